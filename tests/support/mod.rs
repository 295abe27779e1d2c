//! Shared test double for the integration test suite. Not part of the
//! crate's public API — each integration test binary pulls this in via
//! `mod support;`.

use satrand::MacCallbacks;

#[derive(Debug, Clone, Default)]
pub struct FakeMac {
    dama_available: bool,
    buffers_empty_after: bool,
    candidates: u32,
}

impl FakeMac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dama_available(mut self, v: bool) -> Self {
        self.dama_available = v;
        self
    }

    pub fn with_buffers_empty_after(mut self, v: bool) -> Self {
        self.buffers_empty_after = v;
        self
    }

    pub fn with_candidates(mut self, v: u32) -> Self {
        self.candidates = v;
        self
    }
}

impl MacCallbacks for FakeMac {
    fn is_dama_available(&mut self) -> bool {
        self.dama_available
    }

    fn are_buffers_empty(&mut self) -> bool {
        self.buffers_empty_after
    }

    fn num_of_candidate_packets(&mut self, _payload_bytes: u32) -> u32 {
        self.candidates
    }
}
