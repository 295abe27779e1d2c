//! The MAC callback surface the engine queries.
//!
//! The engine never calls back into the MAC asynchronously: every
//! query here is single-valued, non-blocking, and consulted at most a
//! handful of times per [`super::Engine::do_random_access`] call. This
//! mirrors the `UpperLayer` trait boundary used elsewhere in this
//! crate, minus the `Future`: the random-access engine runs to
//! completion between simulator events and has no suspension points.

/// Queries the engine issues against the owning terminal's MAC.
pub trait MacCallbacks {
    /// Does the terminal already hold a scheduled (DAMA) allocation
    /// that can carry the pending packet? Consulted on every decision;
    /// must be cheap.
    fn is_dama_available(&mut self) -> bool;

    /// Are all transmit buffers empty after the most recent candidate
    /// has been accounted for? Used only to re-arm the CRDSA
    /// new-data gate.
    fn are_buffers_empty(&mut self) -> bool;

    /// Given a CRDSA payload size in bytes, how many unique packets
    /// are eligible to be packed into this frame? Never exceeds what
    /// the buffers actually hold.
    fn num_of_candidate_packets(&mut self, payload_bytes: u32) -> u32;
}
