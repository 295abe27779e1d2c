//! Slotted ALOHA. The simplest of the two schemes — a single DAMA
//! check followed by one uniform draw for the release delay within
//! the shared control randomization interval.

use super::{Engine, MacCallbacks, TxDecision};
use crate::rng::UniformRng;

impl<Rng: UniformRng, M: MacCallbacks> Engine<Rng, M> {
    pub(super) fn run_sa(&mut self, channel: u32) -> TxDecision {
        assert!(
            self.is_sa_channel(channel),
            "allocation channel {channel} is not registered as a Slotted ALOHA channel"
        );

        if self.callbacks.is_dama_available() {
            debug!("run_sa({channel}) - DAMA available, yielding to scheduled capacity");
            return TxDecision::DoNothing {
                allocation_channel: channel,
            };
        }

        let interval_ms = self.config.slotted_aloha_control_randomization_interval_ms();
        let release_delay_ms = self.rng.uniform_u32(0, interval_ms);
        trace!("run_sa({channel}) - release_delay_ms={release_delay_ms} (interval={interval_ms})");

        TxDecision::SlottedAlohaTx {
            allocation_channel: channel,
            release_delay_ms,
        }
    }
}
