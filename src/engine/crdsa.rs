//! CRDSA state machine: backoff timing, the probability check, the
//! consecutive/idle-block load control, and replica slot
//! randomization.

use std::collections::BTreeSet;

use super::{Engine, MacCallbacks, SlotIndex, TxDecision};
use crate::rng::UniformRng;
use crate::time::{Duration, SimTime};

impl<Rng: UniformRng, M: MacCallbacks> Engine<Rng, M> {
    /// Runs the CRDSA algorithm for one allocation channel on one
    /// CRDSA trigger: backoff gate, DAMA preemption, the new-data
    /// backoff gate, the prepare-to-transmit loop, and the
    /// consecutive/idle-block bookkeeping that follows it.
    pub(super) fn run_crdsa(&mut self, channel: u32, now: SimTime) -> TxDecision {
        assert!(
            self.is_crdsa_channel(channel),
            "allocation channel {channel} is not registered as a CRDSA channel"
        );

        // Step 1: backoff gate.
        if !self.crdsa_has_backoff_time_passed(channel, now) {
            debug!("run_crdsa({channel}) - backoff still in effect");
            self.crdsa_reduce_idle_blocks(channel);
            return TxDecision::DoNothing {
                allocation_channel: channel,
            };
        }

        // Step 2: DAMA preemption.
        if self.callbacks.is_dama_available() {
            debug!("run_crdsa({channel}) - DAMA available, yielding to scheduled capacity");
            self.crdsa_reduce_idle_blocks(channel);
            return TxDecision::DoNothing {
                allocation_channel: channel,
            };
        }

        // Step 3: new-data gate, falling through to step 4 when it
        // doesn't fire.
        let decision = if self.crdsa_new_data {
            self.crdsa_new_data = false;
            if self.crdsa_do_backoff(channel) {
                debug!("run_crdsa({channel}) - initial new-data backoff triggered");
                self.crdsa_set_backoff_timer(channel, now);
                TxDecision::DoNothing {
                    allocation_channel: channel,
                }
            } else {
                self.crdsa_prepare_to_transmit(channel, now)
            }
        } else {
            self.crdsa_prepare_to_transmit(channel, now)
        };

        // Step 6 bookkeeping: load-control hysteresis.
        match &decision {
            TxDecision::CrdsaTx { .. } => self
                .config
                .allocation_channel_config_mut(channel)
                .increment_consecutive_blocks_used(),
            TxDecision::DoNothing { .. } => self
                .config
                .allocation_channel_config_mut(channel)
                .reset_consecutive_blocks_used(),
            TxDecision::SlottedAlohaTx { .. } => {
                unreachable!("CRDSA never produces a Slotted ALOHA decision")
            }
        }

        decision
    }

    pub(super) fn crdsa_has_backoff_time_passed(&self, channel: u32, now: SimTime) -> bool {
        now >= self.config.allocation_channel_config(channel).crdsa_backoff_release_time()
    }

    pub(super) fn is_crdsa_backoff_probability_too_high(&self, channel: u32) -> bool {
        let cfg = self.config.allocation_channel_config(channel);
        cfg.crdsa_backoff_probability() >= cfg.crdsa_maximum_backoff_probability()
    }

    fn crdsa_do_backoff(&mut self, channel: u32) -> bool {
        let p = self.config.allocation_channel_config(channel).crdsa_backoff_probability();
        let draw = self.rng.uniform_unit();
        let fires = draw < p;
        trace!("crdsa_do_backoff({channel}) - draw={draw} p={p} -> {fires}");
        fires
    }

    fn crdsa_set_backoff_timer(&mut self, channel: u32, now: SimTime) {
        let backoff_time_ms = self.config.allocation_channel_config(channel).crdsa_backoff_time_ms();
        let release_time = now + Duration::from_ms(backoff_time_ms as i64);
        self.config
            .allocation_channel_config_mut(channel)
            .set_backoff_release_time(release_time);
        debug!("crdsa_set_backoff_timer({channel}) - release at {release_time}");
        // The backoff timer arming path reduces idle blocks on its own,
        // in addition to the unconditional reduction at the end of
        // `crdsa_prepare_to_transmit` — this mirrors the original
        // model exactly and can cost two decrements in the same call.
        self.crdsa_reduce_idle_blocks(channel);
    }

    pub(super) fn crdsa_reduce_idle_blocks(&mut self, channel: u32) {
        self.config
            .allocation_channel_config_mut(channel)
            .decrement_idle_blocks_left();
    }

    pub(super) fn crdsa_reduce_idle_blocks_for_all_allocation_channels(&mut self) {
        let channels: Vec<u32> = self.crdsa_channels.iter().copied().collect();
        for channel in channels {
            self.crdsa_reduce_idle_blocks(channel);
        }
    }

    /// Tries up to `k = min(maxUniquePayloadPerBlock,
    /// numOfCandidatePackets)` unique payloads, each landing on
    /// `numOfInstances` distinct, frame-wide-unique slots.
    fn crdsa_prepare_to_transmit(&mut self, channel: u32, now: SimTime) -> TxDecision {
        let max_unique_payloads = self
            .config
            .allocation_channel_config(channel)
            .crdsa_max_unique_payload_per_block();
        let payload_bytes = self.config.allocation_channel_config(channel).crdsa_payload_bytes();
        let candidates = self.callbacks.num_of_candidate_packets(payload_bytes);
        let k = max_unique_payloads.min(candidates);

        let mut frame_wide: BTreeSet<SlotIndex> = BTreeSet::new();
        let mut per_payload: Vec<BTreeSet<SlotIndex>> = Vec::new();

        for _ in 0..k {
            if self.crdsa_do_backoff(channel) {
                debug!("crdsa_prepare_to_transmit({channel}) - backoff triggered mid-block");
                self.crdsa_set_backoff_timer(channel, now);
                break;
            }

            if self.config.allocation_channel_config(channel).crdsa_idle_blocks_left() > 0 {
                trace!("crdsa_prepare_to_transmit({channel}) - idle in effect, skipping candidate");
                continue;
            }

            let slots = self.crdsa_randomize_tx_opportunities(channel, &frame_wide);
            frame_wide.extend(slots.iter().copied());
            per_payload.push(slots);

            if self.callbacks.are_buffers_empty() {
                self.crdsa_new_data = true;
            }
        }

        self.crdsa_reduce_idle_blocks(channel);

        if per_payload.is_empty() {
            TxDecision::DoNothing {
                allocation_channel: channel,
            }
        } else {
            debug!(
                "crdsa_prepare_to_transmit({channel}) - {} unique payload(s) planned",
                per_payload.len()
            );
            TxDecision::CrdsaTx {
                allocation_channel: channel,
                per_payload_slots: per_payload,
            }
        }
    }

    /// Draws `numOfInstances` distinct slots in
    /// `[min, max]`, disjoint from every slot already planned for
    /// other payloads in this block (`frame_wide`). The rejection loop
    /// always draws, then tests, then rejects or accepts — it never
    /// skips a draw — which is what keeps the RNG stream, and
    /// therefore the decision sequence, deterministic for a fixed seed.
    fn crdsa_randomize_tx_opportunities(
        &mut self,
        channel: u32,
        frame_wide: &BTreeSet<SlotIndex>,
    ) -> BTreeSet<SlotIndex> {
        let cfg = self.config.allocation_channel_config(channel);
        let (min, max, instances) = (
            cfg.crdsa_min_randomization_value(),
            cfg.crdsa_max_randomization_value(),
            cfg.crdsa_num_of_instances(),
        );

        let mut this_packet: BTreeSet<SlotIndex> = BTreeSet::new();
        while (this_packet.len() as u32) < instances {
            let slot = self.rng.uniform_u32(min, max);
            if frame_wide.contains(&slot) || this_packet.contains(&slot) {
                continue;
            }
            let fresh = this_packet.insert(slot);
            debug_assert!(
                fresh,
                "slot {slot} was already disjoint from frame_wide and this_packet yet failed to insert"
            );
        }
        this_packet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AllocationChannelConfig, RandomAccessConfiguration, SchemeMode, TriggerKind};
    use crate::rng::StdUniformRng;
    use crate::test_support::FakeMac;

    fn channel_config(min: u32, max: u32, instances: u32, max_unique: u32, payload_bytes: u32) -> AllocationChannelConfig {
        let mut cfg = AllocationChannelConfig::default();
        cfg.set_crdsa_randomization_parameters(min, max, instances);
        cfg.set_crdsa_max_data_rate_limitation_parameters(max_unique, u32::MAX, 0);
        cfg.set_crdsa_payload_bytes(payload_bytes);
        cfg.sanity_check();
        cfg
    }

    fn engine_with(
        channel: u32,
        cfg: AllocationChannelConfig,
        mac: FakeMac,
    ) -> Engine<StdUniformRng, FakeMac> {
        let mut config = RandomAccessConfiguration::new();
        config.add_allocation_channel(channel, cfg);
        let mut engine = Engine::new(config, SchemeMode::CrdsaOnly, StdUniformRng::seed_from_u64(42), mac);
        engine.register_crdsa_channel(channel);
        engine
    }

    #[test]
    fn first_burst_with_zero_backoff_probability_emits() {
        let cfg = channel_config(0, 99, 3, 2, 100);
        let mac = FakeMac::new().with_candidates(2).with_buffers_empty_after(true);
        let mut engine = engine_with(0, cfg, mac);

        let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::ZERO);
        match decision {
            TxDecision::CrdsaTx {
                per_payload_slots, ..
            } => {
                assert_eq!(per_payload_slots.len(), 2);
                let mut all = BTreeSet::new();
                for set in &per_payload_slots {
                    assert_eq!(set.len(), 3);
                    for slot in set {
                        assert!((0..=99).contains(slot));
                        assert!(all.insert(*slot), "slot {slot} reused across payloads");
                    }
                }
            }
            other => panic!("expected CrdsaTx, got {other:?}"),
        }
    }

    #[test]
    fn dama_available_always_do_nothing() {
        let cfg = channel_config(0, 9, 2, 1, 10);
        let mac = FakeMac::new().with_dama_available(true);
        let mut engine = engine_with(0, cfg, mac);

        for _ in 0..5 {
            let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::ZERO);
            assert_eq!(
                decision,
                TxDecision::DoNothing {
                    allocation_channel: 0
                }
            );
        }
    }

    #[test]
    fn idle_block_enforcement_pattern() {
        let mut cfg = channel_config(0, 9, 2, 1, 10);
        cfg.set_crdsa_max_data_rate_limitation_parameters(1, 2, 3);
        cfg.sanity_check();
        let mac = FakeMac::new().with_candidates(1);
        let mut engine = engine_with(0, cfg, mac);

        let mut emitted = Vec::new();
        for i in 0..5 {
            let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::from_ms(i * 10));
            emitted.push(!decision.is_do_nothing());
        }
        assert_eq!(emitted, vec![true, true, false, false, false]);
    }
}
