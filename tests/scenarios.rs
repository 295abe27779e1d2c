//! The six concrete scenarios from the random-access engine's test
//! matrix, each pinned to seed 42 for reproducibility.

mod support;

use std::collections::BTreeSet;

use satrand::rng::StdUniformRng;
use satrand::{
    AllocationChannelConfig, Engine, RandomAccessConfiguration, SchemeMode, SimTime, TriggerKind,
    TxDecision,
};
use support::FakeMac;

fn rng() -> StdUniformRng {
    StdUniformRng::seed_from_u64(42)
}

#[test]
fn scenario_1_sa_only_dama_available() {
    let mut config = RandomAccessConfiguration::new();
    config.add_allocation_channel(0, AllocationChannelConfig::default());
    let mac = FakeMac::new().with_dama_available(true);
    let mut engine = Engine::new(config, SchemeMode::SaOnly, rng(), mac);
    engine.register_sa_channel(0);
    engine.slotted_aloha_set_control_randomization_interval(50);

    let decision = engine.do_random_access(0, TriggerKind::SlottedAloha, SimTime::ZERO);
    assert_eq!(
        decision,
        TxDecision::DoNothing {
            allocation_channel: 0
        }
    );
}

#[test]
fn scenario_2_sa_only_no_dama() {
    let mut config = RandomAccessConfiguration::new();
    config.add_allocation_channel(0, AllocationChannelConfig::default());
    let mac = FakeMac::new().with_dama_available(false);
    let mut engine = Engine::new(config, SchemeMode::SaOnly, rng(), mac);
    engine.register_sa_channel(0);
    engine.slotted_aloha_set_control_randomization_interval(50);

    let decision = engine.do_random_access(0, TriggerKind::SlottedAloha, SimTime::ZERO);
    match decision {
        TxDecision::SlottedAlohaTx {
            allocation_channel,
            release_delay_ms,
        } => {
            assert_eq!(allocation_channel, 0);
            assert!(release_delay_ms <= 50);
            // The literal draw for seed 42 against this crate's
            // `StdUniformRng` gets pinned here once a run records it;
            // until then the range check above is the binding property.
        }
        other => panic!("expected SlottedAlohaTx, got {other:?}"),
    }
}

#[test]
fn scenario_3_crdsa_first_burst_zero_backoff() {
    let mut config = RandomAccessConfiguration::new();
    config.add_allocation_channel(0, AllocationChannelConfig::default());
    let mac = FakeMac::new().with_candidates(2).with_buffers_empty_after(true);
    let mut engine = Engine::new(config, SchemeMode::CrdsaOnly, rng(), mac);
    engine.register_crdsa_channel(0);
    engine.crdsa_set_randomization_parameters(0, 0, 99, 3);
    engine.crdsa_set_maximum_data_rate_limitation_parameters(0, 2, u32::MAX, 0);
    engine.crdsa_set_payload_bytes(0, 100);

    let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::ZERO);
    match decision {
        TxDecision::CrdsaTx {
            allocation_channel,
            per_payload_slots,
        } => {
            assert_eq!(allocation_channel, 0);
            assert_eq!(per_payload_slots.len(), 2);
            let mut all_slots = BTreeSet::new();
            for set in &per_payload_slots {
                assert_eq!(set.len(), 3);
                for &slot in set {
                    assert!(slot <= 99);
                    assert!(all_slots.insert(slot));
                }
            }
            assert_eq!(all_slots.len(), 6);
        }
        other => panic!("expected CrdsaTx, got {other:?}"),
    }
}

#[test]
fn scenario_4_crdsa_idle_enforcement() {
    let mut config = RandomAccessConfiguration::new();
    config.add_allocation_channel(0, AllocationChannelConfig::default());
    let mac = FakeMac::new().with_candidates(1);
    let mut engine = Engine::new(config, SchemeMode::CrdsaOnly, rng(), mac);
    engine.register_crdsa_channel(0);
    engine.crdsa_set_randomization_parameters(0, 0, 9, 2);
    engine.crdsa_set_maximum_data_rate_limitation_parameters(0, 1, 2, 3);

    let mut emitted = Vec::new();
    for i in 0..5 {
        let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::from_ms(i * 10));
        emitted.push(!decision.is_do_nothing());
    }
    assert_eq!(emitted, vec![true, true, false, false, false]);
}

#[test]
fn scenario_5_any_available_arbitration() {
    let mut config = RandomAccessConfiguration::new();
    config.add_allocation_channel(0, AllocationChannelConfig::default());
    config.add_allocation_channel(1, AllocationChannelConfig::default());
    let mac = FakeMac::new().with_candidates(1);
    let mut engine = Engine::new(config, SchemeMode::AnyAvailable, rng(), mac);
    engine.register_crdsa_channel(0);
    engine.register_sa_channel(0);
    engine.crdsa_set_randomization_parameters(0, 0, 9, 2);
    engine.crdsa_set_maximum_backoff_probability(0, 0.5);
    engine.crdsa_set_load_control_parameters(0, 0.9, 100);
    engine.slotted_aloha_set_control_randomization_interval(50);

    // A second, otherwise-unrelated CRDSA channel, forced into a
    // multi-block idle period so the "fan out to every registered CRDSA
    // channel" fallback behavior is actually observable below.
    engine.register_crdsa_channel(1);
    engine.crdsa_set_randomization_parameters(1, 0, 9, 2);
    engine.crdsa_set_maximum_data_rate_limitation_parameters(1, 1, 1, 3);
    let forcing_decision = engine.do_random_access(1, TriggerKind::Crdsa, SimTime::ZERO);
    assert!(!forcing_decision.is_do_nothing());
    let idle_before = engine.config().allocation_channel_config(1).crdsa_idle_blocks_left();
    assert_eq!(idle_before, 3);

    let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::ZERO);

    assert!(matches!(decision, TxDecision::SlottedAlohaTx { .. }));
    let idle_after = engine.config().allocation_channel_config(1).crdsa_idle_blocks_left();
    assert_eq!(idle_after, idle_before - 1);
}

#[test]
fn scenario_6_replica_uniqueness_stress() {
    let mut config = RandomAccessConfiguration::new();
    config.add_allocation_channel(0, AllocationChannelConfig::default());
    let mac = FakeMac::new().with_candidates(2);
    let mut engine = Engine::new(config, SchemeMode::CrdsaOnly, rng(), mac);
    engine.register_crdsa_channel(0);
    engine.crdsa_set_randomization_parameters(0, 0, 9, 5);
    engine.crdsa_set_maximum_data_rate_limitation_parameters(0, 2, u32::MAX, 0);

    let decision = engine.do_random_access(0, TriggerKind::Crdsa, SimTime::ZERO);
    match decision {
        TxDecision::CrdsaTx { per_payload_slots, .. } => {
            assert_eq!(per_payload_slots.len(), 2);
            let mut union = BTreeSet::new();
            for (i, set) in per_payload_slots.iter().enumerate() {
                for (j, other) in per_payload_slots.iter().enumerate() {
                    if i != j {
                        assert!(set.is_disjoint(other));
                    }
                }
                union.extend(set);
            }
            assert_eq!(union.len(), 10);
        }
        other => panic!("expected CrdsaTx, got {other:?}"),
    }
}
