//! The engine's sole observable output.

use std::collections::BTreeSet;

/// Index of a slot within a CRDSA frame/block.
pub type SlotIndex = u32;

/// Outcome of one [`super::Engine::do_random_access`] call.
///
/// Every variant carries the allocation channel the call was made on.
/// There is deliberately no fourth variant and no generic "error"
/// variant: anything that is not one of these three is a fatal
/// programming error and is reported as a panic at the call site that
/// produced it, never smuggled through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxDecision {
    /// No transmission opportunity this call.
    DoNothing { allocation_channel: u32 },
    /// Transmit after waiting `release_delay_ms`, per the Slotted ALOHA
    /// release-time randomization.
    SlottedAlohaTx {
        allocation_channel: u32,
        release_delay_ms: u32,
    },
    /// One slot set per unique payload planned for this CRDSA block.
    CrdsaTx {
        allocation_channel: u32,
        per_payload_slots: Vec<BTreeSet<SlotIndex>>,
    },
}

impl TxDecision {
    /// The allocation channel this decision was produced for.
    pub fn allocation_channel(&self) -> u32 {
        match self {
            TxDecision::DoNothing { allocation_channel }
            | TxDecision::SlottedAlohaTx {
                allocation_channel, ..
            }
            | TxDecision::CrdsaTx {
                allocation_channel, ..
            } => *allocation_channel,
        }
    }

    pub fn is_do_nothing(&self) -> bool {
        matches!(self, TxDecision::DoNothing { .. })
    }
}

/// What triggered a call to [`super::Engine::do_random_access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// A frame/block boundary arrived (normally drives CRDSA).
    Crdsa,
    /// A control/data packet became eligible for transmission.
    SlottedAloha,
}

/// Which random-access scheme(s) the engine is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeMode {
    /// Random access is disabled entirely.
    Off,
    /// Only Slotted ALOHA may be used.
    SaOnly,
    /// Only CRDSA may be used.
    CrdsaOnly,
    /// Either scheme may be used; CRDSA triggers fall back to SA under
    /// load control (see [`super::Engine::do_random_access`]).
    AnyAvailable,
}
