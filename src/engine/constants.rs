#![allow(dead_code)]
//! Default values for a freshly constructed [`super::AllocationChannelConfig`].
//!
//! These are not normative: a host is expected to override all of
//! them through the configuration setters before driving the engine.
//! They only need to be individually valid so a freshly constructed
//! config never fails its own sanity check.

/// Default CRDSA backoff probability: no backoff until configured.
pub const DEFAULT_CRDSA_BACKOFF_PROBABILITY: f64 = 0.0;
/// Default ceiling on the backoff probability above which CRDSA is
/// considered congested in `ANY_AVAILABLE` arbitration.
pub const DEFAULT_CRDSA_MAXIMUM_BACKOFF_PROBABILITY: f64 = 1.0;
/// Default backoff hold time, in milliseconds.
pub const DEFAULT_CRDSA_BACKOFF_TIME_MS: u32 = 0;
/// Default replica-randomization window.
pub const DEFAULT_CRDSA_MIN_RANDOMIZATION_VALUE: u32 = 0;
pub const DEFAULT_CRDSA_MAX_RANDOMIZATION_VALUE: u32 = 2;
/// Default number of replicas per unique payload.
pub const DEFAULT_CRDSA_NUM_OF_INSTANCES: u32 = 2;
/// Default number of unique payloads allowed per block.
pub const DEFAULT_CRDSA_MAX_UNIQUE_PAYLOAD_PER_BLOCK: u32 = 1;
/// Default load-control window: no forced idling until configured.
pub const DEFAULT_CRDSA_MAX_CONSECUTIVE_BLOCKS_ACCESSED: u32 = u32::MAX;
pub const DEFAULT_CRDSA_MIN_IDLE_BLOCKS: u32 = 0;
/// Default CRDSA payload size, in bytes.
pub const DEFAULT_CRDSA_PAYLOAD_BYTES: u32 = 1;

/// Default Slotted ALOHA control randomization interval, in
/// milliseconds.
pub const DEFAULT_SLOTTED_ALOHA_CONTROL_RANDOMIZATION_INTERVAL_MS: u32 = 100;
