//! Per-allocation-channel configuration and its sanity checks.
//!
//! This is the direct analogue of a PAN Information Base elsewhere in
//! this crate: a flat bag of parameters plus runtime counters, with a
//! sanity check invoked after every mutation rather than encoded in
//! the type system (the invariants cross several fields at once, so a
//! typestate encoding would just move the checks to construction time
//! without removing them).

use std::collections::BTreeMap;

use super::constants::*;
use crate::time::SimTime;

/// One allocation channel's CRDSA/SA parameters and the runtime
/// counters the load-control and backoff state machines update.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationChannelConfig {
    crdsa_backoff_probability: f64,
    crdsa_maximum_backoff_probability: f64,
    crdsa_backoff_time_ms: u32,
    crdsa_backoff_release_time: SimTime,
    crdsa_min_randomization_value: u32,
    crdsa_max_randomization_value: u32,
    crdsa_num_of_instances: u32,
    crdsa_max_unique_payload_per_block: u32,
    crdsa_max_consecutive_blocks_accessed: u32,
    crdsa_min_idle_blocks: u32,
    crdsa_num_of_consecutive_blocks_used: u32,
    crdsa_idle_blocks_left: u32,
    crdsa_payload_bytes: u32,
}

impl Default for AllocationChannelConfig {
    fn default() -> Self {
        let config = Self {
            crdsa_backoff_probability: DEFAULT_CRDSA_BACKOFF_PROBABILITY,
            crdsa_maximum_backoff_probability: DEFAULT_CRDSA_MAXIMUM_BACKOFF_PROBABILITY,
            crdsa_backoff_time_ms: DEFAULT_CRDSA_BACKOFF_TIME_MS,
            crdsa_backoff_release_time: SimTime::ZERO,
            crdsa_min_randomization_value: DEFAULT_CRDSA_MIN_RANDOMIZATION_VALUE,
            crdsa_max_randomization_value: DEFAULT_CRDSA_MAX_RANDOMIZATION_VALUE,
            crdsa_num_of_instances: DEFAULT_CRDSA_NUM_OF_INSTANCES,
            crdsa_max_unique_payload_per_block: DEFAULT_CRDSA_MAX_UNIQUE_PAYLOAD_PER_BLOCK,
            crdsa_max_consecutive_blocks_accessed: DEFAULT_CRDSA_MAX_CONSECUTIVE_BLOCKS_ACCESSED,
            crdsa_min_idle_blocks: DEFAULT_CRDSA_MIN_IDLE_BLOCKS,
            crdsa_num_of_consecutive_blocks_used: 0,
            crdsa_idle_blocks_left: 0,
            crdsa_payload_bytes: DEFAULT_CRDSA_PAYLOAD_BYTES,
        };
        config.sanity_check();
        config
    }
}

impl AllocationChannelConfig {
    /// Validates every cross-field invariant on this allocation
    /// channel's configuration. Panics naming the offending field on
    /// violation: these are configuration bugs, not runtime conditions
    /// a caller can recover from.
    pub(crate) fn sanity_check(&self) {
        assert!(
            (0.0..=1.0).contains(&self.crdsa_backoff_probability),
            "crdsaBackoffProbability out of range [0,1]: {}",
            self.crdsa_backoff_probability
        );
        assert!(
            (0.0..=1.0).contains(&self.crdsa_maximum_backoff_probability),
            "crdsaMaximumBackoffProbability out of range [0,1]: {}",
            self.crdsa_maximum_backoff_probability
        );
        assert!(
            self.crdsa_min_randomization_value < self.crdsa_max_randomization_value,
            "crdsaMinRandomizationValue ({}) must be < crdsaMaxRandomizationValue ({})",
            self.crdsa_min_randomization_value,
            self.crdsa_max_randomization_value
        );
        let span = self.crdsa_max_randomization_value - self.crdsa_min_randomization_value;
        assert!(
            self.crdsa_num_of_instances >= 2,
            "crdsaNumOfInstances must be >= 2: {}",
            self.crdsa_num_of_instances
        );
        assert!(
            span >= self.crdsa_num_of_instances,
            "randomization span ({span}) must be >= crdsaNumOfInstances ({})",
            self.crdsa_num_of_instances
        );
        assert!(
            self.crdsa_max_unique_payload_per_block >= 1,
            "crdsaMaxUniquePayloadPerBlock must be >= 1: {}",
            self.crdsa_max_unique_payload_per_block
        );
        let num_slots = span + 1;
        assert!(
            self.crdsa_max_unique_payload_per_block * self.crdsa_num_of_instances <= num_slots,
            "crdsaMaxUniquePayloadPerBlock ({}) * crdsaNumOfInstances ({}) must be <= the number of distinct slots in [min, max] ({num_slots}), otherwise replica randomization cannot terminate",
            self.crdsa_max_unique_payload_per_block,
            self.crdsa_num_of_instances
        );
        assert!(
            self.crdsa_max_consecutive_blocks_accessed >= 1,
            "crdsaMaxConsecutiveBlocksAccessed must be >= 1: {}",
            self.crdsa_max_consecutive_blocks_accessed
        );
        assert!(
            self.crdsa_payload_bytes >= 1,
            "crdsaPayloadBytes must be >= 1: {}",
            self.crdsa_payload_bytes
        );
        assert!(
            self.crdsa_num_of_consecutive_blocks_used <= self.crdsa_max_consecutive_blocks_accessed,
            "crdsaNumOfConsecutiveBlocksUsed ({}) must be <= crdsaMaxConsecutiveBlocksAccessed ({})",
            self.crdsa_num_of_consecutive_blocks_used,
            self.crdsa_max_consecutive_blocks_accessed
        );
        assert!(
            self.crdsa_idle_blocks_left <= self.crdsa_min_idle_blocks,
            "crdsaIdleBlocksLeft ({}) must be <= crdsaMinIdleBlocks ({})",
            self.crdsa_idle_blocks_left,
            self.crdsa_min_idle_blocks
        );
    }

    // ---- configuration setters (validated as a group by the caller via sanity_check) ----

    pub(crate) fn set_crdsa_backoff_probability(&mut self, v: f64) {
        self.crdsa_backoff_probability = v;
    }

    pub(crate) fn set_crdsa_maximum_backoff_probability(&mut self, v: f64) {
        self.crdsa_maximum_backoff_probability = v;
    }

    pub(crate) fn set_crdsa_backoff_time_ms(&mut self, v: u32) {
        self.crdsa_backoff_time_ms = v;
    }

    pub(crate) fn set_crdsa_payload_bytes(&mut self, v: u32) {
        self.crdsa_payload_bytes = v;
    }

    pub(crate) fn set_crdsa_randomization_parameters(&mut self, min: u32, max: u32, num_instances: u32) {
        self.crdsa_min_randomization_value = min;
        self.crdsa_max_randomization_value = max;
        self.crdsa_num_of_instances = num_instances;
    }

    pub(crate) fn set_crdsa_max_data_rate_limitation_parameters(
        &mut self,
        max_unique_payload_per_block: u32,
        max_consecutive_blocks_accessed: u32,
        min_idle_blocks: u32,
    ) {
        self.crdsa_max_unique_payload_per_block = max_unique_payload_per_block;
        self.crdsa_max_consecutive_blocks_accessed = max_consecutive_blocks_accessed;
        self.crdsa_min_idle_blocks = min_idle_blocks;
    }

    // ---- runtime mutations driven by the CRDSA state machine ----

    pub(crate) fn set_backoff_release_time(&mut self, t: SimTime) {
        self.crdsa_backoff_release_time = t;
    }

    pub(crate) fn decrement_idle_blocks_left(&mut self) {
        self.crdsa_idle_blocks_left = self.crdsa_idle_blocks_left.saturating_sub(1);
    }

    pub(crate) fn force_idle(&mut self) {
        self.crdsa_idle_blocks_left = self.crdsa_min_idle_blocks;
        self.crdsa_num_of_consecutive_blocks_used = 0;
    }

    pub(crate) fn increment_consecutive_blocks_used(&mut self) {
        self.crdsa_num_of_consecutive_blocks_used += 1;
        if self.crdsa_num_of_consecutive_blocks_used >= self.crdsa_max_consecutive_blocks_accessed {
            self.force_idle();
        }
    }

    pub(crate) fn reset_consecutive_blocks_used(&mut self) {
        self.crdsa_num_of_consecutive_blocks_used = 0;
    }

    // ---- read-only accessors (test hooks + internal use) ----

    pub fn crdsa_backoff_probability(&self) -> f64 {
        self.crdsa_backoff_probability
    }

    pub fn crdsa_maximum_backoff_probability(&self) -> f64 {
        self.crdsa_maximum_backoff_probability
    }

    pub fn crdsa_backoff_time_ms(&self) -> u32 {
        self.crdsa_backoff_time_ms
    }

    pub fn crdsa_backoff_release_time(&self) -> SimTime {
        self.crdsa_backoff_release_time
    }

    pub fn crdsa_min_randomization_value(&self) -> u32 {
        self.crdsa_min_randomization_value
    }

    pub fn crdsa_max_randomization_value(&self) -> u32 {
        self.crdsa_max_randomization_value
    }

    pub fn crdsa_num_of_instances(&self) -> u32 {
        self.crdsa_num_of_instances
    }

    pub fn crdsa_max_unique_payload_per_block(&self) -> u32 {
        self.crdsa_max_unique_payload_per_block
    }

    pub fn crdsa_max_consecutive_blocks_accessed(&self) -> u32 {
        self.crdsa_max_consecutive_blocks_accessed
    }

    pub fn crdsa_min_idle_blocks(&self) -> u32 {
        self.crdsa_min_idle_blocks
    }

    pub fn crdsa_num_of_consecutive_blocks_used(&self) -> u32 {
        self.crdsa_num_of_consecutive_blocks_used
    }

    pub fn crdsa_idle_blocks_left(&self) -> u32 {
        self.crdsa_idle_blocks_left
    }

    pub fn crdsa_payload_bytes(&self) -> u32 {
        self.crdsa_payload_bytes
    }
}

impl core::fmt::Display for AllocationChannelConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "consecutive {}/{}, idle {}/{}, backoff release {}",
            self.crdsa_num_of_consecutive_blocks_used,
            self.crdsa_max_consecutive_blocks_accessed,
            self.crdsa_idle_blocks_left,
            self.crdsa_min_idle_blocks,
            self.crdsa_backoff_release_time,
        )
    }
}

/// Shared configuration for a terminal's random-access engine: the
/// per-allocation-channel parameter sets plus the one global Slotted
/// ALOHA parameter.
#[derive(Debug, Clone)]
pub struct RandomAccessConfiguration {
    channels: BTreeMap<u32, AllocationChannelConfig>,
    slotted_aloha_control_randomization_interval_ms: u32,
}

impl Default for RandomAccessConfiguration {
    fn default() -> Self {
        Self {
            channels: BTreeMap::new(),
            slotted_aloha_control_randomization_interval_ms:
                DEFAULT_SLOTTED_ALOHA_CONTROL_RANDOMIZATION_INTERVAL_MS,
        }
    }
}

impl RandomAccessConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an allocation channel with its initial (caller-built)
    /// configuration. Overwrites any previous configuration for the
    /// same id, mirroring how the original configuration object is
    /// populated one allocation channel at a time from a config file.
    pub fn add_allocation_channel(&mut self, channel: u32, config: AllocationChannelConfig) {
        config.sanity_check();
        self.channels.insert(channel, config);
    }

    pub fn num_of_allocation_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn allocation_channel_config(&self, channel: u32) -> &AllocationChannelConfig {
        self.channels
            .get(&channel)
            .unwrap_or_else(|| panic!("allocation channel {channel} is not configured"))
    }

    pub(crate) fn allocation_channel_config_mut(&mut self, channel: u32) -> &mut AllocationChannelConfig {
        self.channels
            .get_mut(&channel)
            .unwrap_or_else(|| panic!("allocation channel {channel} is not configured"))
    }

    pub fn slotted_aloha_control_randomization_interval_ms(&self) -> u32 {
        self.slotted_aloha_control_randomization_interval_ms
    }

    pub(crate) fn set_slotted_aloha_control_randomization_interval_ms(&mut self, ms: u32) {
        self.slotted_aloha_control_randomization_interval_ms = ms;
        self.sanity_check_slotted_aloha();
    }

    fn sanity_check_slotted_aloha(&self) {
        assert!(
            self.slotted_aloha_control_randomization_interval_ms >= 1,
            "slottedAlohaControlRandomizationInterval must be >= 1 ms: {}",
            self.slotted_aloha_control_randomization_interval_ms
        );
    }
}
