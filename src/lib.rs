#![allow(unused)]
//! Random-access transmission-opportunity engine for a satellite
//! return-link terminal.
//!
//! This crate implements the decision logic a terminal's MAC uses to
//! decide when, and on which slots, it may transmit on a
//! contention-based return channel. Two schemes are supported:
//! Slotted ALOHA (SA) and Contention Resolution Diversity Slotted
//! ALOHA (CRDSA). See [`engine::Engine`] for the entry point.

#[macro_use]
pub(crate) mod utils;

pub mod engine;
pub mod rng;
pub mod time;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{
    AllocationChannelConfig, Engine, MacCallbacks, RandomAccessConfiguration, SchemeMode,
    SlotIndex, TriggerKind, TxDecision,
};
pub use rng::UniformRng;
pub use time::{Duration, SimTime};
