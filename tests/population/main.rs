//! Population Integration Tests
//!
//! Multi-rank gather/transform/scatter behavior over the in-process
//! transport, one thread per rank.

#[path = "../common/mod.rs"]
mod common;

mod derived_columns;
mod failure_propagation;
mod parameter_preflight;
mod repopulation;
mod round_trip;
