//! # MLB CAN Library
//!
//! Encodes lateral and longitudinal control intents into VW MLB control-bus
//! frames.
//!
//! This library provides the encoding layer between a driving policy and a
//! frame packer: per-frame field maps, stock-frame passthrough, rolling
//! counters and the per-address checksum selection.

pub mod config;
pub mod error;
pub mod mlb;
pub mod controller;
pub mod emitter;
