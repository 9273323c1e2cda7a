//! # MLB Control-Bus Module
//!
//! Encoding layer for the VW MLB lateral and longitudinal control frames.
//!
//! This module handles:
//! - Frame catalogue and signal-level data types
//! - Per-frame encoders producing field maps
//! - Stock-frame passthrough (allow-listed or verbatim)
//! - Address-driven checksum dispatch (XOR with seed / CRC8-H2F)

pub mod protocol;
pub mod encoder;
pub mod passthrough;
pub mod checksum;
