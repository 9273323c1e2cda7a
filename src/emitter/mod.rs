//! # Frame Emitter Module
//!
//! The seam between encoded field maps and whatever packs and sends frames.
//!
//! This module handles:
//! - The [`FrameEmitter`] trait consumed by the car controller
//! - A JSON-lines emitter that records each frame with its address and the
//!   checksum algorithm its address selects

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{MlbCanError, Result};
use crate::mlb::checksum::XorSeedTable;
use crate::mlb::protocol::{frame_address, FieldMap};

/// Turns a frame name, bus and field map into a transmittable frame
#[cfg_attr(test, mockall::automock(type Frame = EmittedFrame;))]
pub trait FrameEmitter {
    /// Frame type produced by the emitter
    type Frame;

    /// Pack and hand over one frame
    fn emit(&mut self, frame_name: &str, bus: u8, fields: &FieldMap) -> Result<Self::Frame>;
}

/// One line of emitter output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedFrame {
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    pub name: String,
    pub address: u32,
    pub bus: u8,
    /// Algorithm selected for `address`, e.g. `xor(0x08)` or `crc8h2f`
    pub checksum: String,
    pub fields: FieldMap,
}

/// Writes one JSON object per emitted frame
pub struct JsonLinesEmitter<W> {
    writer: W,
    table: XorSeedTable,
}

impl<W> std::fmt::Debug for JsonLinesEmitter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesEmitter")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(writer: W, table: XorSeedTable) -> Self {
        Self { writer, table }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameEmitter for JsonLinesEmitter<W> {
    type Frame = EmittedFrame;

    fn emit(&mut self, frame_name: &str, bus: u8, fields: &FieldMap) -> Result<EmittedFrame> {
        let address = frame_address(frame_name)
            .ok_or_else(|| MlbCanError::UnknownFrame(frame_name.to_string()))?;

        let frame = EmittedFrame {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            name: frame_name.to_string(),
            address,
            bus,
            checksum: self.table.select(address).to_string(),
            fields: fields.clone(),
        };

        serde_json::to_writer(&mut self.writer, &frame)?;
        self.writer.write_all(b"\n")?;

        debug!("Emitted {} (0x{:03X}) on bus {}", frame_name, address, bus);
        Ok(frame)
    }
}
