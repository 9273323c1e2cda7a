//! # MLB Control-Bus Constants and Types
//!
//! Frame catalogue, sentinel values and the data types that flow between the
//! encoders, the stock-frame source and the frame emitter.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{MlbCanError, Result};

/// Heading Control Assist (steering torque command)
pub const HCA_01: &str = "HCA_01";
pub const HCA_01_ADDRESS: u32 = 0x126;

/// Lane departure warning HUD
pub const LDW_02: &str = "LDW_02";
pub const LDW_02_ADDRESS: u32 = 0x397;

/// Cruise control stalk buttons
pub const LS_01: &str = "LS_01";
pub const LS_01_ADDRESS: u32 = 0x10B;

/// ACC acceleration command
pub const ACC_01: &str = "ACC_01";
pub const ACC_01_ADDRESS: u32 = 0x109;

/// ACC HUD status
pub const ACC_02: &str = "ACC_02";
pub const ACC_02_ADDRESS: u32 = 0x30C;

/// ACC frames observed on the bus but not emitted by this crate
pub const ACC_04: &str = "ACC_04";
pub const ACC_04_ADDRESS: u32 = 0x324;
pub const ACC_05: &str = "ACC_05";
pub const ACC_05_ADDRESS: u32 = 0x10D;

/// Every frame name this crate knows, with its address
pub const FRAME_CATALOGUE: &[(&str, u32)] = &[
    (HCA_01, HCA_01_ADDRESS),
    (LDW_02, LDW_02_ADDRESS),
    (LS_01, LS_01_ADDRESS),
    (ACC_01, ACC_01_ADDRESS),
    (ACC_02, ACC_02_ADDRESS),
    (ACC_04, ACC_04_ADDRESS),
    (ACC_05, ACC_05_ADDRESS),
];

/// Rolling counter signal name, shared by every frame that carries one
pub const COUNTER: &str = "COUNTER";

/// Rolling counters are 4 bits wide
pub const COUNTER_MODULUS: u8 = 16;

/// "No speed request" sentinel (km/h), used by both HCA_01 and ACC_02
pub const NO_SPEED_REQUEST: f64 = 327.36;

/// Look up the address of a catalogue frame
///
/// # Examples
///
/// ```
/// use mlb_can::mlb::protocol::{frame_address, HCA_01};
///
/// assert_eq!(frame_address(HCA_01), Some(0x126));
/// assert_eq!(frame_address("NOT_A_FRAME"), None);
/// ```
pub fn frame_address(name: &str) -> Option<u32> {
    FRAME_CATALOGUE
        .iter()
        .find(|(frame, _)| *frame == name)
        .map(|&(_, address)| address)
}

/// Signal-name to raw-value map handed to the frame emitter.
///
/// Signals iterate and serialize in alphabetical order of their names, not in
/// the order a record declares them. Booleans are stored as 0/1. No scaling,
/// bit layout or checksum lives here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, f64>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a signal value
    pub fn insert(&mut self, signal: impl Into<String>, value: f64) {
        self.0.insert(signal.into(), value);
    }

    pub fn get(&self, signal: &str) -> Option<f64> {
        self.0.get(signal).copied()
    }

    pub fn contains(&self, signal: &str) -> bool {
        self.0.contains_key(signal)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Overlay `other` on top of this map; values from `other` win
    pub fn overlay(&mut self, other: FieldMap) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, f64)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Snapshot of a frame observed on the bus during the current tick.
///
/// Read-only to the encoders: they copy from it, never write into it.
#[derive(Debug, Clone, PartialEq)]
pub struct StockFrame {
    name: String,
    signals: BTreeMap<String, f64>,
}

impl StockFrame {
    pub fn new(name: impl Into<String>, signals: BTreeMap<String, f64>) -> Self {
        Self {
            name: name.into(),
            signals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read one signal
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the frame does not carry `signal`
    pub fn get(&self, signal: &str) -> Result<f64> {
        self.signals
            .get(signal)
            .copied()
            .ok_or_else(|| MlbCanError::MissingField {
                frame: self.name.clone(),
                field: signal.to_string(),
            })
    }

    /// Read the rolling counter
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if there is no counter, `InvalidSignal` if it is
    /// not an integer in 0..=15
    pub fn counter(&self) -> Result<u8> {
        let raw = self.get(COUNTER)?;
        if !raw.is_finite() || raw.fract() != 0.0 || raw < 0.0 || raw >= f64::from(COUNTER_MODULUS) {
            return Err(MlbCanError::InvalidSignal {
                signal: format!("{}.{}", self.name, COUNTER),
                reason: format!("expected an integer in 0..={}, got {}", COUNTER_MODULUS - 1, raw),
            });
        }
        Ok(raw as u8)
    }

    /// Every signal of the frame, copied into a field map
    pub fn to_field_map(&self) -> FieldMap {
        self.signals.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

/// One encoded frame: the catalogue name, the destination bus and its fields
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub name: &'static str,
    pub bus: u8,
    pub fields: FieldMap,
}

/// Translate a typed frame record into a name-keyed field map.
///
/// Records are plain structs whose fields carry `#[serde(rename = "...")]`
/// signal names. Numbers pass through, booleans become 0/1.
///
/// # Errors
///
/// Returns `InvalidSignal` for non-finite floats (serialized as null) and for
/// anything that is not a number or a boolean.
pub fn to_field_map<T: Serialize>(record: &T) -> Result<FieldMap> {
    let Value::Object(object) = serde_json::to_value(record)? else {
        return Err(MlbCanError::InvalidSignal {
            signal: std::any::type_name::<T>().to_string(),
            reason: "record must serialize to a map of signals".to_string(),
        });
    };

    let mut fields = FieldMap::new();
    for (signal, value) in object {
        let raw = match value {
            Value::Bool(flag) => if flag { 1.0 } else { 0.0 },
            Value::Number(number) => match number.as_f64() {
                Some(raw) => raw,
                None => {
                    return Err(MlbCanError::InvalidSignal {
                        signal,
                        reason: format!("{} is not representable as f64", number),
                    })
                }
            },
            Value::Null => {
                return Err(MlbCanError::InvalidSignal {
                    signal,
                    reason: "non-finite value".to_string(),
                })
            }
            other => {
                return Err(MlbCanError::InvalidSignal {
                    signal,
                    reason: format!("unsupported value {}", other),
                })
            }
        };
        fields.insert(signal, raw);
    }

    Ok(fields)
}
