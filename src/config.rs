//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::controller::{StockFrames, VehicleControlIntent};
use crate::error::{MlbCanError, Result};
use crate::mlb::checksum::XorSeedTable;
use crate::mlb::protocol::{StockFrame, COUNTER, LDW_02, LS_01};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bus: BusConfig,
    pub control: ControlConfig,
    #[serde(default)]
    pub checksum: ChecksumConfig,
    #[serde(default)]
    pub intent: VehicleControlIntent,
    #[serde(default)]
    pub stock: StockConfig,
}

/// Bus routing
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    #[serde(default = "default_pt_bus")]
    pub pt: u8,

    #[serde(default = "default_button_bus")]
    pub buttons: u8,
}

/// Control loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    /// Number of ticks to run; 0 runs until interrupted
    #[serde(default)]
    pub ticks: u64,

    #[serde(default)]
    pub openpilot_longitudinal: bool,
}

/// Checksum seed table selection
#[derive(Debug, Deserialize, Clone)]
pub struct ChecksumConfig {
    #[serde(default = "default_checksum_table")]
    pub table: String,
}

/// Stock frames standing in for bus observation
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StockConfig {
    #[serde(default)]
    pub ldw_02: BTreeMap<String, f64>,

    #[serde(default)]
    pub ls_01: Option<BTreeMap<String, f64>>,
}

// Default value functions
fn default_pt_bus() -> u8 { 0 }
fn default_button_bus() -> u8 { 0 }

fn default_rate_hz() -> u32 { 100 }

fn default_checksum_table() -> String { "extended".to_string() }

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self { table: default_checksum_table() }
    }
}

impl ChecksumConfig {
    /// Seed table named by `table`; anything but "legacy" is the extended table
    pub fn seed_table(&self) -> XorSeedTable {
        match self.table.as_str() {
            "legacy" => XorSeedTable::legacy(),
            _ => XorSeedTable::extended(),
        }
    }
}

impl StockConfig {
    /// Build this tick's stock frame snapshot
    pub fn stock_frames(&self) -> StockFrames {
        StockFrames {
            ldw_02: StockFrame::new(LDW_02, self.ldw_02.clone()),
            ls_01: self.ls_01.clone().map(|signals| StockFrame::new(LS_01, signals)),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> MlbCanError {
    MlbCanError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mlb_can::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        for (name, bus) in [("bus.pt", self.bus.pt), ("bus.buttons", self.bus.buttons)] {
            if bus > 2 {
                return Err(invalid(format!("{} must be between 0 and 2", name)));
            }
        }

        if ![10, 20, 50, 100].contains(&self.control.rate_hz) {
            return Err(invalid("rate_hz must be one of: 10, 20, 50, 100"));
        }

        if !["extended", "legacy"].contains(&self.checksum.table.as_str()) {
            return Err(invalid("checksum table must be 'extended' or 'legacy'"));
        }

        for (name, value) in [
            ("intent.accel", self.intent.accel),
            ("intent.set_speed", self.intent.set_speed),
            ("intent.lead_distance", self.intent.lead_distance),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be a finite number", name)));
            }
        }

        // The LS_01 echo advances the stock counter, so a stock LS_01 must carry one
        if let Some(ls_01) = &self.stock.ls_01 {
            if !ls_01.contains_key(COUNTER) {
                return Err(invalid("stock.ls_01 must contain COUNTER"));
            }
        }

        if (self.intent.cancel || self.intent.resume) && self.stock.ls_01.is_none() {
            return Err(invalid("intent.cancel / intent.resume need a stock.ls_01 table"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config {
            bus: BusConfig {
                pt: default_pt_bus(),
                buttons: default_button_bus(),
            },
            control: ControlConfig {
                rate_hz: default_rate_hz(),
                ticks: 0,
                openpilot_longitudinal: false,
            },
            checksum: ChecksumConfig::default(),
            intent: VehicleControlIntent::default(),
            stock: StockConfig::default(),
        }
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_bus() {
        let mut config = create_valid_config();
        config.bus.buttons = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rate() {
        let mut config = create_valid_config();
        config.control.rate_hz = 250;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_checksum_table() {
        let mut config = create_valid_config();
        config.checksum.table = "crc".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_intent() {
        let mut config = create_valid_config();
        config.intent.accel = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = create_valid_config();
        config.intent.set_speed = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stock_ls_01_requires_counter() {
        let mut config = create_valid_config();
        config.stock.ls_01 = Some(BTreeMap::from([("LS_Codierung".to_string(), 1.0)]));
        assert!(config.validate().is_err());

        config.stock.ls_01 = Some(BTreeMap::from([(COUNTER.to_string(), 1.0)]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_button_request_requires_stock_ls_01() {
        let mut config = create_valid_config();
        config.intent.cancel = true;
        assert!(config.validate().is_err());

        config.stock.ls_01 = Some(BTreeMap::from([(COUNTER.to_string(), 1.0)]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seed_table_selection() {
        let mut checksum = ChecksumConfig::default();
        assert_eq!(checksum.seed_table(), XorSeedTable::extended());
        checksum.table = "legacy".to_string();
        assert_eq!(checksum.seed_table(), XorSeedTable::legacy());
    }

    #[test]
    fn test_stock_frames() {
        let stock = StockConfig {
            ldw_02: BTreeMap::from([("LDW_Gong".to_string(), 1.0)]),
            ls_01: None,
        };
        let frames = stock.stock_frames();
        assert_eq!(frames.ldw_02.name(), LDW_02);
        assert_eq!(frames.ldw_02.get("LDW_Gong").unwrap(), 1.0);
        assert!(frames.ls_01.is_none());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = Config::from_toml("[bus]\n[control]\n").unwrap();
        assert_eq!(config.bus.pt, 0);
        assert_eq!(config.control.rate_hz, 100);
        assert_eq!(config.checksum.table, "extended");
        assert!(!config.control.openpilot_longitudinal);
        assert_eq!(config.intent, VehicleControlIntent::default());
    }

    #[test]
    fn test_missing_section() {
        assert!(Config::from_toml("[bus]\n").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[bus]
pt = 0
buttons = 2

[control]
rate_hz = 50
ticks = 10
openpilot_longitudinal = true

[checksum]
table = "legacy"

[intent]
apply_steer = -42
lat_active = true
set_speed = 300.0

[intent.hud_control]
left_lane_visible = true

[stock.ldw_02]
COUNTER = 0
LDW_Gong = 0

[stock.ls_01]
COUNTER = 5
LS_Hauptschalter = 1
LS_Typ_Hauptschalter = 0
LS_Codierung = 2
LS_Tip_Stufe_2 = 1
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.bus.buttons, 2);
        assert_eq!(config.control.rate_hz, 50);
        assert_eq!(config.intent.apply_steer, -42);
        assert!(config.intent.hud_control.left_lane_visible);
        assert_eq!(config.checksum.seed_table(), XorSeedTable::legacy());
        assert_eq!(config.stock.stock_frames().ls_01.unwrap().counter().unwrap(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/mlb-can.toml");
        assert!(matches!(result, Err(MlbCanError::Io(_))));
    }
}
