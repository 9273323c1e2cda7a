//! # Control Intent
//!
//! What the driving policy wants this tick, and what the bus showed this tick.

use serde::Deserialize;

use crate::mlb::protocol::StockFrame;

/// Lane lines and departures reported by the driving policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HudControl {
    pub left_lane_visible: bool,
    pub right_lane_visible: bool,
    pub left_lane_depart: bool,
    pub right_lane_depart: bool,
}

/// Lateral and longitudinal control intent for one tick.
///
/// Built fresh by the caller every tick. Also deserializable so a scripted
/// intent can live in the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleControlIntent {
    /// Steering torque command in HCA units (0.01 Nm), signed
    pub apply_steer: i32,
    /// Lateral control engaged
    pub lat_active: bool,
    /// Driver is overriding the steering
    pub steering_pressed: bool,
    pub hud_control: HudControl,
    /// LDW_02 text / alert code
    pub hud_alert: u8,

    /// Cruise stalk requests to relay
    pub cancel: bool,
    pub resume: bool,

    pub main_switch_on: bool,
    pub long_active: bool,
    pub long_fault: bool,
    /// Commanded acceleration (m/s²)
    pub accel: f64,
    pub stopping: bool,
    pub starting: bool,
    pub esp_hold: bool,
    pub acc_type: u8,

    /// Cruise set speed (km/h)
    pub set_speed: f64,
    /// Lead vehicle distance index
    pub lead_distance: f64,
    /// Driver time-gap setting
    pub distance: u8,
}

/// Stock frames observed on the bus during the current tick
#[derive(Debug, Clone, PartialEq)]
pub struct StockFrames {
    /// Lane departure HUD from the camera; required every tick
    pub ldw_02: StockFrame,
    /// Cruise stalk; only needed when a button press is relayed
    pub ls_01: Option<StockFrame>,
}
