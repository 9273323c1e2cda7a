//! # Controller Module
//!
//! The per-tick caller of the MLB encoders.
//!
//! This module handles:
//! - Control intent and stock-frame snapshots for one tick
//! - Choosing which frames are due and on which bus
//! - Handing encoded frames to a frame emitter

pub mod intent;
pub mod car_controller;

pub use car_controller::{CarController, CarControllerParams};
pub use intent::{HudControl, StockFrames, VehicleControlIntent};
