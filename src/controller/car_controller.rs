//! # Car Controller
//!
//! Runs one control tick: encodes every frame due for the current intent and
//! hands them to a [`FrameEmitter`]. Holds configuration only; nothing carries
//! over between ticks.

use tracing::{debug, warn};

use super::intent::{StockFrames, VehicleControlIntent};
use crate::config::Config;
use crate::emitter::FrameEmitter;
use crate::error::{MlbCanError, Result};
use crate::mlb::encoder::{
    acc_control_value, acc_hud_status_value, encode_acc_accel_control, encode_acc_buttons,
    encode_acc_hud, encode_lane_departure_hud, encode_steering_control,
};
use crate::mlb::protocol::{EncodedFrame, LS_01};

/// Bus routing and feature switches for the car controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarControllerParams {
    /// Powertrain / extended CAN bus for HCA, LDW and ACC frames
    pub pt_bus: u8,
    /// Bus the LS_01 echo goes to (camera side when relaying through a gateway)
    pub button_bus: u8,
    /// Emit ACC_01 / ACC_02
    pub openpilot_longitudinal: bool,
}

/// Per-tick frame encoder for the MLB platform
#[derive(Debug, Clone, Default)]
pub struct CarController {
    params: CarControllerParams,
}

impl CarController {
    pub fn new(params: CarControllerParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CarControllerParams {
            pt_bus: config.bus.pt,
            button_bus: config.bus.buttons,
            openpilot_longitudinal: config.control.openpilot_longitudinal,
        })
    }

    pub fn params(&self) -> CarControllerParams {
        self.params
    }

    /// Encode the frames for one tick.
    ///
    /// Order: HCA_01, LDW_02, LS_01 (only on cancel/resume), then the ACC
    /// command frames and ACC_02 when longitudinal control is configured.
    ///
    /// # Errors
    ///
    /// [`MlbCanError::MissingFrame`] when cancel or resume is requested but no
    /// stock LS_01 was observed. Propagates encoder errors (missing stock
    /// signals, invalid values).
    pub fn update(&self, intent: &VehicleControlIntent, stock: &StockFrames) -> Result<Vec<EncodedFrame>> {
        let pt = self.params.pt_bus;
        let mut frames = Vec::with_capacity(5);

        frames.push(encode_steering_control(pt, intent.apply_steer, intent.lat_active)?);

        frames.push(encode_lane_departure_hud(
            pt,
            &stock.ldw_02,
            intent.lat_active,
            intent.steering_pressed,
            intent.hud_alert,
            &intent.hud_control,
        )?);

        if intent.cancel || intent.resume {
            let ls_01 = stock.ls_01.as_ref().ok_or_else(|| {
                warn!(
                    "Cannot relay button press (cancel={}, resume={}): no LS_01 observed this tick",
                    intent.cancel, intent.resume
                );
                MlbCanError::MissingFrame(LS_01.to_string())
            })?;
            frames.push(encode_acc_buttons(self.params.button_bus, ls_01, intent.cancel, intent.resume)?);
        }

        if self.params.openpilot_longitudinal {
            let acc_control = acc_control_value(intent.main_switch_on, intent.long_fault, intent.long_active);
            frames.extend(encode_acc_accel_control(pt, intent.long_active, intent.accel, acc_control)?);

            let acc_hud_status = acc_hud_status_value(intent.main_switch_on, intent.long_fault, intent.long_active);
            frames.push(encode_acc_hud(
                pt,
                acc_hud_status,
                intent.set_speed,
                intent.lead_distance,
                intent.distance,
            )?);
        }

        debug!("Encoded {} frames", frames.len());
        Ok(frames)
    }

    /// Hand encoded frames to the emitter, in order.
    ///
    /// Stops at the first emitter error.
    pub fn emit<E: FrameEmitter>(&self, frames: &[EncodedFrame], emitter: &mut E) -> Result<Vec<E::Frame>> {
        frames
            .iter()
            .map(|frame| emitter.emit(frame.name, frame.bus, &frame.fields))
            .collect()
    }
}
