//! # MLB Frame Encoders
//!
//! Turns control intents into field maps for the frames this crate emits.
//! Every encoder is a pure function of its arguments; the only value carried
//! across ticks is the rolling counter, and that is read back from the stock
//! frame each time.
//!
//! | Frame | Encoder | Passthrough |
//! |-------|---------|-------------|
//! | HCA_01 | [`encode_steering_control`] | none |
//! | LDW_02 | [`encode_lane_departure_hud`] | whole stock frame |
//! | LS_01 | [`encode_acc_buttons`] | [`LS_01_PASSTHROUGH`] |
//! | ACC_01 | [`encode_acc_accel_control`] | none |
//! | ACC_02 | [`encode_acc_hud`] | none |

use serde::Serialize;

use super::passthrough::PassthroughMerger;
use super::protocol::*;
use crate::controller::intent::HudControl;
use crate::error::{MlbCanError, Result};

/// HCA_01 status while lateral control is active
pub const HCA_STATUS_ACTIVE: u8 = 7;

/// HCA_01 status while lateral control is off
pub const HCA_STATUS_STANDBY: u8 = 3;

/// HCA_01 vibration frequency
pub const HCA_VIB_FREQ: u8 = 18;

/// ACC_01 allowed deviation from the requested acceleration (m/s²), both directions
pub const ACC_REGELABW: f64 = 0.2;

/// ACC_01 jerk limit while enabled (m/s³), both directions
pub const ACC_JERK_LIMIT: f64 = 4.0;

/// ACC_01 dynamics mode
pub const ACC_DYNAMIK_MODUS: u8 = 3;

/// ACC_02 display priority
pub const ACC_DISPLAY_PRIO: u8 = 3;

/// Set speeds at or above this (km/h) are sent as [`NO_SPEED_REQUEST`]
pub const ACC_SET_SPEED_MAX: f64 = 250.0;

/// ACC_02 time-gap display index offset
pub const ACC_ZEITLUECKE_OFFSET: u8 = 2;

/// LS_01 signals copied from the stock frame. These are stalk coding and type
/// bits the control loop must not invent.
pub const LS_01_PASSTHROUGH: &[&str] = &[
    "LS_Hauptschalter",
    "LS_Typ_Hauptschalter",
    "LS_Codierung",
    "LS_Tip_Stufe_2",
];

/// ACC state shared by ACC_01 (control) and ACC_02 (HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AccControlState {
    Disabled = 0,
    Ready = 2,
    Active = 3,
    Fault = 6,
}

impl AccControlState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Resolve the ACC control state.
///
/// A fault beats active control, active control beats a main switch that is
/// merely on.
///
/// # Examples
///
/// ```
/// use mlb_can::mlb::encoder::{acc_control_value, AccControlState};
///
/// assert_eq!(acc_control_value(true, true, true), AccControlState::Fault);
/// assert_eq!(acc_control_value(true, false, true), AccControlState::Active);
/// ```
pub fn acc_control_value(main_switch_on: bool, acc_faulted: bool, long_active: bool) -> AccControlState {
    if acc_faulted {
        AccControlState::Fault
    } else if long_active {
        AccControlState::Active
    } else if main_switch_on {
        AccControlState::Ready
    } else {
        AccControlState::Disabled
    }
}

/// Resolve the ACC HUD state.
///
/// Same as [`acc_control_value`] for now. Initialization and gas-override
/// states are not distinguished on the HUD yet.
pub fn acc_hud_status_value(main_switch_on: bool, acc_faulted: bool, long_active: bool) -> AccControlState {
    acc_control_value(main_switch_on, acc_faulted, long_active)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteeringCommand {
    #[serde(rename = "HCA_01_Status_HCA")]
    pub status: u8,
    #[serde(rename = "HCA_01_LM_Offset")]
    pub torque: u32,
    #[serde(rename = "HCA_01_LM_OffSign")]
    pub torque_negative: bool,
    #[serde(rename = "HCA_01_Vib_Freq")]
    pub vib_freq: u8,
    #[serde(rename = "HCA_01_Sendestatus")]
    pub send_status: bool,
    #[serde(rename = "EA_ACC_Wunschgeschwindigkeit")]
    pub ea_speed_request: f64,
}

/// Encode HCA_01.
///
/// The torque is sent as magnitude plus sign. It is not clamped here.
///
/// # Examples
///
/// ```
/// use mlb_can::mlb::encoder::encode_steering_control;
///
/// let frame = encode_steering_control(0, -5, true)?;
/// assert_eq!(frame.fields.get("HCA_01_Status_HCA"), Some(7.0));
/// assert_eq!(frame.fields.get("HCA_01_LM_Offset"), Some(5.0));
/// assert_eq!(frame.fields.get("HCA_01_LM_OffSign"), Some(1.0));
/// # Ok::<(), mlb_can::error::MlbCanError>(())
/// ```
pub fn encode_steering_control(bus: u8, apply_steer: i32, lkas_enabled: bool) -> Result<EncodedFrame> {
    let record = SteeringCommand {
        status: if lkas_enabled { HCA_STATUS_ACTIVE } else { HCA_STATUS_STANDBY },
        torque: apply_steer.unsigned_abs(),
        torque_negative: apply_steer < 0,
        vib_freq: HCA_VIB_FREQ,
        send_status: lkas_enabled,
        ea_speed_request: NO_SPEED_REQUEST,
    };

    Ok(EncodedFrame {
        name: HCA_01,
        bus,
        fields: to_field_map(&record)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneDepartureHud {
    #[serde(rename = "LDW_Status_LED_gelb")]
    pub led_yellow: bool,
    #[serde(rename = "LDW_Status_LED_gruen")]
    pub led_green: bool,
    #[serde(rename = "LDW_Lernmodus_links")]
    pub learn_mode_left: u8,
    #[serde(rename = "LDW_Lernmodus_rechts")]
    pub learn_mode_right: u8,
    #[serde(rename = "LDW_Texte")]
    pub text: u8,
}

/// Lane line display: 1 = not seen, 2 = visible, 3 = departing
fn learn_mode(visible: bool, depart: bool) -> u8 {
    if depart {
        3
    } else {
        1 + u8::from(visible)
    }
}

/// Encode LDW_02 on top of the complete stock frame.
///
/// The stock signals are numerous and not understood here, so all of them are
/// carried over. Yellow LED while the driver overrides, green otherwise.
pub fn encode_lane_departure_hud(
    bus: u8,
    ldw_stock: &StockFrame,
    enabled: bool,
    steering_pressed: bool,
    hud_alert: u8,
    hud: &HudControl,
) -> Result<EncodedFrame> {
    let record = LaneDepartureHud {
        led_yellow: enabled && steering_pressed,
        led_green: enabled && !steering_pressed,
        learn_mode_left: learn_mode(hud.left_lane_visible, hud.left_lane_depart),
        learn_mode_right: learn_mode(hud.right_lane_visible, hud.right_lane_depart),
        text: hud_alert,
    };

    let fields = PassthroughMerger::Verbatim.merge(ldw_stock, to_field_map(&record)?)?;
    Ok(EncodedFrame { name: LDW_02, bus, fields })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccButtons {
    #[serde(rename = "COUNTER")]
    pub counter: u8,
    #[serde(rename = "LS_Abbrechen")]
    pub cancel: bool,
    #[serde(rename = "LS_Tip_Wiederaufnahme")]
    pub resume: bool,
}

/// Encode LS_01 to relay a cancel or resume press.
///
/// Only [`LS_01_PASSTHROUGH`] is copied from the stock frame; the counter is
/// the stock counter plus one, modulo 16.
///
/// # Errors
///
/// `MissingField` if the stock frame lacks a passthrough signal or the
/// counter, `InvalidSignal` if the stock counter is out of range.
pub fn encode_acc_buttons(bus: u8, ls_stock: &StockFrame, cancel: bool, resume: bool) -> Result<EncodedFrame> {
    let record = AccButtons {
        counter: (ls_stock.counter()? + 1) % COUNTER_MODULUS,
        cancel,
        resume,
    };

    let fields = PassthroughMerger::AllowList(LS_01_PASSTHROUGH).merge(ls_stock, to_field_map(&record)?)?;
    Ok(EncodedFrame { name: LS_01, bus, fields })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccAccelCommand {
    #[serde(rename = "ACC_Status_ACC")]
    pub status: u8,
    #[serde(rename = "ACC_Sollbeschleunigung_02")]
    pub accel: f64,
    #[serde(rename = "ACC_zul_Regelabw_unten")]
    pub tolerance_lower: f64,
    #[serde(rename = "ACC_zul_Regelabw_oben")]
    pub tolerance_upper: f64,
    #[serde(rename = "ACC_neg_Sollbeschl_Grad_02")]
    pub jerk_negative: f64,
    #[serde(rename = "ACC_pos_Sollbeschl_Grad_02")]
    pub jerk_positive: f64,
    #[serde(rename = "ACC_Dynamikmodus")]
    pub dynamics_mode: u8,
    #[serde(rename = "ACC_Minimale_Bremsung")]
    pub minimum_braking: bool,
}

/// Encode the longitudinal command frames.
///
/// Returns every frame of the command; today that is ACC_01 alone. While
/// disabled both the acceleration and the jerk limits are zero.
///
/// # Errors
///
/// `InvalidSignal` if `accel` is not finite while enabled.
pub fn encode_acc_accel_control(
    bus: u8,
    acc_enabled: bool,
    accel: f64,
    acc_control: AccControlState,
) -> Result<Vec<EncodedFrame>> {
    let jerk_limit = if acc_enabled { ACC_JERK_LIMIT } else { 0.0 };
    let record = AccAccelCommand {
        status: acc_control.code(),
        accel: if acc_enabled { accel } else { 0.0 },
        tolerance_lower: ACC_REGELABW,
        tolerance_upper: ACC_REGELABW,
        jerk_negative: jerk_limit,
        jerk_positive: jerk_limit,
        dynamics_mode: ACC_DYNAMIK_MODUS,
        minimum_braking: false,
    };

    Ok(vec![EncodedFrame {
        name: ACC_01,
        bus,
        fields: to_field_map(&record)?,
    }])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccHud {
    #[serde(rename = "ACC_Status_Anzeige")]
    pub status: u8,
    #[serde(rename = "ACC_Wunschgeschw_02")]
    pub set_speed: f64,
    #[serde(rename = "ACC_Gesetzte_Zeitluecke")]
    pub time_gap: u8,
    #[serde(rename = "ACC_Display_Prio")]
    pub display_prio: u8,
    #[serde(rename = "ACC_Abstandsindex")]
    pub lead_distance: f64,
}

/// Encode ACC_02.
///
/// `distance` is the driver's time-gap setting, shifted into the display index.
///
/// # Errors
///
/// A NaN `set_speed` is [`MlbCanError::InvalidSignal`]; `+inf` is out of range
/// and goes out as [`NO_SPEED_REQUEST`].
pub fn encode_acc_hud(
    bus: u8,
    acc_hud_status: AccControlState,
    set_speed: f64,
    lead_distance: f64,
    distance: u8,
) -> Result<EncodedFrame> {
    if set_speed.is_nan() {
        return Err(MlbCanError::InvalidSignal {
            signal: "ACC_Wunschgeschw_02".to_string(),
            reason: "set speed is NaN".to_string(),
        });
    }

    let record = AccHud {
        status: acc_hud_status.code(),
        set_speed: if set_speed < ACC_SET_SPEED_MAX { set_speed } else { NO_SPEED_REQUEST },
        time_gap: distance.saturating_add(ACC_ZEITLUECKE_OFFSET),
        display_prio: ACC_DISPLAY_PRIO,
        lead_distance,
    };

    Ok(EncodedFrame {
        name: ACC_02,
        bus,
        fields: to_field_map(&record)?,
    })
}
