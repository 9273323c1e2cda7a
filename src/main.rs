//! # MLB CAN
//!
//! Runs the MLB control-frame encoders against a scripted intent.
//!
//! Frames are written to stdout as JSON lines; logs go to stderr.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use mlb_can::config::Config;
use mlb_can::controller::CarController;
use mlb_can::emitter::JsonLinesEmitter;
use mlb_can::mlb::protocol::{EncodedFrame, StockFrame, LS_01};

/// Config file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 1000;

/// Main entry point for MLB CAN
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, or `config/default.toml`)
///    - Configure the tick interval from `control.rate_hz`
///
/// 2. **Main Loop**
///    - Encode the configured intent against the current stock frames
///    - Emit every frame as a JSON line
///    - Feed an emitted LS_01 back as the next tick's observed LS_01
///
/// 3. **Shutdown**
///    - After `control.ticks` ticks, or on Ctrl+C
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("MLB CAN v{} starting...", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path))?;
    info!("Loaded configuration from {}", path);

    let controller = CarController::from_config(&config);
    let mut emitter = JsonLinesEmitter::new(std::io::stdout(), config.checksum.seed_table());
    let mut stock = config.stock.stock_frames();

    let period_ms = 1000 / config.control.rate_hz;
    let mut tick_interval = interval(Duration::from_millis(period_ms as u64));

    info!(
        "Encoding at {}Hz (longitudinal: {}, checksum table: {})",
        config.control.rate_hz, config.control.openpilot_longitudinal, config.checksum.table
    );

    let mut tick_count: u64 = 0;

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let frames = controller.update(&config.intent, &stock)?;
                controller.emit(&frames, &mut emitter)?;

                if let Some(echo) = frames.iter().find(|frame| frame.name == LS_01) {
                    stock.ls_01 = Some(observe(echo));
                }

                tick_count += 1;

                if tick_count % LOG_INTERVAL_TICKS == 0 {
                    info!("Completed {} ticks", tick_count);
                }

                if config.control.ticks != 0 && tick_count >= config.control.ticks {
                    info!("Finished {} ticks", tick_count);
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                warn!("Received Ctrl+C after {} ticks, shutting down...", tick_count);
                break;
            }
        }
    }

    Ok(())
}

/// Treat an emitted frame as if it had been read back from the bus
fn observe(frame: &EncodedFrame) -> StockFrame {
    StockFrame::new(
        frame.name,
        frame.fields.iter().map(|(signal, value)| (signal.to_string(), value)).collect(),
    )
}
