//! Room controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  NvsAdapter        ExpanderOutput     SystemClock   MqttLink   │
//! │  (StoragePort)     (OutputPort)       (ClockPort)   (inbound)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  RoomContext: ConfigStore · SensorValues               │    │
//! │  │  MessageRouter ──writes──▶ ◀──reads── ControlEngine    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler thread (App core): Evaluate ─Gate─▶ Drive · Report  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use esp_idf_svc::eth::{BlockingEth, EspEth, EthDriver, RmiiClockConfig, RmiiEthChipset};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::gpio;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;
use esp_idf_svc::sntp::EspSntp;
use log::info;

use roomctl::adapters::device_id;
use roomctl::adapters::expander::ExpanderOutput;
use roomctl::adapters::mqtt::{MqttHandler, MqttLink};
use roomctl::adapters::nvs::NvsAdapter;
use roomctl::adapters::time::SystemClock;
use roomctl::app::context::RoomContext;
use roomctl::config::SystemConfig;
use roomctl::error::Error;
use roomctl::pins;
use roomctl::router::MessageRouter;
use roomctl::scheduler::{self, Gate, Timing};

// Typed pins below are taken by name; the board map must agree with them.
const _: () = assert!(pins::I2C_SDA_GPIO == 13 && pins::I2C_SCL_GPIO == 16);
const _: () = assert!(pins::RMII_CLK_GPIO == 0 && pins::PHY_POWER_GPIO == 12);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  roomctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 2. Parameter registry (fatal without storage) ─────────
    let nvs = NvsAdapter::open(&config.nvs_namespace)
        .map_err(Error::StorageInit)
        .context("opening parameter storage")?;
    let ctx = Arc::new(RoomContext::new(nvs));
    let summary = ctx.config.load();
    info!(
        "Registry ready: {} restored, {} initialised, {} failed",
        summary.restored, summary.initialised, summary.failed
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let pins_hal = peripherals.pins;
    let sys_loop = EspSystemEventLoop::take()?;

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        pins_hal.gpio13,
        pins_hal.gpio16,
        &I2cConfig::new().baudrate(pins::I2C_BAUD_HZ.Hz()),
    )?;
    let outputs = ExpanderOutput::new(i2c, config.expander_address, config.expander_active_low);

    // ── 4. Network (Ethernet) + wall clock ────────────────────
    let eth = EspEth::wrap(EthDriver::new_rmii(
        peripherals.mac,
        pins_hal.gpio25,
        pins_hal.gpio26,
        pins_hal.gpio27,
        pins_hal.gpio23,
        pins_hal.gpio22,
        pins_hal.gpio21,
        pins_hal.gpio19,
        pins_hal.gpio18,
        RmiiClockConfig::<gpio::Gpio0, gpio::Gpio16, gpio::Gpio17>::Input(pins_hal.gpio0),
        Some(pins_hal.gpio12),
        RmiiEthChipset::LAN87XX,
        Some(pins::PHY_ADDRESS),
        sys_loop.clone(),
    )?)?;
    let mut eth = BlockingEth::wrap(eth, sys_loop)?;
    eth.start()?;
    eth.wait_netif_up()?;
    info!("Ethernet up: {:?}", eth.eth().netif().get_ip_info()?);

    let _sntp = EspSntp::new_default()?;

    // ── 5. Control loop ───────────────────────────────────────
    let gate = Arc::new(Gate::new());
    scheduler::spawn(
        Arc::clone(&ctx),
        SystemClock::new(),
        outputs,
        gate,
        Timing::from(&config),
    )
    .context("spawning scheduler")?;

    // ── 6. Inbound messaging ──────────────────────────────────
    let dev_id = device_id::device_id(&device_id::read_mac());
    let topic = config.subscribe_pattern(&dev_id);
    info!("Device ID: {} (subscribing to {})", dev_id, topic);

    let handler = MqttHandler::new(MessageRouter::new(ctx));
    let link = MqttLink::start(&config.broker_url, &dev_id, topic, handler)?;

    info!("System ready.");
    link.run()
}
