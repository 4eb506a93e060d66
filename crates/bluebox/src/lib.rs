//! Host-side driver for the Bluebox USB narrowband radio transceiver.
//!
//! # Overview
//!
//! `bluebox` talks to the transceiver's firmware over two USB planes:
//!
//! - the **control plane**: class-scoped, interface-recipient control
//!   transfers that read and write the radio chip's sixteen hardware
//!   registers, tune the carrier, switch TX/RX and select test modes;
//! - the **data plane**: raw payload transfer on the bulk IN/OUT endpoints.
//!
//! Raw readback words (RSSI, firmware version, AFC) are fetched through the
//! chip's readback register; RSSI is translated into dBm by
//! [`calibration::rssi_dbm`].
//!
//! # Example
//!
//! ```no_run
//! use bluebox::{Bluebox, Config, TestMode};
//! use std::time::Duration;
//!
//! let config = Config::default().with_discovery_timeout(Some(Duration::from_secs(5)));
//! let mut radio = Bluebox::open_with(&config)?;
//!
//! println!("Firmware: 0x{:04x}", radio.read_version()?);
//! radio.set_frequency(433_920_000)?;
//! radio.enter_test_mode(TestMode::Pn9)?;
//! println!("RSSI: {} dBm", radio.read_rssi()?);
//! # Ok::<(), bluebox::Error>(())
//! ```

pub mod calibration;
pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod registers;
pub mod transport;

pub use calibration::rssi_dbm;
pub use config::{Config, Discovery};
pub use device::{Bluebox, DeviceInfo, DEFAULT_RECEIVE_LENGTH};
pub use error::{Error, Result};
pub use registers::{
    IfBandwidth, ReadbackSelect, Register, Request, SyncWordLength, SyncWordTolerance, TestMode,
};
pub use transport::{list_devices, Transport, UsbTransport};

// Bluebox device identifiers (USB VID/PID)
pub const BLUEBOX_VID: u16 = 0x1d50;
pub const BLUEBOX_PID: u16 = 0x6666;

/// Bulk IN data endpoint (endpoint 1, device-to-host).
pub const DATA_IN_ENDPOINT: u8 = 0x81;
/// Bulk OUT data endpoint (endpoint 2, host-to-device).
pub const DATA_OUT_ENDPOINT: u8 = 0x02;

/// The firmware exposes a single interface.
pub const INTERFACE: u8 = 0;
