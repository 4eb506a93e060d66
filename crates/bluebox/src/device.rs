//! Bluebox device controller.
//!
//! [`Bluebox`] exclusively owns one claimed device and exposes the
//! semantic operations of the firmware: register access, tuning, RF test
//! modes, telemetry readback and bulk payload transfer. It is generic over
//! [`Transport`] so the protocol logic can run against something other than
//! real hardware.

use crate::calibration;
use crate::codec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registers::{
    IfBandwidth, ReadbackSelect, Register, Request, SyncWordLength, SyncWordTolerance, TestMode,
};
use crate::transport::{Transport, UsbTransport};
use crate::{DATA_IN_ENDPOINT, DATA_OUT_ENDPOINT};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Default maximum length of a single bulk read.
pub const DEFAULT_RECEIVE_LENGTH: usize = 512;

/// Register responses are one 32-bit word.
const REGISTER_WORD_LEN: usize = 4;

/// USB string descriptors, resolved once when the device is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub product: String,
    pub serial: String,
}

/// Bluebox device handle.
///
/// The handle is move-only; operations that invalidate the device
/// ([`Bluebox::enter_bootloader`], [`Bluebox::close`]) consume it.
pub struct Bluebox<T: Transport = UsbTransport> {
    transport: T,
    info: DeviceInfo,
    config: Config,
}

impl Bluebox<UsbTransport> {
    /// Wait for a Bluebox to appear and open it with the default configuration.
    ///
    /// Blocks until a device is found.
    pub fn open() -> Result<Self> {
        Self::open_with(&Config::default())
    }

    /// Open a Bluebox, waiting according to `config.discovery`.
    pub fn open_with(config: &Config) -> Result<Self> {
        let transport = UsbTransport::open(config)?;
        let info = transport.device_info();
        Ok(Self::from_transport(transport, info, *config))
    }

    /// Open a Bluebox, giving up with [`Error::Cancelled`] once `cancel` is set.
    pub fn open_cancellable(config: &Config, cancel: &AtomicBool) -> Result<Self> {
        let transport = UsbTransport::open_cancellable(config, cancel)?;
        let info = transport.device_info();
        Ok(Self::from_transport(transport, info, *config))
    }
}

impl<T: Transport> Bluebox<T> {
    /// Build a controller on top of an already opened transport.
    pub fn from_transport(transport: T, info: DeviceInfo, config: Config) -> Self {
        tracing::debug!(
            "Bluebox ready: manufacturer={:?} product={:?} serial={:?}",
            info.manufacturer,
            info.product,
            info.serial
        );
        Self {
            transport,
            info,
            config,
        }
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn manufacturer(&self) -> &str {
        &self.info.manufacturer
    }

    pub fn product(&self) -> &str {
        &self.info.product
    }

    pub fn serial(&self) -> &str {
        &self.info.serial
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn control_write(&mut self, request: Request, value: u16, data: &[u8]) -> Result<()> {
        self.transport
            .control_write(request.code(), value, 0, data, self.config.control_timeout)
    }

    /// Issue a register read request and decode the 32-bit response word.
    fn read_word(&mut self, value: u16) -> Result<u16> {
        let request = Request::Register.code();
        let bytes = self.transport.control_read(
            request,
            value,
            0,
            REGISTER_WORD_LEN,
            self.config.control_timeout,
        )?;
        let word: [u8; REGISTER_WORD_LEN] =
            bytes.as_slice().try_into().map_err(|_| Error::ShortTransfer {
                request,
                expected: REGISTER_WORD_LEN,
                actual: bytes.len(),
            })?;
        Ok(codec::decode_register_read(word))
    }

    /// Read a hardware register. Every call queries the device.
    pub fn read_register(&mut self, register: Register) -> Result<u16> {
        self.read_word(u16::from(register.address()))
    }

    /// Write a hardware register. The write is not read back.
    ///
    /// Fails with [`Error::ValueOutOfRange`] if `value` overlaps the low
    /// nibble, which carries the register address on the wire.
    pub fn write_register(&mut self, register: Register, value: u16) -> Result<()> {
        let payload = codec::encode_register_write(register, value)?;
        tracing::trace!("write register {}: 0x{:04x}", register.address(), value);
        self.control_write(Request::Register, u16::from(register.address()), &payload)
    }

    /// Set the carrier frequency. The value is passed to the firmware unscaled.
    pub fn set_frequency(&mut self, hz: u32) -> Result<()> {
        self.control_write(Request::Frequency, 0, &codec::encode_frequency(hz))
    }

    /// Read a telemetry word through the readback register.
    ///
    /// The selector travels in `wValue` of a register read; the firmware
    /// programs [`Register::Readback`] with it and returns the readback word
    /// in the same transfer.
    pub fn read_readback(&mut self, select: ReadbackSelect) -> Result<u16> {
        self.read_word(select.code())
    }

    /// Raw firmware/silicon version word.
    pub fn read_version(&mut self) -> Result<u16> {
        self.read_readback(ReadbackSelect::Version)
    }

    /// Raw RSSI readback word (magnitude and gain stage).
    pub fn read_rssi_raw(&mut self) -> Result<u16> {
        self.read_readback(ReadbackSelect::Rssi)
    }

    /// Calibrated RSSI in dBm.
    pub fn read_rssi(&mut self) -> Result<i32> {
        let raw = self.read_rssi_raw()?;
        let dbm = calibration::rssi_dbm(raw);
        tracing::trace!("rssi raw=0x{:04x} -> {} dBm", raw, dbm);
        Ok(dbm)
    }

    /// Raw AFC readback word.
    pub fn read_afc(&mut self) -> Result<u16> {
        self.read_readback(ReadbackSelect::Afc)
    }

    pub fn enter_test_mode(&mut self, mode: TestMode) -> Result<()> {
        self.write_register(Register::TestMode, mode.register_value())
    }

    pub fn enter_tx_mode(&mut self) -> Result<()> {
        self.control_write(Request::RxTxMode, 1, &[])
    }

    pub fn enter_rx_mode(&mut self) -> Result<()> {
        self.control_write(Request::RxTxMode, 0, &[])
    }

    /// Jump to the bootloader.
    ///
    /// The device usually drops off the bus before acknowledging, so the
    /// outcome of the transfer is discarded and the handle is consumed.
    pub fn enter_bootloader(mut self) {
        if let Err(e) = self.control_write(Request::Bootloader, 0, &[]) {
            tracing::debug!("Bootloader request ended with {} (device detached)", e);
        }
    }

    /// Modulation index.
    pub fn set_mod_index(&mut self, index: u8) -> Result<()> {
        self.control_write(Request::ModIndex, 0, &[index])
    }

    /// RSSI threshold (dBm) used for carrier sense before transmitting.
    pub fn set_csma_rssi(&mut self, dbm: i16) -> Result<()> {
        self.control_write(Request::CsmaRssi, 0, &dbm.to_le_bytes())
    }

    /// Raw power amplifier setting.
    pub fn set_pa_setting(&mut self, setting: u8) -> Result<()> {
        self.control_write(Request::Power, 0, &[setting])
    }

    pub fn set_afc(&mut self, enable: bool) -> Result<()> {
        self.control_write(Request::Afc, 0, &[u8::from(enable)])
    }

    pub fn set_if_bandwidth(&mut self, bandwidth: IfBandwidth) -> Result<()> {
        self.control_write(Request::IfBandwidth, 0, &[bandwidth as u8])
    }

    /// Training sequence timing. The firmware has no handler for this request.
    pub fn set_training(&mut self, _start: Duration, _interval: Duration) -> Result<()> {
        Err(Error::Unsupported("training sequence"))
    }

    /// Sync word configuration. The firmware has no handler for this request.
    pub fn set_sync_word(
        &mut self,
        _word: u32,
        _length: SyncWordLength,
        _tolerance: SyncWordTolerance,
    ) -> Result<()> {
        Err(Error::Unsupported("sync word"))
    }

    /// Write a payload to the bulk OUT endpoint.
    pub fn send_data(&mut self, data: &[u8]) -> Result<usize> {
        self.transport
            .bulk_write(DATA_OUT_ENDPOINT, data, self.config.bulk_timeout)
    }

    /// Read up to `max_length` bytes from the bulk IN endpoint, using the
    /// configured bulk timeout (blocking indefinitely by default).
    pub fn receive_data(&mut self, max_length: usize) -> Result<Vec<u8>> {
        self.receive_data_timeout(max_length, self.config.bulk_timeout)
    }

    pub fn receive_data_timeout(
        &mut self,
        max_length: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>> {
        self.transport.bulk_read(DATA_IN_ENDPOINT, max_length, timeout)
    }

    /// Release the device.
    pub fn close(self) {
        tracing::debug!("Closing Bluebox {}", self.info.serial);
    }
}
