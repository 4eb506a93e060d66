//! USB transport layer for Bluebox devices.

use crate::config::{Config, Discovery};
use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use crate::{BLUEBOX_PID, BLUEBOX_VID, INTERFACE};
use rusb::{Context, Device, DeviceHandle, Direction, Recipient, RequestType, UsbContext};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Configuration value selected before claiming the interface.
const CONFIGURATION: u8 = 1;

/// Raw I/O primitives the device controller is built on.
///
/// Control transfers are class-scoped and addressed to the device's
/// interface. Methods take `&mut self`: the control pipe is not reentrant, so
/// a transport is only ever driven by one caller at a time.
pub trait Transport {
    /// Host-to-device control transfer carrying `data`.
    fn control_write(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> Result<()>;

    /// Device-to-host control transfer; returns exactly `length` bytes.
    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        length: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>>;

    /// Bulk OUT transfer. `None` blocks until the device accepts the data.
    fn bulk_write(
        &mut self,
        endpoint: u8,
        data: &[u8],
        timeout: Option<Duration>,
    ) -> Result<usize>;

    /// Bulk IN transfer of at most `max_length` bytes. `None` blocks until data arrives.
    fn bulk_read(
        &mut self,
        endpoint: u8,
        max_length: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>>;
}

/// List all Bluebox devices currently on the bus.
pub fn list_devices() -> Result<Vec<String>> {
    let context = Context::new()?;
    let devices = context.devices()?;
    let mut result = Vec::new();

    for device in devices.iter() {
        if is_bluebox(&device) {
            result.push(format!(
                "Bus {:03} Device {:03}",
                device.bus_number(),
                device.address()
            ));
        }
    }

    Ok(result)
}

fn is_bluebox<T: UsbContext>(device: &Device<T>) -> bool {
    match device.device_descriptor() {
        Ok(desc) => desc.vendor_id() == BLUEBOX_VID && desc.product_id() == BLUEBOX_PID,
        Err(e) => {
            tracing::debug!(
                "Skipping bus {:03} device {:03}: failed to read descriptor: {}",
                device.bus_number(),
                device.address(),
                e
            );
            false
        }
    }
}

fn find_device(context: &Context) -> Result<Option<Device<Context>>> {
    let devices = context.devices()?;
    Ok(devices.iter().find(|device| is_bluebox(device)))
}

/// Call `find` every `discovery.poll_interval` until it yields a device, the
/// discovery bound expires or `cancel` is raised.
///
/// `find` runs at least once unless `cancel` is already set. The last sleep is
/// shortened so the bound is never overshot.
fn poll_until<D>(
    discovery: &Discovery,
    cancel: Option<&AtomicBool>,
    mut find: impl FnMut() -> Result<Option<D>>,
) -> Result<D> {
    let started = Instant::now();

    loop {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Error::Cancelled);
        }

        if let Some(device) = find()? {
            return Ok(device);
        }

        let delay = match discovery.timeout {
            Some(timeout) => {
                let remaining = timeout.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(Error::DeviceNotFound);
                }
                discovery.poll_interval.min(remaining)
            }
            None => discovery.poll_interval,
        };

        tracing::trace!("No Bluebox on the bus, retrying in {:?}", delay);
        thread::sleep(delay);
    }
}

fn wait_for_device(
    context: &Context,
    discovery: &Discovery,
    cancel: Option<&AtomicBool>,
) -> Result<Device<Context>> {
    poll_until(discovery, cancel, || find_device(context))
}

/// rusb-backed transport owning the claimed Bluebox interface.
pub struct UsbTransport {
    handle: DeviceHandle<Context>,
}

impl UsbTransport {
    /// Wait for a Bluebox according to `config.discovery` and claim it.
    ///
    /// # Returns
    ///
    /// - `Err(Error::DeviceNotFound)` if the discovery timeout expired
    /// - `Err(Error::DeviceNotClaimable)` if the device could not be configured or claimed
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_inner(config, None)
    }

    /// Like [`UsbTransport::open`], but gives up with `Error::Cancelled` once
    /// `cancel` is set. The flag is checked before every poll.
    pub fn open_cancellable(config: &Config, cancel: &AtomicBool) -> Result<Self> {
        Self::open_inner(config, Some(cancel))
    }

    fn open_inner(config: &Config, cancel: Option<&AtomicBool>) -> Result<Self> {
        let context = Context::new()?;
        let device = wait_for_device(&context, &config.discovery, cancel)?;
        Self::open_device(&device)
    }

    /// Open a device handle.
    ///
    /// 1. Open the USB device
    /// 2. Detach kernel driver (Linux only)
    /// 3. Select configuration 1 if not already active
    /// 4. Claim interface 0
    fn open_device(device: &Device<Context>) -> Result<Self> {
        let handle = device.open().map_err(Error::DeviceNotClaimable)?;

        #[cfg(target_os = "linux")]
        {
            if handle.kernel_driver_active(INTERFACE).unwrap_or(false) {
                tracing::debug!("Detaching kernel driver from interface {}", INTERFACE);
                if let Err(e) = handle.detach_kernel_driver(INTERFACE) {
                    tracing::warn!("Failed to detach kernel driver: {}", e);
                }
            }
        }

        if handle.active_configuration().ok() != Some(CONFIGURATION) {
            handle
                .set_active_configuration(CONFIGURATION)
                .map_err(Error::DeviceNotClaimable)?;
        }

        handle
            .claim_interface(INTERFACE)
            .map_err(Error::DeviceNotClaimable)?;

        tracing::info!(
            "Claimed Bluebox at bus {:03} device {:03}",
            device.bus_number(),
            device.address()
        );

        Ok(UsbTransport { handle })
    }

    /// Resolve the manufacturer, product and serial string descriptors.
    pub fn device_info(&self) -> DeviceInfo {
        let desc = match self.handle.device().device_descriptor() {
            Ok(desc) => desc,
            Err(e) => {
                tracing::debug!("Failed to read device descriptor: {}", e);
                return DeviceInfo::default();
            }
        };

        let read = |index: Option<u8>| -> String {
            index
                .and_then(|idx| match self.handle.read_string_descriptor_ascii(idx) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        tracing::debug!("Failed to read string descriptor {}: {}", idx, e);
                        None
                    }
                })
                .unwrap_or_default()
        };

        DeviceInfo {
            manufacturer: read(desc.manufacturer_string_index()),
            product: read(desc.product_string_index()),
            serial: read(desc.serial_number_string_index()),
        }
    }
}

impl Transport for UsbTransport {
    fn control_write(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> Result<()> {
        let request_type =
            rusb::request_type(Direction::Out, RequestType::Class, Recipient::Interface);

        match self
            .handle
            .write_control(request_type, request, value, index, data, timeout)
        {
            Ok(n) if n == data.len() => Ok(()),
            Ok(n) => Err(Error::ShortTransfer {
                request,
                expected: data.len(),
                actual: n,
            }),
            Err(e) => {
                tracing::debug!(
                    "Control OUT transfer failed: req=0x{:02x}, val={}, idx={}, error={}",
                    request,
                    value,
                    index,
                    e
                );
                Err(Error::Transfer { request, source: e })
            }
        }
    }

    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        length: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let request_type =
            rusb::request_type(Direction::In, RequestType::Class, Recipient::Interface);
        let mut buffer = vec![0u8; length];

        match self
            .handle
            .read_control(request_type, request, value, index, &mut buffer, timeout)
        {
            Ok(n) if n == length => Ok(buffer),
            Ok(n) => {
                tracing::debug!(
                    "Control IN transfer short: req=0x{:02x}, buffer={:02X?}",
                    request,
                    &buffer[..n]
                );
                Err(Error::ShortTransfer {
                    request,
                    expected: length,
                    actual: n,
                })
            }
            Err(e) => {
                tracing::debug!(
                    "Control IN transfer failed: req=0x{:02x}, val={}, idx={}, error={}",
                    request,
                    value,
                    index,
                    e
                );
                Err(Error::Transfer { request, source: e })
            }
        }
    }

    fn bulk_write(
        &mut self,
        endpoint: u8,
        data: &[u8],
        timeout: Option<Duration>,
    ) -> Result<usize> {
        // libusb treats a zero timeout as "wait forever"
        self.handle
            .write_bulk(endpoint, data, timeout.unwrap_or(Duration::ZERO))
            .map_err(|source| Error::Bulk { endpoint, source })
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        max_length: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; max_length];
        let n = self
            .handle
            .read_bulk(endpoint, &mut buffer, timeout.unwrap_or(Duration::ZERO))
            .map_err(|source| Error::Bulk { endpoint, source })?;
        buffer.truncate(n);
        Ok(buffer)
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(INTERFACE) {
            tracing::debug!("Failed to release USB interface: {}", e);
        }
        tracing::debug!("Bluebox device closed");
    }
}
