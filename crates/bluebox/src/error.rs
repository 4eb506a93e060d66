//! Error types for Bluebox operations.

use thiserror::Error;

/// Result type for Bluebox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a Bluebox.
#[derive(Debug, Error)]
pub enum Error {
    /// USB context or enumeration failure.
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// Discovery gave up before a Bluebox appeared on the bus.
    #[error("No Bluebox device found")]
    DeviceNotFound,

    /// Discovery was cancelled by the caller.
    #[error("Device discovery cancelled")]
    Cancelled,

    /// The device was found but could not be opened, configured or claimed.
    #[error("Device not claimable: {0}")]
    DeviceNotClaimable(rusb::Error),

    /// A control transfer failed or timed out.
    #[error("Control transfer 0x{request:02x} failed: {source}")]
    Transfer {
        request: u8,
        #[source]
        source: rusb::Error,
    },

    /// A control read returned fewer bytes than requested.
    #[error("Control transfer 0x{request:02x} returned {actual} bytes, expected {expected}")]
    ShortTransfer {
        request: u8,
        expected: usize,
        actual: usize,
    },

    /// A bulk transfer failed or timed out.
    #[error("Bulk transfer on endpoint 0x{endpoint:02x} failed: {source}")]
    Bulk {
        endpoint: u8,
        #[source]
        source: rusb::Error,
    },

    /// Register value overlaps the bits reserved for the register address.
    #[error("Value 0x{value:04x} overlaps the address bits of register {register}")]
    ValueOutOfRange { register: u8, value: u16 },

    /// Register address outside `0..=15`.
    #[error("Invalid register address {0}")]
    InvalidRegister(u8),

    /// Operation has no handler in the device firmware.
    #[error("Not supported by the Bluebox protocol: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Whether this error came from a control or bulk transfer on an open device.
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            Error::Transfer { .. } | Error::ShortTransfer { .. } | Error::Bulk { .. }
        )
    }
}
