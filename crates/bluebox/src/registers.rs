//! Request codes, register map and selector constants of the Bluebox firmware.

use crate::error::Error;

/// Class request codes understood by the firmware (`bRequest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Request {
    /// Register read/write.
    Register = 0x01,
    /// Carrier frequency.
    Frequency = 0x02,
    /// Modulation index.
    ModIndex = 0x03,
    /// CSMA RSSI threshold.
    CsmaRssi = 0x04,
    /// PA setting.
    Power = 0x05,
    /// AFC enable.
    Afc = 0x06,
    /// IF filter bandwidth.
    IfBandwidth = 0x07,
    /// Training sequence.
    Training = 0x08,
    /// Sync word.
    SyncWord = 0x09,
    /// TX/RX mode select.
    RxTxMode = 0x0a,
    /// Reserved; payload moves over the bulk endpoints instead.
    Data = 0x10,
    /// Jump to the bootloader.
    Bootloader = 0xff,
}

impl Request {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// The sixteen hardware registers of the radio chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    N = 0,
    VcoOsc = 1,
    TxMod = 2,
    TxRxClock = 3,
    Demod = 4,
    IfFilter = 5,
    IfFineCal = 6,
    /// Generic readback register, multiplexed by a [`ReadbackSelect`] word.
    Readback = 7,
    PowerDown = 8,
    Agc = 9,
    Afc = 10,
    SyncWordDetect = 11,
    SyncWordThreshold = 12,
    Fsk3Fsk4 = 13,
    TestDac = 14,
    TestMode = 15,
}

impl Register {
    pub const ALL: [Register; 16] = [
        Register::N,
        Register::VcoOsc,
        Register::TxMod,
        Register::TxRxClock,
        Register::Demod,
        Register::IfFilter,
        Register::IfFineCal,
        Register::Readback,
        Register::PowerDown,
        Register::Agc,
        Register::Afc,
        Register::SyncWordDetect,
        Register::SyncWordThreshold,
        Register::Fsk3Fsk4,
        Register::TestDac,
        Register::TestMode,
    ];

    /// Register address in `0..=15`.
    pub fn address(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Register {
    type Error = Error;

    fn try_from(address: u8) -> Result<Self, Self::Error> {
        Register::ALL
            .get(usize::from(address))
            .copied()
            .ok_or(Error::InvalidRegister(address))
    }
}

/// Telemetry words exposed through [`Register::Readback`].
///
/// Selectors are opaque codes, not register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ReadbackSelect {
    Rssi = 0x0014,
    Afc = 0x0016,
    Version = 0x001c,
}

impl ReadbackSelect {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// RF test modes, written into the upper byte of [`Register::TestMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TestMode {
    /// Unmodulated carrier.
    Carrier = 1,
    /// Constant high tone.
    High = 2,
    /// Constant low tone.
    Low = 3,
    /// Alternating 1010 pattern.
    Pattern1010 = 4,
    /// PN9 pseudo-random sequence.
    Pn9 = 5,
    /// Repeated sync word.
    SyncWord = 6,
}

impl TestMode {
    /// Register value for this mode; the lower byte stays zero.
    pub fn register_value(self) -> u16 {
        u16::from(self as u8) << 8
    }
}

/// IF filter bandwidth setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum IfBandwidth {
    Khz12_5 = 0,
    Khz18_75 = 1,
    #[default]
    Khz25 = 2,
}

/// Sync word length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SyncWordLength {
    Bits12 = 0,
    Bits16 = 1,
    Bits20 = 2,
    Bits24 = 3,
}

/// Number of bit errors tolerated when matching the sync word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SyncWordTolerance {
    Exact = 0,
    OneBit = 1,
    TwoBits = 2,
    ThreeBits = 3,
}
