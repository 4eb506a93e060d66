//! Wire encoding of register and frequency payloads.
//!
//! Every multi-byte control payload is a little-endian 32-bit word. Register
//! writes OR the address into the low nibble of the word, so the value itself
//! must leave those four bits clear.

use crate::error::{Error, Result};
use crate::registers::Register;

/// Bits of a register word reserved for the register address.
pub const ADDRESS_MASK: u32 = 0x000f;

/// Width of a register value on the chip.
pub const REGISTER_MASK: u32 = 0xffff;

/// Encode a register write as `value | address`, little-endian.
///
/// Fails with [`Error::ValueOutOfRange`] if `value` uses the address bits.
pub fn encode_register_write(register: Register, value: u16) -> Result<[u8; 4]> {
    let value = u32::from(value);
    if value & ADDRESS_MASK != 0 {
        return Err(Error::ValueOutOfRange {
            register: register.address(),
            value: value as u16,
        });
    }
    Ok((value | u32::from(register.address())).to_le_bytes())
}

/// Decode a register read response, masked to the 16-bit register width.
pub fn decode_register_read(bytes: [u8; 4]) -> u16 {
    (u32::from_le_bytes(bytes) & REGISTER_MASK) as u16
}

/// Encode a carrier frequency. The value is sent as-is, without scaling.
pub fn encode_frequency(hz: u32) -> [u8; 4] {
    hz.to_le_bytes()
}
