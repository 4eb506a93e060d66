//! RSSI calibration.
//!
//! The RSSI readback word carries a 7-bit magnitude in bits 0..=6 and the
//! active AGC gain stage in bits 7..=10. Each gain stage has a fixed
//! correction added to the magnitude before scaling to dBm.

/// Correction per gain stage, in half-dB steps. Unused stages are zero.
pub const GAIN_CORRECTION: [u8; 16] = [86, 0, 0, 0, 58, 38, 24, 0, 0, 0, 0, 0, 0, 0, 0, 0];

const MAGNITUDE_MASK: u16 = 0x007f;
const STAGE_MASK: u16 = 0x0780;
const STAGE_SHIFT: u16 = 7;

/// 7-bit RSSI magnitude field of a readback word.
pub fn magnitude(raw: u16) -> u8 {
    (raw & MAGNITUDE_MASK) as u8
}

/// 4-bit gain stage index of a readback word.
pub fn gain_stage(raw: u16) -> usize {
    usize::from((raw & STAGE_MASK) >> STAGE_SHIFT)
}

/// Convert a raw RSSI readback word to dBm.
///
/// `dbm = round((magnitude + correction[stage]) * 0.5 - 130)`. Halves round
/// away from zero (`f64::round`), so `-37.5` becomes `-38` and `-86.5`
/// becomes `-87`.
pub fn rssi_dbm(raw: u16) -> i32 {
    let correction = GAIN_CORRECTION
        .get(gain_stage(raw))
        .copied()
        .unwrap_or_default();
    let half_db = f64::from(u16::from(magnitude(raw)) + u16::from(correction));
    (half_db * 0.5 - 130.0).round() as i32
}
