use std::f32::consts::TAU;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y).min(255) as u8
}

/// `[0,1]` float to an 8-bit weight.
pub(crate) fn unit_to_u8(v: f32) -> u16 {
    if !v.is_finite() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u16
}

/// One term of a loop-closed motion: `sin(phase_radians * k + offset)`.
///
/// `k` must be an integer for the term to return to its start value at the end of the loop.
pub(crate) fn harmonic(phase_radians: f32, k: u32, offset: f32) -> f32 {
    (phase_radians * k as f32 + offset).sin()
}

/// Cosine counterpart of [`harmonic`].
pub(crate) fn harmonic_cos(phase_radians: f32, k: u32, offset: f32) -> f32 {
    (phase_radians * k as f32 + offset).cos()
}

/// Round a pixel displacement to an integer offset, mapping non-finite values to zero.
pub(crate) fn px_offset(v: f32) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}

/// Toroidal wrap of a sample coordinate into `[0, len)`.
pub(crate) fn wrap_coord(v: f32, len: u32) -> usize {
    if len == 0 {
        return 0;
    }
    let i = if v.is_finite() { v.round() as i64 } else { 0 };
    i.rem_euclid(i64::from(len)) as usize
}

pub(crate) fn radians(phase: f64) -> f32 {
    (phase * f64::from(TAU)) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
