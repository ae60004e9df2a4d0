//! Fixed-point math utilities for deterministic simulation.
//!
//! Production arithmetic itself is integer-only. Fixed-point values are used
//! where a fraction has to leave the simulation, such as build progress shown
//! by queue displays.

use fixed::types::I32F32;

/// Fixed-point number type for all fractional values.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Ratio `numerator / denominator` as a fixed-point value clamped to `[0, 1]`.
///
/// A zero or negative denominator yields one, so degenerate totals read as
/// complete rather than dividing by zero.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    if denominator <= 0 {
        return Fixed::ONE;
    }
    let value = Fixed::from_num(numerator) / Fixed::from_num(denominator);
    value.clamp(Fixed::ZERO, Fixed::ONE)
}

/// Integer percentage (0-100) of `numerator / denominator`, floored.
#[must_use]
pub fn percentage(numerator: i32, denominator: i32) -> u32 {
    let scaled = ratio(numerator, denominator) * Fixed::from_num(100);
    scaled.to_num::<u32>()
}
