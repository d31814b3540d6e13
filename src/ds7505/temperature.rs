//! Fixed-point temperature encoding.
//!
//! Temperatures travel as two bytes. The first carries the sign in bit 7 and
//! the integer magnitude in bits 6..0. The second holds four fractional bits
//! in bits 7..4, weighing 1/2, 1/4, 1/8 and 1/16 °C.

use num_traits::Float;

/// Lowest limit the thermostat accepts, °C.
pub const TEMP_MIN: f32 = -55.0;
/// Highest limit the thermostat accepts, °C.
pub const TEMP_MAX: f32 = 125.0;

/// Smallest representable step, °C.
pub const LSB: f32 = 0.0625;

const SIGN_BIT: u8 = 0x80;

const FRACTION_BITS: [(u8, f32); 4] = [(0x80, 0.5), (0x40, 0.25), (0x20, 0.125), (0x10, 0.0625)];

/// Decode a register pair into °C.
pub fn decode(msb: u8, lsb: u8) -> f32 {
    let (sign, magnitude) = if (msb & SIGN_BIT) == SIGN_BIT {
        (-1.0, msb & !SIGN_BIT)
    } else {
        (1.0, msb)
    };
    let fraction: f32 = FRACTION_BITS
        .iter()
        .filter(|(bit, _)| lsb & bit != 0)
        .map(|(_, weight)| weight)
        .sum();
    sign * (magnitude as f32 + fraction)
}

/// Encode °C into a register pair, truncating below 1/16 °C.
///
/// The magnitude must fit in 7 bits; callers check against
/// [`TEMP_MIN`]..=[`TEMP_MAX`] first.
pub fn encode(celsius: f32) -> [u8; 2] {
    let magnitude = celsius.abs();
    let integer = magnitude.trunc();

    let mut msb = integer as u8 & !SIGN_BIT;
    if celsius < 0.0 {
        msb |= SIGN_BIT;
    }

    let mut remainder = magnitude - integer;
    let mut lsb = 0u8;
    for &(bit, weight) in FRACTION_BITS.iter() {
        if remainder >= weight {
            lsb |= bit;
            remainder -= weight;
        }
    }

    [msb, lsb]
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    9.0 / 5.0 * celsius + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_positive() {
        assert_eq!(decode(0x19, 0x00), 25.0);
        assert_eq!(decode(0x19, 0x90), 25.5625);
        assert_eq!(decode(0x7d, 0x00), 125.0);
        // low nibble is unused
        assert_eq!(decode(0x00, 0x4f), 0.25);
    }

    #[test]
    fn decode_negative() {
        assert_eq!(decode(0x8a, 0x80), -10.5);
        assert_eq!(decode(0xb7, 0x00), -55.0);
        assert_eq!(decode(0x80, 0x10), -0.0625);
    }

    #[test]
    fn encode_sets_sign_next_to_magnitude() {
        assert_eq!(encode(-10.5), [0x8a, 0x80]);
        assert_eq!(encode(-55.0), [0xb7, 0x00]);
        assert_eq!(encode(-0.25), [0x80, 0x40]);
    }

    #[test]
    fn encode_quantizes_toward_zero() {
        assert_eq!(encode(32.45), [0x20, 0x70]);
        assert_eq!(encode(30.14), [0x1e, 0x20]);
        assert_eq!(encode(0.06), [0x00, 0x00]);
        assert_eq!(encode(125.0), [0x7d, 0x00]);
    }

    #[test]
    fn limits_survive_encoding_within_one_lsb() {
        for step in 0..=18_000u32 {
            let celsius = (TEMP_MIN + step as f32 * 0.01).min(TEMP_MAX);
            let [msb, lsb] = encode(celsius);
            let decoded = decode(msb, lsb);
            assert!(
                (decoded - celsius).abs() < LSB,
                "{} decoded as {}",
                celsius,
                decoded
            );
        }
    }

    #[test]
    fn fahrenheit_is_affine_in_celsius() {
        for &(msb, lsb) in &[(0x00, 0x00), (0x19, 0x90), (0x8a, 0x80), (0xb7, 0x00), (0x7d, 0x00)] {
            let celsius = decode(msb, lsb);
            assert_eq!(celsius_to_fahrenheit(celsius), 9.0 / 5.0 * celsius + 32.0);
        }
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(fahrenheit_to_celsius(212.0), 100.0);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
    }
}
