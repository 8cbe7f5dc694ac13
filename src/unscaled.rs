//! Arbitrary-precision unscaled decimal values.
//!
//! Every physical decimal encoding is reduced to a [`BigInt`] holding the
//! unscaled value. Byte encodings are big-endian two's complement of any
//! width. Rescaling by a negative scale delta rounds half away from zero,
//! never half to even.

use std::f64::consts::LOG10_2;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};

/// Reads big-endian two's complement bytes. An empty slice is zero.
pub fn decode_twos_complement(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::zero();
    }
    BigInt::from_signed_bytes_be(bytes)
}

/// Minimal big-endian two's complement bytes for `value`, sign-extended on
/// the left up to `min_len`. Zero always yields at least one byte.
pub fn encode_twos_complement(value: &BigInt, min_len: usize) -> Vec<u8> {
    let mut bytes = value.to_signed_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    }
    if bytes.len() < min_len {
        let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
        let mut extended = vec![fill; min_len - bytes.len()];
        extended.extend_from_slice(&bytes);
        bytes = extended;
    }
    bytes
}

pub fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10u32).pow(exponent)
}

/// Moves `value` from one scale to another by `delta` decimal digits.
pub fn rescale(value: &BigInt, delta: i64) -> BigInt {
    match delta {
        0 => value.clone(),
        d if d > 0 => value * pow10(exponent(d)),
        // |value| < 10^(|d| - 1) rounds to zero without building the divisor.
        d if digit_bounds(value).1 < d.unsigned_abs() => BigInt::zero(),
        d => divide_round_half_away(value, &pow10(exponent(-d))),
    }
}

fn exponent(delta: i64) -> u32 {
    u32::try_from(delta).unwrap_or(u32::MAX)
}

/// Truncating division, then one step away from zero when the dropped
/// remainder is at least half the divisor.
pub fn divide_round_half_away(dividend: &BigInt, divisor: &BigInt) -> BigInt {
    let mut quotient = dividend / divisor;
    let remainder = dividend % divisor;
    if remainder.abs() * 2u32 >= divisor.abs() {
        if dividend.is_negative() {
            quotient -= BigInt::one();
        } else {
            quotient += BigInt::one();
        }
    }
    quotient
}

/// True when `|value| < 10^precision`.
///
/// The bit length settles most values; `10^precision` is only materialised
/// when the precision sits within a couple of digits of the value's own
/// length, so the cost follows the operand rather than the declared precision.
pub fn fits_precision(value: &BigInt, precision: u32) -> bool {
    if value.is_zero() {
        return true;
    }
    let (min_digits, max_digits) = digit_bounds(value);
    let precision = u64::from(precision);
    if max_digits <= precision {
        return true;
    }
    if min_digits > precision {
        return false;
    }
    value.abs() < pow10(exponent(precision as i64))
}

/// Loose lower and upper bounds on the decimal digit count of `|value|`,
/// derived from its bit length with one digit of slack on each side.
fn digit_bounds(value: &BigInt) -> (u64, u64) {
    let bits = value.bits();
    if bits == 0 {
        return (0, 1);
    }
    let lower = ((bits - 1) as f64 * LOG10_2).floor() as u64;
    let upper = (bits as f64 * LOG10_2).ceil() as u64 + 1;
    (lower, upper)
}

/// Renders an unscaled value as a fixed-point decimal string.
pub fn format_unscaled(value: &BigInt, scale: u32) -> String {
    let digits = value.abs().to_string();
    let sign = if value.is_negative() { "-" } else { "" };
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    format!("{sign}{whole}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn big(value: i64) -> BigInt {
        BigInt::from(value)
    }

    #[test]
    fn decode_handles_sign_bit() {
        assert_eq!(decode_twos_complement(&[]), big(0));
        assert_eq!(decode_twos_complement(&[0x7f]), big(127));
        assert_eq!(decode_twos_complement(&[0x80]), big(-128));
        assert_eq!(decode_twos_complement(&[0x00, 0x80]), big(128));
        assert_eq!(decode_twos_complement(&[0xff, 0xff]), big(-1));
        assert_eq!(decode_twos_complement(&[0xcf, 0xc7]), big(-12345));
    }

    #[test]
    fn encode_is_minimal_with_sign_padding() {
        assert_eq!(encode_twos_complement(&big(0), 0), vec![0x00]);
        assert_eq!(encode_twos_complement(&big(0), 4), vec![0; 4]);
        assert_eq!(encode_twos_complement(&big(128), 0), vec![0x00, 0x80]);
        assert_eq!(encode_twos_complement(&big(-128), 0), vec![0x80]);
        assert_eq!(encode_twos_complement(&big(-1), 3), vec![0xff, 0xff, 0xff]);
        assert_eq!(encode_twos_complement(&big(255), 4), vec![0, 0, 0, 0xff]);
    }

    #[test]
    fn rescale_rounds_ties_away_from_zero() {
        assert_eq!(rescale(&big(15), -1), big(2));
        assert_eq!(rescale(&big(-15), -1), big(-2));
        assert_eq!(rescale(&big(14), -1), big(1));
        assert_eq!(rescale(&big(-14), -1), big(-1));
        assert_eq!(rescale(&big(25), -1), big(3));
        assert_eq!(rescale(&big(1234550), -2), big(12346));
        assert_eq!(rescale(&big(1234549), -2), big(12345));
        assert_eq!(rescale(&big(12345), 2), big(1234500));
    }

    #[test]
    fn format_unscaled_places_decimal_point() {
        assert_eq!(format_unscaled(&big(12345), 2), "123.45");
        assert_eq!(format_unscaled(&big(-5), 3), "-0.005");
        assert_eq!(format_unscaled(&big(42), 0), "42");
        assert_eq!(format_unscaled(&big(100), 2), "1.00");
    }

    #[test]
    fn precision_limit_is_exclusive() {
        assert!(fits_precision(&big(99999), 5));
        assert!(fits_precision(&big(-99999), 5));
        assert!(!fits_precision(&big(100000), 5));
        assert!(!fits_precision(&big(-100000), 5));
        assert!(fits_precision(&big(0), 1));
        assert!(!fits_precision(&big(1), 0));
    }

    #[test]
    fn huge_precision_never_builds_the_power() {
        let value = pow10(40) - big(1);
        assert!(fits_precision(&value, u32::MAX));
        assert!(fits_precision(&value, 40));
        assert!(!fits_precision(&value, 39));
    }

    #[test]
    fn huge_scale_reduction_rounds_small_values_to_zero() {
        assert_eq!(rescale(&big(-123_456_789), -(i64::from(u32::MAX))), big(0));
        assert_eq!(rescale(&big(5), -1), big(1));
        assert_eq!(rescale(&big(4), -1), big(0));
        assert_eq!(rescale(&big(-50), -2), big(-1));
        assert_eq!(rescale(&big(49), -2), big(0));
        assert_eq!(rescale(&big(99), -3), big(0));
    }

    proptest! {
        #[test]
        fn bytes_round_trip_at_any_sufficient_width(value in any::<i64>(), extra in 0usize..8) {
            let big_value = big(value);
            let minimal = encode_twos_complement(&big_value, 0);
            let encoded = encode_twos_complement(&big_value, minimal.len() + extra);
            prop_assert_eq!(encoded.len(), minimal.len() + extra);
            prop_assert_eq!(decode_twos_complement(&encoded), big_value);
        }

        #[test]
        fn precision_check_matches_exact_comparison(value in any::<i128>(), precision in 0u32..45) {
            let big_value = BigInt::from(value);
            let exact = big_value.abs() < pow10(precision);
            prop_assert_eq!(fits_precision(&big_value, precision), exact);
        }

        #[test]
        fn scale_reduction_matches_direct_division(value in any::<i64>(), digits in 1i64..25) {
            let big_value = big(value);
            prop_assert_eq!(
                rescale(&big_value, -digits),
                divide_round_half_away(&big_value, &pow10(digits as u32))
            );
        }

        #[test]
        fn scaling_up_then_down_is_lossless(value in any::<i64>(), digits in 0i64..20) {
            let big_value = big(value);
            prop_assert_eq!(rescale(&rescale(&big_value, digits), -digits), big_value);
        }
    }
}
