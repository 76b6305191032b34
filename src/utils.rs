// Utility helpers shared by the pricing engine and the token registry

use num_bigint::BigUint;
use starknet_core::types::Felt;

use crate::{
    constants::{STARKNET_ADDRESS_BOUND, THOUSANDS_SEPARATOR},
    error::{AppError, Result},
};

/// Parses and range-checks a Starknet address, returning it zero-padded to 64 hex digits.
pub fn validate_and_parse_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AppError::InvalidToken(format!("Address must be 0x-prefixed: {}", address)))?;
    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::InvalidToken(format!("Malformed address: {}", address)));
    }

    let felt = Felt::from_hex(&format!("0x{}", digits.to_ascii_lowercase()))
        .map_err(|_| AppError::InvalidToken(format!("Malformed address: {}", address)))?;
    // fixed-width lowercase hex orders the same as the numbers it encodes
    let padded = felt.to_fixed_hex_string();
    if padded.as_str() >= STARKNET_ADDRESS_BOUND {
        return Err(AppError::InvalidToken(format!("Address out of range: {}", address)));
    }

    Ok(padded)
}

/// Key used to compare token addresses across payloads.
///
/// Felts compare by value; anything else falls back to trimmed lowercase text.
pub fn address_key(address: &str) -> String {
    validate_and_parse_address(address)
        .unwrap_or_else(|_| address.trim().to_ascii_lowercase())
}

pub fn pow10(exponent: u32) -> BigUint {
    BigUint::from(10u32).pow(exponent)
}

/// Integer division rounding the midpoint away from zero.
pub fn div_round_half_up(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder * 2u32 >= *denominator {
        quotient + 1u32
    } else {
        quotient
    }
}

/// Inserts thousands separators into a run of ASCII digits.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped
}

/// True for plain decimal or scientific notation such as `-1.5` or `1e-3`.
/// Rejects the `_` separators that `Decimal` parsing lets through.
pub fn is_decimal_literal(raw: &str) -> bool {
    let (mantissa, exponent) = match raw.find(['e', 'E']) {
        Some(i) => (&raw[..i], Some(&raw[i + 1..])),
        None => (raw, None),
    };

    let mantissa = mantissa.strip_prefix(['-', '+']).unwrap_or(mantissa);
    let mantissa_ok = mantissa.bytes().any(|b| b.is_ascii_digit())
        && mantissa.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && mantissa.bytes().filter(|b| *b == b'.').count() <= 1;

    let exponent_ok = match exponent {
        Some(exp) => {
            let digits = exp.strip_prefix(['-', '+']).unwrap_or(exp);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}

/// Splits a fixed-point integer into its whole part and a zero-padded fraction.
pub fn split_fixed_point(scaled: &BigUint, decimals: u32) -> (BigUint, String) {
    let unit = pow10(decimals);
    let whole = scaled / &unit;
    let fraction = (scaled % &unit).to_str_radix(10);
    let padded = format!("{:0>width$}", fraction, width = decimals as usize);
    (whole, padded)
}
