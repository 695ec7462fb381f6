//! Address and value normalization.
//!
//! Addresses flow through the rest of the crate in canonical lowercase form;
//! the checksummed (EIP-55) form exists only for display. Amounts are kept as
//! fixed-point integers in minor units end to end — no floating point crosses
//! the wire or touches storage.

use alloy::primitives::{U256, keccak256};
use thiserror::Error;

/// Error returned when an address fails validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidAddress {
    /// Address is not exactly 20 bytes once the optional `0x` prefix is stripped.
    #[error("wrong length: expected 40 hex characters, got {0}")]
    WrongLength(usize),
    /// Address contains characters outside `[0-9a-fA-F]`.
    #[error("invalid hex encoding")]
    InvalidHex,
}

/// Normalize a wallet address string.
///
/// Returns the canonical lowercase `0x`-prefixed form used as the key
/// everywhere in this crate, alongside the EIP-55 checksummed form used for
/// display.
///
/// # Errors
/// Returns [`InvalidAddress`] if the string is not 20 bytes of valid hex.
pub fn normalize(address: &str) -> Result<(String, String), InvalidAddress> {
    let stripped = address.strip_prefix("0x").unwrap_or(address);
    if stripped.len() != 40 {
        return Err(InvalidAddress::WrongLength(stripped.len()));
    }
    let bytes = hex::decode(stripped).map_err(|_| InvalidAddress::InvalidHex)?;
    let canonical = format!("0x{}", hex::encode(&bytes));
    let checksummed = checksum(&canonical);
    Ok((canonical, checksummed))
}

/// Produce the EIP-55 checksummed form of a canonical (lowercase) address.
///
/// Follows EIP-55: hash the lowercase hex string (without `0x`) with
/// keccak256, then capitalize a hex digit of the address iff the
/// corresponding nibble of the hash is `>= 8`.
#[must_use]
pub fn checksum(canonical_address: &str) -> String {
    let lower = canonical_address
        .strip_prefix("0x")
        .unwrap_or(canonical_address)
        .to_lowercase();
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        if ch.is_ascii_alphabetic() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Error returned when an amount string cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidAmount {
    /// The string contains characters other than ASCII digits.
    #[error("amount must be a non-negative integer: {0}")]
    NotAnInteger(String),
}

/// Format a raw integer amount (minor units, e.g. wei) as a fixed-point
/// decimal string with `decimals` fractional digits.
#[must_use]
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let raw_str = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw_str;
    }
    if raw_str.len() <= decimals {
        let padded = format!("{:0>width$}", raw_str, width = decimals);
        format!("0.{padded}")
    } else {
        let split_at = raw_str.len() - decimals;
        format!("{}.{}", &raw_str[..split_at], &raw_str[split_at..])
    }
}

/// Parse a fixed-point decimal string back into a raw integer amount
/// (minor units) given its decimal precision.
///
/// # Errors
/// Returns [`InvalidAmount`] if `s` is not a valid non-negative decimal.
pub fn parse_amount(s: &str, decimals: u8) -> Result<U256, InvalidAmount> {
    let decimals = decimals as usize;
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(InvalidAmount::NotAnInteger(s.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(InvalidAmount::NotAnInteger(s.to_string()));
    }
    if frac_part.len() > decimals {
        return Err(InvalidAmount::NotAnInteger(s.to_string()));
    }
    let padded_frac = format!("{frac_part:0<decimals$}");
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let combined = format!("{int_part}{padded_frac}");
    let trimmed = combined.trim_start_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    U256::from_str_radix(digits, 10).map_err(|_| InvalidAmount::NotAnInteger(s.to_string()))
}
