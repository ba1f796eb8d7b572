//! Exact decimal coin amounts.
//!
//! Coin values arrive as decimal text (user input, or the literal of a JSON
//! number reported by a node). They are converted to integer satoshis by
//! digit manipulation only, truncating anything past the eighth decimal.

use crate::PrimitivesError;

/// Number of decimal places in one coin.
pub const COIN_DECIMALS: u32 = 8;

/// Satoshis in one coin.
pub const SATOSHIS_PER_COIN: u64 = 100_000_000;

/// Digits in `u64::MAX`.
const MAX_U64_DIGITS: usize = 20;

/// Parse a decimal coin amount into satoshis, truncating toward zero.
///
/// Accepts an optional leading `+`, an integer part, an optional fractional
/// part, and an optional exponent (`1e-8`, `2.5E3`) so that any JSON number
/// literal is understood. Signs other than `+`, and anything that is not a
/// digit, are rejected.
///
/// # Returns
/// The amount in satoshis, or `InvalidAmount` if the text is malformed or
/// the value exceeds `u64::MAX` satoshis.
pub fn parse_coins(text: &str) -> Result<u64, PrimitivesError> {
    let invalid = |reason: &str| PrimitivesError::InvalidAmount(format!("{:?}: {}", text, reason));
    let s = text.trim();

    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => {
            let exp = s[i + 1..]
                .parse::<i32>()
                .map_err(|_| invalid("malformed exponent"))?;
            (&s[..i], exp)
        }
        None => (s, 0),
    };
    let mantissa = mantissa.strip_prefix('+').unwrap_or(mantissa);

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("no digits"));
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a non-negative decimal number"));
    }

    // value = digits * 10^-frac_len * 10^exponent; satoshis = floor(value * 10^8)
    let digits = format!("{}{}", int_part, frac_part);
    let digits = digits.trim_start_matches('0');
    let shift = i64::from(COIN_DECIMALS) + i64::from(exponent) - frac_part.len() as i64;

    let kept = if shift >= 0 {
        digits
    } else {
        let drop = usize::try_from(-shift).unwrap_or(usize::MAX);
        &digits[..digits.len().saturating_sub(drop)]
    };
    if kept.is_empty() {
        return Ok(0);
    }

    let scale = usize::try_from(shift.max(0)).unwrap_or(usize::MAX);
    if kept.len().saturating_add(scale) > MAX_U64_DIGITS {
        return Err(invalid("too large"));
    }

    let base: u128 = kept.parse().map_err(|_| invalid("too large"))?;
    let value = 10u128
        .checked_pow(scale as u32)
        .and_then(|factor| base.checked_mul(factor))
        .ok_or_else(|| invalid("too large"))?;
    u64::try_from(value).map_err(|_| invalid("too large"))
}

/// Format satoshis as a decimal coin amount with exactly eight decimals.
pub fn format_coins(satoshis: u64) -> String {
    format!(
        "{}.{:08}",
        satoshis / SATOSHIS_PER_COIN,
        satoshis % SATOSHIS_PER_COIN
    )
}
