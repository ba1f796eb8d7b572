//! User-entered payment amounts.

use fbx_primitives::amount::parse_coins;

use crate::SendError;

/// Parse a user-entered coin amount into satoshis.
///
/// Conversion is exact and truncates past eight decimals. Amounts that
/// truncate to zero are rejected.
pub fn parse_amount(input: &str) -> Result<u64, SendError> {
    let satoshis = parse_coins(input).map_err(|e| SendError::InvalidAmount {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    if satoshis == 0 {
        return Err(SendError::InvalidAmount {
            input: input.to_string(),
            reason: "amount must be at least 0.00000001".to_string(),
        });
    }
    Ok(satoshis)
}
