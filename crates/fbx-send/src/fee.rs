//! Platform fee, miner fee and change arithmetic.
//!
//! Fee splitting happens in two steps: [`split`] quotes what a payment will
//! cost before any coin is chosen, and [`FeeQuote::settle`] works out the
//! change once the funding output's value is known.

use crate::config::FeePercent;
use crate::SendError;

/// What a payment costs before a funding output is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub payment: u64,
    pub platform_fee: u64,
    pub miner_fee: u64,
    /// `payment + platform_fee + miner_fee`.
    pub required_total: u64,
}

/// Final split of a funding output's value. The four fields sum to the
/// input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub payment: u64,
    pub platform_fee: u64,
    pub miner_fee: u64,
    pub change: u64,
}

/// Quote a payment.
///
/// The platform fee is `floor(payment * fee_percent / 100)` when a fee
/// address is configured and the percentage is positive, and zero otherwise.
/// It is computed from the nominal payment only.
///
/// # Returns
/// The quote, or `InvalidAmount` if the payment is zero or the total does
/// not fit in 64 bits.
pub fn split(
    payment: u64,
    fee_percent: FeePercent,
    fee_address_present: bool,
    miner_fee: u64,
) -> Result<FeeQuote, SendError> {
    let overflow = || SendError::InvalidAmount {
        input: payment.to_string(),
        reason: "payment plus fees overflows".to_string(),
    };

    if payment == 0 {
        return Err(SendError::InvalidAmount {
            input: payment.to_string(),
            reason: "payment must be positive".to_string(),
        });
    }

    let platform_fee = if fee_address_present && !fee_percent.is_zero() {
        fee_percent.of(payment).ok_or_else(overflow)?
    } else {
        0
    };

    let required_total = payment
        .checked_add(platform_fee)
        .and_then(|t| t.checked_add(miner_fee))
        .ok_or_else(overflow)?;

    Ok(FeeQuote {
        payment,
        platform_fee,
        miner_fee,
        required_total,
    })
}

impl FeeQuote {
    /// Settle the quote against the value of the chosen funding output.
    ///
    /// # Returns
    /// The breakdown with `change = input_value - required_total`, or
    /// `NegativeChange` if the input is too small.
    pub fn settle(&self, input_value: u64) -> Result<FeeBreakdown, SendError> {
        let change = input_value
            .checked_sub(self.required_total)
            .ok_or(SendError::NegativeChange {
                available: input_value,
                required: self.required_total,
            })?;
        Ok(FeeBreakdown {
            payment: self.payment,
            platform_fee: self.platform_fee,
            miner_fee: self.miner_fee,
            change,
        })
    }
}

impl FeeBreakdown {
    /// Sum of all parts, equal to the funding input's value.
    pub fn total(&self) -> u64 {
        self.payment + self.platform_fee + self.miner_fee + self.change
    }
}
