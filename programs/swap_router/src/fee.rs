//! Protocol fee maths.
//!
//! Percentages are fixed-point with [`FEE_SCALE`] = 100%.
//! formula: fee = floor(amount * percentage / FEE_SCALE)

use anchor_lang::prelude::*;

use crate::error::RouterError;

/// 1e18 == 100%.
pub const FEE_SCALE: u64 = 1_000_000_000_000_000_000;

/// Fee owed on `amount` at `fee_percentage`, rounded down.
///
/// `u64 * 1e18` stays far below `u128::MAX`, so the only failure is a
/// percentage above 100% producing a fee that no longer fits `u64`.
pub fn compute_fee(amount: u64, fee_percentage: u64) -> Result<u64> {
    let fee = (amount as u128 * fee_percentage as u128) / FEE_SCALE as u128;
    fee.try_into()
        .map_err(|_| error!(RouterError::NumericalOverflow))
}

/// Splits `amount` into `(fee, amount - fee)`.
pub fn split_fee(amount: u64, fee_percentage: u64) -> Result<(u64, u64)> {
    let fee = compute_fee(amount, fee_percentage)?;
    let net = amount
        .checked_sub(fee)
        .ok_or(RouterError::NumericalOverflow)?;
    Ok((fee, net))
}

pub fn validate_fee_percentage(fee_percentage: u64) -> Result<()> {
    require!(
        fee_percentage <= FEE_SCALE,
        RouterError::InvalidFeePercentage
    );
    Ok(())
}
