//! Deposit and release amounts for a basket token amount.
//!
//! `required[i] = ratio[i] * amount / basket_unit`, floor division.
//! Truncation is part of the contract and must not be rounded up.
//! A mint additionally requires every product to divide exactly, so the
//! custody behind each minted unit is never less than a burn releases.

use soroban_sdk::{Env, Vec};

use crate::error::MinterError;
use crate::ratio::RatioTable;
use crate::storage::BPS_DENOMINATOR;

/// Per-asset amounts required to mint `mint_amount` basket units.
pub fn required_deposits(
    env: &Env,
    table: &RatioTable,
    basket_unit: i128,
    mint_amount: i128,
) -> Result<Vec<i128>, MinterError> {
    if mint_amount <= 0 {
        return Err(MinterError::InvalidAmount);
    }
    if basket_unit <= 0 {
        return Err(MinterError::InvalidConfig);
    }

    let mut required = Vec::new(env);
    for ratio in table.ratios.iter() {
        let scaled = ratio
            .checked_mul(mint_amount)
            .ok_or(MinterError::ArithmeticOverflow)?;
        // Both operands are non-negative, so `/` is floor division
        required.push_back(scaled / basket_unit);
    }
    Ok(required)
}

/// Reject a mint whose deposit for any asset would be truncated.
pub fn require_exact_deposits(
    table: &RatioTable,
    basket_unit: i128,
    mint_amount: i128,
) -> Result<(), MinterError> {
    if basket_unit <= 0 {
        return Err(MinterError::InvalidConfig);
    }
    for ratio in table.ratios.iter() {
        let scaled = ratio
            .checked_mul(mint_amount)
            .ok_or(MinterError::ArithmeticOverflow)?;
        if scaled % basket_unit != 0 {
            return Err(MinterError::InvalidAmount);
        }
    }
    Ok(())
}

/// Amounts released for burning `burn_amount` basket units.
///
/// # Returns
/// (released, fees) where `released[i] + fees[i]` equals the deposit the
/// same amount would require at the current ratios.
pub fn burn_release(
    env: &Env,
    table: &RatioTable,
    basket_unit: i128,
    burn_fee_bps: u32,
    burn_amount: i128,
) -> Result<(Vec<i128>, Vec<i128>), MinterError> {
    let gross = required_deposits(env, table, basket_unit, burn_amount)?;

    let mut released = Vec::new(env);
    let mut fees = Vec::new(env);
    for amount in gross.iter() {
        let fee = amount
            .checked_mul(burn_fee_bps as i128)
            .ok_or(MinterError::ArithmeticOverflow)?
            / BPS_DENOMINATOR;
        released.push_back(amount - fee);
        fees.push_back(fee);
    }
    Ok((released, fees))
}

/// Compare caller-supplied deposits with the computed ones.
/// Exact match only; nothing is clamped.
pub fn check_supplied(required: &Vec<i128>, supplied: &Vec<i128>) -> Result<(), MinterError> {
    if required.len() != supplied.len() {
        return Err(MinterError::DepositMismatch);
    }
    for (want, got) in required.iter().zip(supplied.iter()) {
        if want != got {
            return Err(MinterError::DepositMismatch);
        }
    }
    Ok(())
}
