//! Constant-weighted-product pricing for the two-asset pool.
//!
//! All balances are raw token units, weights and fees are [`WAD`] scaled.
//! Each formula rounds every intermediate in the direction that favours the
//! pool: outputs end up no larger, inputs no smaller than the exact value.

use anchor_lang::prelude::*;

use crate::error::CharonError;

use super::fixed_point::{
    add, complement, div_down, div_up, mul_down, mul_up, pow, sub, Rounding, POW_PRECISION, WAD,
};

/// Largest swap fee a pool may charge (10%)
pub const MAX_FEE: u128 = WAD / 10;

pub const MIN_WEIGHT: u128 = WAD;
pub const MAX_WEIGHT: u128 = 50 * WAD;
pub const MAX_TOTAL_WEIGHT: u128 = 50 * WAD;

/// A single trade may add at most half of the input-side balance
pub const MAX_IN_RATIO: u128 = WAD / 2;

/// A single trade may remove at most a third of the output-side balance
pub const MAX_OUT_RATIO: u128 = WAD / 3 + 1;

/// Twice the error a fractional [`pow`] can leave in a forward quote
const INVERSE_POW_MARGIN: u128 = 4 * POW_PRECISION;

fn require_liquid(balance_a: u128, balance_b: u128) -> Result<()> {
    require!(
        balance_a > 0 && balance_b > 0,
        CharonError::InsufficientLiquidity
    );
    Ok(())
}

fn require_weights(weight_a: u128, weight_b: u128) -> Result<()> {
    require!(weight_a > 0 && weight_b > 0, CharonError::InvalidWeight);
    Ok(())
}

fn require_fee(swap_fee: u128) -> Result<()> {
    require!(swap_fee <= MAX_FEE, CharonError::InvalidFee);
    Ok(())
}

/// Price of the output token in units of the input token, fee included:
///
/// ```text
/// sP = (Bi / Wi) / (Bo / Wo) * 1 / (1 - fee)
/// ```
pub fn calc_spot_price(
    balance_in: u128,
    weight_in: u128,
    balance_out: u128,
    weight_out: u128,
    swap_fee: u128,
) -> Result<u128> {
    require_liquid(balance_in, balance_out)?;
    require_weights(weight_in, weight_out)?;
    require_fee(swap_fee)?;

    let numer = div_up(balance_in, weight_in)?;
    let denom = div_down(balance_out, weight_out)?;
    let ratio = div_up(numer, denom)?;
    let scale = div_up(WAD, complement(swap_fee))?;
    mul_up(ratio, scale)
}

/// Tokens received for `amount_in`:
///
/// ```text
/// Ao = Bo * (1 - (Bi / (Bi + Ai * (1 - fee))) ^ (Wi / Wo))
/// ```
pub fn calc_out_given_in(
    balance_in: u128,
    weight_in: u128,
    balance_out: u128,
    weight_out: u128,
    amount_in: u128,
    swap_fee: u128,
) -> Result<u128> {
    require!(amount_in > 0, CharonError::InvalidAmount);
    require_liquid(balance_in, balance_out)?;
    require_weights(weight_in, weight_out)?;
    require_fee(swap_fee)?;
    require!(
        amount_in <= mul_down(balance_in, MAX_IN_RATIO)?,
        CharonError::InsufficientLiquidity
    );

    let weight_ratio = div_down(weight_in, weight_out)?;
    let adjusted_in = mul_down(amount_in, complement(swap_fee))?;
    let new_balance_in = balance_in
        .checked_add(adjusted_in)
        .ok_or_else(|| error!(CharonError::ArithmeticOverflow))?;
    let y = div_up(balance_in, new_balance_in)?;
    let foo = pow(y, weight_ratio, Rounding::Up)?;
    let amount_out = mul_down(balance_out, complement(foo))?;

    require!(amount_out < balance_out, CharonError::InsufficientLiquidity);
    Ok(amount_out)
}

/// Tokens that must be paid in to receive `amount_out`:
///
/// ```text
/// Ai = Bi * ((Bo / (Bo - Ao)) ^ (Wo / Wi) - 1) / (1 - fee)
/// ```
///
/// The result also covers whatever [`calc_out_given_in`] may have rounded
/// away from `amount_out`, so `calc_in_given_out(calc_out_given_in(x)) >= x`.
pub fn calc_in_given_out(
    balance_in: u128,
    weight_in: u128,
    balance_out: u128,
    weight_out: u128,
    amount_out: u128,
    swap_fee: u128,
) -> Result<u128> {
    require!(amount_out > 0, CharonError::InvalidAmount);
    require_liquid(balance_in, balance_out)?;
    require_weights(weight_in, weight_out)?;
    require_fee(swap_fee)?;
    require!(amount_out < balance_out, CharonError::InsufficientLiquidity);
    require!(
        amount_out <= mul_down(balance_out, MAX_OUT_RATIO)?,
        CharonError::InsufficientLiquidity
    );

    let weight_ratio = div_up(weight_out, weight_in)?;
    let diff = sub(balance_out, amount_out)?;
    let y = div_up(balance_out, diff)?;
    let power = pow(y, weight_ratio, Rounding::Up)?;

    // Relative shortfall `amount_out` may carry: one raw unit, plus the
    // series margin when the forward exponent `Wi / Wo` is fractional
    let mut shortfall = div_up(2, diff)?;
    if div_down(weight_in, weight_out)? % WAD != 0 {
        shortfall = add(shortfall, mul_up(y, INVERSE_POW_MARGIN)?)?;
    }
    // d(power) = power * (Wo / Wi) * dy / y
    let slack = mul_up(mul_up(power, weight_ratio)?, shortfall)?;

    let foo = add(sub(power, WAD)?, slack)?;
    let amount_in = mul_up(balance_in, foo)?;
    // One more unit for the fee-adjusted input truncated on the way out
    add(div_up(amount_in, complement(swap_fee))?, 1)
}

/// Pool shares minted for a single-asset deposit:
///
/// ```text
/// P = S * ((1 + Ai / Bi) ^ (Wi / Wt) - 1)
/// ```
pub fn calc_pool_out_given_single_in(
    balance_in: u128,
    weight_in: u128,
    pool_supply: u128,
    total_weight: u128,
    amount_in: u128,
) -> Result<u128> {
    require!(amount_in > 0, CharonError::InvalidAmount);
    require_liquid(balance_in, pool_supply)?;
    require_weights(weight_in, total_weight)?;
    require!(weight_in <= total_weight, CharonError::InvalidWeight);
    require!(
        amount_in <= mul_down(balance_in, MAX_IN_RATIO)?,
        CharonError::InsufficientLiquidity
    );

    let normalized_weight = div_down(weight_in, total_weight)?;
    let new_balance_in = balance_in
        .checked_add(amount_in)
        .ok_or_else(|| error!(CharonError::ArithmeticOverflow))?;
    let ratio_in = div_down(new_balance_in, balance_in)?;
    let pool_ratio = pow(ratio_in, normalized_weight, Rounding::Down)?;
    let new_pool_supply = mul_down(pool_ratio, pool_supply)?;
    Ok(new_pool_supply.saturating_sub(pool_supply))
}

/// Tokens paid out for burning `pool_amount_in` shares against one asset:
///
/// ```text
/// Ao = Bo * (1 - (1 - P / S) ^ (Wt / Wo)) * (1 - (1 - Wo / Wt) * fee)
/// ```
pub fn calc_single_out_given_pool_in(
    balance_out: u128,
    weight_out: u128,
    pool_supply: u128,
    total_weight: u128,
    pool_amount_in: u128,
    swap_fee: u128,
) -> Result<u128> {
    require!(pool_amount_in > 0, CharonError::InvalidAmount);
    require_liquid(balance_out, pool_supply)?;
    require_weights(weight_out, total_weight)?;
    require!(weight_out <= total_weight, CharonError::InvalidWeight);
    require_fee(swap_fee)?;
    require!(
        pool_amount_in < pool_supply,
        CharonError::InsufficientLiquidity
    );

    let normalized_weight = div_down(weight_out, total_weight)?;
    let new_pool_supply = sub(pool_supply, pool_amount_in)?;
    let pool_ratio = div_up(new_pool_supply, pool_supply)?;
    // pool_ratio < 1, so a smaller exponent keeps more in the pool
    let exponent = div_down(WAD, normalized_weight)?;
    let token_out_ratio = pow(pool_ratio, exponent, Rounding::Up)?;
    let new_balance_out = mul_up(token_out_ratio, balance_out)?;
    let amount_out_before_fee = balance_out.saturating_sub(new_balance_out);

    let zaz = mul_up(complement(normalized_weight), swap_fee)?;
    let amount_out = mul_down(amount_out_before_fee, complement(zaz))?;

    require!(
        amount_out <= mul_down(balance_out, MAX_OUT_RATIO)?,
        CharonError::InsufficientLiquidity
    );
    Ok(amount_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOKEN: u128 = 1_000_000_000;

    fn close(a: u128, b: u128, tolerance: u128) -> bool {
        a.max(b) - a.min(b) <= tolerance
    }

    #[test]
    fn test_spot_price_equal_weights() {
        let price = calc_spot_price(100 * TOKEN, WAD, 1000 * TOKEN, WAD, 0).unwrap();
        assert_eq!(price, WAD / 10);

        let price = calc_spot_price(1000 * TOKEN, WAD, 100 * TOKEN, WAD, 0).unwrap();
        assert_eq!(price, 10 * WAD);
    }

    #[test]
    fn test_out_given_in_equal_weights() {
        // 100 * (1 - 1000 / 1100) = 9.0909...
        let out = calc_out_given_in(1000 * TOKEN, WAD, 100 * TOKEN, WAD, 100 * TOKEN, 0).unwrap();
        assert!(close(out, 9_090_909_090, 2), "out = {}", out);
    }

    #[test]
    fn test_in_given_out_equal_weights() {
        // 100 * (1000 / 900 - 1) = 11.111...
        let amount_in =
            calc_in_given_out(100 * TOKEN, WAD, 1000 * TOKEN, WAD, 100 * TOKEN, 0).unwrap();
        assert!(close(amount_in, 11_111_111_112, 2), "in = {}", amount_in);
    }

    #[test]
    fn test_pool_out_given_single_in() {
        // 100 * (1.1 ^ 0.5 - 1) = 4.8808848...
        let out = calc_pool_out_given_single_in(100 * TOKEN, WAD, 100 * TOKEN, 2 * WAD, 10 * TOKEN)
            .unwrap();
        assert!(out >= 4_880 * TOKEN / 1000, "out = {}", out);
        assert!(close(out, 4_880_884_817, 1_000), "out = {}", out);
    }

    #[test]
    fn test_single_out_given_pool_in_inverts_single_in() {
        let pool_out =
            calc_pool_out_given_single_in(1000 * TOKEN, WAD, 100 * TOKEN, 2 * WAD, 10 * TOKEN)
                .unwrap();
        let tokens_back = calc_single_out_given_pool_in(
            1010 * TOKEN,
            WAD,
            100 * TOKEN + pool_out,
            2 * WAD,
            pool_out,
            0,
        )
        .unwrap();
        assert!(tokens_back <= 10 * TOKEN);
        assert!(close(tokens_back, 10 * TOKEN, TOKEN / 1000));
    }

    #[test]
    fn test_fee_reduces_output() {
        let no_fee = calc_out_given_in(100 * TOKEN, WAD, 100 * TOKEN, WAD, TOKEN, 0).unwrap();
        let with_fee =
            calc_out_given_in(100 * TOKEN, WAD, 100 * TOKEN, WAD, TOKEN, WAD / 100).unwrap();
        assert!(with_fee < no_fee);
    }

    #[test]
    fn test_rejects_zero_and_oversized_trades() {
        assert!(calc_out_given_in(100, WAD, 100, WAD, 0, 0).is_err());
        assert!(calc_out_given_in(100, WAD, 100, WAD, 51, 0).is_err());
        assert!(calc_in_given_out(100, WAD, 100, WAD, 100, 0).is_err());
        assert!(calc_in_given_out(100, WAD, 100, WAD, 40, 0).is_err());
        assert!(calc_in_given_out(100, WAD, 100, WAD, 0, 0).is_err());
    }

    #[test]
    fn test_rejects_fee_above_max() {
        assert!(calc_spot_price(100, WAD, 100, WAD, MAX_FEE + 1).is_err());
    }

    #[test]
    fn test_inverse_covers_fractional_exponent() {
        // Wi / Wo = 1/3 goes through the series
        for fee in [0, WAD / 100, MAX_FEE] {
            let amount_in = 200_000_000;
            let out = calc_out_given_in(100 * TOKEN, WAD, 1000 * TOKEN, 3 * WAD, amount_in, fee)
                .unwrap();
            let back = calc_in_given_out(100 * TOKEN, WAD, 1000 * TOKEN, 3 * WAD, out, fee)
                .unwrap();
            assert!(back >= amount_in, "fee {}: {} < {}", fee, back, amount_in);
            assert!(back - amount_in <= 1_000, "fee {}: overcharge {}", fee, back - amount_in);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_in_given_out_inverts_out_given_in(
            balance_in in 1_000_000u128..1_000_000 * TOKEN,
            balance_out in 1_000_000u128..1_000_000 * TOKEN,
            weight_in_halves in 2u128..=20,
            weight_out in 1u128..=10,
            fee in 0u128..=MAX_FEE,
            fraction in 1u128..=500,
        ) {
            let weight_in = weight_in_halves * WAD / 2;
            let weight_out = weight_out * WAD;
            let amount_in = (balance_in * fraction / 1_000).max(1);

            let out = calc_out_given_in(balance_in, weight_in, balance_out, weight_out, amount_in, fee);
            prop_assume!(matches!(out, Ok(o) if o > 0));
            let out = out.unwrap();

            let back = calc_in_given_out(balance_in, weight_in, balance_out, weight_out, out, fee);
            prop_assume!(back.is_ok());
            prop_assert!(back.unwrap() >= amount_in);
        }
    }
}
