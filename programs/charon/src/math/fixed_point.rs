//! 18-decimal fixed point arithmetic over `u128`.
//!
//! Every operation that loses precision takes an explicit [`Rounding`].
//! Amounts paid out of the pool round [`Rounding::Down`], amounts charged
//! into the pool round [`Rounding::Up`], so truncation never leaks value.
//!
//! Token amounts are raw integer units; ratios, weights and fees are WAD
//! scaled. `mul(amount, ratio)` therefore yields raw units again.

use anchor_lang::prelude::*;

use crate::error::CharonError;

/// 1.0 in fixed point
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Smallest base accepted by [`pow`]
pub const MIN_POW_BASE: u128 = 1;

/// Largest base accepted by [`pow`] (just below 2.0)
pub const MAX_POW_BASE: u128 = 2 * WAD - 1;

/// Series truncation threshold for fractional powers (1e-10)
pub const POW_PRECISION: u128 = WAD / 10_000_000_000;

/// Relative error allowance added on top of [`POW_PRECISION`] (1e-14)
pub const MAX_POW_RELATIVE_ERROR: u128 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

pub fn add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b)
        .ok_or_else(|| error!(CharonError::ArithmeticOverflow))
}

pub fn sub(a: u128, b: u128) -> Result<u128> {
    a.checked_sub(b)
        .ok_or_else(|| error!(CharonError::ArithmeticOverflow))
}

/// `|a - b|` together with whether the difference is negative.
fn sub_sign(a: u128, b: u128) -> (u128, bool) {
    if a >= b {
        (a - b, false)
    } else {
        (b - a, true)
    }
}

fn div_rounded(numerator: u128, denominator: u128, rounding: Rounding) -> u128 {
    match rounding {
        Rounding::Down => numerator / denominator,
        Rounding::Up => {
            if numerator == 0 {
                0
            } else {
                (numerator - 1) / denominator + 1
            }
        }
    }
}

/// `a * b / WAD`
pub fn mul(a: u128, b: u128, rounding: Rounding) -> Result<u128> {
    let product = a
        .checked_mul(b)
        .ok_or_else(|| error!(CharonError::ArithmeticOverflow))?;
    Ok(div_rounded(product, WAD, rounding))
}

/// `a * WAD / b`
pub fn div(a: u128, b: u128, rounding: Rounding) -> Result<u128> {
    require!(b != 0, CharonError::ArithmeticOverflow);
    let scaled = a
        .checked_mul(WAD)
        .ok_or_else(|| error!(CharonError::ArithmeticOverflow))?;
    Ok(div_rounded(scaled, b, rounding))
}

pub fn mul_down(a: u128, b: u128) -> Result<u128> {
    mul(a, b, Rounding::Down)
}

pub fn mul_up(a: u128, b: u128) -> Result<u128> {
    mul(a, b, Rounding::Up)
}

pub fn div_down(a: u128, b: u128) -> Result<u128> {
    div(a, b, Rounding::Down)
}

pub fn div_up(a: u128, b: u128) -> Result<u128> {
    div(a, b, Rounding::Up)
}

/// `1 - x` for a fixed point fraction `x <= 1`.
pub fn complement(x: u128) -> u128 {
    WAD.saturating_sub(x)
}

/// `base ^ exp` with both operands in fixed point.
///
/// Integer exponents are computed by repeated squaring with every product
/// rounded in the requested direction, so the bound is exact. The fractional
/// part uses a binomial series and is then widened by its error bound in the
/// requested direction.
pub fn pow(base: u128, exp: u128, rounding: Rounding) -> Result<u128> {
    require!(
        (MIN_POW_BASE..=MAX_POW_BASE).contains(&base),
        CharonError::PowBaseOutOfRange
    );

    let whole = exp / WAD;
    let remain = exp - whole * WAD;

    let whole_pow = pow_int(base, whole, rounding)?;
    if remain == 0 {
        return Ok(whole_pow);
    }

    let partial = pow_approx(base, remain)?;
    let margin = add(mul_up(partial, MAX_POW_RELATIVE_ERROR)?, POW_PRECISION)?;
    let partial = match rounding {
        Rounding::Up => add(partial, margin)?,
        Rounding::Down => partial.saturating_sub(margin),
    };

    mul(whole_pow, partial, rounding)
}

/// `base ^ n` for an integer `n`.
fn pow_int(mut base: u128, mut n: u128, rounding: Rounding) -> Result<u128> {
    let mut acc = if n % 2 != 0 { base } else { WAD };
    n /= 2;
    while n != 0 {
        base = mul(base, base, rounding)?;
        if n % 2 != 0 {
            acc = mul(acc, base, rounding)?;
        }
        n /= 2;
    }
    Ok(acc)
}

/// Binomial expansion of `base ^ exp` for `0 < exp < 1`:
/// `(1 + x)^a = 1 + a*x + a(a-1)/2! * x^2 + ...`, truncated once a term
/// drops below [`POW_PRECISION`].
fn pow_approx(base: u128, exp: u128) -> Result<u128> {
    let (x, x_negative) = sub_sign(base, WAD);
    let mut term = WAD;
    let mut sum = WAD;
    let mut negative = false;

    let mut i: u128 = 1;
    while term >= POW_PRECISION {
        let big_k = i
            .checked_mul(WAD)
            .ok_or_else(|| error!(CharonError::ArithmeticOverflow))?;
        let (c, c_negative) = sub_sign(exp, big_k - WAD);
        term = mul_down(term, mul_down(c, x)?)?;
        term = div_down(term, big_k)?;
        if term == 0 {
            break;
        }

        if x_negative {
            negative = !negative;
        }
        if c_negative {
            negative = !negative;
        }
        sum = if negative { sub(sum, term)? } else { add(sum, term)? };
        i += 1;
    }

    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_rounding_direction() {
        // 1 wei * 0.5 = 0.5 wei
        assert_eq!(mul_down(1, WAD / 2).unwrap(), 0);
        assert_eq!(mul_up(1, WAD / 2).unwrap(), 1);
        assert_eq!(mul_down(3 * WAD, 2 * WAD).unwrap(), 6 * WAD);
        assert_eq!(mul_up(3 * WAD, 2 * WAD).unwrap(), 6 * WAD);
    }

    #[test]
    fn test_div_rounding_direction() {
        assert_eq!(div_down(WAD, 3 * WAD).unwrap(), 333_333_333_333_333_333);
        assert_eq!(div_up(WAD, 3 * WAD).unwrap(), 333_333_333_333_333_334);
        assert!(div_down(1, 0).is_err());
    }

    #[test]
    fn test_pow_integer_exponent_is_exact() {
        let base = 3 * WAD / 2;
        assert_eq!(pow(base, 2 * WAD, Rounding::Down).unwrap(), 9 * WAD / 4);
        assert_eq!(pow(base, 2 * WAD, Rounding::Up).unwrap(), 9 * WAD / 4);
        assert_eq!(pow(base, 0, Rounding::Down).unwrap(), WAD);
        assert_eq!(pow(base, WAD, Rounding::Up).unwrap(), base);
    }

    #[test]
    fn test_pow_fractional_brackets_true_value() {
        // 1.21 ^ 0.5 = 1.1
        let base = 121 * WAD / 100;
        let down = pow(base, WAD / 2, Rounding::Down).unwrap();
        let up = pow(base, WAD / 2, Rounding::Up).unwrap();
        let exact = 11 * WAD / 10;
        assert!(down <= exact, "down {} > exact", down);
        assert!(up >= exact, "up {} < exact", up);
        assert!(up - down < 10 * POW_PRECISION);
    }

    #[test]
    fn test_pow_rejects_base_out_of_range() {
        assert!(pow(0, WAD / 2, Rounding::Down).is_err());
        assert!(pow(2 * WAD, WAD / 2, Rounding::Down).is_err());
    }
}
