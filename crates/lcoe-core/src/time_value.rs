//! Decimal time-value helpers shared by the LCOE components.
//!
//! Integer powers use iterative multiplication (no `powd` drift). The half-year of the
//! mid-year convention is a square root, so `(1+r)^(t+0.5)` is `(1+r)^t * sqrt(1+r)`.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

pub const PI: Decimal = dec!(3.1415926535897932384626433833);

const TAYLOR_SIN_TERMS: u32 = 30;
const NEWTON_ITERATIONS: u32 = 40;
const SERIES_EPSILON: Decimal = dec!(0.000000000000000000000001);

/// Rates within this distance of zero are treated as zero when an annuity would divide by them.
pub const ZERO_RATE_TOLERANCE: Decimal = dec!(0.000000000001);

/// Fisher equation: (1 + nominal) = (1 + real)(1 + inflation).
pub fn fisher_nominal(real: Rate, inflation: Rate) -> Rate {
    (Decimal::ONE + real).saturating_mul(Decimal::ONE + inflation) - Decimal::ONE
}

/// base^n via iterative multiplication. Saturates at `Decimal::MAX` rather than overflowing.
pub fn compound(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = match result.checked_mul(base) {
            Some(v) => v,
            None => return Decimal::MAX,
        };
    }
    result
}

/// (1 + rate)^(periods + 0.5): growth to the middle of period `periods + 1`.
pub fn mid_year_growth(rate: Rate, periods: u32) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    compound(one_plus_r, periods)
        .checked_mul(decimal_sqrt(one_plus_r))
        .unwrap_or(Decimal::MAX)
}

/// 1 / (1 + rate)^(periods + 0.5).
pub fn mid_year_discount(rate: Rate, periods: u32) -> Decimal {
    safe_div(Decimal::ONE, mid_year_growth(rate, periods))
}

/// Division that returns zero on a zero denominator and saturates on overflow.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// Square root; zero for non-positive arguments.
pub fn decimal_sqrt(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    x.sqrt().unwrap_or_else(|| newton_sqrt(x))
}

fn newton_sqrt(x: Decimal) -> Decimal {
    let mut guess = if x > Decimal::ONE { x / dec!(2) } else { Decimal::ONE };
    for _ in 0..NEWTON_ITERATIONS {
        let next = (guess + x / guess) / dec!(2);
        if (next - guess).abs() < SERIES_EPSILON {
            return next;
        }
        guess = next;
    }
    guess
}

/// Taylor series sin(x), argument reduced to [-pi, pi] first.
pub fn decimal_sin(x: Decimal) -> Decimal {
    let two_pi = PI * dec!(2);
    let mut x = x;
    while x > PI {
        x -= two_pi;
    }
    while x < -PI {
        x += two_pi;
    }

    let x_sq = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1..=TAYLOR_SIN_TERMS {
        let k = Decimal::from(2 * n);
        term = -term * x_sq / (k * (k + Decimal::ONE));
        sum += term;
        if term.abs() < SERIES_EPSILON {
            break;
        }
    }
    sum
}

/// Level annual deposit that accumulates to `target` after `periods` years at `rate`.
///
/// Falls back to straight-line funding when the rate is (numerically) zero or the annuity
/// factor vanishes.
pub fn sinking_fund_payment(target: Money, rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return Decimal::ZERO;
    }
    let straight_line = target / Decimal::from(periods);
    if rate.abs() < ZERO_RATE_TOLERANCE {
        return straight_line;
    }
    let accumulation = compound(Decimal::ONE + rate, periods).saturating_sub(Decimal::ONE);
    if accumulation.is_zero() {
        return straight_line;
    }
    safe_div(target.saturating_mul(rate), accumulation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_fisher_nominal() {
        // (1.04)(1.02) - 1 = 0.0608
        assert_eq!(fisher_nominal(dec!(0.04), dec!(0.02)), dec!(0.0608));
    }

    #[test]
    fn test_compound_integer_power() {
        assert_eq!(compound(dec!(1.1), 3), dec!(1.331));
        assert_eq!(compound(dec!(1.1), 0), Decimal::ONE);
    }

    #[test]
    fn test_mid_year_growth_is_half_period_ahead() {
        // 1.21^(1.5) = 1.21 * 1.1 = 1.331
        let g = mid_year_growth(dec!(0.21), 1);
        assert!(close(g, dec!(1.331), dec!(0.0000000001)), "got {g}");
        let d = mid_year_discount(dec!(0.21), 0);
        assert!(close(d, Decimal::ONE / dec!(1.1), dec!(0.0000000001)), "got {d}");
    }

    #[test]
    fn test_sin_reference_points() {
        assert!(close(decimal_sin(PI / dec!(2)), Decimal::ONE, dec!(0.0000000001)));
        assert!(close(decimal_sin(PI / dec!(6)), dec!(0.5), dec!(0.0000000001)));
        assert!(decimal_sin(PI).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_sqrt_of_non_positive_is_zero() {
        assert_eq!(decimal_sqrt(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(decimal_sqrt(dec!(-4)), Decimal::ZERO);
        assert!(close(decimal_sqrt(dec!(2.25)), dec!(1.5), dec!(0.0000000001)));
    }

    #[test]
    fn test_sinking_fund_payment() {
        // 1000 at 5% over 10 years: 1000 * 0.05 / (1.05^10 - 1) ≈ 79.505
        let p = sinking_fund_payment(dec!(1000), dec!(0.05), 10);
        assert!(close(p, dec!(79.505), dec!(0.001)), "got {p}");
    }

    #[test]
    fn test_sinking_fund_zero_rate_is_straight_line() {
        assert_eq!(sinking_fund_payment(dec!(1000), Decimal::ZERO, 4), dec!(250));
        assert_eq!(sinking_fund_payment(dec!(1000), dec!(0.05), 0), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_by_zero() {
        assert_eq!(safe_div(dec!(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_saturates_on_overflow() {
        let tiny = dec!(0.0000000000000000000001);
        assert_eq!(safe_div(Decimal::MAX, tiny), Decimal::MAX);
        assert_eq!(safe_div(-Decimal::MAX, tiny), Decimal::MIN);
    }

    #[test]
    fn test_saturated_growth_stays_saturated() {
        // 2^200 is far beyond the 96-bit mantissa.
        assert_eq!(compound(dec!(2), 200), Decimal::MAX);
        assert_eq!(mid_year_growth(Decimal::ONE, 200), Decimal::MAX);
        let p = sinking_fund_payment(Decimal::MAX, Decimal::ONE, 200);
        assert!(p >= Decimal::ZERO);
    }
}
