//! Exact bounds on the reduction function over integer ranges.
//!
//! For `x` in `[a, b]` these functions compute the exact minimum and maximum of `red(x)`,
//! of `red(w * x)` for a fixed multiplier `w`, and of `red(w * x)` when `w` itself ranges over
//! an interval. Every result carries a *witness*: an argument at which the bound is attained.
//!
//! ## Block search
//!
//! Write `w * x = 2^M * q + r`. Then `red(w * x) = K * r - q`. Inside one *block* of consecutive
//! `x` sharing the same quotient `q`, the value is maximised by the largest remainder and
//! minimised by the smallest one. [`max_red_mul`] jumps from block to block using `lmax`
//! (the largest `y >= x` in the block of `x`), and stops as soon as
//!
//! - the end of the range is reached,
//! - the best possible value of any later block, `K * h - q`, cannot beat the current maximum,
//!   where `h = 2^M - gcd(w, 2^M)` is the largest remainder reachable by a multiple of `w`,
//! - or the current maximum already has remainder `h`.
//!
//! [`min_red_mul`] is symmetric, walking downward from `b` with `lmin`.

use log::trace;

use crate::error::{Error, Result};
use crate::params::{divd, red, remd, K, M, MASK};

/// Bound on `red(x)` or `red(w * x)` together with an argument attaining it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RedBound {
    pub value: i64,
    pub x: i64,
}

/// Bound on `red(w * x)` over a range of multipliers, with the attaining pair `(x, w)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RedMulBound {
    pub value: i64,
    pub x: i64,
    pub w: i64,
}

fn check_range(a: i64, b: i64) -> Result<()> {
    if a > b {
        return Err(Error::InvalidInterval { min: a, max: b });
    }
    Ok(())
}

fn checked_mul(lhs: i64, rhs: i64) -> Result<i64> {
    lhs.checked_mul(rhs).ok_or(Error::ArithmeticOverflow { op: "mul", lhs, rhs })
}

fn checked_neg(x: i64) -> Result<i64> {
    x.checked_neg().ok_or(Error::ArithmeticOverflow { op: "neg", lhs: x, rhs: 0 })
}

/// Largest power of two dividing `w`, capped at `2^M`.
fn gcd_pow2(w: i64) -> i64 {
    let mut w = w;
    let mut g = 1;
    while w & 1 == 0 && g < (1 << M) {
        g <<= 1;
        w >>= 1;
    }
    g
}

/// Largest `y >= x` such that `w * y` and `w * x` have the same quotient. Requires `w > 0`.
fn lmax(w: i64, x: i64) -> i64 {
    x.saturating_add((MASK - remd(w * x)) / w)
}

/// Smallest `y <= x` such that `w * y` and `w * x` have the same quotient. Requires `w > 0`.
fn lmin(w: i64, x: i64) -> i64 {
    x.saturating_sub(remd(w * x) / w)
}

/// Maximum of `red(x)` for `x` in `[a, b]`.
pub fn max_red(a: i64, b: i64) -> Result<RedBound> {
    check_range(a, b)?;
    let x = (a | MASK).min(b);
    Ok(RedBound { value: red(x), x })
}

/// Minimum of `red(x)` for `x` in `[a, b]`.
pub fn min_red(a: i64, b: i64) -> Result<RedBound> {
    check_range(a, b)?;
    let x = (b & !MASK).max(a);
    Ok(RedBound { value: red(x), x })
}

/// Maximum of `red(w * x)` for `x` in `[a, b]`.
///
/// Returns [`Error::ArithmeticOverflow`] if `w * a` or `w * b` does not fit in 64 bits.
pub fn max_red_mul(a: i64, b: i64, w: i64) -> Result<RedBound> {
    check_range(a, b)?;
    if w == 0 {
        return Ok(RedBound { value: 0, x: a });
    }
    // red(w * x) = red(|w| * (-x)) for negative w.
    let (a, b, pw) = if w < 0 { (checked_neg(b)?, checked_neg(a)?, checked_neg(w)?) } else { (a, b, w) };
    checked_mul(pw, a)?;
    checked_mul(pw, b)?;

    let h = (1 << M) - gcd_pow2(pw);
    let g = K * h;
    let mut best = RedBound { value: red(pw * b), x: b };
    let mut x = a;
    loop {
        x = lmax(pw, x);
        if x >= b || -divd(pw * x) + g <= best.value {
            break;
        }
        let r = red(pw * x);
        if r > best.value {
            best = RedBound { value: r, x };
            if remd(pw * x) == h {
                break;
            }
        }
        x += 1;
    }

    if w < 0 {
        best.x = -best.x;
    }
    Ok(best)
}

/// Minimum of `red(w * x)` for `x` in `[a, b]`.
///
/// Returns [`Error::ArithmeticOverflow`] if `w * a` or `w * b` does not fit in 64 bits.
pub fn min_red_mul(a: i64, b: i64, w: i64) -> Result<RedBound> {
    check_range(a, b)?;
    if w == 0 {
        return Ok(RedBound { value: 0, x: a });
    }
    let (a, b, pw) = if w < 0 { (checked_neg(b)?, checked_neg(a)?, checked_neg(w)?) } else { (a, b, w) };
    checked_mul(pw, a)?;
    checked_mul(pw, b)?;

    let mut best = RedBound { value: red(pw * a), x: a };
    let mut x = b;
    loop {
        x = lmin(pw, x);
        if x <= a || -divd(pw * x) >= best.value {
            break;
        }
        let r = red(pw * x);
        if r < best.value {
            best = RedBound { value: r, x };
            if remd(pw * x) == 0 {
                break;
            }
        }
        x -= 1;
    }

    if w < 0 {
        best.x = -best.x;
    }
    Ok(best)
}

fn check_corners(a: i64, b: i64, low: i64, high: i64) -> Result<()> {
    for w in [low, high] {
        checked_mul(w, a)?;
        checked_mul(w, b)?;
    }
    Ok(())
}

fn keep_if(best: &mut Option<RedMulBound>, r: RedBound, w: i64, better: impl Fn(i64, i64) -> bool) {
    if best.map_or(true, |bst| better(r.value, bst.value)) {
        *best = Some(RedMulBound { value: r.value, x: r.x, w });
    }
}

/// Maximum of `red(w * x)` for `x` in `[a, b]` and `w` in `[low, high]`.
///
/// Multipliers are scanned from the extremes toward zero. A multiplier is skipped when
/// `K * MASK - divd(w * x)` cannot exceed the best value found so far, and the scan stops once
/// that estimate can only decrease further.
pub fn max_red_mul_interval(a: i64, b: i64, low: i64, high: i64) -> Result<RedMulBound> {
    check_range(a, b)?;
    check_range(low, high)?;
    check_corners(a, b, low, high)?;

    let mut best: Option<RedMulBound> = None;
    if low <= 0 && 0 <= high {
        best = Some(RedMulBound { value: 0, x: a, w: 0 });
    }

    // Negative multipliers: red(w * x) <= K * MASK - divd(w * b).
    let mut w = low;
    while w < 0 && w <= high {
        let estimate = -divd(w * b) + K * MASK;
        if best.is_some_and(|bst| estimate <= bst.value) {
            if b >= 0 {
                break;
            }
        } else {
            keep_if(&mut best, max_red_mul(a, b, w)?, w, |r, bst| r > bst);
        }
        w += 1;
    }

    // Positive multipliers: red(w * x) <= K * MASK - divd(w * a).
    let mut w = high;
    while w > 0 && w >= low {
        let estimate = -divd(w * a) + K * MASK;
        if best.is_some_and(|bst| estimate <= bst.value) {
            if a <= 0 {
                break;
            }
        } else {
            keep_if(&mut best, max_red_mul(a, b, w)?, w, |r, bst| r > bst);
        }
        w -= 1;
    }

    let best = best.ok_or(Error::InvalidInterval { min: low, max: high })?;
    trace!("max red(w*x) for x in [{}, {}], w in [{}, {}]: {:?}", a, b, low, high, best);
    Ok(best)
}

/// Minimum of `red(w * x)` for `x` in `[a, b]` and `w` in `[low, high]`.
pub fn min_red_mul_interval(a: i64, b: i64, low: i64, high: i64) -> Result<RedMulBound> {
    check_range(a, b)?;
    check_range(low, high)?;
    check_corners(a, b, low, high)?;

    let mut best: Option<RedMulBound> = None;
    if low <= 0 && 0 <= high {
        best = Some(RedMulBound { value: 0, x: a, w: 0 });
    }

    // Negative multipliers: red(w * x) >= -divd(w * a).
    let mut w = low;
    while w < 0 && w <= high {
        let estimate = -divd(w * a);
        if best.is_some_and(|bst| estimate >= bst.value) {
            if a <= 0 {
                break;
            }
        } else {
            keep_if(&mut best, min_red_mul(a, b, w)?, w, |r, bst| r < bst);
        }
        w += 1;
    }

    // Positive multipliers: red(w * x) >= -divd(w * b).
    let mut w = high;
    while w > 0 && w >= low {
        let estimate = -divd(w * b);
        if best.is_some_and(|bst| estimate >= bst.value) {
            if b >= 0 {
                break;
            }
        } else {
            keep_if(&mut best, min_red_mul(a, b, w)?, w, |r, bst| r < bst);
        }
        w -= 1;
    }

    let best = best.ok_or(Error::InvalidInterval { min: low, max: high })?;
    trace!("min red(w*x) for x in [{}, {}], w in [{}, {}]: {:?}", a, b, low, high, best);
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const RANGES: [(i64, i64); 6] = [(-5000, 5000), (4000, 9000), (-100_000, -3), (7, 7), (-4097, 4096), (0, 12288)];
    const MULTIPLIERS: [i64; 13] = [1, 2, 3, -3, 4096, -6144, 6144, 493, -4096, 12288, 8, 1024, -7];

    #[test]
    fn test_red_bounds_brute_force() {
        for (a, b) in RANGES {
            let max = max_red(a, b).unwrap();
            let min = min_red(a, b).unwrap();
            let values = (a..=b).map(red);
            assert_eq!(max.value, values.clone().max().unwrap(), "max_red({}, {})", a, b);
            assert_eq!(min.value, values.min().unwrap(), "min_red({}, {})", a, b);
            assert_eq!(red(max.x), max.value);
            assert_eq!(red(min.x), min.value);
        }
    }

    #[test]
    fn test_red_bounds_full_i32_range() {
        let (a, b) = (i32::MIN as i64, i32::MAX as i64);
        assert_eq!(max_red(a, b).unwrap().value, 536573);
        assert_eq!(min_red(a, b).unwrap().value, -524287);
        assert_eq!(max_red(-524287, 536573).unwrap().value, 12413);
        assert_eq!(min_red(-524287, 536573).unwrap().value, -130);
    }

    #[test]
    fn test_red_mul_bounds_brute_force() {
        for (a, b) in RANGES {
            for w in MULTIPLIERS {
                let max = max_red_mul(a, b, w).unwrap();
                let min = min_red_mul(a, b, w).unwrap();
                let values = (a..=b).map(|x| red(w * x));
                assert_eq!(max.value, values.clone().max().unwrap(), "max_red_mul({}, {}, {})", a, b, w);
                assert_eq!(min.value, values.min().unwrap(), "min_red_mul({}, {}, {})", a, b, w);
                assert!((a..=b).contains(&max.x) && (a..=b).contains(&min.x));
                assert_eq!(red(w * max.x), max.value);
                assert_eq!(red(w * min.x), min.value);
            }
        }
    }

    #[test]
    fn test_red_mul_zero_multiplier() {
        assert_eq!(max_red_mul(-10, 10, 0).unwrap(), RedBound { value: 0, x: -10 });
        assert_eq!(min_red_mul(-10, 10, 0).unwrap(), RedBound { value: 0, x: -10 });
    }

    #[test]
    fn test_invalid_range() {
        assert_eq!(max_red(5, 4), Err(Error::InvalidInterval { min: 5, max: 4 }));
        assert!(min_red_mul(5, 4, 3).is_err());
        assert!(max_red_mul_interval(0, 1, 3, 2).is_err());
    }

    #[test]
    fn test_red_mul_overflow() {
        let err = max_red_mul(0, i64::MAX / 2, 4).unwrap_err();
        assert!(matches!(err, Error::ArithmeticOverflow { .. }));
        assert!(min_red_mul(i64::MIN, 0, -1).is_err());
        assert!(max_red_mul_interval(-1, 1, i64::MIN, 0).is_err());
    }

    #[test]
    fn test_red_mul_interval_brute_force() {
        let cases = [
            (-300, 300, -50, 50),
            (10, 500, -20, 30),
            (-500, -10, 5, 40),
            (0, 12288, -30, -2),
            (-70, 90, 100, 160),
            (-40, 40, 0, 0),
        ];
        for (a, b, low, high) in cases {
            let max = max_red_mul_interval(a, b, low, high).unwrap();
            let min = min_red_mul_interval(a, b, low, high).unwrap();
            let values = (low..=high).flat_map(|w| (a..=b).map(move |x| red(w * x)));
            assert_eq!(max.value, values.clone().max().unwrap(), "max for {:?}", (a, b, low, high));
            assert_eq!(min.value, values.min().unwrap(), "min for {:?}", (a, b, low, high));
            assert_eq!(red(max.w * max.x), max.value);
            assert_eq!(red(min.w * min.x), min.value);
            assert!((low..=high).contains(&max.w) && (a..=b).contains(&max.x));
            assert!((low..=high).contains(&min.w) && (a..=b).contains(&min.x));
        }
    }

    #[test]
    fn test_red_mul_interval_reference_values() {
        let max = max_red_mul_interval(-6144, 6144, -6144, 6144).unwrap();
        let min = min_red_mul_interval(-6144, 6144, -6144, 6144).unwrap();
        assert_eq!((min.value, max.value), (-9216, 21499));

        let max = max_red_mul_interval(-12288, 12288, -6144, 6144).unwrap();
        let min = min_red_mul_interval(-12288, 12288, -6144, 6144).unwrap();
        assert_eq!((min.value, max.value), (-18432, 30709));

        let max = max_red_mul_interval(0, 12288, 0, 12288).unwrap();
        let min = min_red_mul_interval(0, 12288, 0, 12288).unwrap();
        assert_eq!((min.value, max.value), (-36864, 12285));
        assert_eq!(red(max.x * max.w), 12285);
        assert_eq!(red(min.x * min.w), -36864);
    }

    #[test]
    fn test_red_mul_interval_larger_range() {
        let max = max_red_mul_interval(-1000, 1000, -6144, 6144).unwrap();
        let min = min_red_mul_interval(-1000, 1000, -6144, 6144).unwrap();
        assert_eq!(max.value, 13754);
        assert_eq!(min.value, -1500);
        assert_eq!(red(max.x * max.w), max.value);
        assert_eq!(red(min.x * min.w), min.value);
    }
}
