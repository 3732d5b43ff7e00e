//! Per-round bound propagation for Cooley–Tukey and Gentleman–Sande transforms.
//!
//! A round maps `(x, y)` to either
//!
//! - CT: `(x + red(w*y), x - red(w*y))`, or
//! - GS: `(x + y, red(w*(x - y)))`.
//!
//! Given a symmetric input bound `|x|, |y| <= b`, the functions below compute the smallest
//! output bound that holds for every pair, using the exact solver from [`crate::bounds`].
//! Chaining them over all `log2(n)` rounds of a transform bounds every intermediate value.

use std::fmt;

use log::debug;

use crate::bounds::{max_red_mul, max_red_mul_interval, min_red_mul, min_red_mul_interval};
use crate::error::{Error, Result};
use crate::utils::log2_exact;

fn check_bound(b: i64) -> Result<()> {
    if b < 0 {
        return Err(Error::PreconditionViolation {
            what: "round input bound",
            min: b,
            max: b,
        });
    }
    Ok(())
}

fn double(b: i64) -> Result<i64> {
    b.checked_mul(2).ok_or(Error::ArithmeticOverflow { op: "mul", lhs: b, rhs: 2 })
}

/// Largest `|x + r|` or `|x - r|` for `|x| <= b` and `r` in `[min_r, max_r]`.
fn ct_combine(b: i64, min_r: i64, max_r: i64) -> Result<i64> {
    let hi = b.checked_add(max_r).ok_or(Error::ArithmeticOverflow {
        op: "add",
        lhs: b,
        rhs: max_r,
    })?;
    let lo = b.checked_sub(min_r).ok_or(Error::ArithmeticOverflow {
        op: "sub",
        lhs: b,
        rhs: min_r,
    })?;
    largest_abs(hi, lo)
}

/// Largest of `|min_r|`, `|max_r|` and `2b`.
fn gs_combine(b2: i64, min_r: i64, max_r: i64) -> Result<i64> {
    Ok(largest_abs(min_r, max_r)?.max(b2))
}

fn largest_abs(x: i64, y: i64) -> Result<i64> {
    i64::try_from(x.unsigned_abs().max(y.unsigned_abs())).map_err(|_| Error::ArithmeticOverflow {
        op: "abs",
        lhs: x,
        rhs: y,
    })
}

/// Output bound of a CT round with any multiplier in `[low, high]`.
pub fn ct_bound(b: i64, low: i64, high: i64) -> Result<i64> {
    check_bound(b)?;
    let min_r = min_red_mul_interval(-b, b, low, high)?.value;
    let max_r = max_red_mul_interval(-b, b, low, high)?.value;
    ct_combine(b, min_r, max_r)
}

/// Output bound of a GS round with any multiplier in `[low, high]`.
pub fn gs_bound(b: i64, low: i64, high: i64) -> Result<i64> {
    check_bound(b)?;
    let b2 = double(b)?;
    let min_r = min_red_mul_interval(-b2, b2, low, high)?.value;
    let max_r = max_red_mul_interval(-b2, b2, low, high)?.value;
    gs_combine(b2, min_r, max_r)
}

/// Output bound of a CT round with the fixed multiplier `w`.
pub fn ct_bound_fixed(b: i64, w: i64) -> Result<i64> {
    check_bound(b)?;
    let min_r = min_red_mul(-b, b, w)?.value;
    let max_r = max_red_mul(-b, b, w)?.value;
    ct_combine(b, min_r, max_r)
}

/// Output bound of a GS round with the fixed multiplier `w`.
pub fn gs_bound_fixed(b: i64, w: i64) -> Result<i64> {
    check_bound(b)?;
    let b2 = double(b)?;
    let min_r = min_red_mul(-b2, b2, w)?.value;
    let max_r = max_red_mul(-b2, b2, w)?.value;
    gs_combine(b2, min_r, max_r)
}

/// Bounds after each round of a transform.
///
/// `bounds()[0]` is the input bound and `bounds()[k]` the bound after round `k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundBounds {
    bounds: Vec<i64>,
}

impl RoundBounds {
    pub fn bounds(&self) -> &[i64] {
        &self.bounds
    }

    /// Bound on the transform output.
    pub fn output(&self) -> i64 {
        self.bounds.last().copied().unwrap_or_default()
    }

    /// Number of rounds, `log2(n)`.
    pub fn num_rounds(&self) -> usize {
        self.bounds.len().saturating_sub(1)
    }

    /// Returns `true` if no round can exceed `i32::MAX` in magnitude.
    pub fn fits_i32(&self) -> bool {
        self.bounds.iter().all(|&b| b <= i32::MAX as i64)
    }
}

impl fmt::Display for RoundBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, b) in self.bounds.iter().enumerate() {
            if k > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", b)?;
        }
        Ok(())
    }
}

fn propagate(
    b0: i64,
    table: &[i16],
    strides: impl Iterator<Item = usize>,
    round: impl Fn(i64, i64) -> Result<i64>,
) -> Result<RoundBounds> {
    check_bound(b0)?;
    let mut bounds = vec![b0];
    let mut b = b0;
    for t in strides {
        let mut next = 0;
        for &w in &table[t..2 * t] {
            next = next.max(round(b, w as i64)?);
        }
        debug!("round t={}: {} -> {}", t, b, next);
        bounds.push(next);
        b = next;
    }
    Ok(RoundBounds { bounds })
}

fn table_log2(table: &[i16]) -> Result<u32> {
    match log2_exact(table.len()) {
        Some(k) if k >= 1 => Ok(k),
        _ => Err(Error::InvalidSize(table.len())),
    }
}

/// Bounds after each round of a CT transform using `table`, for inputs bounded by `b0`.
///
/// Rounds use strides `t = 1, 2, ..., n/2` and multipliers `table[t..2t]`.
pub fn ntt_ct_bounds(b0: i64, table: &[i16]) -> Result<RoundBounds> {
    let k = table_log2(table)?;
    propagate(b0, table, (0..k).map(|i| 1 << i), ct_bound_fixed)
}

/// Bounds after each round of a GS transform using `table`, for inputs bounded by `b0`.
///
/// Rounds use strides `t = n/2, ..., 2, 1` and multipliers `table[t..2t]`.
pub fn ntt_gs_bounds(b0: i64, table: &[i16]) -> Result<RoundBounds> {
    let k = table_log2(table)?;
    propagate(b0, table, (0..k).rev().map(|i| 1 << i), gs_bound_fixed)
}
