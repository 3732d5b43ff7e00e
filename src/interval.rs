//! Interval abstract domain for reduced arithmetic.
//!
//! An [`Interval`] is a closed range `[min, max]` of 64-bit integers. Arithmetic is exact:
//! any operation that would leave the 64-bit range reports [`Error::ArithmeticOverflow`]
//! instead of wrapping or saturating, so a successful analysis is a proof.
//!
//! The reduction transfer functions ([`Interval::red`], [`Interval::red_mul`], ...) are exact
//! images computed by the solver in [`crate::bounds`], not over-approximations.

use std::fmt;

use crate::bounds::{max_red, max_red_mul, max_red_mul_interval, min_red, min_red_mul, min_red_mul_interval};
use crate::error::{Error, Result};
use crate::params::{HALF_Q, INV_K, Q};
use crate::utils::rem_q;

/// A closed integer interval `[min, max]` with `min <= max`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    min: i64,
    max: i64,
}

impl Interval {
    /// All residues `[0, Q-1]`.
    pub const RESIDUES: Interval = Interval { min: 0, max: Q as i64 - 1 };

    /// Centred residues `[-(Q-1)/2, (Q-1)/2]`.
    pub const CENTERED: Interval = Interval {
        min: -(HALF_Q as i64),
        max: HALF_Q as i64,
    };

    /// All 32-bit signed integers.
    pub const I32: Interval = Interval {
        min: i32::MIN as i64,
        max: i32::MAX as i64,
    };

    /// Interval containing the single value `x`.
    pub const fn point(x: i64) -> Self {
        Interval { min: x, max: x }
    }

    /// Interval `[min, max]`.
    ///
    /// Returns [`Error::InvalidInterval`] if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidInterval { min, max });
        }
        Ok(Interval { min, max })
    }

    pub fn min(self) -> i64 {
        self.min
    }

    pub fn max(self) -> i64 {
        self.max
    }

    /// Number of values minus one: `max - min`.
    pub fn size(self) -> u64 {
        self.max.abs_diff(self.min)
    }

    pub fn is_point(self) -> bool {
        self.min == self.max
    }

    pub fn contains(self, x: i64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns `true` if `self` is a subset of `other`.
    pub fn is_within(self, other: Interval) -> bool {
        other.min <= self.min && self.max <= other.max
    }

    /// Returns `true` if every value fits in an `i32`.
    pub fn fits_i32(self) -> bool {
        self.is_within(Interval::I32)
    }

    /// Smallest interval containing both.
    pub fn join(self, other: Interval) -> Interval {
        Interval {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn add(self, other: Interval) -> Result<Interval> {
        let min = self.min.checked_add(other.min).ok_or(Error::ArithmeticOverflow {
            op: "add",
            lhs: self.min,
            rhs: other.min,
        })?;
        let max = self.max.checked_add(other.max).ok_or(Error::ArithmeticOverflow {
            op: "add",
            lhs: self.max,
            rhs: other.max,
        })?;
        Ok(Interval { min, max })
    }

    pub fn sub(self, other: Interval) -> Result<Interval> {
        let min = self.min.checked_sub(other.max).ok_or(Error::ArithmeticOverflow {
            op: "sub",
            lhs: self.min,
            rhs: other.max,
        })?;
        let max = self.max.checked_sub(other.min).ok_or(Error::ArithmeticOverflow {
            op: "sub",
            lhs: self.max,
            rhs: other.min,
        })?;
        Ok(Interval { min, max })
    }

    pub fn neg(self) -> Result<Interval> {
        let min = self.max.checked_neg().ok_or(Error::ArithmeticOverflow {
            op: "neg",
            lhs: self.max,
            rhs: 0,
        })?;
        let max = self.min.checked_neg().ok_or(Error::ArithmeticOverflow {
            op: "neg",
            lhs: self.min,
            rhs: 0,
        })?;
        Ok(Interval { min, max })
    }

    /// Exact range of `red(x)`.
    pub fn red(self) -> Result<Interval> {
        let min = min_red(self.min, self.max)?.value;
        let max = max_red(self.min, self.max)?.value;
        Ok(Interval { min, max })
    }

    /// Exact range of `red(red(x))`.
    pub fn red_twice(self) -> Result<Interval> {
        self.red()?.red()
    }

    /// Exact range of `red(k * x)` for a constant `k`.
    pub fn red_scale(self, k: i64) -> Result<Interval> {
        let min = min_red_mul(self.min, self.max, k)?.value;
        let max = max_red_mul(self.min, self.max, k)?.value;
        Ok(Interval { min, max })
    }

    /// Exact range of `red(x * y)` for `x` in `self` and `y` in `other`.
    ///
    /// The narrower of the two intervals is scanned as the multiplier.
    pub fn red_mul(self, other: Interval) -> Result<Interval> {
        let (w, x) = if self.size() <= other.size() { (self, other) } else { (other, self) };
        let min = min_red_mul_interval(x.min, x.max, w.min, w.max)?.value;
        let max = max_red_mul_interval(x.min, x.max, w.min, w.max)?.value;
        Ok(Interval { min, max })
    }

    /// Range of `x mod Q`.
    pub fn normal(self) -> Interval {
        if self.size() >= Q as u64 - 1 {
            return Interval::RESIDUES;
        }
        let lo = rem_q(self.min);
        let hi = rem_q(self.max);
        if lo <= hi {
            Interval { min: lo, max: hi }
        } else {
            Interval::RESIDUES
        }
    }

    /// Range of `(x * K^-1) mod Q`. Exact for points only.
    pub fn normal_inv3(self) -> Interval {
        if self.is_point() {
            Interval::point(rem_q(rem_q(self.min) * INV_K))
        } else {
            Interval::RESIDUES
        }
    }

    /// Range of the centred representative of residues in `self`.
    ///
    /// Requires `self` within `[0, Q-1]`.
    pub fn shift(self) -> Result<Interval> {
        if !self.is_within(Interval::RESIDUES) {
            return Err(Error::PreconditionViolation {
                what: "shift",
                min: self.min,
                max: self.max,
            });
        }
        let half = HALF_Q as i64;
        let q = Q as i64;
        if self.min > half {
            Ok(Interval {
                min: self.min - q,
                max: self.max - q,
            })
        } else if self.max <= half {
            Ok(self)
        } else {
            Ok(Interval::CENTERED)
        }
    }

    /// Range of `correct(x)`, the residue of `x` in `[0, Q-1]`.
    ///
    /// Requires `self` within `[-Q, 2Q-1]`.
    pub fn correct(self) -> Result<Interval> {
        let q = Q as i64;
        if !self.is_within(Interval { min: -q, max: 2 * q - 1 }) {
            return Err(Error::PreconditionViolation {
                what: "correct",
                min: self.min,
                max: self.max,
            });
        }
        // Images of the three pieces [-Q, -1], [0, Q-1] and [Q, 2Q-1].
        let pieces = [(-q, -1, q), (0, q - 1, 0), (q, 2 * q - 1, -q)];
        let mut result: Option<Interval> = None;
        for (lo, hi, offset) in pieces {
            let min = self.min.max(lo);
            let max = self.max.min(hi);
            if min <= max {
                let image = Interval {
                    min: min + offset,
                    max: max + offset,
                };
                result = Some(result.map_or(image, |r| r.join(image)));
            }
        }
        // Non-empty since `self` is within the union of the pieces.
        Ok(result.unwrap_or(Interval::RESIDUES))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
