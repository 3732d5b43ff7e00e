//! Abstract interpretation of the transforms over intervals.
//!
//! [`Analyzer`] re-executes every function of [`crate::ntt`] and [`crate::product`] with each
//! buffer element replaced by an [`Interval`] of its possible values. The loop structure is
//! identical to the concrete code, so the resulting bounds hold for every concrete input drawn
//! from the initial intervals.
//!
//! After every round, the analyzer logs the hull of all element bounds and records an
//! [`OverflowWarning`] for each element that may leave the 32-bit range. Warnings do not stop
//! the analysis. Domain errors (for example, a `correct` input outside `[-Q, 2Q-1]`) do.
//!
//! Multiplier tables are abstracted by the [`Multipliers`] trait: exact `i16` tables give the
//! tightest bounds, interval tables check every table whose entries lie within the intervals.

use std::collections::HashMap;
use std::fmt;

use log::{debug, error, trace, warn};

use crate::error::Result;
use crate::interval::Interval;
use crate::ntt::{Direction, Variant};
use crate::product::ProductVariant;
use crate::tables::NttTables;

/// A table of multipliers, exact or abstract.
pub trait Multipliers {
    /// Bounds on `red(x * p[index])`.
    fn red_mul_at(&self, index: usize, x: Interval) -> Result<Interval>;
}

impl Multipliers for [i16] {
    fn red_mul_at(&self, index: usize, x: Interval) -> Result<Interval> {
        x.red_scale(self[index] as i64)
    }
}

impl Multipliers for [Interval] {
    fn red_mul_at(&self, index: usize, x: Interval) -> Result<Interval> {
        x.red_mul(self[index])
    }
}

/// An element that may not fit in an `i32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowWarning {
    pub stage: &'static str,
    /// Round number (from 1) inside a transform, or 0 for a whole stage.
    pub round: usize,
    pub index: usize,
    pub bounds: Interval,
}

impl fmt::Display for OverflowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} round {}: element {} in {} may overflow 32 bits",
            self.stage, self.round, self.index, self.bounds
        )
    }
}

/// Hull of all element bounds after one stage or round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBounds {
    pub stage: &'static str,
    pub round: usize,
    pub bounds: Interval,
}

/// Interval interpreter for transforms and products.
#[derive(Debug, Default)]
pub struct Analyzer {
    warnings: Vec<OverflowWarning>,
    history: Vec<StageBounds>,
    red_mul_cache: HashMap<(Interval, Interval), Interval>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overflow warnings collected so far.
    pub fn warnings(&self) -> &[OverflowWarning] {
        &self.warnings
    }

    /// Per-round hulls collected so far, in execution order.
    pub fn history(&self) -> &[StageBounds] {
        &self.history
    }

    /// Forgets collected warnings, history and cached interval products.
    pub fn clear(&mut self) {
        self.warnings.clear();
        self.history.clear();
        self.red_mul_cache.clear();
    }

    /// Records the hull of `a` and warns about every element outside the `i32` range.
    fn check(&mut self, stage: &'static str, round: usize, a: &[Interval]) -> Interval {
        let mut hull: Option<Interval> = None;
        for (index, &bounds) in a.iter().enumerate() {
            trace!("{} round {}: a[{}] in {}", stage, round, index, bounds);
            if !bounds.fits_i32() {
                let warning = OverflowWarning {
                    stage,
                    round,
                    index,
                    bounds,
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
            hull = Some(hull.map_or(bounds, |h| h.join(bounds)));
        }
        let hull = hull.unwrap_or(Interval::point(0));
        debug!("{} round {}: {}", stage, round, hull);
        self.history.push(StageBounds {
            stage,
            round,
            bounds: hull,
        });
        hull
    }

    /// Records the hull of a transform output. Elements were already checked round by round.
    fn summarize(&mut self, stage: &'static str, a: &[Interval]) -> Interval {
        let hull = a.iter().copied().reduce(Interval::join).unwrap_or(Interval::point(0));
        debug!("{} output: {}", stage, hull);
        self.history.push(StageBounds {
            stage,
            round: 0,
            bounds: hull,
        });
        hull
    }

    fn map(
        &mut self,
        stage: &'static str,
        a: &mut [Interval],
        f: impl Fn(Interval) -> Result<Interval>,
    ) -> Result<Interval> {
        for x in a.iter_mut() {
            *x = f(*x)?;
        }
        Ok(self.check(stage, 0, a))
    }

    pub fn normalize(&mut self, a: &mut [Interval]) -> Interval {
        for x in a.iter_mut() {
            *x = x.normal();
        }
        self.check("normalize", 0, a)
    }

    pub fn normalize_inv3(&mut self, a: &mut [Interval]) -> Interval {
        for x in a.iter_mut() {
            *x = x.normal_inv3();
        }
        self.check("normalize_inv3", 0, a)
    }

    pub fn shift_array(&mut self, a: &mut [Interval]) -> Result<Interval> {
        self.map("shift_array", a, Interval::shift)
    }

    pub fn reduce_array(&mut self, a: &mut [Interval]) -> Result<Interval> {
        self.map("reduce_array", a, Interval::red)
    }

    pub fn reduce_array_twice(&mut self, a: &mut [Interval]) -> Result<Interval> {
        self.map("reduce_array_twice", a, Interval::red_twice)
    }

    /// Requires every element within `[-Q, 2Q-1]`.
    pub fn correct(&mut self, a: &mut [Interval]) -> Result<Interval> {
        for (index, x) in a.iter_mut().enumerate() {
            let bounds = *x;
            *x = bounds.correct().map_err(|e| {
                error!("correct: element {} in {} is out of range", index, bounds);
                e
            })?;
        }
        Ok(self.check("correct", 0, a))
    }

    pub fn mul_reduce_array16<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        for (i, x) in a.iter_mut().enumerate() {
            *x = p.red_mul_at(i, *x)?;
        }
        Ok(self.check("mul_reduce_array16", 0, a))
    }

    /// `c[i] = red(a[i] * b[i])`. Results are cached per pair of intervals.
    pub fn mul_reduce_array(&mut self, c: &mut [Interval], a: &[Interval], b: &[Interval]) -> Result<Interval> {
        for ((z, &x), &y) in c.iter_mut().zip(a).zip(b) {
            *z = match self.red_mul_cache.get(&(x, y)) {
                Some(&r) => r,
                None => {
                    let r = x.red_mul(y)?;
                    self.red_mul_cache.insert((x, y), r);
                    r
                }
            };
        }
        Ok(self.check("mul_reduce_array", 0, c))
    }

    pub fn scalar_mul_reduce_array(&mut self, a: &mut [Interval], c: i16) -> Result<Interval> {
        self.map("scalar_mul_reduce_array", a, |x| x.red_scale(c as i64))
    }

    /// Abstract CT butterfly on `(a[i], a[i+d])` where `x` bounds the product.
    fn ct_butterfly(a: &mut [Interval], i: usize, d: usize, x: Interval) -> Result<()> {
        a[i + d] = a[i].sub(x)?;
        a[i] = a[i].add(x)?;
        Ok(())
    }

    /// Abstract GS butterfly on `(a[i], a[i+d])` with multiplier `p[index]`.
    fn gs_butterfly<P: Multipliers + ?Sized>(a: &mut [Interval], i: usize, d: usize, p: &P, index: usize) -> Result<()> {
        let x = a[i + d];
        a[i + d] = p.red_mul_at(index, a[i].sub(x)?)?;
        a[i] = a[i].add(x)?;
        Ok(())
    }

    pub fn ntt_red_ct_rev2std<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::CtRev2Std.name();
        let n = a.len();
        let mut t = 1;
        let mut round = 1;
        while t < n {
            for s in (0..n).step_by(2 * t) {
                let x = a[s + t];
                Self::ct_butterfly(a, s, t, x)?;
            }
            for j in 1..t {
                for s in (j..n).step_by(2 * t) {
                    let x = p.red_mul_at(t + j, a[s + t])?;
                    Self::ct_butterfly(a, s, t, x)?;
                }
            }
            self.check(stage, round, a);
            t <<= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn mulntt_red_ct_rev2std<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::MulCtRev2Std.name();
        let n = a.len();
        let mut t = 1;
        let mut round = 1;
        while t < n {
            for j in 0..t {
                for s in (j..n).step_by(2 * t) {
                    let x = p.red_mul_at(t + j, a[s + t])?;
                    Self::ct_butterfly(a, s, t, x)?;
                }
            }
            self.check(stage, round, a);
            t <<= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn ntt_red_ct_std2rev<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::CtStd2Rev.name();
        let n = a.len();
        let mut d = n;
        let mut t = 1;
        let mut round = 1;
        while t < n {
            d >>= 1;
            for s in 0..d {
                let x = a[s + d];
                Self::ct_butterfly(a, s, d, x)?;
            }
            let mut u = 0;
            for j in 1..t {
                u += 2 * d;
                for s in u..u + d {
                    let x = p.red_mul_at(t + j, a[s + d])?;
                    Self::ct_butterfly(a, s, d, x)?;
                }
            }
            self.check(stage, round, a);
            t <<= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn mulntt_red_ct_std2rev<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::MulCtStd2Rev.name();
        let n = a.len();
        let mut d = n;
        let mut t = 1;
        let mut round = 1;
        while t < n {
            d >>= 1;
            let mut u = 0;
            for j in 0..t {
                for s in u..u + d {
                    let x = p.red_mul_at(t + j, a[s + d])?;
                    Self::ct_butterfly(a, s, d, x)?;
                }
                u += 2 * d;
            }
            self.check(stage, round, a);
            t <<= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn ntt_red_gs_rev2std<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::GsRev2Std.name();
        let n = a.len();
        let mut t = n;
        let mut d = 1;
        let mut round = 1;
        while d < n {
            t >>= 1;
            for s in 0..d {
                let x = a[s + d];
                Self::ct_butterfly(a, s, d, x)?;
            }
            let mut u = 2 * d;
            for j in 1..t {
                for s in u..u + d {
                    Self::gs_butterfly(a, s, d, p, t + j)?;
                }
                u += 2 * d;
            }
            self.check(stage, round, a);
            d <<= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn nttmul_red_gs_rev2std<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::MulGsRev2Std.name();
        let n = a.len();
        let mut t = n;
        let mut d = 1;
        let mut round = 1;
        while d < n {
            t >>= 1;
            let mut u = 0;
            for j in 0..t {
                for s in u..u + d {
                    Self::gs_butterfly(a, s, d, p, t + j)?;
                }
                u += 2 * d;
            }
            self.check(stage, round, a);
            d <<= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn ntt_red_gs_std2rev<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::GsStd2Rev.name();
        let n = a.len();
        let mut t = n >> 1;
        let mut round = 1;
        while t > 0 {
            for s in (0..n).step_by(2 * t) {
                let x = a[s + t];
                Self::ct_butterfly(a, s, t, x)?;
            }
            for j in 1..t {
                for s in (j..n).step_by(2 * t) {
                    Self::gs_butterfly(a, s, t, p, t + j)?;
                }
            }
            self.check(stage, round, a);
            t >>= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    pub fn nttmul_red_gs_std2rev<P: Multipliers + ?Sized>(&mut self, a: &mut [Interval], p: &P) -> Result<Interval> {
        let stage = Variant::MulGsStd2Rev.name();
        let n = a.len();
        let mut t = n >> 1;
        let mut round = 1;
        while t > 0 {
            for j in 0..t {
                for s in (j..n).step_by(2 * t) {
                    Self::gs_butterfly(a, s, t, p, t + j)?;
                }
            }
            self.check(stage, round, a);
            t >>= 1;
            round += 1;
        }
        Ok(self.summarize(stage, a))
    }

    /// Runs the abstract version of `variant`. Returns the hull of the output.
    pub fn transform<P: Multipliers + ?Sized>(&mut self, variant: Variant, a: &mut [Interval], p: &P) -> Result<Interval> {
        match variant {
            Variant::CtRev2Std => self.ntt_red_ct_rev2std(a, p),
            Variant::MulCtRev2Std => self.mulntt_red_ct_rev2std(a, p),
            Variant::CtStd2Rev => self.ntt_red_ct_std2rev(a, p),
            Variant::MulCtStd2Rev => self.mulntt_red_ct_std2rev(a, p),
            Variant::GsRev2Std => self.ntt_red_gs_rev2std(a, p),
            Variant::MulGsRev2Std => self.nttmul_red_gs_rev2std(a, p),
            Variant::GsStd2Rev => self.ntt_red_gs_std2rev(a, p),
            Variant::MulGsStd2Rev => self.nttmul_red_gs_std2rev(a, p),
        }
    }

    /// Abstract version of [`ProductVariant::apply`]: bounds `c` for all `a`, `b` in the given intervals.
    pub fn product(
        &mut self,
        variant: ProductVariant,
        c: &mut [Interval],
        a: &mut [Interval],
        b: &mut [Interval],
        tables: &NttTables,
    ) -> Result<Interval> {
        debug!("analyzing {} for n={}", variant, tables.n());
        let forward = variant.forward();
        let p = forward.table(tables, Direction::Forward);
        for x in [&mut *a, &mut *b] {
            self.shift_array(x)?;
            if !variant.is_fused() {
                self.mul_reduce_array16(x, tables.psi_powers())?;
            }
            self.transform(forward, x, p)?;
            self.reduce_array(x)?;
        }

        self.mul_reduce_array(c, a, b)?;
        self.reduce_array_twice(c)?;

        let inverse = variant.inverse();
        self.transform(inverse, c, inverse.table(tables, Direction::Inverse))?;
        if variant.is_fused() {
            self.scalar_mul_reduce_array(c, tables.rescale())?;
        } else {
            self.mul_reduce_array16(c, tables.scaled_inv_psi_powers())?;
        }
        self.reduce_array_twice(c)?;
        self.correct(c)
    }

    /// Analyzes `variant` on all inputs with coefficients in `[0, Q-1]`.
    pub fn analyze_product(&mut self, variant: ProductVariant, tables: &NttTables) -> Result<Vec<Interval>> {
        let n = tables.n();
        let mut a = vec![Interval::RESIDUES; n];
        let mut b = vec![Interval::RESIDUES; n];
        let mut c = vec![Interval::point(0); n];
        self.product(variant, &mut c, &mut a, &mut b, tables)?;
        Ok(c)
    }
}
