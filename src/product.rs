//! Polynomial multiplication modulo `X^n + 1` and `Q`.
//!
//! Each product takes `a` and `b` with coefficients in `[0, Q-1]`, destroys them, and writes
//! `a * b mod (X^n + 1, Q)` into `c` with coefficients in `[0, Q-1]`:
//!
//! ```text
//! a, b:  shift -> multiply by psi^i -> forward NTT -> reduce
//! c:     red(a[i] * b[i]) -> reduce twice
//!        -> inverse NTT -> multiply by psi^-i / (K^8 n) -> reduce twice -> correct
//! ```
//!
//! The extra factors of `K` introduced by every `red` add up to `K^8`, which the final
//! multiplier cancels together with `1/n`. [`product5`] folds the powers of `psi` into the
//! transforms and rescales with a single constant.

use std::fmt;

use crate::ntt::{
    correct, mul_reduce_array, mul_reduce_array16, reduce_array, reduce_array_twice, scalar_mul_reduce_array,
    shift_array, Direction, Variant,
};
use crate::params::Q;
use crate::tables::NttTables;

/// One of the five product pipelines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProductVariant {
    /// CT forward, CT inverse.
    Product1,
    /// GS forward, CT inverse.
    Product2,
    /// CT forward, GS inverse.
    Product3,
    /// GS forward, GS inverse.
    Product4,
    /// Fused CT forward, fused GS inverse.
    Product5,
}

impl ProductVariant {
    pub const ALL: [ProductVariant; 5] = [
        ProductVariant::Product1,
        ProductVariant::Product2,
        ProductVariant::Product3,
        ProductVariant::Product4,
        ProductVariant::Product5,
    ];

    /// Forward transform: standard input, bit-reversed output.
    pub fn forward(self) -> Variant {
        match self {
            ProductVariant::Product1 | ProductVariant::Product3 => Variant::CtStd2Rev,
            ProductVariant::Product2 | ProductVariant::Product4 => Variant::GsStd2Rev,
            ProductVariant::Product5 => Variant::MulCtStd2Rev,
        }
    }

    /// Inverse transform: bit-reversed input, standard output.
    pub fn inverse(self) -> Variant {
        match self {
            ProductVariant::Product1 | ProductVariant::Product2 => Variant::CtRev2Std,
            ProductVariant::Product3 | ProductVariant::Product4 => Variant::GsRev2Std,
            ProductVariant::Product5 => Variant::MulGsRev2Std,
        }
    }

    pub fn is_fused(self) -> bool {
        self == ProductVariant::Product5
    }

    /// Computes `c = a * b mod (X^n + 1, Q)`. Overwrites `a` and `b`.
    pub fn apply(self, c: &mut [i32], a: &mut [i32], b: &mut [i32], tables: &NttTables) {
        let n = tables.n();
        debug_assert!(a.len() == n && b.len() == n && c.len() == n);
        debug_assert!(a.iter().chain(b.iter()).all(|x| (0..Q).contains(x)));

        let forward = self.forward();
        let p = forward.table(tables, Direction::Forward);
        for x in [&mut *a, &mut *b] {
            shift_array(x);
            if !self.is_fused() {
                mul_reduce_array16(x, tables.psi_powers());
            }
            forward.apply(x, p);
            reduce_array(x);
        }

        mul_reduce_array(c, a, b);
        reduce_array_twice(c);

        let inverse = self.inverse();
        inverse.apply(c, inverse.table(tables, Direction::Inverse));
        if self.is_fused() {
            scalar_mul_reduce_array(c, tables.rescale());
        } else {
            mul_reduce_array16(c, tables.scaled_inv_psi_powers());
        }
        reduce_array_twice(c);
        correct(c);
    }
}

impl fmt::Display for ProductVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = match self {
            ProductVariant::Product1 => 1,
            ProductVariant::Product2 => 2,
            ProductVariant::Product3 => 3,
            ProductVariant::Product4 => 4,
            ProductVariant::Product5 => 5,
        };
        write!(f, "product{}", k)
    }
}

pub fn product1(c: &mut [i32], a: &mut [i32], b: &mut [i32], tables: &NttTables) {
    ProductVariant::Product1.apply(c, a, b, tables)
}

pub fn product2(c: &mut [i32], a: &mut [i32], b: &mut [i32], tables: &NttTables) {
    ProductVariant::Product2.apply(c, a, b, tables)
}

pub fn product3(c: &mut [i32], a: &mut [i32], b: &mut [i32], tables: &NttTables) {
    ProductVariant::Product3.apply(c, a, b, tables)
}

pub fn product4(c: &mut [i32], a: &mut [i32], b: &mut [i32], tables: &NttTables) {
    ProductVariant::Product4.apply(c, a, b, tables)
}

pub fn product5(c: &mut [i32], a: &mut [i32], b: &mut [i32], tables: &NttTables) {
    ProductVariant::Product5.apply(c, a, b, tables)
}
