//! Reduction parameters and scalar reduction primitives.
//!
//! The modulus is `Q = K * 2^M + 1 = 3 * 4096 + 1 = 12289`. Instead of computing `x mod Q`,
//! the engine uses the Longa–Naehrig reduction
//!
//! ```text
//! red(x) = K * (x mod 2^M) - (x div 2^M)
//! ```
//!
//! which only needs a mask, a shift and a small multiplication. The result is *not* in `[0, Q-1]`,
//! but it is congruent to `K * x` modulo `Q` and much smaller in magnitude than `x`.
//! Tables compensate for the extra factor `K` by storing values pre-multiplied by `K^-1 mod Q`.

/// The prime modulus.
pub const Q: i32 = 12289;

/// Number of low bits split off by [`red`].
pub const M: u32 = 12;

/// Multiplier of the low part in [`red`]: `Q = K * 2^M + 1`.
pub const K: i64 = 3;

/// Mask selecting the low `M` bits.
pub const MASK: i64 = (1 << M) - 1;

/// Inverse of [`K`] modulo [`Q`].
pub const INV_K: i64 = 8193;

/// Half of `Q - 1`: the largest magnitude of a centred residue.
pub const HALF_Q: i32 = (Q - 1) / 2;

/// Lower end of the product range on which `red` always fits in an `i32`.
pub const PRODUCT_MIN: i64 = -8_796_042_698_752;

/// Upper end of the product range on which `red` always fits in an `i32`.
pub const PRODUCT_MAX: i64 = 8_796_093_026_303;

/// Quotient part of the reduction: `x div 2^M` (arithmetic shift, rounds toward `-inf`).
#[inline]
pub const fn divd(x: i64) -> i64 {
    x >> M
}

/// Remainder part of the reduction: `x mod 2^M`, always in `[0, 2^M - 1]`.
#[inline]
pub const fn remd(x: i64) -> i64 {
    x & MASK
}

/// Longa–Naehrig reduction: returns a value congruent to `K * x` modulo [`Q`].
#[inline]
pub const fn red(x: i64) -> i64 {
    K * remd(x) - divd(x)
}

/// Reduction of a product: `red(x * w)`.
///
/// The product is computed in 64 bits. The result fits in an `i32` only when the product
/// lies in `[PRODUCT_MIN, PRODUCT_MAX]`, which debug builds assert.
#[inline]
pub fn mul_red(x: i32, w: i32) -> i32 {
    let z = x as i64 * w as i64;
    debug_assert!((PRODUCT_MIN..=PRODUCT_MAX).contains(&z), "product {} * {} out of range", x, w);
    let r = red(z);
    debug_assert!(i32::try_from(r).is_ok(), "red({}) = {} does not fit in i32", z, r);
    r as i32
}

/// Branch-free conversion of `x` in `[-Q, 2Q-1]` to its residue in `[0, Q-1]`.
///
/// Adds `Q` when `x` is negative, subtracts `Q`, then adds `Q` back if the result went negative.
/// The sign is extracted with a 16-bit shift, which is exact for every input of the valid range.
#[inline]
pub const fn correct(x: i32) -> i32 {
    let mut x = x;
    x += (x >> 16) & Q;
    x -= Q;
    x += (x >> 16) & Q;
    x
}

/// Maps a residue in `[0, Q-1]` to its centred representative in `[-(Q-1)/2, (Q-1)/2]`.
#[inline]
pub const fn shift(x: i32) -> i32 {
    if x > HALF_Q {
        x - Q
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_constants() {
        assert_eq!(Q as i64, K * (1 << M) + 1);
        assert_eq!(MASK, 4095);
        assert_eq!((K * INV_K) % Q as i64, 1);
        assert_eq!(HALF_Q, 6144);
    }

    #[test]
    fn test_red_congruence() {
        let q = Q as i64;
        let samples = [
            0i64,
            1,
            -1,
            4095,
            4096,
            -4096,
            12288,
            -12289,
            21499,
            -21499,
            123_456_789,
            -987_654_321,
            i32::MAX as i64,
            i32::MIN as i64,
        ];
        for x in samples {
            let r = red(x);
            assert_eq!((r - K * x).rem_euclid(q), 0, "red({}) = {}", x, r);
        }
        for x in (-100_000i64..100_000).step_by(997) {
            assert_eq!((red(x) - K * x).rem_euclid(q), 0);
        }
    }

    #[test]
    fn test_red_known_values() {
        assert_eq!(red(0), 0);
        assert_eq!(red(1), 3);
        assert_eq!(red(4096), -1);
        assert_eq!(red(-1), 3 * 4095 + 1);
        assert_eq!(divd(-1), -1);
        assert_eq!(remd(-1), 4095);
    }

    #[test]
    fn test_mul_red() {
        assert_eq!(mul_red(2, 3), red(6) as i32);
        assert_eq!(mul_red(-21499, 6144), red(-21499 * 6144) as i32);
        // Wider than 32 bits before reduction.
        assert_eq!(mul_red(i32::MAX, 4096), red(i32::MAX as i64 * 4096) as i32);
    }

    #[test]
    fn test_product_range_limits() {
        assert_eq!(red(PRODUCT_MAX), i32::MIN as i64 + K * MASK);
        assert!(red(PRODUCT_MAX + 1) < i32::MIN as i64);
        assert_eq!(red(PRODUCT_MIN), i32::MAX as i64 - K * MASK);
        assert!(red(PRODUCT_MIN - 1) > i32::MAX as i64);
        let highest = (PRODUCT_MIN..PRODUCT_MIN + 4096).map(red).max().unwrap();
        assert_eq!(highest, i32::MAX as i64);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "out of range")]
    fn test_mul_red_rejects_wide_product() {
        mul_red(i32::MAX, i32::MAX);
    }

    fn correct_naive(x: i32) -> i32 {
        if x < 0 {
            x + Q
        } else if x >= Q {
            x - Q
        } else {
            x
        }
    }

    #[test]
    fn test_correct_matches_naive() {
        for x in -Q..2 * Q {
            let c = correct(x);
            assert_eq!(c, correct_naive(x), "correct({})", x);
            assert!((0..Q).contains(&c));
        }
    }

    #[test]
    fn test_shift_boundary() {
        assert_eq!(shift(0), 0);
        assert_eq!(shift(HALF_Q), HALF_Q);
        assert_eq!(shift(HALF_Q + 1), -HALF_Q);
        assert_eq!(shift(Q - 1), -1);
    }
}
