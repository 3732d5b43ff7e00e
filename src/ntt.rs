//! Concrete transforms with reduced arithmetic.
//!
//! All functions work in place on `i32` buffers and use `i16` constant tables from
//! [`NttTables`]. Nothing is range-checked in release builds: the bounds computed in
//! [`crate::rounds`] and [`crate::analysis`] guarantee that no intermediate value leaves
//! the 32-bit range for inputs of magnitude at most [`INPUT_BOUND`]. Debug builds assert
//! that every product passed to `red` lies in the range where the result fits an `i32`.
//!
//! ## Variants
//!
//! | function                  | butterfly | input    | output   | table               |
//! |---------------------------|-----------|----------|----------|---------------------|
//! | [`ntt_red_ct_rev2std`]    | CT        | reversed | standard | `omega_powers`      |
//! | [`mulntt_red_ct_rev2std`] | CT        | reversed | standard | `mixed_powers`      |
//! | [`ntt_red_ct_std2rev`]    | CT        | standard | reversed | `omega_powers_rev`  |
//! | [`mulntt_red_ct_std2rev`] | CT        | standard | reversed | `mixed_powers_rev`  |
//! | [`ntt_red_gs_rev2std`]    | GS        | reversed | standard | `omega_powers_rev`  |
//! | [`nttmul_red_gs_rev2std`] | GS        | reversed | standard | `mixed_powers_rev`  |
//! | [`ntt_red_gs_std2rev`]    | GS        | standard | reversed | `omega_powers`      |
//! | [`nttmul_red_gs_std2rev`] | GS        | standard | reversed | `mixed_powers`      |
//!
//! The inverse transforms use the same functions with the `inv_` tables.
//! The `mul` variants fold the multiplication by powers of `psi` into the butterflies:
//! CT variants multiply the input by `psi^i` before transforming, GS variants multiply the
//! output by `psi^i` after transforming.

use std::fmt;

use crate::params::{correct as correct_one, mul_red, red, shift, INV_K, Q};
use crate::tables::NttTables;

/// Largest input magnitude for which every transform is proven not to overflow.
pub const INPUT_BOUND: i32 = 21499;

/// Replaces each element by its residue in `[0, Q-1]`.
pub fn normalize(a: &mut [i32]) {
    for x in a.iter_mut() {
        *x = x.rem_euclid(Q);
        debug_assert!((0..Q).contains(x));
    }
}

/// Replaces each element `x` by `(x * K^-1) mod Q`, undoing one factor `K` from [`red`].
pub fn normalize_inv3(a: &mut [i32]) {
    for x in a.iter_mut() {
        *x = (*x as i64 * INV_K).rem_euclid(Q as i64) as i32;
        debug_assert!((0..Q).contains(x));
    }
}

/// Maps residues in `[0, Q-1]` to centred residues in `[-(Q-1)/2, (Q-1)/2]`.
pub fn shift_array(a: &mut [i32]) {
    for x in a.iter_mut() {
        debug_assert!((0..Q).contains(x), "shift input {} out of range", x);
        *x = shift(*x);
    }
}

/// Applies [`red`] to each element.
pub fn reduce_array(a: &mut [i32]) {
    for x in a.iter_mut() {
        *x = red(*x as i64) as i32;
    }
}

/// Applies [`red`] twice to each element.
pub fn reduce_array_twice(a: &mut [i32]) {
    for x in a.iter_mut() {
        *x = red(red(*x as i64)) as i32;
    }
}

/// Converts each element in `[-Q, 2Q-1]` to its residue in `[0, Q-1]`, without branches.
pub fn correct(a: &mut [i32]) {
    for x in a.iter_mut() {
        debug_assert!((-Q..2 * Q).contains(x), "correct input {} out of range", x);
        *x = correct_one(*x);
    }
}

/// `a[i] = red(a[i] * p[i])`.
pub fn mul_reduce_array16(a: &mut [i32], p: &[i16]) {
    debug_assert_eq!(a.len(), p.len());
    for (x, &w) in a.iter_mut().zip(p) {
        *x = mul_red(*x, w as i32);
    }
}

/// `c[i] = red(a[i] * b[i])`.
pub fn mul_reduce_array(c: &mut [i32], a: &[i32], b: &[i32]) {
    debug_assert!(c.len() == a.len() && c.len() == b.len());
    for ((z, &x), &y) in c.iter_mut().zip(a).zip(b) {
        *z = mul_red(x, y);
    }
}

/// `a[i] = red(a[i] * c)`.
pub fn scalar_mul_reduce_array(a: &mut [i32], c: i16) {
    for x in a.iter_mut() {
        *x = mul_red(*x, c as i32);
    }
}

/// CT butterfly on `(a[i], a[i+d])` with the multiplication already applied.
#[inline(always)]
fn ct_butterfly(a: &mut [i32], i: usize, d: usize, x: i32) {
    a[i + d] = a[i] - x;
    a[i] += x;
}

/// GS butterfly on `(a[i], a[i+d])` with multiplier `w`.
#[inline(always)]
fn gs_butterfly(a: &mut [i32], i: usize, d: usize, w: i32) {
    let x = a[i + d];
    a[i + d] = mul_red(a[i] - x, w);
    a[i] += x;
}

/// CT transform, bit-reversed input, standard output.
///
/// Round `t` (`t = 1, 2, ..., n/2`) combines elements `t` apart using `p[t..2t]`.
/// The first multiplier of each round is `1` and is skipped.
pub fn ntt_red_ct_rev2std(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut t = 1;
    while t < n {
        for s in (0..n).step_by(2 * t) {
            let x = a[s + t];
            ct_butterfly(a, s, t, x);
        }
        for j in 1..t {
            let w = p[t + j] as i32;
            for s in (j..n).step_by(2 * t) {
                let x = mul_red(a[s + t], w);
                ct_butterfly(a, s, t, x);
            }
        }
        t <<= 1;
    }
}

/// CT transform of `psi^i * a[i]`, bit-reversed input, standard output.
pub fn mulntt_red_ct_rev2std(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut t = 1;
    while t < n {
        for j in 0..t {
            let w = p[t + j] as i32;
            for s in (j..n).step_by(2 * t) {
                let x = mul_red(a[s + t], w);
                ct_butterfly(a, s, t, x);
            }
        }
        t <<= 1;
    }
}

/// CT transform, standard input, bit-reversed output.
///
/// Round `t` works on blocks of `2d` elements (`d = n/2t`), block `j` using `p[t+j]`.
pub fn ntt_red_ct_std2rev(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut d = n;
    let mut t = 1;
    while t < n {
        d >>= 1;
        for s in 0..d {
            let x = a[s + d];
            ct_butterfly(a, s, d, x);
        }
        let mut u = 0;
        for j in 1..t {
            let w = p[t + j] as i32;
            u += 2 * d;
            for s in u..u + d {
                let x = mul_red(a[s + d], w);
                ct_butterfly(a, s, d, x);
            }
        }
        t <<= 1;
    }
}

/// CT transform of `psi^i * a[i]`, standard input, bit-reversed output.
pub fn mulntt_red_ct_std2rev(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut d = n;
    let mut t = 1;
    while t < n {
        d >>= 1;
        let mut u = 0;
        for j in 0..t {
            let w = p[t + j] as i32;
            for s in u..u + d {
                let x = mul_red(a[s + d], w);
                ct_butterfly(a, s, d, x);
            }
            u += 2 * d;
        }
        t <<= 1;
    }
}

/// GS transform, bit-reversed input, standard output.
///
/// Round `t` (`t = n/2, ..., 1`) works on blocks of `2d` elements (`d = n/2t`).
pub fn ntt_red_gs_rev2std(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut t = n;
    let mut d = 1;
    while d < n {
        t >>= 1;
        for s in 0..d {
            let x = a[s + d];
            ct_butterfly(a, s, d, x);
        }
        let mut u = 2 * d;
        for j in 1..t {
            let w = p[t + j] as i32;
            for s in u..u + d {
                gs_butterfly(a, s, d, w);
            }
            u += 2 * d;
        }
        d <<= 1;
    }
}

/// GS transform followed by multiplication by `psi^i`, bit-reversed input, standard output.
pub fn nttmul_red_gs_rev2std(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut t = n;
    let mut d = 1;
    while d < n {
        t >>= 1;
        let mut u = 0;
        for j in 0..t {
            let w = p[t + j] as i32;
            for s in u..u + d {
                gs_butterfly(a, s, d, w);
            }
            u += 2 * d;
        }
        d <<= 1;
    }
}

/// GS transform, standard input, bit-reversed output.
pub fn ntt_red_gs_std2rev(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut t = n >> 1;
    while t > 0 {
        for s in (0..n).step_by(2 * t) {
            let x = a[s + t];
            ct_butterfly(a, s, t, x);
        }
        for j in 1..t {
            let w = p[t + j] as i32;
            for s in (j..n).step_by(2 * t) {
                gs_butterfly(a, s, t, w);
            }
        }
        t >>= 1;
    }
}

/// GS transform followed by multiplication by `psi^i`, standard input, bit-reversed output.
pub fn nttmul_red_gs_std2rev(a: &mut [i32], p: &[i16]) {
    let n = a.len();
    let mut t = n >> 1;
    while t > 0 {
        for j in 0..t {
            let w = p[t + j] as i32;
            for s in (j..n).step_by(2 * t) {
                gs_butterfly(a, s, t, w);
            }
        }
        t >>= 1;
    }
}

/// Butterfly family of a transform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Family {
    /// Cooley–Tukey: multiply, then add/subtract.
    Ct,
    /// Gentleman–Sande: add/subtract, then multiply the difference.
    Gs,
}

/// Element order of a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Order {
    Standard,
    BitReversed,
}

/// Forward (`omega`, `psi`) or inverse (`omega^-1`, `psi^-1`) tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Inverse,
}

/// One of the eight transform kernels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Variant {
    CtRev2Std,
    MulCtRev2Std,
    CtStd2Rev,
    MulCtStd2Rev,
    GsRev2Std,
    MulGsRev2Std,
    GsStd2Rev,
    MulGsStd2Rev,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::CtRev2Std,
        Variant::MulCtRev2Std,
        Variant::CtStd2Rev,
        Variant::MulCtStd2Rev,
        Variant::GsRev2Std,
        Variant::MulGsRev2Std,
        Variant::GsStd2Rev,
        Variant::MulGsStd2Rev,
    ];

    /// Runs the transform in place.
    pub fn apply(self, a: &mut [i32], p: &[i16]) {
        match self {
            Variant::CtRev2Std => ntt_red_ct_rev2std(a, p),
            Variant::MulCtRev2Std => mulntt_red_ct_rev2std(a, p),
            Variant::CtStd2Rev => ntt_red_ct_std2rev(a, p),
            Variant::MulCtStd2Rev => mulntt_red_ct_std2rev(a, p),
            Variant::GsRev2Std => ntt_red_gs_rev2std(a, p),
            Variant::MulGsRev2Std => nttmul_red_gs_rev2std(a, p),
            Variant::GsStd2Rev => ntt_red_gs_std2rev(a, p),
            Variant::MulGsStd2Rev => nttmul_red_gs_std2rev(a, p),
        }
    }

    pub fn family(self) -> Family {
        match self {
            Variant::CtRev2Std | Variant::MulCtRev2Std | Variant::CtStd2Rev | Variant::MulCtStd2Rev => Family::Ct,
            _ => Family::Gs,
        }
    }

    /// Returns `true` for the variants that fold in the powers of `psi`.
    pub fn is_fused(self) -> bool {
        matches!(
            self,
            Variant::MulCtRev2Std | Variant::MulCtStd2Rev | Variant::MulGsRev2Std | Variant::MulGsStd2Rev
        )
    }

    pub fn input_order(self) -> Order {
        match self {
            Variant::CtRev2Std | Variant::MulCtRev2Std | Variant::GsRev2Std | Variant::MulGsRev2Std => {
                Order::BitReversed
            }
            _ => Order::Standard,
        }
    }

    pub fn output_order(self) -> Order {
        match self.input_order() {
            Order::Standard => Order::BitReversed,
            Order::BitReversed => Order::Standard,
        }
    }

    /// The table this kernel expects for the given direction.
    pub fn table(self, tables: &NttTables, direction: Direction) -> &[i16] {
        let forward = direction == Direction::Forward;
        match self {
            Variant::CtRev2Std | Variant::GsStd2Rev => {
                if forward {
                    tables.omega_powers()
                } else {
                    tables.inv_omega_powers()
                }
            }
            Variant::CtStd2Rev | Variant::GsRev2Std => {
                if forward {
                    tables.omega_powers_rev()
                } else {
                    tables.inv_omega_powers_rev()
                }
            }
            Variant::MulCtRev2Std | Variant::MulGsStd2Rev => {
                if forward {
                    tables.mixed_powers()
                } else {
                    tables.inv_mixed_powers()
                }
            }
            Variant::MulCtStd2Rev | Variant::MulGsRev2Std => {
                if forward {
                    tables.mixed_powers_rev()
                } else {
                    tables.inv_mixed_powers_rev()
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::CtRev2Std => "ntt_red_ct_rev2std",
            Variant::MulCtRev2Std => "mulntt_red_ct_rev2std",
            Variant::CtStd2Rev => "ntt_red_ct_std2rev",
            Variant::MulCtStd2Rev => "mulntt_red_ct_std2rev",
            Variant::GsRev2Std => "ntt_red_gs_rev2std",
            Variant::MulGsRev2Std => "nttmul_red_gs_rev2std",
            Variant::GsStd2Rev => "ntt_red_gs_std2rev",
            Variant::MulGsStd2Rev => "nttmul_red_gs_std2rev",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::bitrev::bit_reverse;
    use crate::params::HALF_Q;
    use crate::reference::naive_ntt;
    use crate::utils::pow_mod;

    fn unit(n: usize, k: usize) -> Vec<i32> {
        let mut e = vec![0; n];
        e[k] = 1;
        e
    }

    /// Shifts, reorders and transforms `input` (residues), returning residues in standard order.
    fn run(variant: Variant, input: &[i32], p: &[i16]) -> Vec<i32> {
        let mut a = input.to_vec();
        shift_array(&mut a);
        if variant.input_order() == Order::BitReversed {
            bit_reverse(&mut a);
        }
        variant.apply(&mut a, p);
        normalize(&mut a);
        if variant.output_order() == Order::BitReversed {
            bit_reverse(&mut a);
        }
        a
    }

    const PLAIN: [Variant; 4] = [Variant::CtRev2Std, Variant::CtStd2Rev, Variant::GsRev2Std, Variant::GsStd2Rev];

    #[test]
    fn test_ntt16_unit_vectors() {
        let tables = NttTables::standard(16).unwrap();
        let omega = tables.omega();
        assert_eq!(omega, 6553);
        for variant in PLAIN {
            let p = variant.table(tables, Direction::Forward);
            assert_eq!(run(variant, &unit(16, 0), p), vec![1; 16], "{}", variant);
            for k in 1..16 {
                let expected: Vec<i32> = (0..16).map(|i| pow_mod(omega, (k * i) as u64) as i32).collect();
                assert_eq!(run(variant, &unit(16, k), p), expected, "{} e_{}", variant, k);
            }
        }

        // Fused CT variants twist the input by psi^k, fused GS variants the output by psi^i.
        let psi = tables.psi();
        for variant in Variant::ALL.into_iter().filter(|v| v.is_fused()) {
            let p = variant.table(tables, Direction::Forward);
            for k in 0..16 {
                let expected: Vec<i32> = (0..16)
                    .map(|i| {
                        let twist = if variant.family() == Family::Ct { k } else { i };
                        (pow_mod(omega, (k * i) as u64) * pow_mod(psi, twist as u64) % Q as i64) as i32
                    })
                    .collect();
                assert_eq!(run(variant, &unit(16, k), p), expected, "{} e_{}", variant, k);
            }
        }
    }

    #[test]
    fn test_transform_twice_reverses() {
        for n in [16, 256] {
            let tables = NttTables::standard(n).unwrap();
            for variant in PLAIN {
                let p = variant.table(tables, Direction::Forward);
                for k in [0, 1, 5, n / 2, n - 1] {
                    let once = run(variant, &unit(n, k), p);
                    let twice = run(variant, &once, p);
                    let mut expected = vec![0; n];
                    expected[(n - k) % n] = n as i32;
                    assert_eq!(twice, expected, "{} n={} k={}", variant, n, k);
                }
            }
        }
    }

    #[test]
    fn test_inverse_tables() {
        let tables = NttTables::standard(64).unwrap();
        let inv_omega = tables.inv_omega();
        for variant in PLAIN {
            let p = variant.table(tables, Direction::Inverse);
            let expected: Vec<i32> = (0..64).map(|i| pow_mod(inv_omega, 3 * i as u64) as i32).collect();
            assert_eq!(run(variant, &unit(64, 3), p), expected, "{}", variant);
        }
    }

    #[test]
    fn test_fused_variants() {
        let n = 32;
        let tables = NttTables::standard(n).unwrap();
        let input: Vec<i32> = (0..n as i32).map(|i| (i * 389 + 17) % Q).collect();

        for direction in [Direction::Forward, Direction::Inverse] {
            let (psi, omega) = match direction {
                Direction::Forward => (tables.psi(), tables.omega()),
                Direction::Inverse => (tables.inv_psi(), tables.inv_omega()),
            };
            let twisted: Vec<i32> = input
                .iter()
                .enumerate()
                .map(|(i, &x)| (x as i64 * pow_mod(psi, i as u64) % Q as i64) as i32)
                .collect();
            // CT variants multiply before, GS variants after the transform.
            let pre = naive_ntt(&twisted, omega);
            let post: Vec<i32> = naive_ntt(&input, omega)
                .iter()
                .enumerate()
                .map(|(i, &x)| (x as i64 * pow_mod(psi, i as u64) % Q as i64) as i32)
                .collect();

            for variant in Variant::ALL.into_iter().filter(|v| v.is_fused()) {
                let expected = if variant.family() == Family::Ct { &pre } else { &post };
                let p = variant.table(tables, direction);
                assert_eq!(&run(variant, &input, p), expected, "{} {:?}", variant, direction);
            }
        }
    }

    #[test]
    fn test_primitives() {
        let mut a = vec![-1, 0, 12289, 30000, -30000];
        normalize(&mut a);
        assert_eq!(a, vec![12288, 0, 0, 30000 % Q, (-30000i32).rem_euclid(Q)]);

        let mut a = vec![3, 6, -3];
        normalize_inv3(&mut a);
        assert_eq!(a, vec![1, 2, Q - 1]);

        let mut a = vec![0, 6144, 6145, 12288];
        shift_array(&mut a);
        assert_eq!(a, vec![0, 6144, -6144, -1]);

        let mut a = vec![-Q, -1, 0, Q, 2 * Q - 1];
        correct(&mut a);
        assert_eq!(a, vec![0, Q - 1, 0, 0, Q - 1]);

        let mut a = vec![4096, 1];
        reduce_array(&mut a);
        assert_eq!(a, vec![-1, 3]);
        let mut a = vec![4096, 1];
        reduce_array_twice(&mut a);
        assert_eq!(a, vec![red(-1) as i32, 9]);

        let mut c = vec![0; 2];
        mul_reduce_array(&mut c, &[2, 3], &[5, 7]);
        assert_eq!(c, vec![30, 63]);

        let mut a = vec![2, 3];
        mul_reduce_array16(&mut a, &[5, -7]);
        assert_eq!(a, vec![30, red(-21) as i32]);

        let mut a = vec![2, 3];
        scalar_mul_reduce_array(&mut a, 4);
        assert_eq!(a, vec![24, 36]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "out of range")]
    fn test_mul_reduce_array_rejects_wide_product() {
        let mut c = vec![0];
        mul_reduce_array(&mut c, &[i32::MAX], &[i32::MAX]);
    }

    #[test]
    fn test_mul_reduce_at_input_bound() {
        let mut a = vec![INPUT_BOUND, -INPUT_BOUND];
        mul_reduce_array16(&mut a, &[HALF_Q as i16, -(HALF_Q as i16)]);
        let z = INPUT_BOUND as i64 * HALF_Q as i64;
        assert_eq!(a, vec![red(z) as i32, red(z) as i32]);
    }

    #[test]
    fn test_variant_metadata() {
        assert_eq!(Variant::CtStd2Rev.input_order(), Order::Standard);
        assert_eq!(Variant::CtStd2Rev.output_order(), Order::BitReversed);
        assert_eq!(Variant::MulGsRev2Std.family(), Family::Gs);
        assert_eq!(Variant::ALL.iter().filter(|v| v.is_fused()).count(), 4);
        assert_eq!(Variant::GsStd2Rev.to_string(), "ntt_red_gs_std2rev");
    }
}
