//! Straightforward quadratic-time reference computations.
//!
//! These are used as oracles in tests and benchmarks. Inputs may be any integers;
//! outputs are residues in `[0, Q-1]`.

use crate::params::Q;
use crate::utils::{pow_mod, rem_q};

/// `A[i] = sum_j a[j] * omega^(i*j) mod Q`.
pub fn naive_ntt(a: &[i32], omega: i64) -> Vec<i32> {
    let n = a.len();
    let q = Q as i64;
    (0..n)
        .map(|i| {
            let w = pow_mod(omega, i as u64);
            let mut acc = 0;
            let mut power = 1;
            for &x in a {
                acc = (acc + rem_q(x as i64) * power) % q;
                power = power * w % q;
            }
            acc as i32
        })
        .collect()
}

/// Product of `a` and `b` modulo `X^n + 1` and `Q` by schoolbook multiplication.
///
/// # Panics
///
/// Panics if the lengths differ.
pub fn negacyclic_mul(a: &[i32], b: &[i32]) -> Vec<i32> {
    assert_eq!(a.len(), b.len(), "operands must have the same length");
    let n = a.len();
    let q = Q as i64;
    let mut c = vec![0i64; n];
    for (i, &x) in a.iter().enumerate() {
        let x = rem_q(x as i64);
        for (j, &y) in b.iter().enumerate() {
            let xy = x * rem_q(y as i64) % q;
            let k = i + j;
            if k < n {
                c[k] += xy;
            } else {
                c[k - n] -= xy;
            }
        }
    }
    c.into_iter().map(|v| rem_q(v) as i32).collect()
}
