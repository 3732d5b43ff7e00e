use crate::params::{HALF_Q, Q};

/// Exact residue of `x` modulo [`Q`], in `[0, Q-1]`.
pub fn rem_q(x: i64) -> i64 {
    x.rem_euclid(Q as i64)
}

/// Centred residue of `x` modulo [`Q`], in `[-(Q-1)/2, (Q-1)/2]`.
pub fn center(x: i64) -> i64 {
    let r = rem_q(x);
    if r > HALF_Q as i64 {
        r - Q as i64
    } else {
        r
    }
}

/// Modular exponentiation `base^exp mod Q` by square-and-multiply.
pub fn pow_mod(base: i64, exp: u64) -> i64 {
    let mut result = 1;
    let mut base = rem_q(base);
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % Q as i64;
        }
        base = base * base % Q as i64;
        exp >>= 1;
    }
    result
}

/// Modular inverse modulo [`Q`] (Fermat), or `None` for multiples of `Q`.
pub fn inv_mod(x: i64) -> Option<i64> {
    let x = rem_q(x);
    if x == 0 {
        None
    } else {
        Some(pow_mod(x, Q as u64 - 2))
    }
}

/// Base-2 logarithm of `n`, if `n` is a power of two.
pub fn log2_exact(n: usize) -> Option<u32> {
    if n.is_power_of_two() {
        Some(n.trailing_zeros())
    } else {
        None
    }
}
