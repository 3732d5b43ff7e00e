//! Constant tables of a transform of size `n`.
//!
//! All multipliers used by the reduced-arithmetic engine are pre-multiplied by `K^-1 mod Q`,
//! so that `red(x * p[i])` is congruent to `x * (power)` rather than `K * x * (power)`.
//! Every entry is stored as its centred representative in `[-(Q-1)/2, (Q-1)/2]`, which keeps
//! products within the ranges established by [`crate::rounds`].
//!
//! Round tables are indexed by `t + j` where `t = 2^k` is the round stride and `0 <= j < t`:
//!
//! ```text
//! omega_powers[t + j]              = omega^((n/2t) * j)                    * K^-1
//! omega_powers_rev[t + rev_k(j)]   = omega^((n/2t) * j)                    * K^-1
//! mixed_powers[t + j]              = psi^(n/2t) * omega^((n/2t) * j)       * K^-1
//! mixed_powers_rev[t + rev_k(j)]   = psi^(n/2t) * omega^((n/2t) * j)       * K^-1
//! ```
//!
//! and likewise with `psi^-1`, `omega^-1` for the `inv_` variants. Index `0` is unused.

use std::fmt;
use std::sync::OnceLock;

use log::debug;

use crate::bitrev::reverse_bits;
use crate::error::{Error, Result};
use crate::params::{HALF_Q, INV_K, K, Q};
use crate::utils::{center, inv_mod, log2_exact, pow_mod, rem_q};

/// Sizes and roots of the built-in tables.
pub const STANDARD_ROOTS: [(usize, i64); 8] = [
    (16, 1212),
    (32, 563),
    (64, 81),
    (128, 1022),
    (256, 1002),
    (512, 1003),
    (1024, 1014),
    (2048, 12248),
];

/// Table contents supplied from outside, validated by [`NttTables::from_raw`].
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub psi_powers: Vec<i16>,
    pub inv_psi_powers: Vec<i16>,
    pub scaled_inv_psi_powers: Vec<i16>,
    pub omega_powers: Vec<i16>,
    pub omega_powers_rev: Vec<i16>,
    pub inv_omega_powers: Vec<i16>,
    pub inv_omega_powers_rev: Vec<i16>,
    pub mixed_powers: Vec<i16>,
    pub mixed_powers_rev: Vec<i16>,
    pub inv_mixed_powers: Vec<i16>,
    pub inv_mixed_powers_rev: Vec<i16>,
    pub rescale: i16,
}

impl RawTables {
    fn named(&self) -> [(&'static str, &[i16]); 11] {
        [
            ("psi_powers", &self.psi_powers),
            ("inv_psi_powers", &self.inv_psi_powers),
            ("scaled_inv_psi_powers", &self.scaled_inv_psi_powers),
            ("omega_powers", &self.omega_powers),
            ("omega_powers_rev", &self.omega_powers_rev),
            ("inv_omega_powers", &self.inv_omega_powers),
            ("inv_omega_powers_rev", &self.inv_omega_powers_rev),
            ("mixed_powers", &self.mixed_powers),
            ("mixed_powers_rev", &self.mixed_powers_rev),
            ("inv_mixed_powers", &self.inv_mixed_powers),
            ("inv_mixed_powers_rev", &self.inv_mixed_powers_rev),
        ]
    }
}

/// Transform descriptor: size, roots of unity and all constant tables.
#[derive(Clone)]
pub struct NttTables {
    n: usize,
    log_n: u32,
    psi: i64,
    omega: i64,
    inv_psi: i64,
    inv_omega: i64,
    inv_n: i64,
    raw: RawTables,
}

fn to_i16(x: i64) -> i16 {
    // Centred residues always fit.
    center(x) as i16
}

/// `a[t + j] = x^(n/2t) * y^((n/2t) * j) * scale` for every round stride `t`.
fn build_table(n: usize, x: i64, y: i64, scale: i64, reversed: bool) -> Vec<i16> {
    let mut table = vec![0; n];
    let mut t = 1;
    let mut k = 0;
    while t < n {
        let e = (n / (2 * t)) as u64;
        let mut b = pow_mod(x, e);
        let c = pow_mod(y, e);
        for j in 0..t {
            let index = if reversed { reverse_bits(j, k) } else { j };
            table[t + index] = to_i16(b * scale);
            b = b * c % Q as i64;
        }
        t *= 2;
        k += 1;
    }
    table
}

/// `a[i] = x^i * scale`.
fn build_power_table(n: usize, x: i64, scale: i64) -> Vec<i16> {
    let mut table = Vec::with_capacity(n);
    let mut b = 1;
    for _ in 0..n {
        table.push(to_i16(b * scale));
        b = b * x % Q as i64;
    }
    table
}

fn check_size(n: usize) -> Result<u32> {
    match log2_exact(n) {
        Some(k) if k >= 1 => Ok(k),
        _ => Err(Error::InvalidSize(n)),
    }
}

fn inverse(x: i64, n: usize) -> Result<i64> {
    inv_mod(x).ok_or(Error::InvalidRoot { psi: x, n })
}

impl NttTables {
    fn with_params(n: usize, psi: i64, raw: RawTables) -> Result<Self> {
        let log_n = check_size(n)?;
        let psi = rem_q(psi);
        if pow_mod(psi, n as u64) != Q as i64 - 1 {
            return Err(Error::InvalidRoot { psi, n });
        }
        let omega = psi * psi % Q as i64;
        Ok(NttTables {
            n,
            log_n,
            psi,
            omega,
            inv_psi: inverse(psi, n)?,
            inv_omega: inverse(omega, n)?,
            inv_n: inverse(n as i64, n)?,
            raw,
        })
    }

    /// Builds all tables for size `n` from a primitive `2n`-th root of unity `psi`.
    pub fn generate(n: usize, psi: i64) -> Result<Self> {
        let mut tables = Self::with_params(n, psi, RawTables::default())?;
        let (psi, omega, inv_psi, inv_omega) = (tables.psi, tables.omega, tables.inv_psi, tables.inv_omega);
        let k8 = pow_mod(K, 8);
        let scale = inverse(k8 * n as i64 % Q as i64, n)?;

        tables.raw = RawTables {
            psi_powers: build_power_table(n, psi, INV_K),
            inv_psi_powers: build_power_table(n, inv_psi, INV_K),
            scaled_inv_psi_powers: build_power_table(n, inv_psi, scale),
            omega_powers: build_table(n, 1, omega, INV_K, false),
            omega_powers_rev: build_table(n, 1, omega, INV_K, true),
            inv_omega_powers: build_table(n, 1, inv_omega, INV_K, false),
            inv_omega_powers_rev: build_table(n, 1, inv_omega, INV_K, true),
            mixed_powers: build_table(n, psi, omega, INV_K, false),
            mixed_powers_rev: build_table(n, psi, omega, INV_K, true),
            inv_mixed_powers: build_table(n, inv_psi, inv_omega, INV_K, false),
            inv_mixed_powers_rev: build_table(n, inv_psi, inv_omega, INV_K, true),
            rescale: to_i16(scale),
        };
        debug!("generated tables for n={}, psi={}, omega={}", n, psi, omega);
        Ok(tables)
    }

    /// Wraps externally produced tables after checking their shape.
    ///
    /// Checks that `n` is a power of two, `psi^n = -1 mod Q`, every table has `n` entries,
    /// and every entry is a centred residue. The values themselves are trusted.
    pub fn from_raw(n: usize, psi: i64, raw: RawTables) -> Result<Self> {
        let tables = Self::with_params(n, psi, raw)?;
        let half = HALF_Q as i16;
        for (name, table) in tables.raw.named() {
            if table.len() != n {
                return Err(Error::TableLength {
                    name,
                    expected: n,
                    got: table.len(),
                });
            }
            if let Some(&x) = table.iter().find(|&&x| !(-half..=half).contains(&x)) {
                return Err(Error::PreconditionViolation {
                    what: name,
                    min: x as i64,
                    max: x as i64,
                });
            }
        }
        if !(-half..=half).contains(&tables.raw.rescale) {
            let r = tables.raw.rescale as i64;
            return Err(Error::PreconditionViolation {
                what: "rescale",
                min: r,
                max: r,
            });
        }
        Ok(tables)
    }

    /// Shared built-in tables for `n` in `16, 32, ..., 2048`, generated on first use.
    pub fn standard(n: usize) -> Result<&'static NttTables> {
        static STANDARD: [OnceLock<NttTables>; STANDARD_ROOTS.len()] =
            [const { OnceLock::new() }; STANDARD_ROOTS.len()];

        let index = STANDARD_ROOTS
            .iter()
            .position(|&(size, _)| size == n)
            .ok_or(Error::UnsupportedSize(n))?;
        let cell = &STANDARD[index];
        if let Some(tables) = cell.get() {
            return Ok(tables);
        }
        let tables = NttTables::generate(n, STANDARD_ROOTS[index].1)?;
        Ok(cell.get_or_init(|| tables))
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn log_n(&self) -> u32 {
        self.log_n
    }

    pub fn psi(&self) -> i64 {
        self.psi
    }

    pub fn omega(&self) -> i64 {
        self.omega
    }

    pub fn inv_psi(&self) -> i64 {
        self.inv_psi
    }

    pub fn inv_omega(&self) -> i64 {
        self.inv_omega
    }

    pub fn inv_n(&self) -> i64 {
        self.inv_n
    }

    /// `(K^8 * n)^-1 mod Q`, the final scaling constant of the fused product.
    pub fn rescale(&self) -> i16 {
        self.raw.rescale
    }

    /// `psi^i * K^-1`.
    pub fn psi_powers(&self) -> &[i16] {
        &self.raw.psi_powers
    }

    /// `psi^-i * K^-1`.
    pub fn inv_psi_powers(&self) -> &[i16] {
        &self.raw.inv_psi_powers
    }

    /// `psi^-i * (K^8 * n)^-1`.
    pub fn scaled_inv_psi_powers(&self) -> &[i16] {
        &self.raw.scaled_inv_psi_powers
    }

    pub fn omega_powers(&self) -> &[i16] {
        &self.raw.omega_powers
    }

    pub fn omega_powers_rev(&self) -> &[i16] {
        &self.raw.omega_powers_rev
    }

    pub fn inv_omega_powers(&self) -> &[i16] {
        &self.raw.inv_omega_powers
    }

    pub fn inv_omega_powers_rev(&self) -> &[i16] {
        &self.raw.inv_omega_powers_rev
    }

    pub fn mixed_powers(&self) -> &[i16] {
        &self.raw.mixed_powers
    }

    pub fn mixed_powers_rev(&self) -> &[i16] {
        &self.raw.mixed_powers_rev
    }

    pub fn inv_mixed_powers(&self) -> &[i16] {
        &self.raw.inv_mixed_powers
    }

    pub fn inv_mixed_powers_rev(&self) -> &[i16] {
        &self.raw.inv_mixed_powers_rev
    }

    /// All tables with their names.
    pub fn named_tables(&self) -> [(&'static str, &[i16]); 11] {
        self.raw.named()
    }
}

impl fmt::Debug for NttTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NttTables")
            .field("n", &self.n)
            .field("psi", &self.psi)
            .field("omega", &self.omega)
            .field("inv_psi", &self.inv_psi)
            .field("inv_omega", &self.inv_omega)
            .field("inv_n", &self.inv_n)
            .field("rescale", &self.raw.rescale)
            .finish_non_exhaustive()
    }
}
