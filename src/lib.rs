//! # ntt-red: verified reduced-arithmetic NTT over Q = 12289
//!
//! **`ntt-red`** computes the Number-Theoretic Transform over `Z/QZ` with `Q = 12289` and uses it
//! to multiply polynomials modulo `X^n + 1`, for `n` a power of two (built-in tables cover
//! `16 <= n <= 2048`).
//!
//! ## Reduced arithmetic
//!
//! Instead of exact `x mod Q`, every multiplication is followed by the cheap reduction
//!
//! ```text
//! red(x) = 3 * (x mod 4096) - (x div 4096)      with Q = 3 * 4096 + 1
//! ```
//!
//! which returns a small value congruent to `3x`. Values are never fully normalised inside a
//! transform, so they grow from round to round. The crate therefore comes with its own proof
//! that they never overflow 32-bit integers:
//!
//! - **[`bounds`]** computes the exact range of `red(x)` and `red(w * x)` over integer ranges;
//! - **[`rounds`]** chains those bounds over the rounds of a transform;
//! - **[`analysis`]** re-runs every transform and product over [`interval::Interval`]s and
//!   reports any element that may leave the `i32` range.
//!
//! ## Transforms and products
//!
//! - **[`ntt`]**: eight in-place transform kernels (Cooley–Tukey and Gentleman–Sande, both
//!   element orders, with and without folded-in powers of `psi`) and the array primitives.
//! - **[`product`]**: five complete multiplication pipelines built from those kernels.
//! - **[`tables`]**: the constant tables, generated from a root of unity or validated when
//!   supplied from outside.
//!
//! ## Basic Usage
//!
//! ```rust
//! use ntt_red::product::product1;
//! use ntt_red::tables::NttTables;
//!
//! let tables = NttTables::standard(16).unwrap();
//!
//! // (1 + x) * x^15 = x^15 + x^16 = x^15 - 1  (mod x^16 + 1)
//! let mut a = vec![0; 16];
//! let mut b = vec![0; 16];
//! a[0] = 1;
//! a[1] = 1;
//! b[15] = 1;
//!
//! let mut c = vec![0; 16];
//! product1(&mut c, &mut a, &mut b, tables);
//! assert_eq!(c[0], 12288);
//! assert_eq!(c[15], 1);
//! ```
//!
//! Checking that a product cannot overflow:
//!
//! ```rust
//! use ntt_red::analysis::Analyzer;
//! use ntt_red::product::ProductVariant;
//! use ntt_red::tables::NttTables;
//!
//! let tables = NttTables::standard(16).unwrap();
//! let mut analyzer = Analyzer::new();
//! analyzer.analyze_product(ProductVariant::Product5, tables).unwrap();
//! assert!(analyzer.warnings().is_empty());
//! ```

pub mod analysis;
pub mod bitrev;
pub mod bounds;
pub mod error;
pub mod interval;
pub mod ntt;
pub mod params;
pub mod product;
pub mod reference;
pub mod rounds;
pub mod tables;
pub mod utils;
