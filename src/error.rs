//! Error type shared by the interval domain, the bound solver and table validation.
//!
//! The concrete transform engine never returns errors: it relies on the bounds established
//! by [`crate::rounds`] and [`crate::analysis`].

/// Errors reported by the verification side of the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An interval (or a solver range) with `min > max`.
    #[error("invalid interval [{min}, {max}]")]
    InvalidInterval { min: i64, max: i64 },

    /// A bound computation would exceed the 64-bit range.
    #[error("arithmetic overflow in {op}({lhs}, {rhs})")]
    ArithmeticOverflow { op: &'static str, lhs: i64, rhs: i64 },

    /// An input lies outside the documented safe range of an operation.
    #[error("precondition violated for {what}: [{min}, {max}]")]
    PreconditionViolation { what: &'static str, min: i64, max: i64 },

    /// Transform size is not a power of two of at least 2.
    #[error("invalid transform size {0}")]
    InvalidSize(usize),

    /// No built-in tables exist for this transform size.
    #[error("no standard tables for size {0}")]
    UnsupportedSize(usize),

    /// A supplied table has the wrong number of entries.
    #[error("table {name} has {got} entries, expected {expected}")]
    TableLength { name: &'static str, expected: usize, got: usize },

    /// The supplied `psi` is not a primitive `2n`-th root of unity modulo `Q`.
    #[error("psi = {psi} does not satisfy psi^{n} = -1 mod Q")]
    InvalidRoot { psi: i64, n: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
