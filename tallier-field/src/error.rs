use thiserror::Error;

/// Errors raised by field arithmetic and Shamir (re)construction.
///
/// `SingularMatrix` is fatal at the MPC layer: it means the clique's Vandermonde matrix had no
/// pivot, which should not occur with the primes elections are created against (see spec §12).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("prime {p} is not a valid field modulus (must be >= 2)")]
    InvalidPrime { p: u32 },

    #[error("cannot invert zero")]
    NotInvertible,

    #[error("fewer than {needed} shares given to reconstruct (got {got})")]
    InsufficientShares { needed: usize, got: usize },

    #[error("duplicate evaluation point {x} among shares passed to reconstruct")]
    DuplicateEvaluationPoint { x: u32 },

    #[error("matrix is singular mod p; no pivot found in column {column}")]
    SingularMatrix { column: usize },

    #[error("matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
}
