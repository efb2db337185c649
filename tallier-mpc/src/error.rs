use thiserror::Error;

use tallier_field::FieldError;
use tallier_transport::TransportError;

/// Errors raised while running an MPC sub-protocol (spec §7). `CancelledOperation` is modeled
/// structurally via Tokio cancellation (dropping the future / `JoinHandle::abort`) rather than
/// as a value here, per SPEC_FULL.md §12; the only variants an MPC call can actually return are
/// the ones below.
#[derive(Debug, Error)]
pub enum MpcError {
    /// A peer closed or sent unparsable data mid-protocol. Fatal to the MPC instance; the
    /// caller tears the mesh down (abort-and-restart-the-election, spec §7).
    #[error(transparent)]
    ProtocolAbort(#[from] TransportError),

    /// A field-arithmetic precondition was violated (singular matrix, insufficient shares).
    /// Should not occur with the primes elections are actually created against.
    #[error(transparent)]
    Field(#[from] FieldError),
}
