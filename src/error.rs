//! The closed error taxonomy surfaced to the host engine.
//!
//! Every operation in this crate either produces its declared output or one
//! of the codes below, never both and never neither. Failures inside the
//! chemistry toolkit are caught at the call site and translated into the
//! nearest code; no internal error type crosses the crate boundary.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ChemError>;

/// Errors surfaced to the host engine.
///
/// The set is closed: host adapters can match exhaustively and map each
/// variant to a stable engine-level error code.
#[derive(Debug, Error)]
pub enum ChemError {
    /// An argument's host-level type does not match what the operation
    /// requires. Checked before any resource is acquired.
    #[error("argument has the wrong type: expected {0}")]
    TypeMismatch(&'static str),

    /// A blob cannot be decoded as the structure or fingerprint it claims
    /// to be (corrupt pickle, truncated bit buffer, bad length declaration).
    #[error("malformed input blob: {0}")]
    MalformedInput(String),

    /// A textual structure notation could not be parsed.
    #[error("could not parse structure notation: {0}")]
    ParseError(String),

    /// A structure handle could not be rendered back to text.
    #[error("could not render structure to text: {0}")]
    RenderError(String),

    /// Fingerprint generation failed inside the toolkit.
    #[error("fingerprint generation failed: {0}")]
    GenerationError(String),

    /// Structure serialization (pickling) failed inside the toolkit.
    #[error("structure serialization failed: {0}")]
    SerializationError(String),

    /// The similarity computation failed inside the toolkit.
    #[error("similarity computation failed: {0}")]
    ComputeError(String),

    /// Two fingerprints being compared have different bit lengths.
    #[error("fingerprints have different bit lengths ({0} vs {1})")]
    LengthMismatch(usize, usize),

    /// Allocation failure for an output buffer.
    #[error("out of memory while allocating an output buffer")]
    OutOfMemory,
}
