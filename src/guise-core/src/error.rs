//! Error types for spoofing operations.

use thiserror::Error;

/// Errors raised by the spoofing engine.
///
/// Only [`GuiseError::AttestationBlocked`] is ever surfaced to the host;
/// every other variant is logged at its site and swallowed so the engine
/// cannot crash the process it lives in.
#[derive(Debug, Error)]
pub enum GuiseError {
    /// Key attestation was requested from a gated caller. Deliberate,
    /// non-recoverable; the host maps it to its unsupported-operation
    /// failure.
    #[error("attestation certificate chain request refused")]
    AttestationBlocked,

    /// Package or process name was empty at identity resolution.
    #[error("invalid process identity: {reason}")]
    InvalidProcessIdentity {
        /// What was missing.
        reason: String,
    },

    /// A single build field could not be overwritten. Sibling fields are
    /// unaffected.
    #[error("failed to write build field {field}: {reason}")]
    FieldWriteFailed {
        /// The `android.os.Build` field name.
        field: &'static str,
        /// Underlying failure.
        reason: String,
    },

    /// The live build identity could not be read.
    #[error("identity source unavailable: {reason}")]
    IdentityUnavailable {
        /// Underlying failure.
        reason: String,
    },
}

impl GuiseError {
    /// True for the one deliberate, host-visible rejection.
    #[must_use]
    pub fn is_attestation_block(&self) -> bool {
        matches!(self, Self::AttestationBlocked)
    }
}
