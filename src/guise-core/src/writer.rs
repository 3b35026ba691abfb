//! Identity writer trait.
//!
//! This module defines the core [`IdentityWriter`] capability that all
//! platform implementations must provide. The engine depends only on this
//! trait; the mechanism behind it (JNI on Android, an in-memory store
//! elsewhere) is a platform detail.

use crate::error::GuiseError;
use crate::profile::{BuildField, BuildIdentity};

/// Write access to the process-global build identity.
///
/// Implementations must be safe to share across the host's hook threads.
pub trait IdentityWriter: Send + Sync {
    /// Overwrite a single build field.
    ///
    /// Fields are independent failure domains: an error here must not
    /// prevent the caller from writing the remaining fields.
    fn set_field(&self, field: BuildField, value: &str) -> Result<(), GuiseError>;

    /// Read the live device/product/model/fingerprint tuple.
    ///
    /// Called once at engine construction to capture the original identity
    /// before any patch is applied.
    fn snapshot(&self) -> Result<BuildIdentity, GuiseError>;
}
