//! Writer selection for the current platform.
//!
//! Picks the native build-identity writer when one exists and falls back
//! gracefully to the software store when it does not.

use std::sync::Arc;

use crate::software::SoftwareIdentity;
use crate::writer::IdentityWriter;

/// Create the best available identity writer for this platform.
///
/// Never fails: when the native writer cannot be constructed the software
/// store takes its place, so the engine always has something to write to.
#[must_use]
pub fn create_identity_writer() -> Arc<dyn IdentityWriter> {
    #[cfg(target_os = "android")]
    {
        match super::android::BuildClassWriter::new() {
            Ok(writer) => {
                tracing::info!("using android.os.Build identity writer");
                return Arc::new(writer);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Build class writer unavailable, falling back to software identity"
                );
            }
        }
    }

    tracing::info!("using software identity store");
    Arc::new(SoftwareIdentity::host_defaults())
}
