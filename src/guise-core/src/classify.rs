//! Caller classification.
//!
//! Decides, once per process, which spoof category the calling process
//! falls into. Process identity cannot change at runtime, so the flags are
//! computed once and immutable thereafter.

use crate::error::GuiseError;

/// Play Services package.
pub const PACKAGE_GMS: &str = "com.google.android.gms";
/// The Play Services process that runs integrity verification.
pub const PROCESS_GMS_UNSTABLE: &str = "com.google.android.gms.unstable";
/// Play Store package.
pub const PACKAGE_VENDING: &str = "com.android.vending";
/// Google Photos package.
pub const PACKAGE_GPHOTOS: &str = "com.google.android.apps.photos";
/// AR runtime package that receives the stock fingerprint.
pub const PACKAGE_ARCORE: &str = "com.google.ar.core";
/// Social camera app that receives the full Pixel XL identity.
pub const PACKAGE_SNAPCHAT: &str = "com.snapchat.android";

/// Package and process name of the current process, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessContext {
    /// Package name as reported by the host.
    pub package: String,
    /// Process name as reported by the host.
    pub process: String,
}

impl ProcessContext {
    /// Build a context, rejecting empty names.
    ///
    /// Fail-closed: without a verifiable identity the whole spoofing
    /// subsystem stays inert for this process.
    pub fn new(package: &str, process: &str) -> Result<Self, GuiseError> {
        if package.is_empty() || process.is_empty() {
            return Err(GuiseError::InvalidProcessIdentity {
                reason: "empty package or process name".to_string(),
            });
        }
        Ok(Self {
            package: package.to_string(),
            process: process.to_string(),
        })
    }
}

/// Spoof-category flags, computed once from [`ProcessContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationFlags {
    /// Process is the Play Services integrity-verification process.
    pub is_gms_unstable: bool,
    /// Process is the Play Store.
    pub is_vending: bool,
    /// Process is Photos and Photos spoofing is enabled.
    pub is_photos: bool,
}

/// Classify the process. `spoof_photos` gates the Photos flag.
#[must_use]
pub fn classify(ctx: &ProcessContext, spoof_photos: bool) -> ClassificationFlags {
    ClassificationFlags {
        is_gms_unstable: ctx.package == PACKAGE_GMS && ctx.process == PROCESS_GMS_UNSTABLE,
        is_vending: ctx.package == PACKAGE_VENDING,
        is_photos: spoof_photos && ctx.package == PACKAGE_GPHOTOS,
    }
}
