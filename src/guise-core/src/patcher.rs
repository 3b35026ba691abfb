//! Profile application.
//!
//! The patcher is a pure side-effecting setter with no policy: it pushes a
//! profile's present fields through the identity writer, one field at a
//! time. Fields are independent failure domains: a write error is logged
//! and the remaining fields still go through.

use std::sync::Arc;

use tracing::{debug, error};

use crate::profile::{BuildIdentity, SpoofProfile};
use crate::writer::IdentityWriter;

/// Applies spoof profiles to the process-global build identity.
#[derive(Clone)]
pub struct PropertyPatcher {
    writer: Arc<dyn IdentityWriter>,
}

impl PropertyPatcher {
    /// Create a patcher over the given writer.
    #[must_use]
    pub fn new(writer: Arc<dyn IdentityWriter>) -> Self {
        Self { writer }
    }

    /// Apply every present field of the profile. Never fails the caller.
    pub fn apply(&self, profile: &SpoofProfile) {
        for (field, value) in profile.fields() {
            debug!(
                profile = %profile.name,
                field = field.name(),
                value,
                "overriding build field"
            );
            if let Err(e) = self.writer.set_field(field, value) {
                error!(
                    profile = %profile.name,
                    field = field.name(),
                    error = %e,
                    "failed to override build field"
                );
            }
        }
    }

    /// Apply a full device/product/model/fingerprint tuple under a name.
    pub fn apply_identity(&self, name: &str, identity: &BuildIdentity) {
        self.apply(&SpoofProfile::from_identity(name, identity));
    }
}
