//! In-memory identity store.
//!
//! The fallback [`IdentityWriter`] for platforms without a native build
//! identity, and the writer every test uses. Holds the six overridable
//! fields behind one `RwLock`.

use std::sync::RwLock;

use crate::error::GuiseError;
use crate::profile::{BuildField, BuildIdentity};
use crate::writer::IdentityWriter;

#[derive(Debug, Clone)]
struct Fields {
    brand: String,
    manufacturer: String,
    device: String,
    product: String,
    model: String,
    fingerprint: String,
}

/// Process-local build identity backed by plain memory.
#[derive(Debug)]
pub struct SoftwareIdentity {
    inner: RwLock<Fields>,
}

impl SoftwareIdentity {
    /// Create a store seeded with the given tuple; brand and manufacturer
    /// start out as the generic host values.
    #[must_use]
    pub fn new(initial: BuildIdentity) -> Self {
        Self {
            inner: RwLock::new(Fields {
                brand: "generic".to_string(),
                manufacturer: "unknown".to_string(),
                device: initial.device,
                product: initial.product,
                model: initial.model,
                fingerprint: initial.fingerprint,
            }),
        }
    }

    /// A store seeded from compile-time host facts. Used by the platform
    /// factory when no native identity exists.
    #[must_use]
    pub fn host_defaults() -> Self {
        let os = std::env::consts::OS;
        let arch = std::env::consts::ARCH;
        Self::new(BuildIdentity::new(
            os,
            format!("{os}_{arch}"),
            "host",
            format!("generic/{os}/{arch}:0/unsigned"),
        ))
    }

    /// Read one field. Test and host convenience; the engine itself only
    /// goes through [`IdentityWriter`].
    #[must_use]
    pub fn get(&self, field: BuildField) -> String {
        let Ok(fields) = self.inner.read() else {
            return String::new();
        };
        match field {
            BuildField::Brand => fields.brand.clone(),
            BuildField::Manufacturer => fields.manufacturer.clone(),
            BuildField::Device => fields.device.clone(),
            BuildField::Product => fields.product.clone(),
            BuildField::Model => fields.model.clone(),
            BuildField::Fingerprint => fields.fingerprint.clone(),
        }
    }
}

impl IdentityWriter for SoftwareIdentity {
    fn set_field(&self, field: BuildField, value: &str) -> Result<(), GuiseError> {
        let mut fields = self
            .inner
            .write()
            .map_err(|_| GuiseError::IdentityUnavailable {
                reason: "identity store lock poisoned".to_string(),
            })?;
        let slot = match field {
            BuildField::Brand => &mut fields.brand,
            BuildField::Manufacturer => &mut fields.manufacturer,
            BuildField::Device => &mut fields.device,
            BuildField::Product => &mut fields.product,
            BuildField::Model => &mut fields.model,
            BuildField::Fingerprint => &mut fields.fingerprint,
        };
        *slot = value.to_string();
        Ok(())
    }

    fn snapshot(&self) -> Result<BuildIdentity, GuiseError> {
        let fields = self
            .inner
            .read()
            .map_err(|_| GuiseError::IdentityUnavailable {
                reason: "identity store lock poisoned".to_string(),
            })?;
        Ok(BuildIdentity::new(
            fields.device.clone(),
            fields.product.clone(),
            fields.model.clone(),
            fields.fingerprint.clone(),
        ))
    }
}
