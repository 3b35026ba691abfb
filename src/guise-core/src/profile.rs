//! Spoof profiles and the overridable build-identity fields.
//!
//! A [`SpoofProfile`] is a named, immutable set of substitute values for the
//! process-global build identity. Profiles are either built in (the Pixel XL
//! set) or supplied by device configuration (the certified tuple, the stock
//! fingerprint).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The build-identity fields Guise is allowed to overwrite.
///
/// Names match the static fields on `android.os.Build`; the identity writer
/// uses them verbatim and so do log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildField {
    /// `Build.BRAND`
    Brand,
    /// `Build.MANUFACTURER`
    Manufacturer,
    /// `Build.DEVICE`
    Device,
    /// `Build.PRODUCT`
    Product,
    /// `Build.MODEL`
    Model,
    /// `Build.FINGERPRINT`
    Fingerprint,
}

impl BuildField {
    /// The field name as declared on `android.os.Build`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Brand => "BRAND",
            Self::Manufacturer => "MANUFACTURER",
            Self::Device => "DEVICE",
            Self::Product => "PRODUCT",
            Self::Model => "MODEL",
            Self::Fingerprint => "FINGERPRINT",
        }
    }
}

impl fmt::Display for BuildField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered device/product/model/fingerprint tuple.
///
/// This is the shape of both the certified tuple from configuration and the
/// original identity snapshotted at engine construction. The original
/// snapshot is never overwritten by a spoof; it is only the revert target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIdentity {
    /// Device codename (`Build.DEVICE`).
    pub device: String,
    /// Product name (`Build.PRODUCT`).
    pub product: String,
    /// Marketing model (`Build.MODEL`).
    pub model: String,
    /// Full build fingerprint (`Build.FINGERPRINT`).
    pub fingerprint: String,
}

impl BuildIdentity {
    /// Create an identity from the four fields.
    #[must_use]
    pub fn new(
        device: impl Into<String>,
        product: impl Into<String>,
        model: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            product: product.into(),
            model: model.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Build an identity from a device/product/model/fingerprint tuple.
    #[must_use]
    pub fn from_tuple(tuple: [String; 4]) -> Self {
        let [device, product, model, fingerprint] = tuple;
        Self {
            device,
            product,
            model,
            fingerprint,
        }
    }
}

/// A named set of substitute build-identity values.
///
/// Only the fields that are present are applied; absent fields leave the
/// real value untouched. Immutable after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoofProfile {
    /// Profile name, used in log lines only.
    pub name: String,
    /// Substitute for `Build.BRAND`, if any.
    pub brand: Option<String>,
    /// Substitute for `Build.MANUFACTURER`, if any.
    pub manufacturer: Option<String>,
    /// Substitute for `Build.DEVICE`, if any.
    pub device: Option<String>,
    /// Substitute for `Build.PRODUCT`, if any.
    pub product: Option<String>,
    /// Substitute for `Build.MODEL`, if any.
    pub model: Option<String>,
    /// Substitute for `Build.FINGERPRINT`, if any.
    pub fingerprint: Option<String>,
}

impl SpoofProfile {
    /// A profile overriding only the fingerprint field.
    #[must_use]
    pub fn fingerprint_only(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fingerprint: Some(fingerprint.into()),
            ..Self::default()
        }
    }

    /// A profile overriding the full device/product/model/fingerprint tuple.
    #[must_use]
    pub fn from_identity(name: impl Into<String>, identity: &BuildIdentity) -> Self {
        Self {
            name: name.into(),
            device: Some(identity.device.clone()),
            product: Some(identity.product.clone()),
            model: Some(identity.model.clone()),
            fingerprint: Some(identity.fingerprint.clone()),
            ..Self::default()
        }
    }

    /// The present fields in fixed application order.
    #[must_use]
    pub fn fields(&self) -> Vec<(BuildField, &str)> {
        let mut out = Vec::with_capacity(6);
        let pairs = [
            (BuildField::Brand, &self.brand),
            (BuildField::Manufacturer, &self.manufacturer),
            (BuildField::Device, &self.device),
            (BuildField::Product, &self.product),
            (BuildField::Model, &self.model),
            (BuildField::Fingerprint, &self.fingerprint),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                out.push((field, value.as_str()));
            }
        }
        out
    }

    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// The built-in Pixel XL identity applied to full-spoof targets.
#[must_use]
pub fn pixel_xl() -> SpoofProfile {
    SpoofProfile {
        name: "pixel-xl".to_string(),
        brand: Some("google".to_string()),
        manufacturer: Some("Google".to_string()),
        device: Some("marlin".to_string()),
        product: Some("marlin".to_string()),
        model: Some("Pixel XL".to_string()),
        fingerprint: Some(
            "google/marlin/marlin:10/QP1A.191005.007.A3/5972272:user/release-keys".to_string(),
        ),
    }
}
