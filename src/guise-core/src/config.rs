//! Configuration for the spoofing engine.
//!
//! Configuration is supplied by the system image (how it is delivered is the
//! host's business); this module only gives it a shape and a safe fallback.
//! A missing or malformed document degrades to "no spoofing" rather than
//! erroring; the engine must never take its host process down over config.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::profile::BuildIdentity;

/// Default patch-window duration in milliseconds.
pub const DEFAULT_PATCH_WINDOW_MS: u64 = 2000;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiseConfig {
    /// Global kill switch. When false the coordinator never classifies and
    /// never applies a profile.
    pub enabled: bool,
    /// Stock build fingerprint applied to the AR runtime package. Empty
    /// string means the feature is off.
    pub stock_fingerprint: String,
    /// Certified device/product/model/fingerprint tuple for the patch
    /// window. Absent means the patch window stays inert.
    pub certified: Option<[String; 4]>,
    /// Whether the Photos package gets the full Pixel XL identity.
    pub spoof_photos: bool,
    /// Patch-window duration in milliseconds.
    pub patch_window_ms: u64,
}

impl Default for GuiseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stock_fingerprint: String::new(),
            certified: None,
            spoof_photos: false,
            patch_window_ms: DEFAULT_PATCH_WINDOW_MS,
        }
    }
}

impl GuiseConfig {
    /// Parse a configuration document, degrading to defaults on any error.
    ///
    /// The single warning here is the only trace a malformed document
    /// leaves; the returned configuration is always usable.
    #[must_use]
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "rejecting malformed configuration, spoofing disabled");
                Self::default()
            }
        }
    }

    /// The stock fingerprint, or `None` when the feature is off.
    #[must_use]
    pub fn stock_fingerprint(&self) -> Option<&str> {
        if self.stock_fingerprint.is_empty() {
            None
        } else {
            Some(&self.stock_fingerprint)
        }
    }

    /// The certified tuple as a [`BuildIdentity`], if configured.
    #[must_use]
    pub fn certified_identity(&self) -> Option<BuildIdentity> {
        self.certified
            .as_ref()
            .map(|tuple| BuildIdentity::from_tuple(tuple.clone()))
    }

    /// The patch-window duration.
    #[must_use]
    pub fn patch_window(&self) -> Duration {
        Duration::from_millis(self.patch_window_ms)
    }
}
