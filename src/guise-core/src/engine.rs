//! The spoofing engine.
//!
//! One `GuiseEngine` lives per process and owns every collaborator: the
//! profile configuration, the identity writer, the caller inspector, the
//! property patcher, and the patch window. The host runtime forwards its
//! four hook points here; everything else is internal.
//!
//! ## Failure posture
//!
//! Every degradation path favors "no spoofing" over surfacing an error.
//! The single deliberate failure the engine ever hands back is the
//! attestation rejection; that one is the feature.

use std::sync::{Arc, Once, OnceLock};

use tracing::{debug, error, info, warn};

use crate::classify::{
    classify, ClassificationFlags, ProcessContext, PACKAGE_ARCORE, PACKAGE_SNAPCHAT,
};
use crate::config::GuiseConfig;
use crate::error::GuiseError;
use crate::feature;
use crate::inspector::{is_attestation_stack, BacktraceInspector, CallerInspector};
use crate::patcher::PropertyPatcher;
use crate::profile::{pixel_xl, BuildIdentity, SpoofProfile};
use crate::timer::{Scheduler, ThreadScheduler};
use crate::window::{Effect, PatchWindow};
use crate::writer::IdentityWriter;

/// The identity-spoofing decision engine.
pub struct GuiseEngine {
    config: GuiseConfig,
    inspector: Arc<dyn CallerInspector>,
    patcher: PropertyPatcher,
    /// Resolved once per process lifetime; the winning resolution is final.
    context: OnceLock<ProcessContext>,
    flags: OnceLock<ClassificationFlags>,
    /// The real tuple, captured before any patch. Revert target only.
    original: BuildIdentity,
    /// Present only when a certified tuple is configured.
    window: Option<Arc<PatchWindow>>,
    window_unconfigured: Once,
}

impl GuiseEngine {
    /// Create an engine with default configuration and platform defaults.
    pub fn new() -> Result<Self, GuiseError> {
        Self::with_config(GuiseConfig::default())
    }

    /// Create an engine with the given configuration and platform defaults:
    /// the native identity writer, the backtrace inspector, and the thread
    /// scheduler.
    pub fn with_config(config: GuiseConfig) -> Result<Self, GuiseError> {
        Self::with_parts(
            config,
            crate::platform::create_identity_writer(),
            Arc::new(BacktraceInspector),
            Arc::new(ThreadScheduler),
        )
    }

    /// Create an engine from explicit capabilities.
    ///
    /// This is the dependency-injection seam: tests hand in a software
    /// identity, a scripted inspector, and a manual scheduler.
    pub fn with_parts(
        config: GuiseConfig,
        writer: Arc<dyn IdentityWriter>,
        inspector: Arc<dyn CallerInspector>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, GuiseError> {
        let original = writer.snapshot()?;
        let patcher = PropertyPatcher::new(writer);

        info!(
            enabled = config.enabled,
            stock_fingerprint = config.stock_fingerprint().is_some(),
            certified = config.certified.is_some(),
            spoof_photos = config.spoof_photos,
            patch_window_ms = config.patch_window_ms,
            device = %original.device,
            "GuiseEngine: starting"
        );

        let window = config.certified_identity().map(|certified| {
            let on_patch: Effect = {
                let patcher = patcher.clone();
                Arc::new(move || patcher.apply_identity("certified", &certified))
            };
            let on_revert: Effect = {
                let patcher = patcher.clone();
                let original = original.clone();
                Arc::new(move || patcher.apply_identity("original", &original))
            };
            PatchWindow::new(scheduler, config.patch_window(), on_patch, on_revert)
        });

        Ok(Self {
            config,
            inspector,
            patcher,
            context: OnceLock::new(),
            flags: OnceLock::new(),
            original,
            window,
            window_unconfigured: Once::new(),
        })
    }

    /// The cached classification, all-false until identity resolution.
    #[must_use]
    pub fn classification(&self) -> ClassificationFlags {
        self.flags.get().copied().unwrap_or_default()
    }

    /// The real tuple captured at construction.
    #[must_use]
    pub fn original_identity(&self) -> &BuildIdentity {
        &self.original
    }

    /// Whether the current call comes from the attestation helper inside
    /// the integrity-verification process. Evaluated fresh on every call;
    /// the stack differs per call and is never cached.
    #[must_use]
    pub fn is_attestation_caller(&self) -> bool {
        self.classification().is_gms_unstable && is_attestation_stack(self.inspector.as_ref())
    }

    /// Process-identity hook. Called once, early; later calls and the
    /// losers of a concurrent race are no-ops, so at most one profile is
    /// ever applied per process lifetime.
    pub fn on_process_identity(&self, package: &str, process: &str) {
        if !self.config.enabled {
            return;
        }
        if self.context.get().is_some() {
            debug!("process identity already resolved");
            return;
        }
        let ctx = match ProcessContext::new(package, process) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!(error = %e, "skipping spoofing for this process");
                return;
            }
        };
        let flags = classify(&ctx, self.config.spoof_photos);
        let package = ctx.package.clone();
        if self.context.set(ctx).is_err() {
            // Lost the race; the winner applies the profile.
            return;
        }
        let _ = self.flags.set(flags);

        self.apply_spoof_for(&package, flags);
    }

    /// Spoof selection, in fixed priority order. At most one profile.
    fn apply_spoof_for(&self, package: &str, flags: ClassificationFlags) {
        match self.config.stock_fingerprint() {
            Some(stock_fp) if package == PACKAGE_ARCORE => {
                info!(package, "applying stock fingerprint");
                self.patcher
                    .apply(&SpoofProfile::fingerprint_only("stock-fingerprint", stock_fp));
            }
            _ if flags.is_photos || package == PACKAGE_SNAPCHAT => {
                info!(package, "applying Pixel XL identity");
                self.patcher.apply(&pixel_xl());
            }
            _ => {}
        }
    }

    /// Security-service lookup hook. The service type and algorithm are
    /// deliberately ignored; only classifier state and the live stack
    /// matter.
    pub fn on_security_service_lookup(&self, _service_type: &str, _algorithm: &str) {
        if !self.is_attestation_caller() {
            return;
        }
        match &self.window {
            Some(window) => window.trigger(),
            None => {
                self.window_unconfigured.call_once(|| {
                    warn!("certified tuple not configured, patch window stays inert");
                });
            }
        }
    }

    /// Certificate-chain hook. The one deliberate, host-visible failure:
    /// rejects when the call stack belongs to the attestation helper or the
    /// process is the Play Store.
    pub fn on_certificate_chain_requested(&self) -> Result<(), GuiseError> {
        let flags = self.classification();
        if self.is_attestation_caller() || flags.is_vending {
            info!(
                gms_unstable = flags.is_gms_unstable,
                vending = flags.is_vending,
                "blocking key attestation"
            );
            return Err(GuiseError::AttestationBlocked);
        }
        Ok(())
    }

    /// System-feature hook. Pure filter over the blacklist for the Photos
    /// target; every other caller sees the real answer.
    #[must_use]
    pub fn on_system_feature_query(&self, name: &str, present: bool) -> bool {
        feature::filter(self.classification().is_photos, name, present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{PACKAGE_GMS, PACKAGE_GPHOTOS, PACKAGE_VENDING, PROCESS_GMS_UNSTABLE};
    use crate::inspector::StaticInspector;
    use crate::profile::BuildField;
    use crate::software::SoftwareIdentity;

    const ATTESTATION_FRAME: &str = "com.google.android.gms.droidguard.DroidGuardChimeraService";

    fn real_identity() -> BuildIdentity {
        BuildIdentity::new(
            "sailfish",
            "sailfish",
            "Pixel",
            "google/sailfish/sailfish:10/fp",
        )
    }

    fn make_engine(
        config: GuiseConfig,
        frames: &[&str],
    ) -> (GuiseEngine, Arc<SoftwareIdentity>) {
        let store = Arc::new(SoftwareIdentity::new(real_identity()));
        let engine = GuiseEngine::with_parts(
            config,
            store.clone(),
            Arc::new(StaticInspector::with_frames(frames)),
            Arc::new(ThreadScheduler),
        )
        .unwrap();
        (engine, store)
    }

    #[test]
    fn test_disabled_engine_never_classifies() {
        let config = GuiseConfig {
            enabled: false,
            spoof_photos: true,
            ..GuiseConfig::default()
        };
        let (engine, store) = make_engine(config, &[]);
        engine.on_process_identity(PACKAGE_GPHOTOS, PACKAGE_GPHOTOS);

        assert_eq!(engine.classification(), ClassificationFlags::default());
        assert_eq!(store.get(BuildField::Model), "Pixel");
    }

    #[test]
    fn test_empty_identity_aborts_spoofing() {
        let (engine, store) = make_engine(GuiseConfig::default(), &[]);
        engine.on_process_identity("", "proc");
        engine.on_process_identity("pkg", "");

        assert_eq!(engine.classification(), ClassificationFlags::default());
        assert_eq!(store.get(BuildField::Model), "Pixel");
    }

    #[test]
    fn test_arcore_gets_fingerprint_only() {
        let config = GuiseConfig {
            stock_fingerprint: "google/walleye/walleye:8.1.0/stock".to_string(),
            ..GuiseConfig::default()
        };
        let (engine, store) = make_engine(config, &[]);
        engine.on_process_identity(PACKAGE_ARCORE, PACKAGE_ARCORE);

        assert_eq!(
            store.get(BuildField::Fingerprint),
            "google/walleye/walleye:8.1.0/stock"
        );
        // The rest of the tuple keeps the real values.
        assert_eq!(store.get(BuildField::Device), "sailfish");
        assert_eq!(store.get(BuildField::Model), "Pixel");
    }

    #[test]
    fn test_arcore_without_stock_fingerprint_is_untouched() {
        let (engine, store) = make_engine(GuiseConfig::default(), &[]);
        engine.on_process_identity(PACKAGE_ARCORE, PACKAGE_ARCORE);
        assert_eq!(store.get(BuildField::Fingerprint), real_identity().fingerprint);
    }

    #[test]
    fn test_snapchat_gets_full_pixel_xl() {
        let (engine, store) = make_engine(GuiseConfig::default(), &[]);
        engine.on_process_identity(PACKAGE_SNAPCHAT, PACKAGE_SNAPCHAT);

        assert_eq!(store.get(BuildField::Device), "marlin");
        assert_eq!(store.get(BuildField::Product), "marlin");
        assert_eq!(store.get(BuildField::Model), "Pixel XL");
        assert_eq!(store.get(BuildField::Brand), "google");
        assert_eq!(store.get(BuildField::Manufacturer), "Google");
    }

    #[test]
    fn test_photos_spoof_requires_config() {
        let (engine, store) = make_engine(GuiseConfig::default(), &[]);
        engine.on_process_identity(PACKAGE_GPHOTOS, PACKAGE_GPHOTOS);
        assert_eq!(store.get(BuildField::Model), "Pixel");

        let config = GuiseConfig {
            spoof_photos: true,
            ..GuiseConfig::default()
        };
        let (engine, store) = make_engine(config, &[]);
        engine.on_process_identity(PACKAGE_GPHOTOS, PACKAGE_GPHOTOS);
        assert_eq!(store.get(BuildField::Model), "Pixel XL");
        assert!(engine.classification().is_photos);
    }

    #[test]
    fn test_second_identity_call_is_a_noop() {
        let (engine, store) = make_engine(GuiseConfig::default(), &[]);
        engine.on_process_identity("com.example.app", "com.example.app");
        engine.on_process_identity(PACKAGE_SNAPCHAT, PACKAGE_SNAPCHAT);

        // The second call must not reclassify or apply the Pixel XL set.
        assert_eq!(store.get(BuildField::Model), "Pixel");
        assert_eq!(
            engine.context.get().unwrap().package,
            "com.example.app"
        );
    }

    #[test]
    fn test_attestation_caller_needs_flags_and_stack() {
        let (engine, _) = make_engine(GuiseConfig::default(), &[ATTESTATION_FRAME]);
        // Stack marker present but process not classified yet.
        assert!(!engine.is_attestation_caller());

        engine.on_process_identity(PACKAGE_GMS, PROCESS_GMS_UNSTABLE);
        assert!(engine.is_attestation_caller());

        let (engine, _) = make_engine(GuiseConfig::default(), &["plain.Frame"]);
        engine.on_process_identity(PACKAGE_GMS, PROCESS_GMS_UNSTABLE);
        assert!(!engine.is_attestation_caller());
    }

    #[test]
    fn test_certificate_chain_gate() {
        // Play Store: blocked regardless of the stack.
        let (engine, _) = make_engine(GuiseConfig::default(), &[]);
        engine.on_process_identity(PACKAGE_VENDING, PACKAGE_VENDING);
        let err = engine.on_certificate_chain_requested().unwrap_err();
        assert!(err.is_attestation_block());

        // Attestation stack in the verification process: blocked.
        let (engine, _) = make_engine(GuiseConfig::default(), &[ATTESTATION_FRAME]);
        engine.on_process_identity(PACKAGE_GMS, PROCESS_GMS_UNSTABLE);
        assert!(engine.on_certificate_chain_requested().is_err());

        // Anyone else: allowed.
        let (engine, _) = make_engine(GuiseConfig::default(), &[ATTESTATION_FRAME]);
        engine.on_process_identity("com.example.app", "com.example.app");
        assert!(engine.on_certificate_chain_requested().is_ok());
    }

    #[test]
    fn test_feature_query_filters_only_for_photos() {
        let config = GuiseConfig {
            spoof_photos: true,
            ..GuiseConfig::default()
        };
        let (engine, _) = make_engine(config, &[]);
        engine.on_process_identity(PACKAGE_GPHOTOS, PACKAGE_GPHOTOS);

        assert!(!engine.on_system_feature_query("PIXEL_2019_PRELOAD", true));
        assert!(engine.on_system_feature_query("android.hardware.camera", true));
        assert!(!engine.on_system_feature_query("PIXEL_2019_PRELOAD", false));
    }

    #[test]
    fn test_lookup_without_certified_tuple_is_inert() {
        let (engine, store) = make_engine(GuiseConfig::default(), &[ATTESTATION_FRAME]);
        engine.on_process_identity(PACKAGE_GMS, PROCESS_GMS_UNSTABLE);
        engine.on_security_service_lookup("KeyStore", "AndroidKeyStore");

        assert_eq!(store.get(BuildField::Device), "sailfish");
    }

    #[test]
    fn test_lookup_from_plain_caller_never_triggers_window() {
        let config = GuiseConfig {
            certified: Some([
                "walleye".to_string(),
                "walleye".to_string(),
                "Pixel 2".to_string(),
                "google/walleye/fp".to_string(),
            ]),
            ..GuiseConfig::default()
        };
        let (engine, store) = make_engine(config, &["plain.Frame"]);
        engine.on_process_identity(PACKAGE_GMS, PROCESS_GMS_UNSTABLE);
        engine.on_security_service_lookup("KeyStore", "AndroidKeyStore");

        assert_eq!(store.get(BuildField::Device), "sailfish");
    }
}
