//! Timed patch-window behavior through the public engine API.
//!
//! These tests run with a short window (80 ms) and real sleeps, the same
//! discipline the unit tests use. Margins are generous enough for a loaded
//! CI machine.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use guise_core::{
    BuildField, BuildIdentity, GuiseConfig, GuiseEngine, SoftwareIdentity, StaticInspector,
    ThreadScheduler,
};

const ATTESTATION_FRAME: &str = "com.google.android.gms.droidguard.DroidGuardChimeraService";
const WINDOW_MS: u64 = 80;

fn make_gms_engine(frames: &[&str]) -> (GuiseEngine, Arc<SoftwareIdentity>) {
    let config = GuiseConfig {
        certified: Some([
            "walleye".to_string(),
            "walleye".to_string(),
            "Pixel 2".to_string(),
            "google/walleye/walleye:8.1.0/certified".to_string(),
        ]),
        patch_window_ms: WINDOW_MS,
        ..GuiseConfig::default()
    };
    let store = Arc::new(SoftwareIdentity::new(BuildIdentity::new(
        "sailfish",
        "sailfish",
        "Pixel",
        "google/sailfish/sailfish:10/original",
    )));
    let engine = GuiseEngine::with_parts(
        config,
        store.clone(),
        Arc::new(StaticInspector::with_frames(frames)),
        Arc::new(ThreadScheduler),
    )
    .expect("engine construction");
    engine.on_process_identity("com.google.android.gms", "com.google.android.gms.unstable");
    (engine, store)
}

#[test]
fn single_lookup_patches_then_reverts() {
    let (engine, store) = make_gms_engine(&[ATTESTATION_FRAME]);

    engine.on_security_service_lookup("KeyStore", "AndroidKeyStore");

    // Certified tuple active immediately.
    assert_eq!(store.get(BuildField::Device), "walleye");
    assert_eq!(store.get(BuildField::Model), "Pixel 2");

    // After the window closes the original tuple is back.
    thread::sleep(Duration::from_millis(WINDOW_MS * 3));
    assert_eq!(store.get(BuildField::Device), "sailfish");
    assert_eq!(store.get(BuildField::Model), "Pixel");
    assert_eq!(
        store.get(BuildField::Fingerprint),
        "google/sailfish/sailfish:10/original"
    );
}

#[test]
fn rapid_lookups_rearm_instead_of_stacking() {
    let (engine, store) = make_gms_engine(&[ATTESTATION_FRAME]);

    engine.on_security_service_lookup("KeyStore", "AndroidKeyStore");
    thread::sleep(Duration::from_millis(WINDOW_MS / 2));
    engine.on_security_service_lookup("KeyStore", "AndroidCAStore");

    // Past the first trigger's deadline but inside the second's: still
    // certified, so the first timer was absorbed by the re-arm.
    thread::sleep(Duration::from_millis(WINDOW_MS / 2 + 20));
    assert_eq!(store.get(BuildField::Device), "walleye");

    // And one revert after the second deadline.
    thread::sleep(Duration::from_millis(WINDOW_MS * 3));
    assert_eq!(store.get(BuildField::Device), "sailfish");
}

#[test]
fn lookup_from_clean_stack_never_opens_the_window() {
    let (engine, store) = make_gms_engine(&["java.security.Security.getService"]);

    engine.on_security_service_lookup("KeyStore", "AndroidKeyStore");
    assert_eq!(store.get(BuildField::Device), "sailfish");

    thread::sleep(Duration::from_millis(WINDOW_MS * 2));
    assert_eq!(store.get(BuildField::Device), "sailfish");
}
