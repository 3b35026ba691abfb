//! End-to-end hook flows through the public engine API.

use std::sync::Arc;

use guise_core::{
    BuildField, BuildIdentity, GuiseConfig, GuiseEngine, SoftwareIdentity, StaticInspector,
    ThreadScheduler,
};

const ATTESTATION_FRAME: &str = "com.google.android.gms.droidguard.DroidGuardChimeraService";
const PACKAGE_GMS: &str = "com.google.android.gms";
const PROCESS_GMS_UNSTABLE: &str = "com.google.android.gms.unstable";

fn real_identity() -> BuildIdentity {
    BuildIdentity::new(
        "sailfish",
        "sailfish",
        "Pixel",
        "google/sailfish/sailfish:10/QP1A/release-keys",
    )
}

fn make_engine(config: GuiseConfig, frames: &[&str]) -> (GuiseEngine, Arc<SoftwareIdentity>) {
    let store = Arc::new(SoftwareIdentity::new(real_identity()));
    let engine = GuiseEngine::with_parts(
        config,
        store.clone(),
        Arc::new(StaticInspector::with_frames(frames)),
        Arc::new(ThreadScheduler),
    )
    .expect("engine construction");
    (engine, store)
}

fn tuple(store: &SoftwareIdentity) -> [String; 4] {
    [
        store.get(BuildField::Device),
        store.get(BuildField::Product),
        store.get(BuildField::Model),
        store.get(BuildField::Fingerprint),
    ]
}

#[test]
fn identity_resolution_is_applied_at_most_once() {
    let (engine, store) = make_engine(GuiseConfig::default(), &[]);

    engine.on_process_identity("com.snapchat.android", "com.snapchat.android");
    let after_first = tuple(&store);
    assert_eq!(after_first[2], "Pixel XL");

    // A second resolution with different arguments changes nothing.
    engine.on_process_identity("com.google.ar.core", "com.google.ar.core");
    assert_eq!(tuple(&store), after_first);
}

#[test]
fn arcore_stock_fingerprint_leaves_rest_of_tuple() {
    let config = GuiseConfig::from_json_str(
        r#"{"stock_fingerprint": "google/walleye/walleye:8.1.0/OPM1/stock-keys"}"#,
    );
    let (engine, store) = make_engine(config, &[]);
    engine.on_process_identity("com.google.ar.core", "com.google.ar.core");

    let real = real_identity();
    assert_eq!(store.get(BuildField::Device), real.device);
    assert_eq!(store.get(BuildField::Product), real.product);
    assert_eq!(store.get(BuildField::Model), real.model);
    assert_eq!(
        store.get(BuildField::Fingerprint),
        "google/walleye/walleye:8.1.0/OPM1/stock-keys"
    );
}

#[test]
fn certificate_chain_rejection_is_an_unsupported_operation() {
    let (engine, _) = make_engine(GuiseConfig::default(), &[]);
    engine.on_process_identity("com.android.vending", "com.android.vending");

    let err = engine
        .on_certificate_chain_requested()
        .expect_err("vending must be rejected");
    assert!(err.is_attestation_block());

    // Hard failure, not state: a second request rejects identically.
    assert!(engine.on_certificate_chain_requested().is_err());
}

#[test]
fn attestation_stack_rejection_is_independent_of_store_flag() {
    let (engine, _) = make_engine(GuiseConfig::default(), &[ATTESTATION_FRAME]);
    engine.on_process_identity(PACKAGE_GMS, PROCESS_GMS_UNSTABLE);

    assert!(!engine.classification().is_vending);
    assert!(engine.on_certificate_chain_requested().is_err());
}

#[test]
fn feature_query_suppression_is_photos_only() {
    let config = GuiseConfig::from_json_str(r#"{"spoof_photos": true}"#);
    let (engine, _) = make_engine(config, &[]);
    engine.on_process_identity(
        "com.google.android.apps.photos",
        "com.google.android.apps.photos",
    );

    assert!(!engine.on_system_feature_query("PIXEL_2019_PRELOAD", true));
    assert!(!engine.on_system_feature_query("PIXEL_2019_PRELOAD", false));
    assert!(engine.on_system_feature_query("android.software.webview", true));

    // Same query from any other classification passes through.
    let (other, _) = make_engine(GuiseConfig::default(), &[]);
    other.on_process_identity("com.example.app", "com.example.app");
    assert!(other.on_system_feature_query("PIXEL_2019_PRELOAD", true));
}
