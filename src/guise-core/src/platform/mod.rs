//! Platform-specific identity writers.
//!
//! Each platform overwrites the build identity its own way:
//! - Android: static fields on `android.os.Build` via JNI
//! - Everything else: the in-memory software store

#[cfg(target_os = "android")]
pub mod android;

mod factory;

pub use factory::create_identity_writer;

#[cfg(target_os = "android")]
pub use android::{init_java_vm, BuildClassWriter};
