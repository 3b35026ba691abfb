//! # guise-ffi
//!
//! C-compatible FFI surface for the Guise engine.
//!
//! The host runtime loads this library early in process lifetime, creates
//! one handle per process, and forwards its hook points:
//!
//! ```c
//! GuiseHandle* handle = guise_init(config_json);
//! guise_on_process_identity(handle, package_name, process_name);
//! ...
//! if (guise_on_certificate_chain(handle) != 0) {
//!     /* raise the platform's unsupported-operation failure */
//! }
//! ...
//! bool present = guise_has_system_feature(handle, feature_name, real_answer);
//! guise_destroy(handle);
//! ```
//!
//! All functions are null-safe; a null or invalid argument is reported via
//! the status code, never via a crash.

#![allow(clippy::missing_safety_doc)] // Safety contracts are documented per function

use std::ffi::{c_char, CStr};
use std::ptr;
use std::sync::Arc;

use guise_core::{GuiseConfig, GuiseEngine};

/// Opaque handle to one per-process engine instance.
#[repr(C)]
pub struct GuiseHandle {
    engine: Arc<GuiseEngine>,
}

/// Status codes returned by FFI functions.
#[repr(C)]
pub enum GuiseStatus {
    /// Success; for the certificate-chain hook, "allow".
    Ok = 0,
    /// Null or invalid argument.
    InvalidArgument = -1,
    /// Engine construction failed.
    InitializationFailed = -2,
    /// Attestation was rejected; the host raises its unsupported-operation
    /// failure.
    AttestationBlocked = -3,
}

/// Initialize platform logging once per process.
fn platform_log_init() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag("Guise"),
        );
    }
}

unsafe fn str_arg<'a>(raw: *const c_char) -> Option<&'a str> {
    if raw.is_null() {
        return None;
    }
    CStr::from_ptr(raw).to_str().ok()
}

/// Create the per-process engine.
///
/// `config_json` may be null for defaults; a malformed document degrades to
/// defaults as well. Returns null only when engine construction itself
/// fails.
///
/// # Safety
///
/// `config_json`, when non-null, must point to a valid NUL-terminated
/// string. The returned handle must be freed with [`guise_destroy`].
#[no_mangle]
pub unsafe extern "C" fn guise_init(config_json: *const c_char) -> *mut GuiseHandle {
    platform_log_init();

    let config = match str_arg(config_json) {
        Some(raw) => GuiseConfig::from_json_str(raw),
        None => GuiseConfig::default(),
    };

    match GuiseEngine::with_config(config) {
        Ok(engine) => Box::into_raw(Box::new(GuiseHandle {
            engine: Arc::new(engine),
        })),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize engine");
            ptr::null_mut()
        }
    }
}

/// Forward the process-identity hook. Call once, early.
///
/// # Safety
///
/// `handle` must come from [`guise_init`]; `package` and `process` must be
/// valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn guise_on_process_identity(
    handle: *mut GuiseHandle,
    package: *const c_char,
    process: *const c_char,
) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return GuiseStatus::InvalidArgument as i32;
    };
    let (Some(package), Some(process)) = (str_arg(package), str_arg(process)) else {
        return GuiseStatus::InvalidArgument as i32;
    };
    handle.engine.on_process_identity(package, process);
    GuiseStatus::Ok as i32
}

/// Forward a security-provider service lookup.
///
/// The service type and algorithm may be null; their content is ignored by
/// the engine anyway.
///
/// # Safety
///
/// `handle` must come from [`guise_init`]; non-null strings must be valid
/// and NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn guise_on_security_service_lookup(
    handle: *mut GuiseHandle,
    service_type: *const c_char,
    algorithm: *const c_char,
) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return GuiseStatus::InvalidArgument as i32;
    };
    let service_type = str_arg(service_type).unwrap_or("");
    let algorithm = str_arg(algorithm).unwrap_or("");
    handle
        .engine
        .on_security_service_lookup(service_type, algorithm);
    GuiseStatus::Ok as i32
}

/// Ask whether an attestation certificate chain may be produced.
///
/// Returns [`GuiseStatus::Ok`] to allow, [`GuiseStatus::AttestationBlocked`]
/// when the host must raise its unsupported-operation failure instead.
///
/// # Safety
///
/// `handle` must come from [`guise_init`].
#[no_mangle]
pub unsafe extern "C" fn guise_on_certificate_chain(handle: *mut GuiseHandle) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return GuiseStatus::InvalidArgument as i32;
    };
    match handle.engine.on_certificate_chain_requested() {
        Ok(()) => GuiseStatus::Ok as i32,
        Err(e) if e.is_attestation_block() => GuiseStatus::AttestationBlocked as i32,
        Err(_) => GuiseStatus::Ok as i32,
    }
}

/// Answer a system-feature query, possibly suppressing the real answer.
///
/// A null feature name returns `default_present` unchanged.
///
/// # Safety
///
/// `handle` must come from [`guise_init`]; `name`, when non-null, must be a
/// valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn guise_has_system_feature(
    handle: *mut GuiseHandle,
    name: *const c_char,
    default_present: bool,
) -> bool {
    let Some(handle) = handle.as_ref() else {
        return default_present;
    };
    let Some(name) = str_arg(name) else {
        return default_present;
    };
    handle.engine.on_system_feature_query(name, default_present)
}

/// Destroy a handle from [`guise_init`]. Null is a no-op.
///
/// # Safety
///
/// `handle` must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn guise_destroy(handle: *mut GuiseHandle) {
    if handle.is_null() {
        return;
    }
    drop(Box::from_raw(handle));
}
