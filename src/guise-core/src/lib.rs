//! # guise-core
//!
//! Build-identity presentation engine for a modified system image: presents
//! a substitute device identity to fingerprint-sensitive applications,
//! gates key attestation for integrity-verification flows, and runs the
//! timed patch window that temporarily restores certified properties while
//! such a flow is active.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         GuiseEngine                          │
//! │                                                              │
//! │  ┌──────────────┐  ┌────────────────┐  ┌─────────────────┐  │
//! │  │  GuiseConfig │  │ CallerInspector│  │ IdentityWriter  │  │
//! │  │ (profiles)   │  │ (live stack)   │  │ (per platform)  │  │
//! │  └──────────────┘  └────────────────┘  └─────────────────┘  │
//! │          │                  │                   │            │
//! │          ▼                  ▼                   ▼            │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │        classification + spoof selection (once)       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │          │                                   │               │
//! │          ▼                                   ▼               │
//! │  ┌────────────────────┐          ┌────────────────────────┐ │
//! │  │  attestation gate  │          │  PatchWindow (timed,   │ │
//! │  │  feature filter    │          │  debounced revert)     │ │
//! │  └────────────────────┘          └────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Posture
//!
//! - **Fail-inert**: misconfiguration and invalid identity degrade to "no
//!   spoofing"; the engine never crashes its host process
//! - **Write-once classification**: process identity is resolved once and
//!   read lock-free everywhere after
//! - **One serialized window**: the patch window is the only mutable shared
//!   state, and every mutation goes through its single mutex

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod inspector;
pub mod patcher;
pub mod platform;
pub mod profile;
pub mod software;
pub mod timer;
pub mod window;
pub mod writer;

pub use classify::{classify, ClassificationFlags, ProcessContext};
pub use config::GuiseConfig;
pub use engine::GuiseEngine;
pub use error::GuiseError;
pub use feature::FEATURE_BLACKLIST;
pub use inspector::{
    is_attestation_stack, BacktraceInspector, CallerInspector, StaticInspector,
};
pub use patcher::PropertyPatcher;
pub use profile::{pixel_xl, BuildField, BuildIdentity, SpoofProfile};
pub use software::SoftwareIdentity;
pub use timer::{Scheduler, ThreadScheduler, TimerCallback, TimerHandle};
pub use window::{PatchWindow, WindowState};
pub use writer::IdentityWriter;
