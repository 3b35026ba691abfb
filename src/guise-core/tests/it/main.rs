//! Consolidated integration tests for guise-core.
//!
//! One external test binary instead of several: the timed patch-window
//! tests and the property tests share a process so the suite cannot
//! deadlock on parallel external binaries.

mod engine;
mod patch_window;
