//! Call-stack inspection.
//!
//! The attestation gate and the patch window both need to know whether the
//! current call originated inside the on-device attestation helper. That is
//! a point-in-time question about the live call stack, so the
//! [`CallerInspector`] capability is queried fresh on every call and its
//! answer is never cached.

use std::backtrace::Backtrace;

/// Frame substring that marks the on-device attestation helper.
pub const ATTESTATION_FRAME_MARKER: &str = "DroidGuard";

/// Read access to the current call stack.
pub trait CallerInspector: Send + Sync {
    /// The visible frames of the current call, innermost first. One string
    /// per frame, in whatever rendering the platform provides.
    fn frames(&self) -> Vec<String>;
}

/// True iff any visible frame belongs to the attestation helper.
#[must_use]
pub fn is_attestation_stack(inspector: &dyn CallerInspector) -> bool {
    inspector
        .frames()
        .iter()
        .any(|frame| frame.contains(ATTESTATION_FRAME_MARKER))
}

/// Inspector over the native backtrace of the calling thread.
#[derive(Debug, Default)]
pub struct BacktraceInspector;

impl CallerInspector for BacktraceInspector {
    fn frames(&self) -> Vec<String> {
        Backtrace::force_capture()
            .to_string()
            .lines()
            .map(|line| line.trim().to_string())
            .collect()
    }
}

/// Inspector that answers with a fixed set of frames.
///
/// The inert default for hosts that cannot expose a stack, and the scripted
/// answer every state-machine test uses.
#[derive(Debug, Default)]
pub struct StaticInspector {
    frames: Vec<String>,
}

impl StaticInspector {
    /// An inspector that sees no frames at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An inspector that always reports the given frames.
    #[must_use]
    pub fn with_frames(frames: &[&str]) -> Self {
        Self {
            frames: frames.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

impl CallerInspector for StaticInspector {
    fn frames(&self) -> Vec<String> {
        self.frames.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_anywhere_in_a_frame_matches() {
        let inspector = StaticInspector::with_frames(&[
            "java.security.Security.getProviders",
            "com.google.android.gms.droidguard.DroidGuardService.onRequest",
        ]);
        assert!(is_attestation_stack(&inspector));
    }

    #[test]
    fn test_clean_stack_does_not_match() {
        let inspector = StaticInspector::with_frames(&[
            "com.example.app.MainActivity.onCreate",
            "android.app.ActivityThread.main",
        ]);
        assert!(!is_attestation_stack(&inspector));
    }

    #[test]
    fn test_empty_inspector_is_inert() {
        assert!(!is_attestation_stack(&StaticInspector::empty()));
    }

    #[test]
    fn test_backtrace_inspector_yields_frames() {
        let frames = BacktraceInspector.frames();
        // Backtraces may be disabled in some environments; when captured at
        // all there is at least the capture frame itself.
        if !frames.is_empty() {
            assert!(frames.iter().any(|f| !f.is_empty()));
        }
    }
}
