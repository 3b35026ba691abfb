//! System-feature filtering for the Photos spoof target.

use tracing::debug;

/// Feature names suppressed for the Photos target, matched as substrings.
pub const FEATURE_BLACKLIST: [&str; 8] = [
    "PIXEL_2017_PRELOAD",
    "PIXEL_2018_PRELOAD",
    "PIXEL_2019_MIDYEAR_PRELOAD",
    "PIXEL_2019_PRELOAD",
    "PIXEL_2020_EXPERIENCE",
    "PIXEL_2020_MIDYEAR_EXPERIENCE",
    "PIXEL_2021_EXPERIENCE",
    "PIXEL_2021_MIDYEAR_EXPERIENCE",
];

/// Answer a system-feature query.
///
/// Returns false only when the caller is the Photos target, the real
/// answer is true, and the feature name contains a blacklisted entry.
/// Everything else passes through unchanged.
#[must_use]
pub fn filter(is_photos: bool, name: &str, present: bool) -> bool {
    if is_photos && present && FEATURE_BLACKLIST.iter().any(|entry| name.contains(entry)) {
        debug!(feature = name, "suppressing system feature for spoofed process");
        return false;
    }
    present
}
