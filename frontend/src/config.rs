use log::Level;

/// Fraction of the host element that must be on screen before a counter starts.
pub const VISIBILITY_THRESHOLD: f64 = 0.3;

pub const COUNT_UP_DURATION_MS: u32 = 2000;

/// Largest image the upload pipeline will encode into a data URL (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug  // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}
