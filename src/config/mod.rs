//! Configuration management for screen-profiles
//!
//! This module provides two documents:
//! - **settings**: user settings (log level, poll interval, backend commands)
//! - **profile**: the profile store, saved layouts keyed by name

pub mod profile;
pub mod settings;

pub use profile::{Backend, Profile, ProfileStore};
pub use settings::Settings;

/// Fresh, empty directory for a test
#[cfg(test)]
pub(crate) fn test_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("screen-profiles-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
