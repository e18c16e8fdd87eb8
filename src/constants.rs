//! Application-wide constants
//!
//! Marker tokens, file names and defaults used throughout the application,
//! providing a single source of truth for constant values.

/// Configuration file locations
pub mod config {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "screen-profiles";

    /// Profile store document
    pub const PROFILES_FILENAME: &str = "profiles.json";

    /// User settings document
    pub const SETTINGS_FILENAME: &str = "config.json";
}

/// Tokens in xrandr's `--query` output
pub mod xrandr {
    /// Status token for an output with a display attached
    pub const CONNECTED: &str = "connected";

    /// Marks the primary output
    pub const PRIMARY: &str = "primary";

    /// Rotation tokens that may follow the geometry
    pub const ROTATIONS: [&str; 4] = ["normal", "left", "inverted", "right"];

    pub const PROGRAM: &str = "xrandr";
    pub const QUERY_ARG: &str = "--query";
}

/// Tokens in kscreen-doctor's output listing
pub mod kscreen {
    /// First token of every output line
    pub const OUTPUT_MARKER: &str = "Output:";

    pub const PROGRAM: &str = "kscreen-doctor";
    pub const OUTPUTS_ARG: &str = "--outputs";
}

/// Signature derivation
pub mod signature {
    /// Joins sorted display names; never appears in a connector name
    pub const DELIMITER: &str = "|";

    /// Hex characters kept from the digest
    pub const LENGTH: usize = 8;
}

/// Auto-switch polling
pub mod polling {
    /// Seconds between signature checks
    pub const DEFAULT_INTERVAL_SECS: u64 = 2;

    pub const MIN_INTERVAL_SECS: u64 = 1;

    /// Granularity of the stop-flag check while sleeping
    pub const STOP_CHECK_MS: u64 = 100;
}
