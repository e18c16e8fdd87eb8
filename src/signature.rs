//! Hardware signature of the connected display set

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::signature::{DELIMITER, LENGTH};
use crate::display::DisplayInventory;

/// Short hex digest identifying a set of connected displays.
///
/// Names from both backends are merged and sorted before hashing, so the
/// same displays give the same signature whichever backend reported them
/// and in whatever order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn of(inventory: &DisplayInventory) -> Self {
        let joined = inventory.all_sorted().join(DELIMITER);
        let digest = Sha256::digest(joined.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Self(hex[..LENGTH].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(xrandr: &[&str], kscreen: &[&str]) -> DisplayInventory {
        DisplayInventory {
            xrandr: xrandr.iter().map(|s| s.to_string()).collect(),
            kscreen: kscreen.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_fixed_length_hex() {
        let sig = Signature::of(&inventory(&["HDMI-1", "eDP-1"], &[]));
        assert_eq!(sig.as_str().len(), 8);
        assert!(sig.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_matches_digest_of_joined_names() {
        let sig = Signature::of(&inventory(&["eDP-1", "HDMI-1"], &[]));
        let digest = Sha256::digest(b"HDMI-1|eDP-1");
        let expected: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
        assert_eq!(sig.as_str(), expected);
    }

    #[test]
    fn test_independent_of_order_and_backend() {
        let a = Signature::of(&inventory(&["HDMI-1", "eDP-1"], &[]));
        let b = Signature::of(&inventory(&[], &["eDP-1", "HDMI-1"]));
        let c = Signature::of(&inventory(&["eDP-1"], &["HDMI-1"]));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_differs_for_different_displays() {
        let laptop = Signature::of(&inventory(&["eDP-1"], &[]));
        let docked = Signature::of(&inventory(&["eDP-1", "DP-1"], &[]));
        let projector = Signature::of(&inventory(&["eDP-1", "HDMI-1"], &[]));
        assert_ne!(laptop, docked);
        assert_ne!(docked, projector);
    }

    #[test]
    fn test_empty_inventory_is_stable() {
        let a = Signature::of(&DisplayInventory::default());
        let b = Signature::of(&DisplayInventory::default());
        assert_eq!(a, b);
        // sha256("") starts with e3b0c442
        assert_eq!(a.as_str(), "e3b0c442");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let sig = Signature::of(&inventory(&["DP-1"], &[]));
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}\"", sig));
    }
}
