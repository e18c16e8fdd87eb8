//! Profile store
//!
//! Named layout snapshots, each tagged with the signature of the hardware
//! it was captured on. The whole store is one JSON document, loaded once
//! and rewritten in full on every save. Profiles keep insertion order,
//! which decides which profile wins when several share a signature.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::display::DisplayInventory;
use crate::signature::Signature;

/// Display tool a profile is captured with and restored through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Backend {
    Xrandr,
    KScreen,
    /// Value not understood by this version; kept verbatim
    Unknown(String),
}

impl From<String> for Backend {
    fn from(value: String) -> Self {
        match value.as_str() {
            "xrandr" => Backend::Xrandr,
            "kscreen" => Backend::KScreen,
            _ => Backend::Unknown(value),
        }
    }
}

impl From<Backend> for String {
    fn from(backend: Backend) -> Self {
        backend.to_string()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Xrandr => f.pad("xrandr"),
            Backend::KScreen => f.pad("kscreen"),
            Backend::Unknown(other) => f.pad(other),
        }
    }
}

/// A saved display layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub backend: Backend,
    /// Backend query output captured at save time
    pub raw_config: String,
    pub signature: Signature,
    #[serde(default)]
    pub inventory: DisplayInventory,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    profiles: Vec<Profile>,
}

#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: Vec<Profile>,
}

impl ProfileStore {
    pub fn default_path() -> PathBuf {
        crate::config::settings::config_dir().join(crate::constants::config::PROFILES_FILENAME)
    }

    /// Load from the per-user document
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load a store; a missing or corrupt document gives an empty store
    pub fn load_from(path: PathBuf) -> Self {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                info!(path = %path.display(), error = %e, "No profile store found, starting empty");
                return Self::empty(path);
            }
        };

        match serde_json::from_str::<ProfileDocument>(&contents) {
            Ok(document) => {
                info!(path = %path.display(), count = document.profiles.len(), "Loaded profiles");
                Self { path, profiles: document.profiles }
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Profile store is corrupt, starting empty"
                );
                Self::empty(path)
            }
        }
    }

    pub fn empty(path: PathBuf) -> Self {
        Self { path, profiles: Vec::new() }
    }

    /// Overwrite the document with the full in-memory store
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let document = ProfileDocument { profiles: self.profiles.clone() };
        let json = serde_json::to_string_pretty(&document)
            .context("Failed to serialize profile store")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write profiles to {:?}", self.path))?;

        info!(path = %self.path.display(), count = self.profiles.len(), "Saved profiles");
        Ok(())
    }

    /// Insert, or replace a same-named profile in its existing position
    pub fn put(&mut self, profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Returns false (and changes nothing) when `name` is absent
    pub fn delete(&mut self, name: &str) -> bool {
        match self.profiles.iter().position(|p| p.name == name) {
            Some(index) => {
                self.profiles.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// First profile, in insertion order, captured on this hardware
    pub fn find_by_signature(&self, signature: &Signature) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.signature == signature)
    }
}
