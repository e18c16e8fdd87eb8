//! CLI subcommand handlers
//!
//! Each handler maps one subcommand onto the store, applier or
//! auto-switcher and prints its result to stdout.

use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;
use tracing::{info, warn};

use crate::auto_switch::AutoSwitcher;
use crate::command::CommandRunner;
use crate::config::{Backend, Profile, ProfileStore, Settings};
use crate::display::{enumerate, query};
use crate::signature::Signature;

pub fn init(settings_path: &Path) -> Result<()> {
    if settings_path.exists() {
        println!("Settings already exist at {}", settings_path.display());
        return Ok(());
    }
    Settings::default().save_to(settings_path)?;
    println!("Wrote default settings to {}", settings_path.display());
    Ok(())
}

pub fn detect(runner: &dyn CommandRunner, settings: &Settings, store: &ProfileStore) -> Result<()> {
    let inventory = enumerate(runner, settings);
    if inventory.is_empty() {
        warn!("No backend reported any connected display");
    }
    let signature = Signature::of(&inventory);

    println!("xrandr:    {}", inventory.xrandr.join(", "));
    println!("kscreen:   {}", inventory.kscreen.join(", "));
    println!("signature: {}", signature);
    match store.find_by_signature(&signature) {
        Some(profile) => println!("profile:   {}", profile.name),
        None => println!("profile:   (none)"),
    }
    Ok(())
}

pub fn list(runner: &dyn CommandRunner, settings: &Settings, store: &ProfileStore) -> Result<()> {
    if store.is_empty() {
        println!("No saved profiles");
        return Ok(());
    }

    let current = Signature::of(&enumerate(runner, settings));
    let active = store.find_by_signature(&current).map(|p| p.name.as_str());

    for profile in store.iter() {
        let marker = if Some(profile.name.as_str()) == active { "*" } else { " " };
        println!("{} {:<20} {:<8} {}", marker, profile.name, profile.backend, profile.signature);
    }
    Ok(())
}

pub fn show(store: &ProfileStore, name: &str) -> Result<()> {
    let profile = store.get(name).ok_or_else(|| missing_profile(store, name))?;

    println!("name:      {}", profile.name);
    println!("backend:   {}", profile.backend);
    println!("signature: {}", profile.signature);
    println!("xrandr:    {}", profile.inventory.xrandr.join(", "));
    println!("kscreen:   {}", profile.inventory.kscreen.join(", "));
    println!("config:");
    for line in profile.raw_config.lines() {
        println!("  {}", line);
    }
    Ok(())
}

/// Capture the current layout with `backend` and store it under `name`
pub fn save(
    runner: &dyn CommandRunner,
    settings: &Settings,
    store: &mut ProfileStore,
    name: &str,
    backend: Backend,
) -> Result<()> {
    let capture = match &backend {
        Backend::Xrandr => &settings.xrandr.query,
        Backend::KScreen => &settings.kscreen.query,
        Backend::Unknown(other) => bail!("Unknown backend '{}'", other),
    };

    let raw_config = query(runner, capture)
        .with_context(|| format!("Failed to capture layout with {}", backend))?;
    let inventory = enumerate(runner, settings);
    let signature = Signature::of(&inventory);

    store.put(Profile {
        name: name.to_string(),
        backend,
        raw_config,
        signature: signature.clone(),
        inventory,
    });
    store.save()?;

    info!(profile = %name, signature = %signature, "Saved profile");
    println!("Saved profile '{}' ({})", name, signature);
    Ok(())
}

pub fn apply(
    runner: &dyn CommandRunner,
    settings: &Settings,
    store: &ProfileStore,
    name: &str,
) -> Result<()> {
    let profile = store.get(name).ok_or_else(|| missing_profile(store, name))?;
    crate::apply::apply(runner, settings, profile)?;
    println!("Applied profile '{}'", name);
    Ok(())
}

pub fn delete(store: &mut ProfileStore, name: &str) -> Result<()> {
    if !store.delete(name) {
        return Err(missing_profile(store, name));
    }
    store.save()?;
    println!("Deleted profile '{}'", name);
    Ok(())
}

pub fn auto(
    runner: &dyn CommandRunner,
    settings: &Settings,
    store: &ProfileStore,
    daemon: bool,
) -> Result<()> {
    let switcher = AutoSwitcher::new(runner, settings, store);

    match switcher.match_once() {
        Some(name) => println!("Applied profile '{}'", name),
        None if daemon => println!("No matching profile for current displays"),
        None => bail!("No matching profile for current displays"),
    }

    if daemon {
        let stop = crate::shutdown::install()?;
        switcher.run(&stop);
    }
    Ok(())
}

/// Lookup failure naming the profiles that do exist
fn missing_profile(store: &ProfileStore, name: &str) -> anyhow::Error {
    if store.is_empty() {
        anyhow!("No profile named '{}' (no profiles saved)", name)
    } else {
        anyhow!("No profile named '{}' (saved: {})", name, store.names().join(", "))
    }
}
