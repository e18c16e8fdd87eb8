//! Automatic profile switching
//!
//! Matches the current hardware signature against stored profiles, either
//! once or in a polling loop that re-applies whenever the connected
//! display set changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::apply::apply;
use crate::command::CommandRunner;
use crate::config::{ProfileStore, Settings};
use crate::constants::polling;
use crate::display::enumerate;
use crate::signature::Signature;

/// Result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Unchanged,
    Applied(String),
    NoMatch,
}

pub struct AutoSwitcher<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
    store: &'a ProfileStore,
}

impl<'a> AutoSwitcher<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        settings: &'a Settings,
        store: &'a ProfileStore,
    ) -> Self {
        Self { runner, settings, store }
    }

    pub fn current_signature(&self) -> Signature {
        Signature::of(&enumerate(self.runner, self.settings))
    }

    /// Apply the first profile captured on the current hardware.
    /// Returns its name when it applied successfully.
    pub fn match_once(&self) -> Option<String> {
        self.match_signature(&self.current_signature())
    }

    fn match_signature(&self, signature: &Signature) -> Option<String> {
        let Some(profile) = self.store.find_by_signature(signature) else {
            info!(signature = %signature, "No profile matches current displays");
            return None;
        };

        info!(profile = %profile.name, signature = %signature, "Matched profile");
        match apply(self.runner, self.settings, profile) {
            Ok(()) => Some(profile.name.clone()),
            Err(e) => {
                warn!(profile = %profile.name, error = %e, "Failed to apply matched profile");
                None
            }
        }
    }

    /// One poll cycle. `last` is updated on every change, matched or not.
    pub fn tick(&self, last: &mut Signature) -> Tick {
        let current = self.current_signature();
        if &current == last {
            debug!(signature = %current, "Displays unchanged");
            return Tick::Unchanged;
        }

        info!(from = %last, to = %current, "Display configuration changed");
        let outcome = match self.match_signature(&current) {
            Some(name) => Tick::Applied(name),
            None => Tick::NoMatch,
        };
        *last = current;
        outcome
    }

    /// Poll until `stop` is set
    pub fn run(&self, stop: &AtomicBool) {
        let interval = self.settings.poll_interval();
        let mut last = self.current_signature();
        info!(
            signature = %last,
            interval_secs = interval.as_secs(),
            "Watching for display changes"
        );

        while !stop.load(Ordering::Relaxed) {
            if !sleep_unless_stopped(interval, stop) {
                break;
            }
            self.tick(&mut last);
        }

        info!("Stopped watching for display changes");
    }
}

/// Sleep for `duration`; false if `stop` was set meanwhile
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    let slice = Duration::from_millis(polling::STOP_CHECK_MS);

    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(slice.min(deadline - now));
    }
}
