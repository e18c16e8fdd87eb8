//! Connected display enumeration
//!
//! Queries xrandr and kscreen-doctor and pulls the names of connected
//! outputs out of their text output. A backend that is missing or errors
//! contributes an empty list; enumeration itself never fails.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::CommandRunner;
use crate::config::Settings;
use crate::constants::{kscreen, xrandr};

/// Connected output names per backend, from one enumeration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInventory {
    #[serde(default)]
    pub xrandr: Vec<String>,
    #[serde(default)]
    pub kscreen: Vec<String>,
}

impl DisplayInventory {
    pub fn is_empty(&self) -> bool {
        self.xrandr.is_empty() && self.kscreen.is_empty()
    }

    /// Both lists merged and sorted
    pub fn all_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .xrandr
            .iter()
            .chain(self.kscreen.iter())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

/// Query both backends
pub fn enumerate(runner: &dyn CommandRunner, settings: &Settings) -> DisplayInventory {
    let xrandr = query(runner, &settings.xrandr.query)
        .map(|text| parse_xrandr_connected(&text))
        .unwrap_or_default();
    let kscreen = query(runner, &settings.kscreen.query)
        .map(|text| parse_kscreen_outputs(&text))
        .unwrap_or_default();

    let inventory = DisplayInventory { xrandr, kscreen };
    debug!(xrandr = ?inventory.xrandr, kscreen = ?inventory.kscreen, "Enumerated displays");
    inventory
}

/// Raw text of a backend query, `None` when the command failed
pub fn query(runner: &dyn CommandRunner, argv: &[String]) -> Option<String> {
    let result = runner.run(argv);
    result.success.then_some(result.output)
}

/// True for an xrandr status line of a connected output
pub fn is_xrandr_connected_line(line: &str) -> bool {
    line.split_whitespace().any(|token| token == xrandr::CONNECTED)
}

/// Names of connected outputs in `xrandr --query` text
pub fn parse_xrandr_connected(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| is_xrandr_connected_line(line))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Names from `Output:` lines of kscreen-doctor text (second token)
pub fn parse_kscreen_outputs(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some(kscreen::OUTPUT_MARKER), Some(name)) => Some(name.to_string()),
                _ => None,
            }
        })
        .collect()
}
