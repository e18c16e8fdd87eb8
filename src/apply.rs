//! Profile application
//!
//! Rebuilds the command that restores a saved layout and issues it.
//! For xrandr the layout is reconstructed from the captured `--query`
//! text: output name, mode, position, rotation and the primary flag.
//! xrandr reports the rotated size, so a `left` or `right` output has its
//! width and height swapped back before it becomes `--mode`. Reflection,
//! scaling and refresh rate are not recovered.

use thiserror::Error;
use tracing::{info, warn};

use crate::command::CommandRunner;
use crate::config::{Backend, Profile, Settings};
use crate::constants::xrandr;
use crate::display::is_xrandr_connected_line;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Unknown backend '{0}'")]
    UnknownBackend(String),

    #[error("Profile '{0}' has no connected outputs to restore")]
    NoOutputs(String),

    #[error("{program} failed: {output}")]
    CommandFailed { program: String, output: String },
}

/// Output size and offset from an xrandr geometry token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub offset: Option<(i32, i32)>,
}

impl Geometry {
    /// Parse `WIDTHxHEIGHT` or `WIDTHxHEIGHT+X+Y`
    pub fn parse(token: &str) -> Option<Self> {
        let (size, offset) = match token.split_once('+') {
            Some((size, rest)) => {
                let (x, y) = rest.split_once('+')?;
                (size, Some((x.parse().ok()?, y.parse().ok()?)))
            }
            None => (token, None),
        };

        let (width, height) = size.split_once('x')?;
        Some(Self {
            width: width.parse().ok()?,
            height: height.parse().ok()?,
            offset,
        })
    }

    pub fn mode(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Same placement with width and height exchanged
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            ..self
        }
    }

    /// Offset in xrandr's `--pos XxY` form
    pub fn position(&self) -> Option<String> {
        self.offset.map(|(x, y)| format!("{}x{}", x, y))
    }
}

/// One connected output found in captured xrandr text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub name: String,
    pub primary: bool,
    /// Unrotated mode and offset
    pub geometry: Option<Geometry>,
    pub rotation: Option<String>,
}

/// Connected outputs in captured `xrandr --query` text
pub fn parse_xrandr_layout(raw_config: &str) -> Vec<OutputLayout> {
    raw_config
        .lines()
        .filter(|line| is_xrandr_connected_line(line))
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let name = tokens.next()?;
            let rest: Vec<&str> = tokens.collect();
            let primary = rest.contains(&xrandr::PRIMARY);
            // Geometry follows the status and optional primary marker
            let index = rest
                .iter()
                .position(|t| *t != xrandr::CONNECTED && *t != xrandr::PRIMARY);
            let geometry = index.and_then(|i| Geometry::parse(rest[i]));
            let rotation = match (geometry, index) {
                (Some(_), Some(i)) => rest
                    .get(i + 1)
                    .filter(|t| xrandr::ROTATIONS.contains(*t))
                    .map(|t| t.to_string()),
                _ => None,
            };
            let geometry = match rotation.as_deref() {
                Some("left") | Some("right") => geometry.map(Geometry::transposed),
                _ => geometry,
            };

            Some(OutputLayout {
                name: name.to_string(),
                primary,
                geometry,
                rotation,
            })
        })
        .collect()
}

/// xrandr arguments (without the program) that restore `raw_config`
pub fn build_xrandr_args(raw_config: &str) -> Vec<String> {
    let mut args = Vec::new();

    for output in parse_xrandr_layout(raw_config) {
        args.push("--output".to_string());
        args.push(output.name);

        if let Some(geometry) = output.geometry {
            args.push("--mode".to_string());
            args.push(geometry.mode());
            if let Some(position) = geometry.position() {
                args.push("--pos".to_string());
                args.push(position);
            }
        }

        if let Some(rotation) = output.rotation {
            args.push("--rotate".to_string());
            args.push(rotation);
        }

        if output.primary {
            args.push("--primary".to_string());
        }
    }

    args
}

/// Restore `profile` through its backend
pub fn apply(
    runner: &dyn CommandRunner,
    settings: &Settings,
    profile: &Profile,
) -> Result<(), ApplyError> {
    let argv = match &profile.backend {
        Backend::KScreen => settings.kscreen.restore.clone(),
        Backend::Xrandr => {
            let args = build_xrandr_args(&profile.raw_config);
            if args.is_empty() {
                warn!(profile = %profile.name, "No connected outputs in saved config");
                return Err(ApplyError::NoOutputs(profile.name.clone()));
            }
            let mut argv = settings.xrandr.restore.clone();
            argv.extend(args);
            argv
        }
        Backend::Unknown(other) => {
            warn!(
                profile = %profile.name,
                backend = %other,
                "Cannot apply profile with unknown backend"
            );
            return Err(ApplyError::UnknownBackend(other.clone()));
        }
    };

    info!(
        profile = %profile.name,
        backend = %profile.backend,
        command = %argv.join(" "),
        "Applying profile"
    );

    let result = runner.run(&argv);
    if result.success {
        info!(profile = %profile.name, "Profile applied");
        Ok(())
    } else {
        Err(ApplyError::CommandFailed {
            program: argv.first().cloned().unwrap_or_default(),
            output: result.output.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::command::fake::FakeRunner;
    use crate::display::DisplayInventory;
    use crate::signature::Signature;

    const DOCKED: &str = "\
Screen 0: minimum 8 x 8, current 4480 x 1440, maximum 32767 x 32767
eDP-1 connected 1920x1080+2560+360 (normal left inverted right x axis y axis) 344mm x 194mm
   1920x1080     60.01*+
DP-1 connected primary 2560x1440+0+0 (normal left inverted right x axis y axis) 597mm x 336mm
   2560x1440     59.95*+
HDMI-1 disconnected (normal left inverted right x axis y axis)
";

    fn profile(backend: Backend, raw_config: &str) -> Profile {
        Profile {
            name: "docked".to_string(),
            backend,
            raw_config: raw_config.to_string(),
            signature: Signature::of(&DisplayInventory::default()),
            inventory: DisplayInventory::default(),
        }
    }

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_geometry_parse() {
        assert_eq!(
            Geometry::parse("1920x1080+0+0"),
            Some(Geometry { width: 1920, height: 1080, offset: Some((0, 0)) })
        );
        assert_eq!(
            Geometry::parse("2560x1440"),
            Some(Geometry { width: 2560, height: 1440, offset: None })
        );
        assert_eq!(Geometry::parse("(normal"), None);
        assert_eq!(Geometry::parse("1920x"), None);
        assert_eq!(Geometry::parse("1920x1080+10"), None);
    }

    #[test]
    fn test_primary_line_reconstruction() {
        let args = build_xrandr_args(
            "DP-1 connected primary 1920x1080+0+0 (normal left inverted right) 597mm x 336mm\n",
        );
        assert_eq!(
            args,
            strings(&["--output", "DP-1", "--mode", "1920x1080", "--pos", "0x0", "--primary"])
        );
    }

    #[test]
    fn test_rotated_output_restores_unrotated_mode() {
        let args = build_xrandr_args(
            "HDMI-1 connected 1080x1920+1920+0 left (normal left inverted right x axis y axis)\n",
        );
        assert_eq!(
            args,
            strings(&[
                "--output", "HDMI-1", "--mode", "1920x1080", "--pos", "1920x0",
                "--rotate", "left",
            ])
        );

        let args = build_xrandr_args("DP-1 connected primary 1920x1080+0+0 inverted (normal)\n");
        assert_eq!(
            args,
            strings(&[
                "--output", "DP-1", "--mode", "1920x1080", "--pos", "0x0",
                "--rotate", "inverted", "--primary",
            ])
        );
    }

    #[test]
    fn test_rotation_needs_geometry() {
        let layout = parse_xrandr_layout("HDMI-1 connected left (normal left inverted right)\n");
        assert_eq!(layout[0].geometry, None);
        assert_eq!(layout[0].rotation, None);
    }

    #[test]
    fn test_multi_output_single_invocation() {
        let settings = Settings::default();
        let runner = FakeRunner::new();

        apply(&runner, &settings, &profile(Backend::Xrandr, DOCKED)).unwrap();

        assert_eq!(
            runner.calls(),
            vec![strings(&[
                "xrandr",
                "--output", "eDP-1", "--mode", "1920x1080", "--pos", "2560x360",
                "--output", "DP-1", "--mode", "2560x1440", "--pos", "0x0", "--primary",
            ])]
        );
    }

    #[test]
    fn test_unparsable_geometry_still_addresses_output() {
        // Connected but switched off: xrandr prints no geometry
        let args =
            build_xrandr_args("HDMI-1 connected (normal left inverted right x axis y axis)\n");
        assert_eq!(args, strings(&["--output", "HDMI-1"]));

        let args = build_xrandr_args("DP-2 connected 1920x1080\n");
        assert_eq!(args, strings(&["--output", "DP-2", "--mode", "1920x1080"]));
    }

    #[test]
    fn test_apply_twice_issues_same_command() {
        let settings = Settings::default();
        let runner = FakeRunner::new();
        let docked = profile(Backend::Xrandr, DOCKED);

        assert!(apply(&runner, &settings, &docked).is_ok());
        assert!(apply(&runner, &settings, &docked).is_ok());

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn test_kscreen_issues_restore_command() {
        let settings = Settings::default();
        let runner = FakeRunner::new();

        let plasma = profile(Backend::KScreen, "Output: 1 eDP-1 enabled");
        apply(&runner, &settings, &plasma).unwrap();
        assert_eq!(runner.calls(), vec![settings.kscreen.restore.clone()]);
    }

    #[test]
    fn test_unknown_backend_issues_nothing() {
        let settings = Settings::default();
        let runner = FakeRunner::new();

        let gnome = profile(Backend::Unknown("gnome".to_string()), DOCKED);
        let err = apply(&runner, &settings, &gnome);
        assert_eq!(err, Err(ApplyError::UnknownBackend("gnome".to_string())));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_no_connected_outputs_issues_nothing() {
        let settings = Settings::default();
        let runner = FakeRunner::new();

        let err = apply(&runner, &settings, &profile(Backend::Xrandr, "DP-1 disconnected\n"));
        assert_eq!(err, Err(ApplyError::NoOutputs("docked".to_string())));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_command_failure_propagates_without_retry() {
        let settings = Settings::default();
        let runner = FakeRunner::new()
            .respond(&["xrandr"], CommandOutput::failed("xrandr: cannot find mode 2560x1440\n"));

        let err = apply(&runner, &settings, &profile(Backend::Xrandr, DOCKED)).unwrap_err();
        assert_eq!(
            err,
            ApplyError::CommandFailed {
                program: "xrandr".to_string(),
                output: "xrandr: cannot find mode 2560x1440".to_string(),
            }
        );
        assert_eq!(runner.calls().len(), 1);
    }
}
