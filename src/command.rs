//! External command execution
//!
//! The engine only builds argument lists and reads text back; running the
//! process is the job of a [`CommandRunner`].

use std::io::ErrorKind;
use std::process::Command;
use tracing::{debug, warn};

/// Outcome of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// stdout on success, error text on failure
    pub output: String,
}

impl CommandOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

pub trait CommandRunner {
    /// Run `argv[0]` with the remaining arguments and capture its output.
    /// Never panics; a missing executable is reported as a failure.
    fn run(&self, argv: &[String]) -> CommandOutput;
}

/// Runs commands as child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> CommandOutput {
        let Some((program, args)) = argv.split_first() else {
            return CommandOutput::failed("empty command");
        };

        debug!(command = %argv.join(" "), "Running external command");

        let result = match Command::new(program).args(args).output() {
            Ok(output) if output.status.success() => {
                CommandOutput::ok(String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let text = if stderr.trim().is_empty() {
                    String::from_utf8_lossy(&output.stdout).into_owned()
                } else {
                    stderr.into_owned()
                };
                CommandOutput::failed(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                CommandOutput::failed(format!("command not found: {program}"))
            }
            Err(e) => CommandOutput::failed(format!("failed to run {program}: {e}")),
        };

        if !result.success {
            warn!(program = %program, output = %result.output.trim(), "External command failed");
        }
        result
    }
}
