use reltools_common::{RelToolsError, Result};
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs external tools. Abstracted so the engine can be exercised without them.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` and return its stdout split into lines.
    ///
    /// The exit status is not inspected: `diff` exits with 1 whenever it finds
    /// differences, which is the normal case here.
    fn output_lines(&self, program: &str, args: &[String]) -> Result<Vec<String>>;

    /// Run `program` to completion and report whether it exited successfully.
    fn status(&self, program: &str, args: &[String]) -> Result<bool>;
}

/// [`ProcessRunner`] backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> RelToolsError {
    if err.kind() == ErrorKind::NotFound {
        RelToolsError::ToolNotFound(program.to_string())
    } else {
        RelToolsError::Process(format!("failed to run {program}: {err}"))
    }
}

impl ProcessRunner for SystemRunner {
    fn output_lines(&self, program: &str, args: &[String]) -> Result<Vec<String>> {
        debug!("{} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| spawn_error(program, e))?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    fn status(&self, program: &str, args: &[String]) -> Result<bool> {
        debug!("{} {}", program, args.join(" "));
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| spawn_error(program, e))?;
        Ok(status.success())
    }
}
