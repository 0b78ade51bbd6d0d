use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, trace};

use leasecheck_common::error::CapabilityError;

/// Output of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub command: String,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn into_failure(self) -> CapabilityError {
        CapabilityError::CommandFailed {
            command: self.command,
            status: self.status.to_string(),
            stderr: self.stderr.trim().to_string(),
        }
    }
}

/// Runs host tools, prefixed with `sudo -n` when elevation is enabled.
///
/// Children are killed when the awaiting future is dropped, so a caller's
/// timeout also ends the process.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    elevate: bool,
}

impl CommandRunner {
    pub fn new(elevate: bool) -> Self {
        Self { elevate }
    }

    /// Runs the command and returns its output whatever the exit status.
    pub async fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CapabilityError> {
        let command = self.render(program, args);
        debug!(%command, "running");

        let mut cmd = if self.elevate {
            let mut sudo = Command::new("sudo");
            sudo.arg("-n").arg(program);
            sudo
        } else {
            Command::new(program)
        };
        let output = cmd
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CapabilityError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = CommandOutput {
            command,
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(status = %output.status, stdout = %output.stdout, stderr = %output.stderr);
        Ok(output)
    }

    /// Runs the command and fails unless it exits successfully.
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CapabilityError> {
        let output = self.output(program, args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(output.into_failure())
        }
    }

    fn render(&self, program: &str, args: &[&str]) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(args.len() + 3);
        if self.elevate {
            parts.extend(["sudo", "-n"]);
        }
        parts.push(program);
        parts.extend_from_slice(args);
        parts.join(" ")
    }
}
