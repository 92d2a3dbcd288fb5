use std::process::Stdio;

use webui_core::CommandSpec;

use crate::error::ExecError;

/// Abstraction over external command execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command and capture stdout.
    async fn exec(&self, cmd: &CommandSpec) -> Result<String, ExecError>;

    /// Run a command with stdio inherited from this process (progress output,
    /// interactive prompts).
    async fn exec_streaming(&self, cmd: &CommandSpec) -> Result<(), ExecError>;
}

/// Spawns real child processes via tokio.
pub struct RealExecutor;

impl RealExecutor {
    fn command(cmd: &CommandSpec) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(cmd.program());
        // A dropped future (e.g. on Ctrl-C) must not leave the child running.
        command
            .args(cmd.to_args())
            .envs(cmd.to_envs())
            .kill_on_drop(true);
        command
    }
}

impl CommandExecutor for RealExecutor {
    async fn exec(&self, cmd: &CommandSpec) -> Result<String, ExecError> {
        tracing::debug!(command = %cmd, "exec");

        let output = Self::command(cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecError::NotFound {
                program: cmd.program().to_owned(),
                source: e,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
                program: cmd.program().to_owned(),
                source: e,
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            Err(ExecError::CommandFailed {
                command: cmd.to_string(),
                code: output.status.code(),
                stderr,
            })
        }
    }

    async fn exec_streaming(&self, cmd: &CommandSpec) -> Result<(), ExecError> {
        tracing::debug!(command = %cmd, "exec (streaming)");

        let status = Self::command(cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::NotFound {
                program: cmd.program().to_owned(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                command: cmd.to_string(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}
