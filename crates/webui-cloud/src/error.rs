#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{program} not found — is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("command failed ({}): {command}\n{stderr}", describe_code(*code))]
    CommandFailed {
        /// Redacted rendering of the command.
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },
}

impl ExecError {
    /// Exit status of the failed child, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_owned(),
    }
}
