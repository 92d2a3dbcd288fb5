use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// A single argument or environment value of a [`CommandSpec`].
#[derive(Debug, Clone)]
pub enum Token {
    Plain(String),
    /// Rendered as `prefix` followed by the secret; only the prefix is ever displayed.
    Sensitive {
        prefix: String,
        value: SecretString,
    },
}

impl Token {
    /// The real value, as handed to the child process.
    pub fn expose(&self) -> String {
        match self {
            Token::Plain(s) => s.clone(),
            Token::Sensitive { prefix, value } => format!("{prefix}{}", value.expose_secret()),
        }
    }

    /// Display form: plain tokens shell-quoted, secrets masked.
    fn redacted(&self) -> String {
        match self {
            Token::Plain(s) => quote(s),
            Token::Sensitive { prefix, .. } => format!("{prefix}***"),
        }
    }
}

/// An external process invocation: program, ordered arguments, and extra
/// environment assignments.
///
/// Built through the consuming builder methods and read-only afterwards.
/// `Display` redacts sensitive tokens, so a command can be logged or put into an
/// error message as-is.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<Token>,
    envs: Vec<(String, Token)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Token::Plain(arg.into()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| Token::Plain(a.into())));
        self
    }

    /// Append `flag value` only when `value` is present.
    pub fn opt_flag(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    pub fn secret_arg(mut self, prefix: impl Into<String>, value: SecretString) -> Self {
        self.args.push(Token::Sensitive {
            prefix: prefix.into(),
            value,
        });
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), Token::Plain(value.into())));
        self
    }

    pub fn secret_env(mut self, key: impl Into<String>, value: SecretString) -> Self {
        self.envs.push((
            key.into(),
            Token::Sensitive {
                prefix: String::new(),
                value,
            },
        ));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn tokens(&self) -> &[Token] {
        &self.args
    }

    /// Arguments with secrets exposed. Only executors should need this.
    pub fn to_args(&self) -> Vec<String> {
        self.args.iter().map(Token::expose).collect()
    }

    /// Environment assignments with secrets exposed.
    pub fn to_envs(&self) -> Vec<(String, String)> {
        self.envs
            .iter()
            .map(|(k, v)| (k.clone(), v.expose()))
            .collect()
    }

    /// Environment variable names, without values.
    pub fn env_keys(&self) -> impl Iterator<Item = &str> {
        self.envs.iter().map(|(k, _)| k.as_str())
    }

    /// True when `flag` appears as a plain argument.
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args
            .iter()
            .any(|t| matches!(t, Token::Plain(s) if s == flag))
    }

    /// The plain argument following the first occurrence of `flag`.
    pub fn value_of(&self, flag: &str) -> Option<String> {
        let pos = self
            .args
            .iter()
            .position(|t| matches!(t, Token::Plain(s) if s == flag))?;
        self.args.get(pos + 1).map(Token::expose)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.envs {
            write!(f, "{key}={} ", value.redacted())?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.redacted())?;
        }
        Ok(())
    }
}

/// Single-quote a token for display when a shell would split or expand it.
fn quote(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || "'\"$`\\*?;&|<>()".contains(c));
    if needs_quotes {
        format!("'{}'", token.replace('\'', r"'\''"))
    } else {
        token.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn display_redacts_sensitive_tokens() {
        let cmd = CommandSpec::new("docker")
            .args(["run", "-e"])
            .secret_arg("OPENAI_API_KEY=", secret("sk-live-123"));

        let shown = cmd.to_string();
        assert_eq!(shown, "docker run -e OPENAI_API_KEY=***");
        assert!(!shown.contains("sk-live-123"));
    }

    #[test]
    fn to_args_exposes_sensitive_tokens() {
        let cmd = CommandSpec::new("docker")
            .arg("-e")
            .secret_arg("WEBUI_SECRET_KEY=", secret("abc"));

        assert_eq!(cmd.to_args(), vec!["-e", "WEBUI_SECRET_KEY=abc"]);
    }

    #[test]
    fn display_quotes_shell_metacharacters() {
        let cmd = CommandSpec::new("uvicorn")
            .args(["--forwarded-allow-ips", "*", "a b"]);
        assert_eq!(cmd.to_string(), "uvicorn --forwarded-allow-ips '*' 'a b'");
    }

    #[test]
    fn display_redacts_secret_env() {
        let cmd = CommandSpec::new("uvicorn")
            .secret_env("WEBUI_SECRET_KEY", secret("k3y"))
            .env("HF_HUB_OFFLINE", "0");

        assert_eq!(
            cmd.to_string(),
            "WEBUI_SECRET_KEY=*** HF_HUB_OFFLINE=0 uvicorn"
        );
        assert_eq!(
            cmd.to_envs(),
            vec![
                ("WEBUI_SECRET_KEY".to_owned(), "k3y".to_owned()),
                ("HF_HUB_OFFLINE".to_owned(), "0".to_owned()),
            ]
        );
    }

    #[test]
    fn opt_flag_skips_absent_values() {
        let cmd = CommandSpec::new("gcloud")
            .opt_flag("--vpc-connector", None)
            .opt_flag("--service-account", Some("sa@p.iam.gserviceaccount.com"));

        assert!(!cmd.has_arg("--vpc-connector"));
        assert_eq!(
            cmd.value_of("--service-account").as_deref(),
            Some("sa@p.iam.gserviceaccount.com")
        );
    }
}
