use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{flag} is required — {hint}")]
    MissingRequired {
        flag: &'static str,
        hint: &'static str,
    },

    #[error("invalid environment variable {0:?}: expected KEY=VALUE")]
    InvalidEnvVar(String),

    // ── Secret key bootstrap ──
    #[error("failed to read secret key file {path}")]
    SecretKeyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write secret key file {path}")]
    SecretKeyWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to obtain random bytes from the operating system")]
    RandomSource(#[source] getrandom::Error),

    #[error("secret key file {0} is empty — delete it to generate a new key")]
    EmptySecretKey(PathBuf),
}
