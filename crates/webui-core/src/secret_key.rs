//! Resolution of the `WEBUI_SECRET_KEY` used to sign Open WebUI sessions.
//!
//! Order: an explicit non-empty value (usually the environment), then the key
//! file, then a freshly generated key written to the key file.

use std::io::Write;
use std::path::Path;

use base64::Engine;
use secrecy::SecretString;

/// Key file created in the working directory when no key is supplied.
pub const DEFAULT_KEY_FILE: &str = ".webui_secret_key";

const KEY_BYTES: usize = 12;

/// Where the resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Explicit,
    File,
    Generated,
}

pub fn resolve(
    explicit: Option<&str>,
    key_file: &Path,
) -> crate::Result<(SecretString, KeySource)> {
    if let Some(value) = explicit.filter(|v| !v.trim().is_empty()) {
        return Ok((SecretString::from(value.to_owned()), KeySource::Explicit));
    }

    if key_file.exists() {
        let content =
            std::fs::read_to_string(key_file).map_err(|e| crate::Error::SecretKeyRead {
                path: key_file.to_path_buf(),
                source: e,
            })?;
        let key = content.trim();
        if key.is_empty() {
            return Err(crate::Error::EmptySecretKey(key_file.to_path_buf()));
        }
        tracing::debug!(path = %key_file.display(), "using secret key from file");
        return Ok((SecretString::from(key.to_owned()), KeySource::File));
    }

    let key = generate()?;
    persist(key_file, &key).map_err(|e| crate::Error::SecretKeyWrite {
        path: key_file.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %key_file.display(), "generated new secret key");
    Ok((SecretString::from(key), KeySource::Generated))
}

/// 12 bytes from the OS CSPRNG, base64-encoded.
fn generate() -> crate::Result<String> {
    let mut bytes = [0u8; KEY_BYTES];
    getrandom::fill(&mut bytes).map_err(crate::Error::RandomSource)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Write the key newline-terminated; owner read/write only on unix.
fn persist(key_file: &Path, key: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(key_file)?;
    file.write_all(format!("{key}\n").as_bytes())
}
