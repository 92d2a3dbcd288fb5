use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// The only placeholder rewritten. Other `--platform` forms are left alone.
pub const PLATFORM_PLACEHOLDER: &str = "--platform=$BUILDPLATFORM";

/// Replace every occurrence of [`PLATFORM_PLACEHOLDER`] with a concrete platform.
pub fn rewrite_platform(content: &str, platform: &str) -> String {
    content.replace(PLATFORM_PLACEHOLDER, &format!("--platform={platform}"))
}

/// A rewritten copy of a Dockerfile, placed next to the original.
///
/// The copy is deleted when this value is dropped, so every exit path of the
/// build (including `?` early returns and failed builds) cleans it up.
#[derive(Debug)]
pub struct PreparedDockerfile {
    file: NamedTempFile,
    replacements: usize,
}

impl PreparedDockerfile {
    pub fn prepare(original: &Path, platform: &str) -> Result<Self, DockerfileError> {
        let content = std::fs::read_to_string(original).map_err(|e| DockerfileError::Read {
            path: original.to_path_buf(),
            source: e,
        })?;

        let replacements = content.matches(PLATFORM_PLACEHOLDER).count();
        let rewritten = rewrite_platform(&content, platform);

        let dir = match original.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = match original.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => "Dockerfile".to_owned(),
        };

        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| DockerfileError::CreateTemp {
                dir: dir.clone(),
                source: e,
            })?;

        file.write_all(rewritten.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| DockerfileError::Write {
                path: file.path().to_path_buf(),
                source: e,
            })?;

        tracing::debug!(
            original = %original.display(),
            copy = %file.path().display(),
            replacements,
            platform,
            "prepared build definition"
        );

        Ok(Self { file, replacements })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of placeholders rewritten.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    /// Delete the copy now, reporting a removal failure instead of ignoring it.
    pub fn close(self) -> Result<(), DockerfileError> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|e| DockerfileError::Remove { path, source: e })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DockerfileError {
    #[error("failed to read build definition {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create temporary build definition in {dir}")]
    CreateTemp {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write temporary build definition {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove temporary build definition {path}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}
