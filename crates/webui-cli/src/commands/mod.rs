mod build;
mod cloud_deploy;
mod deploy;
mod push;
mod start;

use std::path::Path;

use webui_core::DeployConfig;

pub use build::{BuildArgs, build};
pub use cloud_deploy::{CloudDeployArgs, cloud_deploy};
pub use deploy::{DeployArgs, deploy};
pub use push::{PushArgs, push};
pub use start::{StartArgs, start};

/// Ctrl-C arrived while a child process was running.
#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Load webui-deploy.toml from the working directory (defaults when absent).
pub(crate) fn load_config() -> anyhow::Result<DeployConfig> {
    Ok(DeployConfig::load(Path::new("."))?)
}

/// Replace `slot` with the flag value when the flag was given.
pub(crate) fn set<T>(slot: &mut T, flag: Option<T>) {
    if let Some(value) = flag {
        *slot = value;
    }
}
