//! Core types and configuration for webui-deploy.
//!
//! This crate defines the option sets for each operation and the optional
//! `webui-deploy.toml` schema ([`DeployConfig`]), the [`CommandSpec`] handed to
//! executors, secret-key bootstrap, and shared error types.

pub mod command;
pub mod config;
pub mod error;
pub mod secret_key;

pub use command::{CommandSpec, Token};
pub use config::{BuildConfig, CloudRunConfig, DeployConfig, EnvVar, LocalConfig, PushConfig};
pub use error::{Error, Result};

/// Default image name used across build, deploy, and push.
pub const DEFAULT_IMAGE_NAME: &str = "truly-open-webui";

/// Port the Open WebUI server listens on inside the container.
pub const CONTAINER_PORT: u16 = 8080;
