//! Docker and Cloud Run operations for webui-deploy.
//!
//! Every external call goes through a [`CommandExecutor`], so the clients can
//! be driven by mocks in tests.

pub mod docker;
pub mod error;
pub mod executor;
pub mod gcloud;

pub use docker::{DockerClient, DockerError, RuntimeSecrets};
pub use error::ExecError;
pub use executor::{CommandExecutor, RealExecutor};
pub use gcloud::{GcloudClient, GcloudError};
