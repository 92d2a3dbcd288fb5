use secrecy::SecretString;
use webui_core::{CloudRunConfig, CommandSpec, EnvVar};

use crate::error::ExecError;
use crate::executor::{CommandExecutor, RealExecutor};

const GCLOUD: &str = "gcloud";

/// APIs enabled before every Cloud Run deployment.
pub const REQUIRED_SERVICES: [&str; 3] = [
    "run.googleapis.com",
    "cloudbuild.googleapis.com",
    "artifactregistry.googleapis.com",
];

// ── Command composition ──

/// Value for `--set-env-vars`: the configured variables in the order given,
/// then `PORT`, joined with commas.
pub fn env_vars_flag(env: &[EnvVar], port: u16) -> String {
    env.iter()
        .map(EnvVar::to_string)
        .chain(std::iter::once(format!("PORT={port}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// `gcloud run deploy` for the configured service.
pub fn deploy_command(config: &CloudRunConfig) -> CommandSpec {
    let env_vars = env_vars_flag(&config.env, config.port);

    let cmd = CommandSpec::new(GCLOUD)
        .args(["run", "deploy"])
        .arg(&config.service)
        .arg("--image")
        .arg(&config.image)
        .args(["--platform", "managed"])
        .arg("--region")
        .arg(&config.region)
        .arg("--port")
        .arg(config.port.to_string())
        .arg("--cpu")
        .arg(config.cpu.to_string())
        .arg("--memory")
        .arg(&config.memory)
        .arg("--min-instances")
        .arg(config.min_instances.to_string())
        .arg("--max-instances")
        .arg(config.max_instances.to_string())
        .arg("--concurrency")
        .arg(config.concurrency.to_string())
        .arg("--timeout")
        .arg(config.timeout.to_string())
        .arg("--ingress")
        .arg(&config.ingress)
        // User-supplied variables may carry credentials.
        .arg("--set-env-vars")
        .secret_arg("", SecretString::from(env_vars))
        .opt_flag("--add-cloudsql-instances", config.sql_instance())
        .opt_flag("--vpc-connector", config.vpc_connector())
        .opt_flag("--service-account", config.service_account());

    let cmd = if config.authenticate {
        cmd
    } else {
        cmd.arg("--allow-unauthenticated")
    };

    cmd.args(["--quiet", "--format", "value(status.url)"])
}

/// Reads the URL of an already deployed service.
pub fn describe_command(config: &CloudRunConfig) -> CommandSpec {
    CommandSpec::new(GCLOUD)
        .args(["run", "services", "describe"])
        .arg(&config.service)
        .arg("--region")
        .arg(&config.region)
        .args(["--format", "value(status.url)"])
}

fn gcloud<const N: usize>(a: [&str; N]) -> CommandSpec {
    CommandSpec::new(GCLOUD).args(a)
}

// ── Client ──

/// GCP operations client, parameterized over the executor for testability.
pub struct GcloudClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl GcloudClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for GcloudClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GcloudClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    pub async fn set_project(&self, project_id: &str) -> Result<(), GcloudError> {
        self.executor
            .exec(&gcloud(["config", "set", "project", project_id]))
            .await
            .map_err(|e| GcloudError::SetProject {
                project: project_id.to_owned(),
                source: e,
            })?;
        Ok(())
    }

    pub async fn enable_services(&self) -> Result<(), GcloudError> {
        let cmd = CommandSpec::new(GCLOUD)
            .args(["services", "enable"])
            .args(REQUIRED_SERVICES);
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| GcloudError::EnableServices { source: e })
    }

    /// Select the project, enable required APIs, and deploy the service.
    /// The deploy streams its progress; the URL is read back afterwards.
    pub async fn deploy_service(&self, config: &CloudRunConfig) -> Result<String, GcloudError> {
        let project_id = config.require_project()?;

        tracing::info!(project = project_id, "setting active project");
        self.set_project(project_id).await?;

        tracing::info!(services = ?REQUIRED_SERVICES, "enabling required services");
        self.enable_services().await?;

        let cmd = deploy_command(config);
        tracing::info!(
            service = %config.service,
            region = %config.region,
            "deploying to Cloud Run"
        );
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| GcloudError::Deploy { source: e })?;

        let output = self
            .executor
            .exec(&describe_command(config))
            .await
            .map_err(|e| GcloudError::Describe { source: e })?;

        Ok(output.trim().to_owned())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GcloudError {
    #[error("failed to set active project '{project}'")]
    SetProject { project: String, source: ExecError },

    #[error("failed to enable required services")]
    EnableServices { source: ExecError },

    #[error("cloud run deployment failed")]
    Deploy { source: ExecError },

    #[error("failed to read the service URL")]
    Describe { source: ExecError },

    #[error(transparent)]
    Options(#[from] webui_core::Error),
}
