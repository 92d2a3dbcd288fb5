use std::path::Path;

use secrecy::SecretString;
use webui_core::{BuildConfig, CONTAINER_PORT, CommandSpec, LocalConfig, PushConfig};

use crate::error::ExecError;
use crate::executor::{CommandExecutor, RealExecutor};

const DOCKER: &str = "docker";

/// Secrets injected into the local container, each only when non-empty.
#[derive(Debug, Default, Clone)]
pub struct RuntimeSecrets {
    pub openai_api_key: Option<SecretString>,
    pub secret_key: Option<SecretString>,
}

impl RuntimeSecrets {
    pub fn new(openai_api_key: Option<String>, secret_key: Option<String>) -> Self {
        Self {
            openai_api_key: non_blank(openai_api_key),
            secret_key: non_blank(secret_key),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<SecretString> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

// ── Command composition ──

/// `docker build` for the prepared Dockerfile at `dockerfile`.
pub fn build_command(config: &BuildConfig, dockerfile: &Path) -> CommandSpec {
    let mut cmd = CommandSpec::new(DOCKER)
        .arg("build")
        .arg("-f")
        .arg(dockerfile.to_string_lossy())
        .arg("--build-arg")
        .arg(format!("USE_CUDA={}", config.cuda))
        .arg("--build-arg")
        .arg(format!("USE_CUDA_VER={}", config.cuda_version))
        .arg("--build-arg")
        .arg(format!("USE_OLLAMA={}", config.ollama))
        .arg("--build-arg")
        .arg(format!("USE_EMBEDDING_MODEL={}", config.embedding_model));

    if !config.reranking_model.trim().is_empty() {
        cmd = cmd
            .arg("--build-arg")
            .arg(format!("USE_RERANKING_MODEL={}", config.reranking_model));
    }

    cmd.arg("-t")
        .arg(config.image_ref())
        .arg(config.context.to_string_lossy())
}

/// `docker run` for the local deployment.
pub fn run_command(config: &LocalConfig, secrets: &RuntimeSecrets) -> CommandSpec {
    let mut cmd = CommandSpec::new(DOCKER)
        .args(["run", "-d", "-p"])
        .arg(format!("{}:{CONTAINER_PORT}", config.port));

    if config.ollama {
        cmd = cmd.args(["--network", "host"]);
    }
    if let Some(key) = &secrets.openai_api_key {
        cmd = cmd.arg("-e").secret_arg("OPENAI_API_KEY=", key.clone());
    }
    if let Some(key) = &secrets.secret_key {
        cmd = cmd.arg("-e").secret_arg("WEBUI_SECRET_KEY=", key.clone());
    }

    cmd.arg("-v")
        .arg(config.volume())
        .arg("--name")
        .arg(&config.name)
        .args(["--restart", "always"])
        .arg(config.image_ref())
}

fn docker<const N: usize>(a: [&str; N]) -> CommandSpec {
    CommandSpec::new(DOCKER).args(a)
}

// ── Client ──

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Whether `image_ref` exists in the local image store.
    ///
    /// A failing `docker image inspect` means the image is absent; a docker
    /// binary that cannot be started is an error.
    pub async fn image_exists(&self, image_ref: &str) -> Result<bool, DockerError> {
        match self
            .executor
            .exec(&docker(["image", "inspect", image_ref]))
            .await
        {
            Ok(_) => Ok(true),
            Err(ExecError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(DockerError::Unavailable { source: e }),
        }
    }

    pub async fn require_image(&self, image_ref: &str) -> Result<(), DockerError> {
        if self.image_exists(image_ref).await? {
            Ok(())
        } else {
            Err(DockerError::ImageNotFound {
                image: image_ref.to_owned(),
            })
        }
    }

    /// Stop and remove a container by name. The container may not exist, so
    /// failures are only logged.
    pub async fn remove_container(&self, name: &str) {
        for action in ["stop", "rm"] {
            match self.executor.exec(&docker([action, name])).await {
                Ok(_) => tracing::debug!(container = name, action, "removed previous container"),
                // arch-lint: allow(no-error-swallowing) reason="no previous container is the common case; cleanup is best-effort"
                Err(e) => {
                    tracing::debug!(container = name, action, error = %e, "nothing to clean up")
                }
            }
        }
    }

    // ── Build ──

    pub async fn build(&self, config: &BuildConfig, dockerfile: &Path) -> Result<(), DockerError> {
        let cmd = build_command(config, dockerfile);
        tracing::info!(image = %config.image_ref(), "building image");
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| DockerError::Build { source: e })
    }

    // ── Local deploy ──

    /// Replace any container named `config.name` with a fresh one.
    /// Returns the new container ID.
    pub async fn deploy_local(
        &self,
        config: &LocalConfig,
        secrets: &RuntimeSecrets,
    ) -> Result<String, DockerError> {
        self.require_image(&config.image_ref()).await?;
        self.remove_container(&config.name).await;

        let cmd = run_command(config, secrets);
        tracing::info!(container = %config.name, image = %config.image_ref(), "starting container");
        let output = self
            .executor
            .exec(&cmd)
            .await
            .map_err(|e| DockerError::Run { source: e })?;

        Ok(output.trim().to_owned())
    }

    // ── Push ──

    pub async fn login(&self) -> Result<(), DockerError> {
        self.executor
            .exec_streaming(&docker(["login"]))
            .await
            .map_err(|e| DockerError::Login { source: e })
    }

    /// Tag the local image under the destination account and push it.
    /// Returns the remote reference.
    pub async fn push_image(&self, config: &PushConfig) -> Result<String, DockerError> {
        let username = config.require_username()?;
        let source = config.source_ref();
        let destination = config.destination_ref(username);

        self.require_image(&source).await?;

        if config.skip_login {
            tracing::debug!("skipping docker login");
        } else {
            self.login().await?;
        }

        self.executor
            .exec(&docker(["tag", &source, &destination]))
            .await
            .map_err(|e| DockerError::Tag { source: e })?;

        tracing::info!(%destination, "pushing image");
        self.executor
            .exec_streaming(&docker(["push", &destination]))
            .await
            .map_err(|e| DockerError::Push { source: e })?;

        Ok(destination)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker is not available")]
    Unavailable { source: ExecError },

    #[error("image '{image}' not found locally — run `webui-deploy build` first")]
    ImageNotFound { image: String },

    #[error("docker build failed")]
    Build { source: ExecError },

    #[error("docker run failed")]
    Run { source: ExecError },

    #[error("docker login failed")]
    Login { source: ExecError },

    #[error("docker tag failed")]
    Tag { source: ExecError },

    #[error("docker push failed")]
    Push { source: ExecError },

    #[error(transparent)]
    Options(#[from] webui_core::Error),
}
