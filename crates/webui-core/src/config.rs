use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CONTAINER_PORT, DEFAULT_IMAGE_NAME};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "webui-deploy.toml";

/// webui-deploy.toml configuration.
///
/// Each section holds the full option set of one operation. Missing sections
/// and fields fall back to built-in defaults, and command-line flags are
/// applied on top of the loaded values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub cloud_run: CloudRunConfig,
}

/// Options for `webui-deploy build`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Image name
    #[serde(default = "default_image_name")]
    pub name: String,
    /// Image tag
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Build with CUDA support
    #[serde(default)]
    pub cuda: bool,
    /// CUDA toolkit flavour passed as USE_CUDA_VER
    #[serde(default = "default_cuda_version")]
    pub cuda_version: String,
    /// Bundle Ollama into the image
    #[serde(default)]
    pub ollama: bool,
    /// Sentence-transformers embedding model baked into the image
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Optional reranking model; omitted from the build when empty
    #[serde(default)]
    pub reranking_model: String,
    /// Concrete platform substituted for the `$BUILDPLATFORM` placeholder
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Build definition file
    #[serde(default = "default_dockerfile")]
    pub dockerfile: PathBuf,
    /// Build context directory
    #[serde(default = "default_context")]
    pub context: PathBuf,
}

/// Options for `webui-deploy deploy` (local Docker).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Container name, also used to key the data volume
    #[serde(default = "default_image_name")]
    pub name: String,
    /// Local image name
    #[serde(default = "default_image_name")]
    pub image: String,
    /// Local image tag
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Host port mapped to the container port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Use host networking so the container can reach a local Ollama
    #[serde(default)]
    pub ollama: bool,
}

/// Options for `webui-deploy push`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Local image name
    #[serde(default = "default_image_name")]
    pub name: String,
    /// Tag pushed (same on both sides)
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Docker Hub account (required)
    #[serde(default)]
    pub username: Option<String>,
    /// Destination repository (defaults to the local image name)
    #[serde(default)]
    pub repository: Option<String>,
    /// Skip the interactive `docker login`
    #[serde(default)]
    pub skip_login: bool,
}

/// Options for `webui-deploy cloud-deploy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudRunConfig {
    /// GCP project ID (required)
    #[serde(default)]
    pub project: Option<String>,
    /// GCP region
    #[serde(default = "default_region")]
    pub region: String,
    /// Cloud Run service name
    #[serde(default = "default_image_name")]
    pub service: String,
    /// Image reference Cloud Run pulls
    #[serde(default = "default_cloud_image")]
    pub image: String,
    /// CPU count
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    /// Memory allocation
    #[serde(default = "default_memory")]
    pub memory: String,
    /// Minimum instances
    #[serde(default)]
    pub min_instances: u32,
    /// Maximum instances
    #[serde(default = "default_max_instances")]
    pub max_instances: u32,
    /// Max concurrent requests per instance
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Port the container listens on; also injected as PORT
    #[serde(default = "default_port")]
    pub port: u16,
    /// Ingress policy (all, internal, internal-and-cloud-load-balancing)
    #[serde(default = "default_ingress")]
    pub ingress: String,
    /// Extra environment variables, in the order given
    #[serde(default)]
    pub env: Vec<EnvVar>,
    /// Cloud SQL instance connection name
    #[serde(default)]
    pub sql_instance: Option<String>,
    /// Serverless VPC Access connector
    #[serde(default)]
    pub vpc_connector: Option<String>,
    /// Runtime service account
    #[serde(default)]
    pub service_account: Option<String>,
    /// Require IAM authentication instead of allowing public access
    #[serde(default)]
    pub authenticate: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            tag: default_tag(),
            cuda: false,
            cuda_version: default_cuda_version(),
            ollama: false,
            embedding_model: default_embedding_model(),
            reranking_model: String::new(),
            platform: default_platform(),
            dockerfile: default_dockerfile(),
            context: default_context(),
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            image: default_image_name(),
            tag: default_tag(),
            port: default_port(),
            ollama: false,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            tag: default_tag(),
            username: None,
            repository: None,
            skip_login: false,
        }
    }
}

impl Default for CloudRunConfig {
    fn default() -> Self {
        Self {
            project: None,
            region: default_region(),
            service: default_image_name(),
            image: default_cloud_image(),
            cpu: default_cpu(),
            memory: default_memory(),
            min_instances: 0,
            max_instances: default_max_instances(),
            concurrency: default_concurrency(),
            timeout: default_timeout(),
            port: default_port(),
            ingress: default_ingress(),
            env: Vec::new(),
            sql_instance: None,
            vpc_connector: None,
            service_account: None,
            authenticate: false,
        }
    }
}

impl DeployConfig {
    /// Load from webui-deploy.toml in the given directory, or return defaults if not found.
    pub fn load(dir: &Path) -> crate::Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                path: config_path.clone(),
                source: e,
            })?;
        let config = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: config_path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %config_path.display(), "loaded config file");
        Ok(config)
    }
}

impl BuildConfig {
    /// `name:tag` of the image produced by the build.
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}

impl LocalConfig {
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Named volume holding `/app/backend/data`, keyed by container name.
    pub fn volume(&self) -> String {
        format!("{}-data:/app/backend/data", self.name)
    }

    /// Host port the UI is reachable on. Host networking bypasses the port
    /// mapping, so the container port is exposed directly.
    pub fn published_port(&self) -> u16 {
        if self.ollama {
            CONTAINER_PORT
        } else {
            self.port
        }
    }
}

impl PushConfig {
    pub fn source_ref(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }

    pub fn require_username(&self) -> crate::Result<&str> {
        non_empty(&self.username).ok_or(crate::Error::MissingRequired {
            flag: "--username",
            hint: "pass the Docker Hub account to push to with --username <name>",
        })
    }

    /// `<username>/<repository>:<tag>` on Docker Hub.
    pub fn destination_ref(&self, username: &str) -> String {
        let repository = match non_empty(&self.repository) {
            Some(repository) => repository,
            None => &self.name,
        };
        format!("{username}/{repository}:{tag}", tag = self.tag)
    }
}

impl CloudRunConfig {
    pub fn require_project(&self) -> crate::Result<&str> {
        non_empty(&self.project).ok_or(crate::Error::MissingRequired {
            flag: "--project",
            hint: "pass a GCP project ID with --project <id> or set [cloud_run].project",
        })
    }

    pub fn sql_instance(&self) -> Option<&str> {
        non_empty(&self.sql_instance)
    }

    pub fn vpc_connector(&self) -> Option<&str> {
        non_empty(&self.vpc_connector)
    }

    pub fn service_account(&self) -> Option<&str> {
        non_empty(&self.service_account)
    }
}

/// Treats `Some("")` (e.g. an empty flag value) the same as an unset option.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ── Environment variables ──

/// A `KEY=VALUE` pair passed to the deployed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl FromStr for EnvVar {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| crate::Error::InvalidEnvVar(s.to_owned()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(crate::Error::InvalidEnvVar(s.to_owned()));
        }
        Ok(Self {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl TryFrom<String> for EnvVar {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EnvVar> for String {
    fn from(var: EnvVar) -> Self {
        var.to_string()
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

fn default_image_name() -> String {
    DEFAULT_IMAGE_NAME.to_owned()
}

fn default_tag() -> String {
    "latest".to_owned()
}

fn default_cuda_version() -> String {
    "cu121".to_owned()
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_owned()
}

fn default_platform() -> String {
    "linux/amd64".to_owned()
}

fn default_dockerfile() -> PathBuf {
    PathBuf::from("Dockerfile")
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

fn default_port() -> u16 {
    CONTAINER_PORT
}

fn default_region() -> String {
    "us-central1".to_owned()
}

fn default_cloud_image() -> String {
    "ghcr.io/open-webui/open-webui:main".to_owned()
}

fn default_cpu() -> u32 {
    2
}

fn default_memory() -> String {
    "4Gi".to_owned()
}

fn default_max_instances() -> u32 {
    3
}

fn default_concurrency() -> u32 {
    80
}

fn default_timeout() -> u32 {
    300
}

fn default_ingress() -> String {
    "all".to_owned()
}
