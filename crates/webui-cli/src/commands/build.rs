use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use webui_build::PreparedDockerfile;
use webui_cloud::DockerClient;
use webui_core::BuildConfig;

use super::set;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Image name [default: truly-open-webui]
    #[arg(short, long)]
    name: Option<String>,
    /// Image tag [default: latest]
    #[arg(short, long)]
    tag: Option<String>,
    /// Build with CUDA support
    #[arg(short, long)]
    cuda: bool,
    /// CUDA version passed as USE_CUDA_VER [default: cu121]
    #[arg(long, value_name = "VERSION")]
    cuda_version: Option<String>,
    /// Bundle Ollama into the image
    #[arg(short, long)]
    ollama: bool,
    /// Embedding model baked into the image [default: sentence-transformers/all-MiniLM-L6-v2]
    #[arg(long, value_name = "MODEL")]
    embedding_model: Option<String>,
    /// Reranking model baked into the image
    #[arg(long, value_name = "MODEL")]
    reranking_model: Option<String>,
    /// Platform substituted for $BUILDPLATFORM [default: linux/amd64]
    #[arg(long)]
    platform: Option<String>,
    /// Dockerfile to build from [default: Dockerfile]
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    dockerfile: Option<PathBuf>,
    /// Build context [default: .]
    #[arg(long, value_name = "DIR")]
    context: Option<PathBuf>,
}

impl BuildArgs {
    fn apply(self, config: &mut BuildConfig) {
        set(&mut config.name, self.name);
        set(&mut config.tag, self.tag);
        config.cuda |= self.cuda;
        set(&mut config.cuda_version, self.cuda_version);
        config.ollama |= self.ollama;
        set(&mut config.embedding_model, self.embedding_model);
        set(&mut config.reranking_model, self.reranking_model);
        set(&mut config.platform, self.platform);
        set(&mut config.dockerfile, self.dockerfile);
        set(&mut config.context, self.context);
    }
}

pub async fn build(args: BuildArgs) -> anyhow::Result<()> {
    let mut config = super::load_config()?.build;
    args.apply(&mut config);
    let config = config;

    println!("Building {}...", config.image_ref());
    println!(
        "  CUDA: {} ({})  Ollama: {}  Embedding model: {}",
        config.cuda, config.cuda_version, config.ollama, config.embedding_model
    );

    // Removed on drop, so a failed build below still cleans up.
    let prepared = PreparedDockerfile::prepare(&config.dockerfile, &config.platform)?;
    if prepared.replacements() == 0 {
        tracing::debug!(
            dockerfile = %config.dockerfile.display(),
            "no platform placeholder to rewrite"
        );
    }

    let client = DockerClient::new();
    tokio::select! {
        result = client.build(&config, prepared.path()) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::info!("build interrupted, removing temporary Dockerfile");
            return Err(super::Interrupted.into());
        }
    }
    prepared.close()?;

    println!();
    println!("Built {}", config.image_ref());
    println!(
        "Run it locally with: webui-deploy deploy --image {} --tag {}",
        config.name, config.tag
    );

    Ok(())
}
