use clap::Args;
use webui_cloud::{DockerClient, RuntimeSecrets};
use webui_core::LocalConfig;

use super::set;

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Container name, also used for the data volume [default: truly-open-webui]
    #[arg(short, long)]
    name: Option<String>,
    /// Local image name [default: truly-open-webui]
    #[arg(short, long)]
    image: Option<String>,
    /// Image tag [default: latest]
    #[arg(short, long)]
    tag: Option<String>,
    /// Host port mapped to the container's port 8080 [default: 8080]
    #[arg(short, long)]
    port: Option<u16>,
    /// Use host networking so the container can reach Ollama on localhost
    #[arg(short, long)]
    ollama: bool,
    /// OpenAI API key passed to the container
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    /// Session signing key passed to the container
    #[arg(long, env = "WEBUI_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,
}

impl DeployArgs {
    /// Split the secrets off and apply the remaining flags.
    fn apply(self, config: &mut LocalConfig) -> RuntimeSecrets {
        set(&mut config.name, self.name);
        set(&mut config.image, self.image);
        set(&mut config.tag, self.tag);
        set(&mut config.port, self.port);
        config.ollama |= self.ollama;
        RuntimeSecrets::new(self.openai_api_key, self.secret_key)
    }
}

pub async fn deploy(args: DeployArgs) -> anyhow::Result<()> {
    let mut config = super::load_config()?.local;
    let secrets = args.apply(&mut config);
    let config = config;

    println!(
        "Deploying {} as container '{}'...",
        config.image_ref(),
        config.name
    );

    let client = DockerClient::new();
    let container_id = client.deploy_local(&config, &secrets).await?;
    let short_id: String = container_id.chars().take(12).collect();

    println!();
    println!("Container started: {short_id}");
    println!("Open WebUI: http://localhost:{}", config.published_port());
    println!("Data volume: {}-data", config.name);
    println!("Logs: docker logs -f {}", config.name);

    Ok(())
}
