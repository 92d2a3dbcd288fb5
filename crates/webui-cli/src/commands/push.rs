use clap::Args;
use webui_cloud::DockerClient;
use webui_core::PushConfig;

use super::set;

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Local image name [default: truly-open-webui]
    #[arg(short, long)]
    name: Option<String>,
    /// Image tag [default: latest]
    #[arg(short, long)]
    tag: Option<String>,
    /// Docker Hub account to push to (required)
    #[arg(short, long)]
    username: Option<String>,
    /// Destination repository [default: image name]
    #[arg(short, long)]
    repository: Option<String>,
    /// Skip `docker login` (already logged in)
    #[arg(long)]
    skip_login: bool,
}

impl PushArgs {
    fn apply(self, config: &mut PushConfig) {
        set(&mut config.name, self.name);
        set(&mut config.tag, self.tag);
        if self.username.is_some() {
            config.username = self.username;
        }
        if self.repository.is_some() {
            config.repository = self.repository;
        }
        config.skip_login |= self.skip_login;
    }
}

pub async fn push(args: PushArgs) -> anyhow::Result<()> {
    let mut config = super::load_config()?.push;
    args.apply(&mut config);
    let config = config;

    let username = config.require_username()?;
    println!(
        "Pushing {} to {}...",
        config.source_ref(),
        config.destination_ref(username)
    );

    let client = DockerClient::new();
    let remote = client.push_image(&config).await?;

    println!();
    println!("Pushed: docker.io/{remote}");
    println!("Pull it with: docker pull {remote}");

    Ok(())
}
