use clap::Args;
use webui_cloud::GcloudClient;
use webui_core::{CloudRunConfig, EnvVar};

use super::set;

#[derive(Args, Debug)]
pub struct CloudDeployArgs {
    /// GCP project ID (required)
    #[arg(short, long)]
    project: Option<String>,
    /// GCP region [default: us-central1]
    #[arg(short, long)]
    region: Option<String>,
    /// Cloud Run service name [default: truly-open-webui]
    #[arg(short, long)]
    service: Option<String>,
    /// Image to deploy [default: ghcr.io/open-webui/open-webui:main]
    #[arg(short, long)]
    image: Option<String>,
    /// CPU count [default: 2]
    #[arg(long)]
    cpu: Option<u32>,
    /// Memory allocation [default: 4Gi]
    #[arg(long)]
    memory: Option<String>,
    /// Minimum instances [default: 0]
    #[arg(long)]
    min_instances: Option<u32>,
    /// Maximum instances [default: 3]
    #[arg(long)]
    max_instances: Option<u32>,
    /// Max concurrent requests per instance [default: 80]
    #[arg(long)]
    concurrency: Option<u32>,
    /// Request timeout in seconds [default: 300]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u32>,
    /// Container port, also injected as PORT [default: 8080]
    #[arg(long)]
    port: Option<u16>,
    /// Ingress policy: all, internal, internal-and-cloud-load-balancing [default: all]
    #[arg(long)]
    ingress: Option<String>,
    /// Environment variable for the service; repeatable
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    env: Vec<EnvVar>,
    /// Cloud SQL instance connection name to attach
    #[arg(long, value_name = "CONNECTION_NAME")]
    sql_instance: Option<String>,
    /// Serverless VPC Access connector
    #[arg(long, value_name = "CONNECTOR")]
    vpc_connector: Option<String>,
    /// Service account the revision runs as
    #[arg(long, value_name = "EMAIL")]
    service_account: Option<String>,
    /// Require authentication (do not allow public access)
    #[arg(long)]
    authenticate: bool,
}

impl CloudDeployArgs {
    fn apply(self, config: &mut CloudRunConfig) {
        if self.project.is_some() {
            config.project = self.project;
        }
        set(&mut config.region, self.region);
        set(&mut config.service, self.service);
        set(&mut config.image, self.image);
        set(&mut config.cpu, self.cpu);
        set(&mut config.memory, self.memory);
        set(&mut config.min_instances, self.min_instances);
        set(&mut config.max_instances, self.max_instances);
        set(&mut config.concurrency, self.concurrency);
        set(&mut config.timeout, self.timeout);
        set(&mut config.port, self.port);
        set(&mut config.ingress, self.ingress);
        // Config file entries first, then flags, in the order given.
        config.env.extend(self.env);
        if self.sql_instance.is_some() {
            config.sql_instance = self.sql_instance;
        }
        if self.vpc_connector.is_some() {
            config.vpc_connector = self.vpc_connector;
        }
        if self.service_account.is_some() {
            config.service_account = self.service_account;
        }
        config.authenticate |= self.authenticate;
    }
}

pub async fn cloud_deploy(args: CloudDeployArgs) -> anyhow::Result<()> {
    let mut config = super::load_config()?.cloud_run;
    args.apply(&mut config);
    let config = config;

    let project_id = config.require_project()?;
    println!(
        "Deploying '{}' to Cloud Run ({}, project {project_id})...",
        config.service, config.region
    );

    let client = GcloudClient::new();
    let url = client.deploy_service(&config).await?;

    println!();
    println!("Deployed: {url}");
    if config.authenticate {
        println!("Public access is disabled; grant roles/run.invoker to allowed callers.");
    }

    Ok(())
}
