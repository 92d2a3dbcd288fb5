use std::path::PathBuf;

use clap::Args;
use secrecy::SecretString;
use webui_cloud::{CommandExecutor, RealExecutor};
use webui_core::secret_key::{self, DEFAULT_KEY_FILE};
use webui_core::{CONTAINER_PORT, CommandSpec};

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Address the server binds to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port the server listens on
    #[arg(long, env = "PORT", default_value_t = CONTAINER_PORT)]
    port: u16,
    /// File holding the generated secret key
    #[arg(long, value_name = "PATH", default_value = DEFAULT_KEY_FILE)]
    key_file: PathBuf,
    /// Session signing key; generated and stored in --key-file when unset
    #[arg(long, env = "WEBUI_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,
}

fn server_command(host: &str, port: u16, secret_key: SecretString) -> CommandSpec {
    CommandSpec::new("uvicorn")
        .arg("open_webui.main:app")
        .arg("--host")
        .arg(host)
        .arg("--port")
        .arg(port.to_string())
        .args(["--forwarded-allow-ips", "*"])
        .secret_env("WEBUI_SECRET_KEY", secret_key)
        .env("HF_HUB_OFFLINE", "0")
}

pub async fn start(args: StartArgs) -> anyhow::Result<()> {
    let (key, source) = secret_key::resolve(args.secret_key.as_deref(), &args.key_file)?;
    tracing::info!(?source, "secret key resolved");

    let cmd = server_command(&args.host, args.port, key);
    tracing::info!(host = %args.host, port = args.port, "starting Open WebUI");
    RealExecutor.exec_streaming(&cmd).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_command_binds_host_and_port() {
        let cmd = server_command("0.0.0.0", 8080, SecretString::from("k".to_owned()));

        assert_eq!(cmd.program(), "uvicorn");
        assert_eq!(
            cmd.to_args(),
            vec![
                "open_webui.main:app",
                "--host",
                "0.0.0.0",
                "--port",
                "8080",
                "--forwarded-allow-ips",
                "*",
            ]
        );
    }

    #[test]
    fn server_command_passes_key_and_disables_offline_mode() {
        let cmd = server_command("127.0.0.1", 3000, SecretString::from("s3cret".to_owned()));

        assert_eq!(
            cmd.to_envs(),
            vec![
                ("WEBUI_SECRET_KEY".to_owned(), "s3cret".to_owned()),
                ("HF_HUB_OFFLINE".to_owned(), "0".to_owned()),
            ]
        );
        assert!(!cmd.to_string().contains("s3cret"));
    }
}
