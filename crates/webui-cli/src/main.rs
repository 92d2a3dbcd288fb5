mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use webui_cloud::ExecError;

/// 128 + SIGINT, as a shell reports it.
const INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "webui-deploy",
    about = "Build and deploy Open WebUI to local Docker or Google Cloud Run"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Open WebUI Docker image
    Build(commands::BuildArgs),
    /// Run the image as a local Docker container
    Deploy(commands::DeployArgs),
    /// Tag and push the image to Docker Hub
    Push(commands::PushArgs),
    /// Deploy an image to Google Cloud Run
    CloudDeploy(commands::CloudDeployArgs),
    /// Resolve the secret key and start the Open WebUI server (container entrypoint)
    Start(commands::StartArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="unset or invalid RUST_LOG falls back to the info level"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Flags backed by env vars (OPENAI_API_KEY, WEBUI_SECRET_KEY) may come from .env
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    tracing::debug!(dotenv = dotenv_loaded, "environment loaded");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_exit(&err),
    };

    let result = match cli.command {
        Commands::Build(args) => commands::build(args).await,
        Commands::Deploy(args) => commands::deploy(args).await,
        Commands::Push(args) => commands::push(args).await,
        Commands::CloudDeploy(args) => commands::cloud_deploy(args).await,
        Commands::Start(args) => commands::start(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            exit_code(&err)
        }
    }
}

/// Help and version exit 0; every usage error exits 1.
fn usage_exit(err: &clap::Error) -> ExitCode {
    // arch-lint: allow(no-error-swallowing) reason="clap could not write its own message; nothing left to report it on but stderr"
    if let Err(io) = err.print() {
        eprintln!("{io}");
    }
    if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// 130 when interrupted, a failed external command's own exit status,
/// otherwise 1.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    if err.is::<commands::Interrupted>() {
        return ExitCode::from(INTERRUPTED);
    }

    let code = err
        .chain()
        .find_map(|e| e.downcast_ref::<ExecError>())
        .and_then(ExecError::exit_code);

    match code.map(u8::try_from) {
        Some(Ok(c)) if c != 0 => ExitCode::from(c),
        _ => ExitCode::FAILURE,
    }
}
