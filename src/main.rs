use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use genie_proxy::domain::{
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_MAX_POLL_INTERVAL, DEFAULT_POLL_INTERVAL,
};
use genie_proxy::{serve, Commands, Container, ContainerConfig, PollPolicy, Router};

#[derive(Parser)]
#[command(name = "genie-proxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Databricks workspace URL; `https://` is added when no scheme is given
    #[arg(long, global = true, env = "DATABRICKS_HOST")]
    host: Option<String>,

    /// Pre-shared access token, takes precedence over client credentials
    #[arg(long, global = true, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, global = true, env = "DATABRICKS_CLIENT_ID")]
    client_id: Option<String>,

    #[arg(
        long,
        global = true,
        env = "DATABRICKS_CLIENT_SECRET",
        hide_env_values = true
    )]
    client_secret: Option<String>,

    #[arg(long, global = true, env = "DATABRICKS_GENIE_SPACE_ID")]
    space_id: Option<String>,

    #[arg(long, global = true, env = "GENIE_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_interval_ms: u64,

    #[arg(long, global = true, env = "GENIE_MAX_POLL_INTERVAL_MS", default_value_t = DEFAULT_MAX_POLL_INTERVAL.as_millis() as u64)]
    max_poll_interval_ms: u64,

    #[arg(
        long,
        global = true,
        env = "GENIE_MAX_POLL_ATTEMPTS",
        default_value_t = DEFAULT_MAX_POLL_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_poll_attempts: u32,

    #[arg(long, global = true, env = "GENIE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            host: self.host.clone(),
            token: self.token.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            space_id: self.space_id.clone(),
            poll_policy: PollPolicy::new(
                Duration::from_millis(self.poll_interval_ms),
                Duration::from_millis(self.max_poll_interval_ms),
                self.max_poll_attempts,
            ),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // stdout carries command output only
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(cli.container_config())?;
    container.warn_if_incomplete();

    if let Commands::Serve { port, public } = cli.command {
        let ip = if public {
            Ipv4Addr::UNSPECIFIED
        } else {
            Ipv4Addr::LOCALHOST
        };
        return serve(SocketAddr::from((ip, port)), container.app_state()).await;
    }

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}
