//! CEP weather services.
//!
//! # Architecture Overview
//!
//! ```text
//!   client ──POST /cep──▶ ┌──────────┐ ──POST /weather──▶ ┌────────────┐ ──▶ postal directory
//!                         │   edge   │   (traceparent)    │ resolution │
//!   client ◀───────────── │  :8080   │ ◀───────────────── │   :8081    │ ──▶ weather API
//!                         └────┬─────┘                    └─────┬──────┘
//!                              │            spans               │
//!                              └──────────▶ zipkin ◀────────────┘
//! ```
//!
//! One binary, one service per process: `cep-weather edge` or
//! `cep-weather resolution`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use cep_weather::config::{load_config, AppConfig, ServiceRole};
use cep_weather::http::{EdgeServer, ResolutionServer};
use cep_weather::lifecycle::{wait_for_signal, Shutdown};
use cep_weather::observability::{logging, metrics, telemetry, Telemetry};

#[derive(Parser)]
#[command(name = "cep-weather", version)]
#[command(about = "CEP to temperature edge and resolution services", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the client-facing service (POST /cep)
    Edge {
        /// Override `edge.bind_address`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the city and temperature service (POST /weather)
    Resolution {
        /// Override `resolution.bind_address`
        #[arg(long)]
        bind: Option<String>,
    },
}

impl Commands {
    fn role(&self) -> ServiceRole {
        match self {
            Commands::Edge { .. } => ServiceRole::Edge,
            Commands::Resolution { .. } => ServiceRole::Resolution,
        }
    }

    fn bind(&self) -> Option<&str> {
        match self {
            Commands::Edge { bind } | Commands::Resolution { bind } => bind.as_deref(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let role = cli.command.role();
    let config = load_config(cli.config.as_deref(), role, cli.command.bind())?;
    let service_name = config.service_name(role).to_string();

    // The Zipkin exporter's blocking HTTP client must be created and dropped
    // outside the async runtime.
    let provider = telemetry::tracer_provider(&service_name, &config.observability.tracing)?;
    let dispatch = logging::init_logging(&config.observability, &provider)?;
    let telemetry = Telemetry::new(&service_name, dispatch);

    tracing::info!(
        service = %service_name,
        version = env!("CARGO_PKG_VERSION"),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        span_export = config.observability.tracing.enabled,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let served = runtime.block_on(run(&config, role, telemetry));
    drop(runtime);

    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "Span export did not drain before exit");
    }
    served?;

    tracing::info!(service = %service_name, "Shutdown complete");
    Ok(())
}

async fn run(config: &AppConfig, role: ServiceRole, telemetry: Telemetry) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let listener = TcpListener::bind(config.bind_address(role)).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        let draining = signal_shutdown.trigger();
        tracing::info!(listeners = draining, "Shutdown signalled, draining in-flight requests");
    });

    match role {
        ServiceRole::Edge => EdgeServer::new(config, telemetry)?.run(listener, server_shutdown).await?,
        ServiceRole::Resolution => {
            ResolutionServer::new(config, telemetry)?
                .run(listener, server_shutdown)
                .await?
        }
    }
    Ok(())
}
