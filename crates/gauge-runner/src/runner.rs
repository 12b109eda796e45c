// Runner bootstrap: command line, logging, settings and the message loop.
//
// A step crate builds its `StepRegistry` in `main` and hands it to `run`:
//
//   fn main() -> ExitCode {
//       gauge_runner::run(StepRegistry::new().step("Say {}", |s: String| println!("{s}")))
//   }

use anyhow::{Context, Result};
use clap::Parser;
use gauge_common::constants::variables;
use gauge_common::{GaugeConnection, RunnerSettings};
use std::process::ExitCode;
use std::sync::Arc;

use crate::context::GaugeContext;
use crate::dispatcher::MessageDispatcher;
use crate::registry::StepRegistry;

/// Command-line arguments for a runner process.
#[derive(Parser, Debug)]
#[command(name = "gauge-runner", about = "Gauge language runner for Rust step implementations")]
pub struct Args {
    /// Port of the Gauge message endpoint; overrides GAUGE_INTERNAL_PORT.
    #[arg(long)]
    pub port: Option<u16>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,

    /// Print the registered step descriptions and exit.
    #[arg(long)]
    pub list: bool,
}

/// Parse the command line and run until Gauge stops the runner.
pub fn run(registry: StepRegistry) -> ExitCode {
    run_with_args(Args::parse(), registry)
}

/// Like [`run`], with already-parsed arguments.
pub fn run_with_args(args: Args, registry: StepRegistry) -> ExitCode {
    init_tracing(&args.log_level);

    if args.list {
        for description in registry.descriptions() {
            println!("{description}");
        }
        return ExitCode::SUCCESS;
    }

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to build Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(settings, registry)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Runner failed with error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Connect to Gauge and serve messages with the given steps.
pub async fn serve(settings: RunnerSettings, registry: StepRegistry) -> Result<()> {
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        steps = registry.len(),
        "Runner process starting"
    );
    if let Some(ref root) = settings.project_root {
        tracing::debug!(project_root = %root.display(), "Project root");
    }

    let context = Arc::new(GaugeContext::new(registry));
    let dispatcher = MessageDispatcher::new(context);

    let mut connection = GaugeConnection::connect(&settings.host, settings.port)
        .await
        .context("Failed to connect to Gauge")?;

    dispatcher.run(&mut connection).await
}

fn load_settings(args: &Args) -> Result<RunnerSettings> {
    match args.port {
        // An explicit --port stands in for GAUGE_INTERNAL_PORT.
        Some(port) => RunnerSettings::from_lookup(|name| {
            if name == variables::INTERNAL_PORT {
                Some(port.to_string())
            } else {
                std::env::var(name).ok()
            }
        }),
        None => RunnerSettings::from_env(),
    }
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout belongs to step output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
