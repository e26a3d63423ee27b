//! mesos-exporter - Prometheus exporter for Mesos master state.
//!
//! Serves `/metrics`; every scrape fetches the master's `/state` document and
//! recomputes agent and framework resource gauges from it.

mod handlers;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use mesos_exporter_core::collector::{DEFAULT_STATE_PATH, HttpStateSource, MasterCollector};
use mesos_exporter_core::metrics::RegistryBuilder;

use handlers::SharedCollector;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "mesos-exporter",
    about = "Prometheus exporter for Mesos master state",
    version = mesos_exporter_core::VERSION
)]
struct Args {
    /// Base URL of the Mesos master.
    #[arg(long, default_value = "http://127.0.0.1:5050", env = "MESOS_EXPORTER_MASTER")]
    master: String,

    /// State endpoint path on the master (older masters: /master/state).
    #[arg(long, default_value = DEFAULT_STATE_PATH, env = "MESOS_EXPORTER_STATE_PATH")]
    state_path: String,

    /// Listen address for the metrics endpoint.
    #[arg(long, default_value = "0.0.0.0:9105", env = "MESOS_EXPORTER_LISTEN")]
    listen: String,

    /// Timeout in seconds for fetching the master state.
    #[arg(long, default_value = "10", env = "MESOS_EXPORTER_TIMEOUT")]
    timeout: u64,

    /// Comma-separated agent attributes to export as labels of
    /// mesos_slave_attributes. Empty disables the metric.
    #[arg(long, env = "MESOS_EXPORTER_SLAVE_ATTRIBUTES", value_delimiter = ',')]
    slave_attributes: Vec<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber. `RUST_LOG` directives are applied on
/// top of the level chosen by `-v`/`-q`.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["mesos_exporter", "mesos_exporter_core", "tower_http"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let attributes: Vec<String> = args
        .slave_attributes
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let registry = match RegistryBuilder::new()
        .with_slave_attributes(&attributes)
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, attributes = ?attributes, "invalid --slave-attributes");
            process::exit(2);
        }
    };

    // The blocking client must be built and dropped outside the runtime.
    let source = match HttpStateSource::new(&args.master, Duration::from_secs(args.timeout)) {
        Ok(s) => s.with_path(&args.state_path),
        Err(e) => {
            error!(error = %e, "failed to create HTTP client");
            process::exit(1);
        }
    };

    info!(
        version = mesos_exporter_core::VERSION,
        master = %args.master,
        metrics = registry.len(),
        "mesos-exporter starting"
    );

    let collector: SharedCollector<HttpStateSource> =
        Arc::new(MasterCollector::new(source, registry));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve(Arc::clone(&collector), &args.listen)) {
        error!(error = %e, "server error");
        process::exit(1);
    }
}

async fn serve(collector: SharedCollector<HttpStateSource>, listen: &str) -> std::io::Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let app = handlers::router(collector)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
