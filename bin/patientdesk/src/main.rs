//! patientdesk - patient records over GraphQL.
//!
//! # Usage
//!
//! ```bash
//! # Serve 50 generated patients on :4000
//! patientdesk serve
//!
//! # Serve a seed file
//! SEED_FILE=data.json patientdesk serve --port 4100
//!
//! # Browse page 3 of the active patients
//! patientdesk browse --status active --page 3
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, fmt};

use patientdesk_client::{ClientConfig, GraphqlPatientGateway, HttpTransport};
use patientdesk_core::metrics::init_metrics;
use patientdesk_core::models::{AgeRange, Gender, PatientFilter, PatientStatus};
use patientdesk_core::ports::{DEFAULT_PAGE_SIZE, Notification, NotificationLevel};
use patientdesk_core::services::{ChannelNotifier, ListView, NavigationOutcome, PatientListService};
use patientdesk_graphql::{ServerConfig, build_schema, serve_with_shutdown};
use patientdesk_storage::{SeedSource, open};

/// patientdesk CLI.
#[derive(Parser, Debug)]
#[command(name = "patientdesk")]
#[command(about = "patientdesk - patient records over GraphQL")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON log output.
    #[arg(long, global = true, env = "JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the GraphQL server over an in-memory store.
    Serve(ServeArgs),
    /// Print one page of the patient list from a running server.
    Browse(BrowseArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// GraphQL server port.
    #[arg(long, env = "GRAPHQL_PORT", default_value = "4000")]
    port: u16,

    /// Prometheus metrics port.
    #[arg(long, env = "METRICS_PORT", default_value = "9090")]
    metrics_port: u16,

    /// JSON seed file shaped like `{"patients": [...]}`.
    #[arg(long, env = "SEED_FILE")]
    seed_file: Option<PathBuf>,

    /// Number of generated patients when no seed file is given.
    #[arg(long, env = "SEED_COUNT", default_value = "50")]
    seed_count: usize,

    /// Do not serve GraphiQL on `/`.
    #[arg(long)]
    no_playground: bool,
}

#[derive(Args, Debug)]
struct BrowseArgs {
    /// GraphQL endpoint.
    #[arg(
        long,
        env = "GRAPHQL_ENDPOINT",
        default_value = "http://localhost:4000/graphql"
    )]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Page to display (1-based).
    #[arg(long, default_value = "1")]
    page: u32,

    /// Records per page (10, 20, 50 or 100).
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Case-insensitive match on name, email or medical record number.
    #[arg(long)]
    search: Option<String>,

    /// active, inactive or pending.
    #[arg(long, value_parser = parse_status)]
    status: Option<PatientStatus>,

    /// male, female or other.
    #[arg(long, value_parser = parse_gender)]
    gender: Option<Gender>,

    /// Minimum age in whole years.
    #[arg(long)]
    min_age: Option<i32>,

    /// Maximum age in whole years.
    #[arg(long)]
    max_age: Option<i32>,

    /// Delete this patient, then show the refreshed page.
    #[arg(long)]
    delete: Option<String>,
}

/// Parse patient status from string.
fn parse_status(s: &str) -> Result<PatientStatus, String> {
    match s.to_lowercase().as_str() {
        "active" => Ok(PatientStatus::Active),
        "inactive" => Ok(PatientStatus::Inactive),
        "pending" => Ok(PatientStatus::Pending),
        _ => Err(format!(
            "Invalid status '{}'. Use 'active', 'inactive' or 'pending'.",
            s
        )),
    }
}

/// Parse gender from string.
fn parse_gender(s: &str) -> Result<Gender, String> {
    match s.to_lowercase().as_str() {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        "other" => Ok(Gender::Other),
        _ => Err(format!(
            "Invalid gender '{}'. Use 'male', 'female' or 'other'.",
            s
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Browse(args) => browse(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    // Prometheus metrics exporter (optional - failures don't crash the app)
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_enabled = match metrics_addr.parse::<std::net::SocketAddr>() {
        Ok(metrics_addr) => {
            match PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                Ok(()) => {
                    init_metrics();
                    true
                }
                Err(e) => {
                    warn!(
                        "⚠️  Failed to start metrics exporter: {}. Continuing without metrics.",
                        e
                    );
                    false
                }
            }
        }
        Err(e) => {
            warn!("⚠️  Invalid metrics address: {}. Continuing without metrics.", e);
            false
        }
    };

    // ─────────────────────────────────────────────────────────────────────────
    // 🚀 STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("🚀 Starting patientdesk server");

    // ─────────────────────────────────────────────────────────────────────────
    // 🗄️ STORE
    // ─────────────────────────────────────────────────────────────────────────
    let seed = match args.seed_file {
        Some(path) => SeedSource::File(path),
        None => SeedSource::Generated(args.seed_count),
    };
    debug!(seed = ?seed, "Seed source");

    let repository = open(&seed).await.context("Failed to seed patient store")?;
    let schema = build_schema(Arc::new(repository));

    // ─────────────────────────────────────────────────────────────────────────
    // ⚡ SERVER START
    // ─────────────────────────────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        enable_playground: !args.no_playground,
    };
    let graphql_port = config.port;

    let graphql_handle = tokio::spawn(
        async move {
            let shutdown_signal = async move {
                while !*shutdown_rx.borrow() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            };

            if let Err(e) = serve_with_shutdown(schema, config, shutdown_signal).await {
                error!(error = %e, "❌ Server error");
            }
            debug!("Server stopped");
        }
        .instrument(info_span!("graphql")),
    );

    // ─────────────────────────────────────────────────────────────────────────
    // ✅ READY
    // ─────────────────────────────────────────────────────────────────────────
    info!("✅ patientdesk ready");
    info!("   ⚡ GraphQL:  http://localhost:{}/graphql", graphql_port);
    if metrics_enabled {
        info!(
            "   📊 Metrics:  http://localhost:{}/metrics",
            args.metrics_port
        );
    } else {
        info!("   📊 Metrics:  disabled");
    }
    info!("   Press Ctrl+C to stop");

    shutdown_signal().await;

    // ─────────────────────────────────────────────────────────────────────────
    // 🛑 SHUTDOWN
    // ─────────────────────────────────────────────────────────────────────────
    info!("🛑 Shutting down...");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(Duration::from_secs(10), graphql_handle).await {
        Ok(_) => debug!("GraphQL stopped"),
        Err(_) => warn!("⚠️  GraphQL shutdown timed out"),
    }

    info!("🛑 Shutdown complete");
    Ok(())
}

async fn browse(args: BrowseArgs) -> Result<()> {
    if args.page == 0 {
        bail!("--page is 1-based");
    }

    let config = ClientConfig {
        endpoint: args.endpoint.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let transport = HttpTransport::new(&config).context("Invalid GraphQL endpoint")?;
    let gateway = Arc::new(GraphqlPatientGateway::new(transport));
    let (notifier, mut notes) = ChannelNotifier::new();
    let service = PatientListService::with_page_size(gateway, Arc::new(notifier), args.page_size)
        .context("Invalid page size")?;

    let age_range = match (args.min_age, args.max_age) {
        (None, None) => None,
        (min, max) => Some(AgeRange { min, max }),
    };
    let filter = PatientFilter {
        search: args.search,
        status: args.status,
        gender: args.gender,
        age_range,
    };

    debug!(endpoint = %args.endpoint, "Browsing patients");
    let result = async {
        service.on_filter_change(filter).await?;
        let outcome = service.on_navigate(args.page).await?;
        if let NavigationOutcome::Stalled { requested, reached } = outcome {
            warn!(requested, reached, "Results end before the requested page");
        }
        if let Some(id) = &args.delete {
            service.delete_patient(id).await?;
        }
        Ok::<_, patientdesk_core::error::ServiceError>(service.view().await)
    }
    .await;

    print_notifications(&mut notes);
    let view = result.context("Failed to load patients")?;
    print_page(&view);
    Ok(())
}

fn print_page(view: &ListView) {
    println!(
        "{:<40} {:<24} {:<32} {:<10} {:<8}",
        "ID", "NAME", "EMAIL", "STATUS", "GENDER"
    );
    for p in &view.records {
        println!(
            "{:<40} {:<24} {:<32} {:<10} {:<8}",
            p.id,
            p.full_name(),
            p.email,
            p.status.as_str(),
            p.gender.as_str()
        );
    }
    println!();
    println!(
        "{}  (page {} of {})",
        view.summary(),
        view.current_page,
        view.total_pages.max(1)
    );
}

fn print_notifications(notes: &mut UnboundedReceiver<Notification>) {
    while let Ok(note) = notes.try_recv() {
        let icon = match note.level {
            NotificationLevel::Success => "✅",
            NotificationLevel::Info => "ℹ️ ",
            NotificationLevel::Warning => "⚠️ ",
            NotificationLevel::Error => "❌",
        };
        eprintln!("{} {}", icon, note.message);
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
