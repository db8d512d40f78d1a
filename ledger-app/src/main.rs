//! # Ledger Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize logging and optional trace export
//! - Initialize the repository adapter selected by the database URL
//! - Create the account and transaction services
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledger_hex::{AccountService, HttpServer, LedgerRepository, TransactionService};
use ledger_repo::{Backend, PostgresParts};

use config::{Config, Database, LogFormat};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking).
    // The endpoint is read from OTEL_EXPORTER_OTLP_ENDPOINT.
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("ledger-service"), provider))
}

/// Installs the global subscriber. Returns the trace provider when OTLP export is on.
fn init_tracing(config: &Config) -> anyhow::Result<Option<sdktrace::SdkTracerProvider>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter()))?;

    let (text, json) = match config.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    let (telemetry, provider) = match config.otlp_endpoint {
        Some(_) => {
            let (tracer, provider) = init_tracer()?;
            (
                Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                Some(provider),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .with(telemetry)
        .try_init()?;

    Ok(provider)
}

/// Builds both services over one repository and serves until shutdown.
async fn serve<R: LedgerRepository>(repo: R, config: &Config) -> anyhow::Result<()> {
    let repo = Arc::new(repo);
    let accounts = AccountService::new(Arc::clone(&repo));
    let transactions = TransactionService::new(repo);

    let server = match config.request_timeout {
        Some(timeout) => HttpServer::with_request_timeout(accounts, transactions, timeout),
        None => HttpServer::new(accounts, transactions),
    };
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let url = match &config.database {
        Database::Url(url) => url,
        Database::Parts(parts) => return run_postgres_parts(parts, config).await,
    };
    let backend =
        Backend::from_url(url).ok_or_else(|| anyhow::anyhow!("unsupported database URL scheme"))?;

    tracing::info!(%backend, max_connections = config.max_connections, "connecting to database");

    match backend {
        #[cfg(feature = "postgres")]
        Backend::Postgres => {
            let repo = ledger_repo::PostgresRepo::new(url, config.max_connections).await?;
            serve(repo, config).await
        }
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            let repo = ledger_repo::SqliteRepo::new(url, config.max_connections).await?;
            serve(repo, config).await
        }
        #[allow(unreachable_patterns)]
        _ => anyhow::bail!("the {backend} backend is not compiled in; enable the `{backend}` feature"),
    }
}

#[cfg(feature = "postgres")]
async fn run_postgres_parts(parts: &PostgresParts, config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        host = %parts.host,
        port = parts.port,
        database = %parts.database,
        max_connections = config.max_connections,
        "connecting to database"
    );
    let repo = ledger_repo::PostgresRepo::from_parts(parts, config.max_connections).await?;
    serve(repo, config).await
}

#[cfg(not(feature = "postgres"))]
async fn run_postgres_parts(_parts: &PostgresParts, _config: &Config) -> anyhow::Result<()> {
    anyhow::bail!("DB_* settings need the postgres backend; enable the `postgres` feature or set DATABASE_URL")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    let otel_provider = init_tracing(&config)?;

    tracing::info!("Starting ledger server on port {}", config.port);

    let result = run(&config).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "server stopped with an error");
    }

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "failed to flush traces");
        }
    }
    result
}
