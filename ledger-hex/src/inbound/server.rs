//! HTTP Server configuration and startup.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, Request},
    response::Response,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    request_id::{MakeRequestId, MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::error::internal_error;
use super::handlers::{self, AppState, CORRELATION_ID_HEADER, REQUEST_ID_HEADER};
use crate::openapi::ApiDoc;
use crate::{AccountService, LedgerRepository, TransactionService};

/// Maximum accepted request body size (1 MiB).
pub const BODY_LIMIT: usize = 1024 * 1024;

/// HTTP Server for the Ledger API.
pub struct HttpServer<R: LedgerRepository> {
    state: Arc<AppState<R>>,
}

impl<R: LedgerRepository> HttpServer<R> {
    /// Creates a new HTTP server over both services, with no request deadline.
    pub fn new(accounts: AccountService<R>, transactions: TransactionService<R>) -> Self {
        Self {
            state: Arc::new(AppState {
                accounts,
                transactions,
                request_timeout: None,
            }),
        }
    }

    /// Creates a server whose requests must finish their storage work within `timeout`.
    pub fn with_request_timeout(
        accounts: AccountService<R>,
        transactions: TransactionService<R>,
        timeout: Duration,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                accounts,
                transactions,
                request_timeout: Some(timeout),
            }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        let correlation_id = HeaderName::from_static(CORRELATION_ID_HEADER);

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeCorrelatedRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(PropagateRequestIdLayer::new(correlation_id))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(CompressionLayer::new());

        Router::new()
            .route("/health", get(handlers::health))
            .route("/openapi.yaml", get(handlers::openapi_yaml))
            .route("/accounts", post(handlers::create_account::<R>))
            .route("/accounts/{account_id}", get(handlers::get_account::<R>))
            .route("/transactions", post(handlers::create_transaction::<R>))
            .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
            .layer(DefaultBodyLimit::max(BODY_LIMIT))
            .layer(metrics)
            .layer(middleware)
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Reuses a caller's `x-correlation-id` as the request id, otherwise mints a UUID.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MakeCorrelatedRequestId;

impl MakeRequestId for MakeCorrelatedRequestId {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        match request.headers().get(CORRELATION_ID_HEADER) {
            Some(value) if !value.is_empty() => Some(RequestId::new(value.clone())),
            _ => MakeRequestUuid.make_request_id(request),
        }
    }
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    internal_error()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
