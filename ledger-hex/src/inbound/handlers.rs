//! HTTP request handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use ledger_types::{
    AccountResponse, CreateAccountRequest, CreateTransactionRequest, TransactionResponse,
};

use super::error::{ApiError, internal_error};
use super::validation::{Validate, parse_account_id};
use crate::openapi::ApiDoc;
use crate::{AccountService, LedgerRepository, RequestContext, TransactionService};

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";
/// Accepted alias of [`REQUEST_ID_HEADER`]; echoed back when present.
pub(crate) const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Application state shared across handlers.
pub struct AppState<R: LedgerRepository> {
    pub accounts: AccountService<R>,
    pub transactions: TransactionService<R>,
    /// Deadline applied to each request's storage work.
    pub request_timeout: Option<Duration>,
}

impl<R: LedgerRepository> AppState<R> {
    /// Builds the service context for one request.
    fn context(&self, headers: &HeaderMap) -> RequestContext {
        let ctx = correlation_id(headers)
            .map(RequestContext::new)
            .unwrap_or_else(RequestContext::generate);

        match self.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

/// The caller's request id, taken from `x-request-id` or `x-correlation-id`.
fn correlation_id(headers: &HeaderMap) -> Option<&str> {
    [REQUEST_ID_HEADER, CORRELATION_ID_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the generated OpenAPI document as YAML.
pub async fn openapi_yaml() -> Response {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => ([(header::CONTENT_TYPE, "application/x-yaml")], yaml).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render OpenAPI YAML");
            internal_error()
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn create_account<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let creation = req.validate().map_err(ApiError::BadRequest)?;

    let ctx = state.context(&headers);
    let account = state.accounts.create_account(&ctx, creation).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Get account by ID.
#[tracing::instrument(skip_all)]
pub async fn get_account<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(raw_id) = path?;
    let account_id = parse_account_id(&raw_id).map_err(ApiError::BadRequest)?;

    let ctx = state.context(&headers);
    let account = state.accounts.get_account_by_id(&ctx, account_id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Post a transaction against an account.
#[tracing::instrument(skip_all)]
pub async fn create_transaction<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let creation = req.validate().map_err(ApiError::BadRequest)?;

    let ctx = state.context(&headers);
    let created = state.transactions.create_transaction(&ctx, creation).await?;
    Ok((StatusCode::CREATED, Json(TransactionResponse::from(created))))
}
