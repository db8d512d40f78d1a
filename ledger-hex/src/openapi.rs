//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use ledger_types::dto::{
    AccountResponse, CreateAccountRequest, CreateTransactionRequest, ErrorResponse,
    TransactionResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Open a new account
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 409, description = "Document number already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    )
)]
async fn create_account() {}

/// Get account by ID
#[utoipa::path(
    get,
    path = "/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 400, description = "Account ID is not an integer", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
async fn get_account() {}

/// Post a transaction against an account
///
/// Purchases, installment purchases and withdrawals are stored with a
/// negative amount; payments with a positive one.
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = TransactionResponse),
        (status = 400, description = "Invalid request, operation type or amount", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    )
)]
async fn create_transaction() {}

/// OpenAPI documentation for the Ledger API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger Service API",
        version = "1.0.0",
        description = "Accounts keyed by document number, and signed transactions posted against them.",
        license(name = "MIT"),
    ),
    paths(health, create_account, get_account, create_transaction),
    components(
        schemas(
            CreateAccountRequest,
            AccountResponse,
            CreateTransactionRequest,
            TransactionResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Account management operations"),
        (name = "transactions", description = "Transaction posting"),
    )
)]
pub struct ApiDoc;
