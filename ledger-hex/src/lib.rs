//! # Ledger Hex
//!
//! Application service layer and HTTP adapter for the ledger service.
//!
//! ## Architecture
//!
//! - `service/` - Account and transaction services, request context and the
//!   transactional unit-of-work helper
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The services are generic over the repository ports, allowing different
//! repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use inbound::HttpServer;
pub use service::{AccountService, LedgerRepository, RequestContext, TransactionService};
