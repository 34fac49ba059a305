//! # kahera-client: Backend Access for Kahera POS
//!
//! Owns every network call the register makes and the state shared with
//! background tasks.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Completion                              │
//! │                                                                         │
//! │  ┌───────────────────┐        ┌──────────────────────────────────────┐ │
//! │  │  StockValidator   │        │       TransactionSubmitter           │ │
//! │  │  advisory check   │        │  submit, reconcile, history,         │ │
//! │  │  before checkout  │        │  post-sale refresh (spawned)         │ │
//! │  └─────────┬─────────┘        └──────────────┬───────────────────────┘ │
//! │            │                                 │                         │
//! │            ▼                                 ▼                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐ │
//! │  │  PosBackend (trait)  ◄── HttpBackend (reqwest)                   │ │
//! │  └──────────────────────────────────────────────────────────────────┘ │
//! │            │                                 │                         │
//! │            ▼                                 ▼                         │
//! │  ┌─────────────────────────┐       ┌──────────────────────────────┐   │
//! │  │ SharedCatalog           │       │ EventBus                     │   │
//! │  │ Arc<RwLock<Catalog>>    │       │ TransactionCompleted/Failed, │   │
//! │  │                         │       │ InventoryRefreshed, Drift    │   │
//! │  └─────────────────────────┘       └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - Wire types, `PosBackend` trait, `HttpBackend`
//! - [`catalog`] - Cached product list
//! - [`config`] - Register configuration (TOML + environment)
//! - [`error`] - Client and checkout error types
//! - [`events`] - Broadcast notifications
//! - [`session`] - Bearer token and signed-in cashier
//! - [`stock`] - Pre-checkout stock validation
//! - [`submitter`] - Transaction submission and reconciliation

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod stock;
pub mod submitter;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{CreateTransactionRequest, HttpBackend, PosBackend, TransactionRecord};
pub use catalog::{refresh_catalog, ProductCatalog, SharedCatalog};
pub use config::PosConfig;
pub use error::{CheckoutError, ClientError, ClientResult, RejectionKind};
pub use events::{EventBus, PosEvent};
pub use session::Session;
pub use stock::{StockValidation, StockValidator};
pub use submitter::TransactionSubmitter;
