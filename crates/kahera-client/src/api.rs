//! # Backend API
//!
//! Wire types and the HTTP implementation of [`PosBackend`].
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  {base}/products?status=available                                  │
//! │       ◄── [ { _id, name, price, stock, status, ... } ]                  │
//! │           or { data: [ ... ] }                                          │
//! │                                                                         │
//! │  POST {base}/transactions                                               │
//! │       ──► { items: [{productId, quantity, unitPrice, discount}],       │
//! │             paymentMethod, customerType?, ..., discount, tax }          │
//! │       ◄── { _id, transactionNumber, subtotal, tax, discount,            │
//! │             cashierId, cashierName, createdAt, updatedAt }              │
//! │       ◄── 4xx { message, code? }  or plain text                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts travel as decimal pesos and become centavos right here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kahera_core::{
    Cashier, CheckoutDraft, CustomerType, ItemEligibility, Money, PaymentMethod, Product,
    ProductStatus, ServerConfirmation,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

// =============================================================================
// Wire Types
// =============================================================================

fn yes() -> bool {
    true
}

/// Statuses this register does not know are treated as not sellable, so one
/// odd product cannot fail the whole listing.
fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProductStatus, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        None | Some("available") => ProductStatus::Available,
        Some("unavailable") => ProductStatus::Unavailable,
        Some("discontinued") => ProductStatus::Discontinued,
        Some(other) => {
            warn!(status = %other, "Unknown product status, treating as unavailable");
            ProductStatus::Unavailable
        }
    })
}

/// Product as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ProductStatus,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default = "yes")]
    pub discount_eligible: bool,
    #[serde(default = "yes")]
    pub vat_exempt_eligible: bool,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            name: r.name,
            price_cents: Money::from_major_f64(r.price).cents(),
            stock: r.stock,
            status: r.status,
            category: r.category,
            sku: r.sku,
            unit: r.unit,
            min_stock: r.min_stock,
            eligibility: ItemEligibility {
                discount: r.discount_eligible,
                vat_exemption: r.vat_exempt_eligible,
            },
        }
    }
}

/// Either a bare payload or one wrapped in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(t) => t,
        }
    }
}

/// One line of a transaction-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// Total deduction on this line (discount plus exempted VAT).
    pub discount: f64,
}

/// Body of `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub items: Vec<RequestItem>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub discount: f64,
    pub tax: f64,
}

impl From<&CheckoutDraft> for CreateTransactionRequest {
    fn from(draft: &CheckoutDraft) -> Self {
        let items = draft
            .lines
            .iter()
            .map(|line| RequestItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price().to_major_f64(),
                discount: draft
                    .discounts
                    .line(&line.product_id)
                    .map_or(0.0, |d| d.deduction().to_major_f64()),
            })
            .collect();

        CreateTransactionRequest {
            items,
            payment_method: draft.payment_method,
            customer_id: draft.customer_id.clone(),
            customer_name: draft.customer_name.clone(),
            customer_type: draft
                .customer_type
                .is_discounted()
                .then_some(draft.customer_type),
            notes: draft.notes.clone(),
            discount: draft.discount.to_major_f64(),
            tax: draft.tax.to_major_f64(),
        }
    }
}

/// Transaction as confirmed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub transaction_number: String,
    pub subtotal: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub cashier_id: Option<String>,
    #[serde(default)]
    pub cashier_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Converts to core amounts. `fallback` fills in the cashier when the
    /// backend leaves it out.
    pub fn into_confirmation(self, fallback: Option<Cashier>) -> ServerConfirmation {
        let fallback = fallback.unwrap_or_default();
        let cashier = Cashier {
            id: self.cashier_id.unwrap_or(fallback.id),
            name: self.cashier_name.unwrap_or(fallback.name),
        };

        ServerConfirmation {
            id: self.id,
            transaction_number: self.transaction_number,
            subtotal: Money::from_major_f64(self.subtotal),
            tax: Money::from_major_f64(self.tax),
            discount: Money::from_major_f64(self.discount),
            cashier,
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
        }
    }
}

/// Error body sent with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Operations the register needs from the backend.
#[async_trait]
pub trait PosBackend: Send + Sync {
    /// Lists products, optionally filtered by status.
    async fn list_products(&self, status: Option<ProductStatus>) -> ClientResult<Vec<Product>>;

    /// Creates a transaction. The backend arbitrates stock.
    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> ClientResult<TransactionRecord>;

    /// Cashier signed in on this backend connection, if known.
    fn cashier(&self) -> Option<Cashier> {
        None
    }
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// [`PosBackend`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HttpBackend {
    pub fn new(settings: &ApiSettings, session: Session) -> ClientResult<Self> {
        let mut base_url = Url::parse(&settings.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(HttpBackend {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.bearer() {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(api_error(status, &text));
        }

        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.into_inner())
    }
}

/// Maps a failed response to a [`ClientError`].
fn api_error(status: StatusCode, text: &str) -> ClientError {
    let (message, code) = match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => (body.message, body.code),
        Err(_) if !text.trim().is_empty() => (text.trim().to_string(), None),
        Err(_) => (
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            None,
        ),
    };

    if status == StatusCode::UNAUTHORIZED {
        return ClientError::Unauthorized(message);
    }

    ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

#[async_trait]
impl PosBackend for HttpBackend {
    async fn list_products(&self, status: Option<ProductStatus>) -> ClientResult<Vec<Product>> {
        let mut url = self.endpoint("products")?;
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }

        debug!(%url, "Fetching products");
        let response = self.authorize(self.client.get(url)).send().await?;
        let records: Vec<ProductRecord> = Self::handle_response(response).await?;

        Ok(records.into_iter().map(Product::from).collect())
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> ClientResult<TransactionRecord> {
        let url = self.endpoint("transactions")?;

        debug!(%url, items = request.items.len(), "Submitting transaction");
        let response = self
            .authorize(self.client.post(url).json(request))
            .send()
            .await?;

        Self::handle_response(response).await.map_err(|e| {
            warn!(error = %e, "Transaction rejected");
            e
        })
    }

    fn cashier(&self) -> Option<Cashier> {
        self.session.cashier().cloned()
    }
}
