//! # Transaction Submitter
//!
//! Sends a priced sale to the backend and reconciles the result.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_transaction(cart, draft)                                      │
//! │        │                                                                │
//! │        ├── another submission in flight? ──► SubmissionInProgress      │
//! │        ├── empty cart / stale draft / bad tender? ──► Invalid          │
//! │        ▼                                                                │
//! │  POST /transactions                                                     │
//! │        │                                                                │
//! │   ┌────┴──────────────────────┐                                        │
//! │   ▼ 2xx                       ▼ error                                   │
//! │  merge server fields          keep cart                                 │
//! │  prepend to history           await product refresh                     │
//! │  clear cart                   update cart ceilings                      │
//! │  spawn product refresh        classify (code, then message text)       │
//! │  TransactionCompleted         TransactionFailed                         │
//! │   │                            │                                        │
//! │   ▼                            ▼                                        │
//! │  Ok(Transaction)              Err(CheckoutError)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`Transaction`] only ever exists after the backend confirmed it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kahera_core::{Cart, CheckoutDraft, CoreError, Money, Transaction};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::{CreateTransactionRequest, PosBackend};
use crate::catalog::{refresh_catalog, SharedCatalog};
use crate::error::{CheckoutError, ClientError, RejectionKind};
use crate::events::{EventBus, PosEvent};

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits sales and keeps the session's transaction history.
pub struct TransactionSubmitter {
    backend: Arc<dyn PosBackend>,
    catalog: SharedCatalog,
    events: EventBus,
    cash_limit: Money,
    /// Newest first.
    history: RwLock<Vec<Transaction>>,
    in_flight: AtomicBool,
    refresh: Mutex<Option<JoinHandle<()>>>,
}

impl TransactionSubmitter {
    pub fn new(
        backend: Arc<dyn PosBackend>,
        catalog: SharedCatalog,
        events: EventBus,
        cash_limit: Money,
    ) -> Self {
        TransactionSubmitter {
            backend,
            catalog,
            events,
            cash_limit,
            history: RwLock::new(Vec::new()),
            in_flight: AtomicBool::new(false),
            refresh: Mutex::new(None),
        }
    }

    /// Returns true while a submission is waiting on the backend.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Confirmed transactions of this session, newest first.
    pub async fn history(&self) -> Vec<Transaction> {
        self.history.read().await.clone()
    }

    pub async fn last_transaction(&self) -> Option<Transaction> {
        self.history.read().await.first().cloned()
    }

    /// Submits `draft` and reconciles `cart` with the outcome.
    ///
    /// ## On Success
    /// The cart is cleared and a product refresh is started before this
    /// returns; use [`Self::wait_for_refresh`] to await it.
    ///
    /// ## On Failure
    /// The cart is kept. Products are re-fetched and the cart's stock
    /// ceilings updated before the error is returned.
    pub async fn complete_transaction(
        &self,
        cart: &mut Cart,
        draft: CheckoutDraft,
    ) -> Result<Transaction, CheckoutError> {
        let _in_flight =
            InFlight::acquire(&self.in_flight).ok_or(CheckoutError::SubmissionInProgress)?;

        self.check_locally(cart, &draft)?;

        let request = CreateTransactionRequest::from(&draft);
        debug!(
            provisional_id = %draft.provisional_id,
            lines = request.items.len(),
            total = %draft.total,
            "Submitting transaction"
        );

        match self.backend.create_transaction(&request).await {
            Ok(record) => {
                let transaction = draft.confirm(record.into_confirmation(self.backend.cashier()));

                self.history.write().await.insert(0, transaction.clone());
                cart.clear_cart();
                self.spawn_refresh().await;

                info!(
                    transaction_number = %transaction.transaction_number,
                    total = %transaction.total(),
                    change = %transaction.change(),
                    customer_type = %transaction.customer_type,
                    "Transaction completed"
                );
                self.events.publish(PosEvent::TransactionCompleted {
                    transaction_id: transaction.id.clone(),
                    transaction_number: transaction.transaction_number.clone(),
                    total: transaction.total(),
                });

                Ok(transaction)
            }
            Err(err) => {
                self.refresh_after_failure(cart).await;

                let failure = classify_failure(err, &draft);
                match &failure {
                    CheckoutError::Rejected { .. } => {
                        warn!(error = %failure, "Transaction rejected")
                    }
                    _ => error!(error = %failure, "Transaction failed"),
                }
                self.events.publish(PosEvent::TransactionFailed {
                    message: failure.to_string(),
                });

                Err(failure)
            }
        }
    }

    /// Waits for the most recent post-sale product refresh, if any.
    pub async fn wait_for_refresh(&self) {
        let handle = self.refresh.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Product refresh task ended abnormally");
            }
        }
    }

    fn check_locally(&self, cart: &Cart, draft: &CheckoutDraft) -> Result<(), CheckoutError> {
        if draft.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        if !priced_from(draft, cart) {
            return Err(CoreError::CartChanged.into());
        }

        if draft.change.is_negative() {
            return Err(CoreError::InvalidTender {
                reason: format!(
                    "cash {} is less than the total {}",
                    draft.cash_received, draft.total
                ),
            }
            .into());
        }

        if draft.cash_received > self.cash_limit {
            return Err(CoreError::InvalidTender {
                reason: format!(
                    "cash {} exceeds the {} limit",
                    draft.cash_received, self.cash_limit
                ),
            }
            .into());
        }

        Ok(())
    }

    async fn spawn_refresh(&self) {
        let backend = Arc::clone(&self.backend);
        let catalog = self.catalog.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            match refresh_catalog(backend.as_ref(), &catalog).await {
                Ok(products) => events.publish(PosEvent::InventoryRefreshed {
                    product_count: products.len(),
                }),
                Err(e) => warn!(error = %e, "Post-sale product refresh failed"),
            }
        });

        *self.refresh.lock().await = Some(handle);
    }

    async fn refresh_after_failure(&self, cart: &mut Cart) {
        match refresh_catalog(self.backend.as_ref(), &self.catalog).await {
            Ok(products) => {
                let over = cart.refresh_stock(&products);
                if over > 0 {
                    warn!(lines = over, "Cart exceeds refreshed stock");
                }
                self.events.publish(PosEvent::InventoryRefreshed {
                    product_count: products.len(),
                });
            }
            Err(e) => warn!(error = %e, "Product refresh after failed sale failed"),
        }
    }
}

/// True when `draft` still carries exactly the lines of `cart`.
fn priced_from(draft: &CheckoutDraft, cart: &Cart) -> bool {
    let items = cart.items();
    draft.lines.len() == items.len()
        && draft.lines.iter().zip(items).all(|(line, item)| {
            line.product_id == item.product_id
                && line.quantity == item.quantity
                && line.unit_price_cents == item.unit_price_cents
        })
}

// =============================================================================
// Failure Classification
// =============================================================================

/// Turns a backend failure into what the cashier should do next.
///
/// The backend's `code` decides when present; otherwise the message text
/// is matched.
fn classify_failure(err: ClientError, draft: &CheckoutDraft) -> CheckoutError {
    let ClientError::Api { message, code, .. } = &err else {
        return CheckoutError::Backend(err);
    };

    let kind = match code.as_deref() {
        Some("PRODUCT_UNAVAILABLE") => Some(Kind::Unavailable),
        Some("INSUFFICIENT_STOCK") => Some(Kind::Insufficient),
        Some("OUT_OF_STOCK") => Some(Kind::OutOfStock),
        _ => kind_from_message(message),
    };

    let Some(kind) = kind else {
        return CheckoutError::Backend(err);
    };

    match kind {
        Kind::Unavailable => {
            let product = draft
                .lines
                .iter()
                .find(|l| message.contains(&l.name))
                .map(|l| l.name.clone())
                .unwrap_or_else(|| "An item in the cart".to_string());
            CheckoutError::Rejected {
                message: format!(
                    "{} is no longer available. Please remove it from the cart.",
                    product
                ),
                kind: RejectionKind::ProductUnavailable { product },
            }
        }
        Kind::Insufficient => CheckoutError::Rejected {
            kind: RejectionKind::InsufficientStock,
            message: format!(
                "{}. {}",
                message.trim().trim_end_matches('.'),
                "Another cashier may have just purchased this item; please adjust the quantity."
            ),
        },
        Kind::OutOfStock => CheckoutError::Rejected {
            kind: RejectionKind::OutOfStock,
            message: "One or more items are out of stock. Please review the cart and try again."
                .to_string(),
        },
    }
}

enum Kind {
    Unavailable,
    Insufficient,
    OutOfStock,
}

fn kind_from_message(message: &str) -> Option<Kind> {
    let lower = message.to_lowercase();
    if lower.contains("not available") {
        Some(Kind::Unavailable)
    } else if lower.contains("insufficient stock") {
        Some(Kind::Insufficient)
    } else if lower.contains("out of stock") {
        Some(Kind::OutOfStock)
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductCatalog;
    use crate::testing::{api_error, product, MockBackend};
    use kahera_core::{CheckoutParams, CustomerType, DiscountPolicy, Product};
    use tokio::sync::Notify;

    const LIMIT: Money = Money::from_cents(1_000_000);

    struct Fixture {
        backend: Arc<MockBackend>,
        catalog: SharedCatalog,
        events: EventBus,
        submitter: Arc<TransactionSubmitter>,
    }

    fn fixture(backend: MockBackend) -> Fixture {
        let backend = Arc::new(backend);
        let catalog = ProductCatalog::shared();
        let events = EventBus::default();
        let submitter = Arc::new(TransactionSubmitter::new(
            backend.clone(),
            catalog.clone(),
            events.clone(),
            LIMIT,
        ));
        Fixture {
            backend,
            catalog,
            events,
            submitter,
        }
    }

    fn cart_of(products: &[(&Product, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (p, qty) in products {
            cart.add_to_cart(p).unwrap();
            cart.update_quantity(&p.id, *qty).unwrap();
        }
        cart
    }

    fn draft(cart: &Cart, cash_pesos: i64, customer_type: CustomerType) -> CheckoutDraft {
        CheckoutDraft::build(
            cart,
            CheckoutParams {
                cash_received: Money::from_major_minor(cash_pesos, 0),
                customer_type,
                ..Default::default()
            },
            &DiscountPolicy::default(),
            LIMIT,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_records_history() {
        let a = product("a", 5000, 10);
        let b = product("b", 3000, 10);
        let f = fixture(MockBackend::with_products(vec![a.clone(), b.clone()]));
        let mut rx = f.events.subscribe();

        let mut cart = cart_of(&[(&a, 2), (&b, 1)]);
        let checkout_draft = draft(&cart, 200, CustomerType::Regular);
        let tx = f
            .submitter
            .complete_transaction(&mut cart, checkout_draft)
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(tx.transaction_number, "TXN-000001");
        assert_eq!(tx.total(), Money::from_cents(13000));
        assert_eq!(tx.change(), Money::from_cents(7000));
        assert_eq!(tx.cashier.name, "Maria");
        assert_eq!(f.submitter.last_transaction().await.unwrap().id, tx.id);

        f.submitter.wait_for_refresh().await;
        assert_eq!(f.catalog.read().await.len(), 2);
        assert_eq!(f.backend.list_calls(), 1);

        assert!(matches!(
            rx.recv().await.unwrap(),
            PosEvent::TransactionCompleted { .. }
        ));
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let a = product("a", 1000, 10);
        let f = fixture(MockBackend::with_products(vec![a.clone()]));

        for _ in 0..2 {
            let mut cart = cart_of(&[(&a, 1)]);
            let d = draft(&cart, 20, CustomerType::Regular);
            f.submitter.complete_transaction(&mut cart, d).await.unwrap();
        }

        let history = f.submitter.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction_number, "TXN-000002");
        assert_eq!(history[1].transaction_number, "TXN-000001");
    }

    #[tokio::test]
    async fn test_senior_sale_sends_deductions() {
        let milk = product("milk", 11200, 10);
        let f = fixture(MockBackend::with_products(vec![milk.clone()]));

        let mut cart = cart_of(&[(&milk, 1)]);
        let checkout_draft = draft(&cart, 100, CustomerType::Senior);
        let tx = f
            .submitter
            .complete_transaction(&mut cart, checkout_draft)
            .await
            .unwrap();

        let request = f.backend.last_request().unwrap();
        assert_eq!(request.discount, 32.0);
        assert_eq!(request.items[0].discount, 32.0);
        assert_eq!(tx.total(), Money::from_cents(8000));
        assert_eq!(tx.total_vat_exempt_cents, 1200);
        assert_eq!(tx.total_discount_amount_cents, 2000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_keeps_cart_and_refreshes_first() {
        let mut kape = product("kape", 1250, 10);
        kape.name = "Kape 3-in-1".into();
        let backend = MockBackend::with_products(vec![kape.clone()]);
        let f = fixture(backend);

        let mut sold_down = kape.clone();
        sold_down.stock = 3;
        f.backend.set_products(vec![sold_down]);
        f.backend.push_response(Err(api_error(
            400,
            None,
            "Insufficient stock for Kape 3-in-1. Available: 3",
        )));

        let mut cart = cart_of(&[(&kape, 5)]);
        let checkout_draft = draft(&cart, 100, CustomerType::Regular);
        let err = f
            .submitter
            .complete_transaction(&mut cart, checkout_draft)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected {
                kind: RejectionKind::InsufficientStock,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Kape 3-in-1. Available: 3. \
             Another cashier may have just purchased this item; please adjust the quantity."
        );

        assert_eq!(cart.get("kape").unwrap().quantity, 5);
        assert_eq!(cart.get("kape").unwrap().stock_ceiling, 3);
        assert_eq!(f.backend.list_calls(), 1);
        assert_eq!(f.catalog.read().await.get("kape").unwrap().stock, 3);
        assert!(f.submitter.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_structured_codes_win_over_text() {
        let mut sardinas = product("s", 2500, 10);
        sardinas.name = "Sardinas 155g".into();
        let f = fixture(MockBackend::with_products(vec![]));

        f.backend.push_response(Err(api_error(
            409,
            Some("PRODUCT_UNAVAILABLE"),
            "Sardinas 155g cannot be sold",
        )));
        let mut cart = cart_of(&[(&sardinas, 1)]);
        let checkout_draft = draft(&cart, 100, CustomerType::Regular);
        let err = f
            .submitter
            .complete_transaction(&mut cart, checkout_draft)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Sardinas 155g is no longer available. Please remove it from the cart."
        );
        assert!(err.requires_cart_review());
    }

    #[tokio::test]
    async fn test_out_of_stock_message() {
        let a = product("a", 1000, 10);
        let f = fixture(MockBackend::with_products(vec![a.clone()]));
        f.backend
            .push_response(Err(api_error(400, None, "Product is out of stock")));

        let mut cart = cart_of(&[(&a, 1)]);
        let checkout_draft = draft(&cart, 20, CustomerType::Regular);
        let err = f
            .submitter
            .complete_transaction(&mut cart, checkout_draft)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "One or more items are out of stock. Please review the cart and try again."
        );
    }

    #[tokio::test]
    async fn test_other_failures_pass_through() {
        let a = product("a", 1000, 10);
        let f = fixture(MockBackend::with_products(vec![a.clone()]));
        f.backend
            .push_response(Err(ClientError::Transport("connection refused".into())));
        let mut rx = f.events.subscribe();

        let mut cart = cart_of(&[(&a, 1)]);
        let checkout_draft = draft(&cart, 20, CustomerType::Regular);
        let err = f
            .submitter
            .complete_transaction(&mut cart, checkout_draft)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Backend(_)));
        assert!(err.is_retryable());
        assert_eq!(cart.item_count(), 1);

        assert!(matches!(
            rx.recv().await.unwrap(),
            PosEvent::InventoryRefreshed { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            PosEvent::TransactionFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_local_rejections_skip_network() {
        let a = product("a", 5000, 10);
        let f = fixture(MockBackend::with_products(vec![a.clone()]));

        let mut cart = cart_of(&[(&a, 5)]);
        let mut short = draft(&cart, 300, CustomerType::Regular);
        short.cash_received = Money::from_cents(20000);
        short.change = Money::from_cents(-5000);

        let err = f
            .submitter
            .complete_transaction(&mut cart, short)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Invalid(CoreError::InvalidTender { .. })
        ));

        let mut empty = draft(&cart, 300, CustomerType::Regular);
        empty.lines.clear();
        let err = f
            .submitter
            .complete_transaction(&mut cart, empty)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(CoreError::EmptyCart)));

        assert!(f.backend.last_request().is_none());
        assert_eq!(f.backend.list_calls(), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_cart_edited_after_pricing_is_refused() {
        let a = product("a", 1000, 10);
        let b = product("b", 2000, 10);
        let f = fixture(MockBackend::with_products(vec![a.clone(), b.clone()]));

        let mut cart = cart_of(&[(&a, 1)]);
        let stale = draft(&cart, 100, CustomerType::Regular);
        cart.update_quantity("a", 2).unwrap();

        let err = f
            .submitter
            .complete_transaction(&mut cart, stale)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(CoreError::CartChanged)));
        assert_eq!(cart.get("a").unwrap().quantity, 2);

        let stale = draft(&cart, 100, CustomerType::Regular);
        cart.add_to_cart(&b).unwrap();
        let err = f
            .submitter
            .complete_transaction(&mut cart, stale)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(CoreError::CartChanged)));

        assert!(f.backend.last_request().is_none());
        assert!(f.submitter.history().await.is_empty());
        assert_eq!(cart.items().len(), 2);

        let fresh = draft(&cart, 100, CustomerType::Regular);
        let tx = f
            .submitter
            .complete_transaction(&mut cart, fresh)
            .await
            .unwrap();
        assert_eq!(tx.items.len(), 2);
        assert_eq!(f.backend.last_request().unwrap().items[0].quantity, 2);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_second_submission_while_in_flight_is_refused() {
        let a = product("a", 1000, 10);
        let gate = Arc::new(Notify::new());
        let f = fixture(MockBackend::with_products(vec![a.clone()]).gated(gate.clone()));

        let submitter = f.submitter.clone();
        let first_product = a.clone();
        let first = tokio::spawn(async move {
            let mut cart = cart_of(&[(&first_product, 1)]);
            let d = draft(&cart, 20, CustomerType::Regular);
            submitter.complete_transaction(&mut cart, d).await
        });

        while f.backend.create_calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(f.submitter.is_submitting());

        let mut cart = cart_of(&[(&a, 1)]);
        let d = draft(&cart, 20, CustomerType::Regular);
        let err = f
            .submitter
            .complete_transaction(&mut cart, d)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::SubmissionInProgress));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(!f.submitter.is_submitting());
    }
}
