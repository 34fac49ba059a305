//! Register wiring shared by every command.

use std::sync::Arc;

use kahera_client::{
    refresh_catalog, EventBus, HttpBackend, PosBackend, PosConfig, ProductCatalog, SharedCatalog,
    StockValidator, TransactionSubmitter,
};
use kahera_core::Product;
use tracing::info;

use crate::error::AppResult;

/// Backend connection plus the services built on top of it.
pub struct Register {
    pub config: PosConfig,
    pub catalog: SharedCatalog,
    backend: Arc<dyn PosBackend>,
    validator: StockValidator,
    submitter: TransactionSubmitter,
}

impl Register {
    /// Connects to the backend named in `config`.
    pub fn connect(config: PosConfig) -> AppResult<Self> {
        let backend = HttpBackend::new(&config.api, config.session())?;
        info!(api = %backend.base_url(), store = %config.store.name, "Register ready");
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: PosConfig, backend: Arc<dyn PosBackend>) -> Self {
        let catalog = ProductCatalog::shared();
        let events = EventBus::default();
        let validator = StockValidator::new(backend.clone(), catalog.clone(), events.clone());
        let submitter = TransactionSubmitter::new(
            backend.clone(),
            catalog.clone(),
            events,
            config.cash_limit(),
        );

        Register {
            config,
            catalog,
            backend,
            validator,
            submitter,
        }
    }

    pub fn validator(&self) -> &StockValidator {
        &self.validator
    }

    pub fn submitter(&self) -> &TransactionSubmitter {
        &self.submitter
    }

    /// Reloads available products into the shared catalog.
    pub async fn load_products(&self) -> AppResult<Vec<Product>> {
        Ok(refresh_catalog(self.backend.as_ref(), &self.catalog).await?)
    }
}
