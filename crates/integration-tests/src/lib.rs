//! Integration tests for the Lumière storefront core.
//!
//! These tests wire the real stores (cart, session, catalog) together over
//! in-memory or file-backed storage and a scriptable stub of the commerce
//! API - no network, no external backend.
//!
//! # Test Categories
//!
//! - `storefront_flows` - end-to-end shopper scenarios across the stores
//! - `degraded_catalog` - fallback behavior with an unreachable backend

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lumiere_core::{CustomerId, ProductId};
use lumiere_storefront::catalog::{CatalogApi, fallback};
use lumiere_storefront::commerce::types::{
    Category, Customer, Order, Product, Registration, TokenResponse,
};
use lumiere_storefront::commerce::{CommerceError, ProductFilter};
use lumiere_storefront::session::AuthApi;

/// Scriptable stand-in for the external commerce backend.
///
/// Starts healthy; flip [`StubBackend::set_down`] to make every call fail
/// the way an unreachable backend would. Clones share the same switch, so a
/// test can keep a handle after moving a clone into a store.
#[derive(Debug, Clone, Default)]
pub struct StubBackend {
    down: Arc<AtomicBool>,
}

impl StubBackend {
    /// A healthy backend serving the fallback dataset as its "live" catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a 503.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CommerceError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(CommerceError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl CatalogApi for StubBackend {
    async fn products(&self, _: &ProductFilter) -> Result<Vec<Product>, CommerceError> {
        self.check()?;
        Ok(fallback::products())
    }

    async fn product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.check()?;
        Ok(fallback::product(id))
    }

    async fn categories(&self) -> Result<Vec<Category>, CommerceError> {
        self.check()?;
        Ok(fallback::categories())
    }
}

impl AuthApi for StubBackend {
    async fn token(&self, username: &str, _: &str) -> Result<TokenResponse, CommerceError> {
        self.check()?;
        Ok(TokenResponse {
            token: Some(format!("jwt-{username}")),
            user_email: format!("{username}@example.com"),
            user_nicename: username.to_string(),
            user_display_name: username.to_string(),
        })
    }

    async fn register_customer(
        &self,
        registration: &Registration,
    ) -> Result<Customer, CommerceError> {
        self.check()?;
        Ok(Customer {
            id: CustomerId::new(9),
            username: registration.username.clone(),
            email: registration.email.clone(),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
        })
    }

    async fn customer(&self, id: CustomerId) -> Result<Customer, CommerceError> {
        self.check()?;
        Ok(Customer {
            id,
            username: "shopper".to_string(),
            email: "shopper@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "Shopper".to_string(),
        })
    }

    async fn orders(&self, _: CustomerId) -> Result<Vec<Order>, CommerceError> {
        self.check()?;
        Ok(Vec::new())
    }
}
