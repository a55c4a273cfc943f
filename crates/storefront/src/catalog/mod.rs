//! Catalog access layer.
//!
//! Every read here is total: on transport failure, a non-2xx response, or an
//! empty-but-successful listing, the layer degrades to the fixed
//! [`fallback`] catalog instead of surfacing an error. Callers that care can
//! still distinguish live from degraded data via [`CatalogData`].
//!
//! Rapid refiltering can complete out of order; [`FetchSequence`] tags each
//! fetch with a monotonically increasing ticket and discards stale responses
//! so the last-issued filter always wins.

pub mod fallback;

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use lumiere_core::ProductId;

use crate::commerce::types::{Category, Product};
use crate::commerce::{CommerceClient, CommerceError, ProductFilter};

// =============================================================================
// CatalogData
// =============================================================================

/// Outcome of a total catalog read.
///
/// Both variants carry renderable data; `Fallback` marks the
/// degrade-gracefully path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogData<T> {
    /// Data straight from the backend.
    Live(T),
    /// Deterministic placeholder data (backend unreachable or empty).
    Fallback(T),
}

impl<T> CatalogData<T> {
    /// The carried data, regardless of origin.
    pub const fn get(&self) -> &T {
        match self {
            Self::Live(data) | Self::Fallback(data) => data,
        }
    }

    /// Unwrap the carried data.
    #[allow(clippy::missing_const_for_fn)]
    pub fn into_inner(self) -> T {
        match self {
            Self::Live(data) | Self::Fallback(data) => data,
        }
    }

    /// Whether this is placeholder data.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

// =============================================================================
// CatalogApi seam
// =============================================================================

/// Read operations the catalog layer needs from the commerce client.
///
/// A trait seam so the degrade paths can be driven by stub implementations in
/// tests.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// Fetch published products matching a filter.
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CommerceError>;
    /// Fetch a single product.
    async fn product(&self, id: ProductId) -> Result<Product, CommerceError>;
    /// Fetch non-empty categories.
    async fn categories(&self) -> Result<Vec<Category>, CommerceError>;
}

impl CatalogApi for CommerceClient {
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CommerceError> {
        self.list_products(filter).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.get_product(id).await
    }

    async fn categories(&self) -> Result<Vec<Category>, CommerceError> {
        self.list_categories().await
    }
}

// =============================================================================
// CatalogService
// =============================================================================

/// Total catalog reads over any [`CatalogApi`].
#[derive(Debug, Clone)]
pub struct CatalogService<A = CommerceClient> {
    api: A,
}

impl<A: CatalogApi> CatalogService<A> {
    /// Create a catalog service over an API implementation.
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// List published products; never fails.
    ///
    /// A failed fetch OR an empty successful one both serve the fallback set:
    /// an empty storefront is treated as indistinguishable from an
    /// unreachable one.
    pub async fn list_products(&self, filter: &ProductFilter) -> CatalogData<Vec<Product>> {
        match self.api.products(filter).await {
            Ok(products) if !products.is_empty() => CatalogData::Live(products),
            Ok(_) => {
                warn!("catalog returned no products, serving fallback catalog");
                CatalogData::Fallback(fallback::products())
            }
            Err(error) => {
                warn!(%error, "product listing failed, serving fallback catalog");
                CatalogData::Fallback(fallback::products())
            }
        }
    }

    /// Fetch one product by ID; never fails.
    pub async fn get_product(&self, id: ProductId) -> CatalogData<Product> {
        match self.api.product(id).await {
            Ok(product) => CatalogData::Live(product),
            Err(error) => {
                warn!(%error, %id, "product fetch failed, serving fallback product");
                CatalogData::Fallback(fallback::product(id))
            }
        }
    }

    /// List non-empty categories; never fails.
    pub async fn list_categories(&self) -> CatalogData<Vec<Category>> {
        match self.api.categories().await {
            Ok(categories) => CatalogData::Live(categories),
            Err(error) => {
                warn!(%error, "category listing failed, serving fallback categories");
                CatalogData::Fallback(fallback::categories())
            }
        }
    }
}

// =============================================================================
// Fetch Sequencing
// =============================================================================

/// Ticket identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Orders concurrent catalog fetches so the last-issued one wins.
///
/// Call [`FetchSequence::begin`] when issuing a fetch and
/// [`FetchSequence::try_commit`] when its response arrives; a `false` return
/// means a newer fetch already landed and this response must be discarded.
#[derive(Debug, Default)]
pub struct FetchSequence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl FetchSequence {
    /// Create a sequence with no fetches issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Issue the next ticket.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Attempt to apply the response for `ticket`.
    ///
    /// Returns `true` if the response is current and should be applied,
    /// `false` if a response from a later ticket has already been applied.
    pub fn try_commit(&self, ticket: FetchTicket) -> bool {
        let previous = self.applied.fetch_max(ticket.0, Ordering::SeqCst);
        let fresh = previous < ticket.0;
        if !fresh {
            debug!(ticket = ticket.0, applied = previous, "discarding stale catalog response");
        }
        fresh
    }
}
