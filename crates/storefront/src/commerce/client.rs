//! Commerce API client implementation (the request gateway).
//!
//! Every outbound call goes through [`CommerceClient::send`], which augments
//! the request descriptor with the credential schemes described in the module
//! docs before dispatching it with `reqwest`.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use lumiere_core::{CategoryId, CustomerId, ProductId};

use crate::commerce::CommerceError;
use crate::commerce::types::{Category, Customer, Order, Product, Registration, TokenResponse};
use crate::config::CommerceConfig;

/// Path prefix of the public catalog namespace.
const CATALOG_NAMESPACE: &str = "/wc/v3";

/// Maximum response-body length echoed into errors and logs.
const ERROR_BODY_LIMIT: usize = 500;

// =============================================================================
// Request Descriptor
// =============================================================================

/// An outbound request before credential augmentation.
///
/// Callers describe only what they want: method, path relative to the API
/// base, query parameters, and an optional JSON body. Credentials are the
/// gateway's concern.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Describe a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Describe a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Whether this request targets the public catalog namespace.
    fn targets_catalog(&self) -> bool {
        self.path.starts_with(CATALOG_NAMESPACE)
    }
}

// =============================================================================
// Token Slot
// =============================================================================

/// Shared holder for the session bearer token.
///
/// The session store writes it on login/logout; the gateway reads it on every
/// dispatch. Cloning yields another handle to the same slot.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default)]
pub struct TokenSlot {
    inner: Arc<RwLock<Option<SecretString>>>,
}

impl std::fmt::Debug for TokenSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSlot")
            .field("token", if self.is_set() { &"[REDACTED]" } else { &"<unset>" })
            .finish()
    }
}

impl TokenSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token, replacing any previous one.
    pub fn set(&self, token: SecretString) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Remove the held token, if any.
    pub fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current token, if one is held.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

// =============================================================================
// Product Filter
// =============================================================================

/// Sort key for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Title,
    Price,
    Popularity,
    Rating,
}

impl SortKey {
    const fn as_param(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Title => "title",
            Self::Price => "price",
            Self::Popularity => "popularity",
            Self::Rating => "rating",
        }
    }
}

/// Sort direction for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    const fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Optional filter for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Sort key.
    pub orderby: Option<SortKey>,
    /// Sort direction.
    pub order: Option<SortOrder>,
    /// Restrict to featured products.
    pub featured: Option<bool>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ProductFilter {
    /// Append the filter's query parameters to a request.
    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(category) = self.category {
            request = request.query("category", category);
        }
        if let Some(orderby) = self.orderby {
            request = request.query("orderby", orderby.as_param());
        }
        if let Some(order) = self.order {
            request = request.query("order", order.as_param());
        }
        if let Some(featured) = self.featured {
            request = request.query("featured", featured);
        }
        if let Some(per_page) = self.per_page {
            request = request.query("per_page", per_page);
        }
        request
    }
}

// =============================================================================
// CommerceClient
// =============================================================================

/// A request after credential augmentation, ready for dispatch.
struct PreparedRequest {
    method: Method,
    url: Url,
    bearer: Option<SecretString>,
    body: Option<serde_json::Value>,
}

/// Client for the external commerce API.
///
/// Cheaply cloneable via `Arc`; all clones share one HTTP connection pool and
/// one [`TokenSlot`].
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    http: reqwest::Client,
    config: CommerceConfig,
    token: TokenSlot,
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        Self {
            inner: Arc::new(CommerceClientInner {
                http: reqwest::Client::new(),
                config: config.clone(),
                token: TokenSlot::new(),
            }),
        }
    }

    /// Handle to the shared session token slot.
    #[must_use]
    pub fn token_slot(&self) -> TokenSlot {
        self.inner.token.clone()
    }

    /// Augment a request descriptor with the applicable credential schemes.
    ///
    /// The two rules are independent and order-insensitive: a catalog-path
    /// request issued during an authenticated session carries both the
    /// consumer credentials and the bearer token.
    fn prepare(&self, mut request: ApiRequest) -> Result<PreparedRequest, CommerceError> {
        // Catalog-namespace requests carry the consumer credentials as query
        // parameters, appended after caller-supplied parameters.
        if request.targets_catalog() {
            request = request
                .query("consumer_key", &self.inner.config.consumer_key)
                .query(
                    "consumer_secret",
                    self.inner.config.consumer_secret.expose_secret(),
                );
        }

        let mut url = Url::parse(&format!(
            "{}{}",
            self.inner.config.base_url.as_str().trim_end_matches('/'),
            request.path
        ))?;
        for (key, value) in &request.query {
            url.query_pairs_mut().append_pair(key, value);
        }

        // A held session token rides along on every request, catalog or not.
        let bearer = self.inner.token.get();

        Ok(PreparedRequest {
            method: request.method,
            url,
            bearer,
            body: request.body,
        })
    }

    /// Dispatch a request and deserialize the JSON response.
    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, CommerceError> {
        let prepared = self.prepare(request)?;

        let mut builder = self.inner.http.request(prepared.method, prepared.url);
        if let Some(token) = &prepared.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &prepared.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics.
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CommerceError::Status {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse commerce API response"
            );
            CommerceError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog Endpoints
    // =========================================================================

    /// List published products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not parse.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CommerceError> {
        let request = filter.apply(ApiRequest::get("/wc/v3/products").query("status", "publish"));
        self.send(request).await
    }

    /// Fetch a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not parse.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.send(ApiRequest::get(format!("/wc/v3/products/{id}")))
            .await
    }

    /// List categories that contain at least one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not parse.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        self.send(ApiRequest::get("/wc/v3/products/categories").query("hide_empty", true))
            .await
    }

    // =========================================================================
    // Session Endpoints
    // =========================================================================

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the backend rejects the
    /// credentials with a non-2xx status.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, CommerceError> {
        self.send(ApiRequest::post(
            "/jwt-auth/v1/token",
            serde_json::json!({ "username": username, "password": password }),
        ))
        .await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not parse.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn create_customer(&self, registration: &Registration) -> Result<Customer, CommerceError> {
        self.send(ApiRequest::post(
            "/wc/v3/customers",
            serde_json::to_value(registration)?,
        ))
        .await
    }

    /// Fetch a customer record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not parse.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, CommerceError> {
        self.send(ApiRequest::get(format!("/wc/v3/customers/{id}")))
            .await
    }

    /// List a customer's past orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not parse.
    #[instrument(skip(self), fields(customer_id = %customer))]
    pub async fn list_orders(&self, customer: CustomerId) -> Result<Vec<Order>, CommerceError> {
        self.send(ApiRequest::get("/wc/v3/orders").query("customer", customer))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> CommerceClient {
        CommerceClient::new(&CommerceConfig {
            base_url: Url::parse("https://shop.example.com/wp-json").unwrap(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: SecretString::from("cs_test"),
        })
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_catalog_request_gets_consumer_credentials() {
        let client = test_client();
        let prepared = client
            .prepare(ApiRequest::get("/wc/v3/products").query("status", "publish"))
            .unwrap();

        let pairs = query_pairs(&prepared.url);
        // Caller-supplied parameters survive, credentials are appended.
        assert_eq!(
            pairs,
            vec![
                ("status".to_string(), "publish".to_string()),
                ("consumer_key".to_string(), "ck_test".to_string()),
                ("consumer_secret".to_string(), "cs_test".to_string()),
            ]
        );
        assert!(prepared.bearer.is_none());
    }

    #[test]
    fn test_session_namespace_gets_no_consumer_credentials() {
        let client = test_client();
        let prepared = client
            .prepare(ApiRequest::post(
                "/jwt-auth/v1/token",
                serde_json::json!({}),
            ))
            .unwrap();

        assert!(prepared.url.query().is_none());
    }

    #[test]
    fn test_bearer_attached_on_every_request_once_token_held() {
        let client = test_client();
        client.token_slot().set(SecretString::from("jwt-abc"));

        let catalog = client.prepare(ApiRequest::get("/wc/v3/products")).unwrap();
        let session = client
            .prepare(ApiRequest::get("/wc/v3/customers/1"))
            .unwrap();

        assert_eq!(catalog.bearer.unwrap().expose_secret(), "jwt-abc");
        assert_eq!(session.bearer.unwrap().expose_secret(), "jwt-abc");
    }

    #[test]
    fn test_both_rules_apply_independently() {
        let client = test_client();
        client.token_slot().set(SecretString::from("jwt-abc"));

        let prepared = client.prepare(ApiRequest::get("/wc/v3/orders")).unwrap();

        let pairs = query_pairs(&prepared.url);
        assert!(pairs.iter().any(|(k, _)| k == "consumer_key"));
        assert!(prepared.bearer.is_some());
    }

    #[test]
    fn test_token_clear_stops_bearer_attachment() {
        let client = test_client();
        let slot = client.token_slot();
        slot.set(SecretString::from("jwt-abc"));
        slot.clear();

        let prepared = client.prepare(ApiRequest::get("/wc/v3/products")).unwrap();
        assert!(prepared.bearer.is_none());
    }

    #[test]
    fn test_url_joins_base_path_without_doubled_slash() {
        let client = test_client();
        let prepared = client
            .prepare(ApiRequest::get("/wc/v3/products/7"))
            .unwrap();
        assert!(
            prepared
                .url
                .as_str()
                .starts_with("https://shop.example.com/wp-json/wc/v3/products/7")
        );
    }

    #[test]
    fn test_product_filter_query_parameters() {
        let filter = ProductFilter {
            category: Some(CategoryId::new(10)),
            orderby: Some(SortKey::Price),
            order: Some(SortOrder::Desc),
            featured: Some(true),
            per_page: Some(12),
        };
        let request = filter.apply(ApiRequest::get("/wc/v3/products"));
        assert_eq!(
            request.query,
            vec![
                ("category".to_string(), "10".to_string()),
                ("orderby".to_string(), "price".to_string()),
                ("order".to_string(), "desc".to_string()),
                ("featured".to_string(), "true".to_string()),
                ("per_page".to_string(), "12".to_string()),
            ]
        );
    }

    #[test]
    fn test_token_slot_handles_shared_across_clones() {
        let slot = TokenSlot::new();
        let other = slot.clone();
        slot.set(SecretString::from("shared"));
        assert!(other.is_set());
        assert_eq!(other.get().unwrap().expose_secret(), "shared");
    }

    #[test]
    fn test_token_slot_debug_redacts_token() {
        let slot = TokenSlot::new();
        assert_eq!(format!("{slot:?}"), "TokenSlot { token: \"<unset>\" }");

        slot.set(SecretString::from("jwt-abc"));
        let rendered = format!("{slot:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("jwt-abc"));
    }
}
