//! Session store.
//!
//! A two-state machine: **Anonymous** (no user) and **Authenticated** (user
//! record plus bearer token held). Authentication status is always derived
//! from the presence of the user record; there is no separate flag that
//! could desync.
//!
//! The bearer token lives in the gateway's shared [`TokenSlot`]; the session
//! store is its only writer (on login, logout, and restore).

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use lumiere_core::CustomerId;

use crate::commerce::types::{Customer, Order, Registration, TokenResponse};
use crate::commerce::{CommerceClient, CommerceError, TokenSlot};
use crate::storage::{self, Storage, StorageError, keys};

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The commerce API rejected the call (network failure or non-2xx).
    ///
    /// Credential failures surface here; callers map this to a generic
    /// invalid-credentials message.
    #[error("commerce API error: {0}")]
    Api(#[from] CommerceError),

    /// The backend answered a login with 2xx but no token.
    ///
    /// Treated as a hard failure: a session without a token cannot
    /// authenticate anything.
    #[error("login response carried no session token")]
    MissingToken,

    /// Persisting session state failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The persisted identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend customer ID, once known.
    ///
    /// The token endpoint does not return one; it is filled in by
    /// [`SessionStore::attach_identity`] after a profile fetch.
    pub id: Option<CustomerId>,
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
}

impl From<&TokenResponse> for SessionUser {
    fn from(response: &TokenResponse) -> Self {
        Self {
            id: None,
            username: response.user_nicename.clone(),
            email: response.user_email.clone(),
            display_name: response.user_display_name.clone(),
        }
    }
}

/// Session operations the store needs from the commerce client.
///
/// A trait seam so login/registration flows can be driven by stub
/// implementations in tests.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// Exchange credentials for a token.
    async fn token(&self, username: &str, password: &str) -> Result<TokenResponse, CommerceError>;
    /// Create a customer account.
    async fn register_customer(&self, registration: &Registration)
    -> Result<Customer, CommerceError>;
    /// Fetch a customer record.
    async fn customer(&self, id: CustomerId) -> Result<Customer, CommerceError>;
    /// Fetch a customer's orders.
    async fn orders(&self, customer: CustomerId) -> Result<Vec<Order>, CommerceError>;
}

impl AuthApi for CommerceClient {
    async fn token(&self, username: &str, password: &str) -> Result<TokenResponse, CommerceError> {
        self.login(username, password).await
    }

    async fn register_customer(
        &self,
        registration: &Registration,
    ) -> Result<Customer, CommerceError> {
        self.create_customer(registration).await
    }

    async fn customer(&self, id: CustomerId) -> Result<Customer, CommerceError> {
        self.get_customer(id).await
    }

    async fn orders(&self, customer: CustomerId) -> Result<Vec<Order>, CommerceError> {
        self.list_orders(customer).await
    }
}

/// The session state machine.
#[derive(Debug)]
pub struct SessionStore<A, S: Storage> {
    api: A,
    storage: S,
    token: TokenSlot,
    user: Option<SessionUser>,
    loading: bool,
}

impl<A: AuthApi, S: Storage> SessionStore<A, S> {
    /// Create a store in the loading sub-state; call
    /// [`SessionStore::restore`] before first render.
    pub const fn new(api: A, storage: S, token: TokenSlot) -> Self {
        Self {
            api,
            storage,
            token,
            user: None,
            loading: true,
        }
    }

    /// Synchronously restore a persisted session.
    ///
    /// Transitions to Authenticated only if BOTH the user record and the
    /// token are present (and the user record parses); anything else leaves
    /// the store Anonymous. Always clears the loading sub-state.
    pub fn restore(&mut self) {
        let user: Option<SessionUser> = storage::load_json(&self.storage, keys::USER);
        let token: Option<String> = storage::load_json(&self.storage, keys::TOKEN);

        if let (Some(user), Some(token)) = (user, token) {
            self.token.set(SecretString::from(token));
            self.user = Some(user);
        }
        self.loading = false;
    }

    /// Whether the store is still restoring persisted state.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a user is authenticated. Exactly `user().is_some()`.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Log in against the external auth endpoint.
    ///
    /// On success, persists the token and user record, publishes the token
    /// to the gateway, and transitions to Authenticated.
    ///
    /// # Errors
    ///
    /// Network and credential failures propagate as [`AuthError::Api`]; a
    /// 2xx response without a token is [`AuthError::MissingToken`]. On any
    /// error the store performs no transition and persists nothing.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let response = self.api.token(username, password).await?;
        let token = response.token.clone().ok_or(AuthError::MissingToken)?;

        let user = SessionUser::from(&response);
        storage::store_json(&self.storage, keys::USER, &user)?;
        storage::store_json(&self.storage, keys::TOKEN, &token)?;

        self.token.set(SecretString::from(token));
        self.user = Some(user);
        Ok(())
    }

    /// Create a customer account.
    ///
    /// Deliberately does NOT establish a session: registration and login are
    /// decoupled, and a caller wanting an authenticated session must follow
    /// up with [`SessionStore::login`].
    ///
    /// # Errors
    ///
    /// Propagates API failures unmodified.
    pub async fn register(&self, registration: &Registration) -> Result<Customer, AuthError> {
        Ok(self.api.register_customer(registration).await?)
    }

    /// Fetch the full customer record and merge it into the session identity.
    ///
    /// Fills in the customer ID that the token endpoint does not provide;
    /// no-op when Anonymous.
    ///
    /// # Errors
    ///
    /// Propagates API failures; fails if the updated record cannot be
    /// persisted.
    pub async fn attach_identity(&mut self, id: CustomerId) -> Result<(), AuthError> {
        if self.user.is_none() {
            return Ok(());
        }
        let customer = self.api.customer(id).await?;
        if let Some(user) = self.user.as_mut() {
            user.id = Some(customer.id);
            user.username = customer.username;
            user.email = customer.email;
            storage::store_json(&self.storage, keys::USER, user)?;
        }
        Ok(())
    }

    /// Log out: clear persisted token and user, clear the gateway token,
    /// transition to Anonymous. No network call; always succeeds.
    pub fn logout(&mut self) {
        self.storage.remove(keys::TOKEN);
        self.storage.remove(keys::USER);
        self.token.clear();
        self.user = None;
    }

    /// The authenticated customer's order history.
    ///
    /// Degrades to an empty list (with a diagnostic) when Anonymous, when
    /// the customer ID is not yet known, or when the fetch fails.
    pub async fn order_history(&self) -> Vec<Order> {
        let Some(id) = self.user.as_ref().and_then(|u| u.id) else {
            warn!("order history requested without a known customer id");
            return Vec::new();
        };
        match self.api.orders(id).await {
            Ok(orders) => orders,
            Err(error) => {
                warn!(%error, "order history fetch failed, returning empty list");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use lumiere_core::{OrderId, Price};

    /// Stub auth API with configurable login behavior.
    struct StubApi {
        token: Option<String>,
        fail: bool,
    }

    impl AuthApi for StubApi {
        async fn token(&self, _: &str, _: &str) -> Result<TokenResponse, CommerceError> {
            if self.fail {
                return Err(CommerceError::Status {
                    status: 403,
                    body: "invalid credentials".to_string(),
                });
            }
            Ok(TokenResponse {
                token: self.token.clone(),
                user_email: "amira@example.com".to_string(),
                user_nicename: "amira".to_string(),
                user_display_name: "Amira".to_string(),
            })
        }

        async fn register_customer(
            &self,
            registration: &Registration,
        ) -> Result<Customer, CommerceError> {
            Ok(Customer {
                id: CustomerId::new(9),
                username: registration.username.clone(),
                email: registration.email.clone(),
                first_name: registration.first_name.clone(),
                last_name: registration.last_name.clone(),
            })
        }

        async fn customer(&self, id: CustomerId) -> Result<Customer, CommerceError> {
            Ok(Customer {
                id,
                username: "amira".to_string(),
                email: "amira@example.com".to_string(),
                first_name: "Amira".to_string(),
                last_name: "Haddad".to_string(),
            })
        }

        async fn orders(&self, _: CustomerId) -> Result<Vec<Order>, CommerceError> {
            if self.fail {
                return Err(CommerceError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(vec![Order {
                id: OrderId::new(1),
                status: "completed".to_string(),
                total: Price::from("55.00"),
                date_created: "2026-08-01T10:00:00".parse().expect("valid timestamp"),
                line_items: Vec::new(),
            }])
        }
    }

    /// Stub where login works but the order listing is down.
    struct OrdersDownApi;

    impl AuthApi for OrdersDownApi {
        async fn token(&self, _: &str, _: &str) -> Result<TokenResponse, CommerceError> {
            Ok(TokenResponse {
                token: Some("jwt-abc".to_string()),
                user_email: "amira@example.com".to_string(),
                user_nicename: "amira".to_string(),
                user_display_name: "Amira".to_string(),
            })
        }

        async fn register_customer(
            &self,
            _: &Registration,
        ) -> Result<Customer, CommerceError> {
            Err(CommerceError::Status {
                status: 500,
                body: "unused".to_string(),
            })
        }

        async fn customer(&self, id: CustomerId) -> Result<Customer, CommerceError> {
            Ok(Customer {
                id,
                username: "amira".to_string(),
                email: "amira@example.com".to_string(),
                first_name: "Amira".to_string(),
                last_name: "Haddad".to_string(),
            })
        }

        async fn orders(&self, _: CustomerId) -> Result<Vec<Order>, CommerceError> {
            Err(CommerceError::Status {
                status: 503,
                body: "orders unavailable".to_string(),
            })
        }
    }

    fn store_with(api: StubApi) -> SessionStore<StubApi, MemoryStorage> {
        let mut store = SessionStore::new(api, MemoryStorage::new(), TokenSlot::new());
        store.restore();
        store
    }

    fn registration() -> Registration {
        Registration {
            email: "amira@example.com".to_string(),
            username: "amira".to_string(),
            password: "hunter2".to_string(),
            first_name: "Amira".to_string(),
            last_name: "Haddad".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success_authenticates_and_persists() {
        let storage = MemoryStorage::new();
        let token = TokenSlot::new();
        let mut store = SessionStore::new(
            StubApi {
                token: Some("jwt-abc".to_string()),
                fail: false,
            },
            storage.clone(),
            token.clone(),
        );
        store.restore();

        store.login("amira", "hunter2").await.unwrap();

        assert!(store.is_authenticated());
        assert!(token.is_set());
        assert!(storage.load(keys::TOKEN).is_some());
        assert!(storage.load(keys::USER).is_some());
        assert_eq!(store.user().unwrap().username, "amira");
    }

    #[tokio::test]
    async fn test_login_without_token_is_a_hard_error() {
        let mut store = store_with(StubApi {
            token: None,
            fail: false,
        });

        let err = store.login("amira", "hunter2").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_propagates_without_transition() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(
            StubApi {
                token: Some("jwt".to_string()),
                fail: true,
            },
            storage.clone(),
            TokenSlot::new(),
        );
        store.restore();

        let err = store.login("amira", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Api(CommerceError::Status { status: 403, .. })));
        assert!(!store.is_authenticated());
        assert!(storage.load(keys::TOKEN).is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let storage = MemoryStorage::new();
        let token = TokenSlot::new();
        let mut store = SessionStore::new(
            StubApi {
                token: Some("jwt-abc".to_string()),
                fail: false,
            },
            storage.clone(),
            token.clone(),
        );
        store.restore();
        store.login("amira", "hunter2").await.unwrap();

        store.logout();

        assert!(!store.is_authenticated());
        assert!(!token.is_set());
        assert!(storage.load(keys::TOKEN).is_none());
        assert!(storage.load(keys::USER).is_none());
    }

    #[tokio::test]
    async fn test_registration_does_not_establish_a_session() {
        let store = store_with(StubApi {
            token: Some("jwt".to_string()),
            fail: false,
        });

        let customer = store.register(&registration()).await.unwrap();
        assert_eq!(customer.username, "amira");
        // Registration is decoupled from login.
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_restore_with_both_keys_authenticates() {
        let storage = MemoryStorage::new();
        let user = SessionUser {
            id: Some(CustomerId::new(9)),
            username: "amira".to_string(),
            email: "amira@example.com".to_string(),
            display_name: "Amira".to_string(),
        };
        storage::store_json(&storage, keys::USER, &user).unwrap();
        storage::store_json(&storage, keys::TOKEN, &"jwt-abc".to_string()).unwrap();

        let token = TokenSlot::new();
        let mut store = SessionStore::new(
            StubApi {
                token: None,
                fail: false,
            },
            storage,
            token.clone(),
        );
        assert!(store.is_loading());
        store.restore();

        assert!(!store.is_loading());
        assert!(store.is_authenticated());
        assert!(token.is_set());
    }

    #[test]
    fn test_restore_with_token_but_no_user_stays_anonymous() {
        let storage = MemoryStorage::new();
        storage::store_json(&storage, keys::TOKEN, &"jwt-abc".to_string()).unwrap();

        let mut store = SessionStore::new(
            StubApi {
                token: None,
                fail: false,
            },
            storage,
            TokenSlot::new(),
        );
        store.restore();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_restore_with_corrupt_user_record_stays_anonymous() {
        let storage = MemoryStorage::new();
        storage.store(keys::USER, "{broken").unwrap();
        storage.store(keys::TOKEN, "\"jwt-abc\"").unwrap();

        let mut store = SessionStore::new(
            StubApi {
                token: None,
                fail: false,
            },
            storage,
            TokenSlot::new(),
        );
        store.restore();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_attach_identity_fills_in_customer_id() {
        let mut store = store_with(StubApi {
            token: Some("jwt".to_string()),
            fail: false,
        });
        store.login("amira", "hunter2").await.unwrap();
        assert!(store.user().unwrap().id.is_none());

        store.attach_identity(CustomerId::new(9)).await.unwrap();
        assert_eq!(store.user().unwrap().id, Some(CustomerId::new(9)));
    }

    #[tokio::test]
    async fn test_order_history_without_identity_is_empty() {
        let store = store_with(StubApi {
            token: Some("jwt".to_string()),
            fail: false,
        });
        assert!(store.order_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_order_history_fetch_failure_degrades_to_empty() {
        let mut store = SessionStore::new(OrdersDownApi, MemoryStorage::new(), TokenSlot::new());
        store.restore();
        store.login("amira", "hunter2").await.unwrap();
        store.attach_identity(CustomerId::new(9)).await.unwrap();

        assert!(store.order_history().await.is_empty());
        // The session itself is untouched by the failed fetch.
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_order_history_after_identity_attached() {
        let mut store = store_with(StubApi {
            token: Some("jwt".to_string()),
            fail: false,
        });
        store.login("amira", "hunter2").await.unwrap();
        store.attach_identity(CustomerId::new(9)).await.unwrap();

        let orders = store.order_history().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, "completed");
    }
}
