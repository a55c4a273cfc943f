//! Lumière Storefront - client core for a cosmetics storefront.
//!
//! This crate implements the state-and-request boundary of the storefront:
//!
//! - [`commerce`] - typed client for the external commerce API, handling the
//!   two credential schemes (public catalog key/secret and per-session
//!   bearer token)
//! - [`catalog`] - total (never-failing) catalog reads with a deterministic
//!   fallback catalog when the backend is unreachable or empty
//! - [`session`] - login/logout/registration and persisted identity
//! - [`cart`] - cart and wishlist collections with derived totals
//! - [`storage`] - key/value persistence adapters behind a trait
//!
//! Presentation layers consume the stores read-only and mutate them only
//! through their defined operations. The stores are plain owned values,
//! constructed explicitly and injected where needed - there are no
//! module-level singletons.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod commerce;
pub mod config;
pub mod session;
pub mod storage;
