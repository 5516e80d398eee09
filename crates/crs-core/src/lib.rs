//! Core library for the course-registration client.
//!
//! This crate holds everything below the UI layer:
//!
//! - `auth`: the two-scope `TokenStore`, JWT claim decoding for display,
//!   and the `SessionContext` that owns the credential lifecycle
//! - `api`: the `ApiClient` request wrapper and the normalized `ApiError`
//! - `models`: optional-field schemas for the API's resources, plus the
//!   closed `Role` and `Panel` sets
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ErrorKind, Method, RequestDescriptor, Resource};
pub use auth::{Profile, Scope, SessionContext, TokenClaims, TokenStore};
pub use config::Config;
pub use models::{Panel, Role};
