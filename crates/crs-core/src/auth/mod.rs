//! Authentication module for the bearer credential and its session.
//!
//! This module provides:
//! - `TokenStore`: the credential across a persistent and a session scope
//! - `TokenScope` backends: memory, JSON file, and OS keychain via keyring
//! - `TokenClaims` / `Profile`: display-only decoding of the JWT payload
//! - `SessionContext`: login, refresh, password change and logout
//!
//! Tokens are never checked for expiry here; the server rejects stale ones.

pub mod claims;
pub mod scopes;
pub mod session;
pub mod token_store;

pub use claims::{Profile, TokenClaims};
pub use scopes::{FileScope, KeyringScope, MemoryScope, TokenScope};
pub use session::SessionContext;
pub use token_store::{Scope, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
