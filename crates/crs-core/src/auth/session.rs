use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::token_store::{Scope, TokenStore, REFRESH_TOKEN_KEY};
use super::{Profile, TokenClaims};
use crate::api::{ApiClient, ApiError, Method, RequestDescriptor};
use crate::config::Config;
use crate::models::Role;

const LOGIN_PATH: &str = "/login";
const REFRESH_PATH: &str = "/refresh";
const CHANGE_PASSWORD_PATH: &str = "/change-password";

#[derive(Debug, Clone, Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken", alias = "token")]
    access_token: String,
    #[serde(rename = "refreshToken", default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange<'a> {
    old_password: &'a str,
    new_password: &'a str,
    confirm_new_password: &'a str,
}

/// One signed-in (or signing-in) user's context: the token store and the
/// API client that reads from it.
///
/// Create it at start-up and hand it to whatever issues requests;
/// `logout` ends it and wipes the stored credential.
pub struct SessionContext {
    tokens: Arc<TokenStore>,
    client: ApiClient,
}

impl SessionContext {
    pub fn new(client: ApiClient) -> Self {
        Self {
            tokens: client.tokens().clone(),
            client,
        }
    }

    /// Build the context configuration describes: token scopes per
    /// `token_backend`, client per `api_base` and timeout.
    pub fn start(config: &Config) -> Result<Self> {
        let tokens = Arc::new(TokenStore::for_config(config)?);
        let client = ApiClient::from_config(config, tokens)?;
        debug!(api_base = %client.base_url(), "Session context started");
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }

    /// Exchange credentials for a token and store it. `remember` picks the
    /// persistent scope; otherwise the token only lasts the session.
    /// Returns the role the new token claims, if any.
    pub async fn login(&self, username: &str, password: &str, remember: bool) -> Result<Option<Role>, ApiError> {
        let body = serde_json::to_value(Credentials { username, password })
            .map_err(|e| ApiError::serialize(&e))?;
        let request = RequestDescriptor::post(LOGIN_PATH, body).without_auth();
        let response: LoginResponse = self.client.request_as(&request).await?;

        let scope = Scope::from_remember(remember);
        self.tokens.set(&response.access_token, remember);
        if let Some(refresh) = response.refresh_token.as_deref() {
            self.tokens.set_entry(REFRESH_TOKEN_KEY, refresh, scope);
        }
        info!(username, scope = ?scope, "Logged in");

        Ok(TokenClaims::decode(&response.access_token).and_then(|claims| claims.role()))
    }

    /// Trade the stored refresh token for a new access token, kept in the
    /// same scope as the current one. With no refresh token stored the call
    /// is still made and the server decides.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let mut request = RequestDescriptor::new(Method::Post, REFRESH_PATH);
        if let Some(refresh) = self.tokens.get_entry(REFRESH_TOKEN_KEY) {
            request = request.with_body(json!({ "refreshToken": refresh }));
        }
        let response: LoginResponse = self.client.request_as(&request).await?;

        let scope = self.tokens.current_scope().unwrap_or(Scope::Session);
        self.tokens.set(&response.access_token, scope == Scope::Persistent);
        if let Some(refresh) = response.refresh_token.as_deref() {
            self.tokens.set_entry(REFRESH_TOKEN_KEY, refresh, scope);
        }
        debug!(scope = ?scope, "Access token refreshed");
        Ok(())
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<Value, ApiError> {
        let body = serde_json::to_value(PasswordChange {
            old_password,
            new_password,
            confirm_new_password: new_password,
        })
        .map_err(|e| ApiError::serialize(&e))?;
        self.client
            .request(&RequestDescriptor::post(CHANGE_PASSWORD_PATH, body))
            .await
    }

    /// Header profile for the stored token. `None` when signed out; a token
    /// that can't be decoded gives the generic profile for `default_role`.
    pub fn profile(&self, default_role: Role) -> Option<Profile> {
        self.tokens
            .get()
            .map(|token| Profile::from_token(&token, default_role))
    }

    /// Role claimed by the stored token, if it decodes and names one.
    pub fn role(&self) -> Option<Role> {
        self.tokens
            .get()
            .and_then(|token| TokenClaims::decode(&token))
            .and_then(|claims| claims.role())
    }

    /// End the session: both scopes are cleared unconditionally.
    pub fn logout(self) {
        self.tokens.clear();
        info!("Logged out");
    }
}
