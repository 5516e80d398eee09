//! Display-only decoding of the bearer token's payload.
//!
//! The signature is never checked here. A token that decodes is not a
//! token that is valid; the server decides that.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use tracing::warn;

use crate::models::Role;

/// The claims the UI shows. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl TokenClaims {
    /// Decode the middle segment of a JWT. Any structural problem gives `None`.
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        // Accept standard-alphabet and padded payloads as well
        let normalized: String = payload
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();
        let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// `role`, else the first of `roles`, if it names a known role.
    pub fn role(&self) -> Option<Role> {
        self.role_name()?.parse().ok()
    }

    fn role_name(&self) -> Option<&str> {
        non_empty(&self.role).or_else(|| self.roles.first().map(String::as_str).filter(|r| !r.is_empty()))
    }

    fn first_name(&self) -> Option<&str> {
        non_empty(&self.first_name)
    }

    fn last_name(&self) -> Option<&str> {
        non_empty(&self.last_name)
    }

    fn username(&self) -> Option<&str> {
        non_empty(&self.username)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// What a dashboard header shows for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub display_name: String,
    pub role_label: String,
    pub avatar: char,
    pub first_name: String,
    pub last_name: String,
}

impl Profile {
    /// Build from a stored token. A malformed token is not an error: it
    /// gives the generic profile for `default_role`.
    pub fn from_token(token: &str, default_role: Role) -> Self {
        match TokenClaims::decode(token) {
            Some(claims) => Self::from_claims(&claims, default_role),
            None => {
                warn!("Token payload could not be decoded, showing generic profile");
                Self::generic(default_role)
            }
        }
    }

    pub fn from_claims(claims: &TokenClaims, default_role: Role) -> Self {
        let display_name = match (claims.first_name(), claims.last_name()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, _) => claims
                .username()
                .unwrap_or(default_role.generic_label())
                .to_string(),
        };
        let avatar = claims
            .first_name()
            .or(claims.username())
            .and_then(|s| s.chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or(default_role.initial());

        Self {
            display_name,
            role_label: claims
                .role_name()
                .unwrap_or(default_role.as_str())
                .to_string(),
            avatar,
            first_name: claims.first_name().unwrap_or_default().to_string(),
            last_name: claims.last_name().unwrap_or_default().to_string(),
        }
    }

    pub fn generic(role: Role) -> Self {
        Self {
            display_name: role.generic_label().to_string(),
            role_label: role.as_str().to_string(),
            avatar: role.initial(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}
