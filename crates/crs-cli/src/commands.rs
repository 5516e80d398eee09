//! One function per subcommand.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crs_core::models::{NewUser, Section};
use crs_core::{ApiError, Config, Panel, Profile, Resource, Role, Scope, SessionContext, TokenClaims};

use crate::output::{collection_table, pretty_json, sections_table};

/// Turn an API failure into the message a user should see.
fn failure(err: ApiError, fallback: &str) -> anyhow::Error {
    debug!(status = err.status, kind = ?err.kind(), error = %err, "Command failed");
    anyhow!(err.user_message(fallback))
}

fn read_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Who the stored token says is signed in. Without a role claim no role is
/// guessed; the token's username (or `fallback`) is shown instead.
fn identity(token: Option<&str>, fallback: &str) -> String {
    let Some(claims) = token.and_then(TokenClaims::decode) else {
        return fallback.to_string();
    };
    match claims.role() {
        Some(role) => {
            let profile = Profile::from_claims(&claims, role);
            format!("{} ({})", profile.display_name, profile.role_label)
        }
        None => claims
            .username
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    }
}

/// A remembered token outranks a session one, so a new session login
/// is hidden while an older remembered login is still stored.
fn shadowed_login(requested: Scope, current: Option<Scope>) -> bool {
    current.is_some_and(|scope| scope != requested)
}

fn require_login(ctx: &SessionContext) -> Result<()> {
    if !ctx.is_authenticated() {
        bail!("Not logged in. Run `crs login` first.");
    }
    Ok(())
}

// ===== Session =====

pub async fn login(
    ctx: &SessionContext,
    config: &mut Config,
    username: Option<String>,
    remember: bool,
) -> Result<()> {
    let username = username
        .or_else(|| config.last_username.clone())
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| anyhow!("No username given and none remembered"))?;

    let password = rpassword::prompt_password(format!("Password for {}: ", username))?;
    if password.is_empty() {
        bail!("Username and password required");
    }

    let role = ctx
        .login(&username, &password, remember)
        .await
        .map_err(|e| failure(e, "Login failed"))?;

    config.last_username = Some(username.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    let requested = Scope::from_remember(remember);
    if shadowed_login(requested, ctx.tokens().current_scope()) {
        warn!(requested = ?requested, "An older remembered login takes priority over this one");
        println!("Logged in as {}", username);
        println!("A remembered login is still stored and takes priority. Run `crs logout`, then log in again.");
        return Ok(());
    }

    println!("Logged in as {}", identity(ctx.tokens().get().as_deref(), &username));
    if let Some(role) = role {
        println!("Start with: {}", Panel::default_for(role).title());
    }
    Ok(())
}

pub fn logout(ctx: SessionContext) {
    ctx.logout();
    println!("Logged out");
}

pub fn whoami(ctx: &SessionContext) -> Result<()> {
    require_login(ctx)?;
    let token = ctx.tokens().get();
    match ctx.role() {
        Some(role) => {
            let profile = ctx.profile(role).ok_or_else(|| anyhow!("Not logged in"))?;
            println!("[{}] {}", profile.avatar, profile.display_name);
            println!("Role: {}", profile.role_label);
        }
        None => {
            println!("{}", identity(token.as_deref(), "Unknown user"));
            println!("Role: unknown (the token names no known role)");
        }
    }
    if let Some(scope) = ctx.tokens().current_scope() {
        println!("Token scope: {:?}", scope);
    }
    Ok(())
}

pub async fn refresh(ctx: &SessionContext) -> Result<()> {
    ctx.refresh()
        .await
        .map_err(|e| failure(e, "Could not refresh the session"))?;
    println!("Session refreshed");
    Ok(())
}

pub async fn change_password(ctx: &SessionContext) -> Result<()> {
    require_login(ctx)?;
    let old = rpassword::prompt_password("Current password: ")?;
    let new = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Repeat new password: ")?;
    if old.is_empty() || new.is_empty() {
        bail!("Passwords must not be empty");
    }
    if new != confirm {
        bail!("New passwords do not match");
    }

    let response = ctx
        .change_password(&old, &new)
        .await
        .map_err(|e| failure(e, "Could not change password"))?;
    let message = response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Password changed");
    println!("{}", message);
    Ok(())
}

// ===== Resources =====

pub async fn list(ctx: &SessionContext, resource: Resource, search: Option<&str>, json: bool) -> Result<()> {
    let value = ctx
        .client()
        .list(resource, search)
        .await
        .map_err(|e| failure(e, &format!("Could not load {}", resource)))?;

    if json {
        println!("{}", pretty_json(&value));
        return Ok(());
    }
    match collection_table(resource, &value) {
        Ok(table) if table.is_empty() => println!("No {} found", resource),
        Ok(table) => println!("{}", table.render()),
        Err(e) => {
            warn!(resource = %resource, error = %e, "Unexpected list shape, printing raw JSON");
            println!("{}", pretty_json(&value));
        }
    }
    Ok(())
}

pub async fn get(ctx: &SessionContext, resource: Resource, id: &str) -> Result<()> {
    let value = ctx
        .client()
        .fetch(resource, id)
        .await
        .map_err(|e| failure(e, &format!("Could not load {} {}", resource, id)))?;
    println!("{}", pretty_json(&value));
    Ok(())
}

pub async fn delete(ctx: &SessionContext, resource: Resource, id: &str) -> Result<()> {
    ctx.client()
        .delete(resource, id)
        .await
        .map_err(|e| failure(e, &format!("Could not delete {} {}", resource, id)))?;
    println!("Deleted {} {}", resource, id);
    Ok(())
}

pub async fn create(ctx: &SessionContext, resource: Resource, file: &Path) -> Result<()> {
    let body = read_json(file)?;
    let created = ctx
        .client()
        .create(resource, &body)
        .await
        .map_err(|e| failure(e, &format!("Could not create in {}", resource)))?;
    println!("{}", pretty_json(&created));
    Ok(())
}

pub async fn update(ctx: &SessionContext, resource: Resource, id: &str, file: &Path) -> Result<()> {
    let body = read_json(file)?;
    let updated = ctx
        .client()
        .update(resource, id, &body)
        .await
        .map_err(|e| failure(e, &format!("Could not update {} {}", resource, id)))?;
    println!("{}", pretty_json(&updated));
    Ok(())
}

pub async fn create_user(ctx: &SessionContext, role: Role, file: &Path) -> Result<()> {
    let user: NewUser = serde_json::from_value(read_json(file)?)
        .with_context(|| format!("{} is not an account form", file.display()))?;
    let user = user.for_role(role);
    user.validate()?;

    ctx.client()
        .create_account(role, &user)
        .await
        .map_err(|e| failure(e, "Could not create the account"))?;
    println!("Created {} account {}", role.generic_label().to_lowercase(), user.username);
    Ok(())
}

pub async fn sections(ctx: &SessionContext, search: Option<&str>) -> Result<()> {
    let sections: Vec<Section> = ctx
        .client()
        .list_as(Resource::Sections, None)
        .await
        .map_err(|e| failure(e, "Could not load sections"))?;

    let query = search.unwrap_or_default();
    let matching: Vec<&Section> = sections.iter().filter(|s| s.matches(query)).collect();
    if matching.is_empty() {
        println!("No sections found");
    } else {
        println!("{}", sections_table(&matching).render());
    }
    Ok(())
}

/// Count every collection at once. One failing collection doesn't hide
/// the others.
pub async fn overview(ctx: &SessionContext) -> Result<()> {
    let results = ctx.client().list_many(&Resource::ALL).await;

    let mut failures = 0;
    for (resource, result) in results {
        match result {
            Ok(Value::Array(items)) => println!("{:<12} {}", resource.name(), items.len()),
            Ok(_) => println!("{:<12} ?", resource.name()),
            Err(e) => {
                failures += 1;
                println!("{:<12} error: {}", resource.name(), e.user_message("unavailable"));
            }
        }
    }
    if failures == Resource::ALL.len() {
        bail!("Could not load any collection");
    }
    Ok(())
}

pub fn panels(ctx: &SessionContext, role: Option<Role>) -> Result<()> {
    let role = role
        .or_else(|| ctx.role())
        .ok_or_else(|| anyhow!("No role given and the stored token names none"))?;
    let default = Panel::default_for(role);
    for panel in Panel::available_for(role) {
        let marker = if *panel == default { "*" } else { " " };
        println!("{} {:<12} {}", marker, panel.as_str(), panel.title());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(payload: Value) -> String {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    #[test]
    fn test_identity_uses_role_claim() {
        let t = token(json!({"firstName": "Sara", "lastName": "Karimi", "role": "ADMIN"}));
        assert_eq!(identity(Some(t.as_str()), "skarimi"), "Sara Karimi (ADMIN)");
    }

    #[test]
    fn test_identity_without_role_guesses_nothing() {
        let t = token(json!({"firstName": "Sara", "username": "skarimi"}));
        assert_eq!(identity(Some(t.as_str()), "fallback"), "skarimi");
        assert_eq!(identity(Some("not-a-jwt"), "fallback"), "fallback");
        assert_eq!(identity(None, "fallback"), "fallback");
    }

    #[test]
    fn test_session_login_under_remembered_token_is_flagged() {
        assert!(shadowed_login(Scope::Session, Some(Scope::Persistent)));
        assert!(!shadowed_login(Scope::Session, Some(Scope::Session)));
        assert!(!shadowed_login(Scope::Persistent, Some(Scope::Persistent)));
        assert!(!shadowed_login(Scope::Session, None));
    }
}
