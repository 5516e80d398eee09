use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use super::scopes::{FileScope, KeyringScope, MemoryScope, TokenScope};
use crate::config::{Config, TokenBackend};

/// Key the bearer credential is stored under in both scopes
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key for the optional refresh token issued alongside it
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Token file name in the persistent (cache) directory
const PERSISTENT_TOKEN_FILE: &str = "tokens.json";

/// Token file name in the session (runtime) directory
const SESSION_TOKEN_FILE: &str = "session-token.json";

/// Where a credential lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Survives across sessions ("remember me")
    Persistent,
    /// Gone when the session ends
    Session,
}

impl Scope {
    pub fn from_remember(remember: bool) -> Self {
        if remember {
            Scope::Persistent
        } else {
            Scope::Session
        }
    }
}

/// Holds the bearer credential across a persistent and a session scope.
///
/// When both scopes hold a value the persistent one wins; the session scope
/// is the fallback for logins that weren't remembered. Every operation is
/// total: backend failures are logged and read as "absent".
pub struct TokenStore {
    persistent: Box<dyn TokenScope>,
    session: Box<dyn TokenScope>,
}

impl TokenStore {
    pub fn new(persistent: Box<dyn TokenScope>, session: Box<dyn TokenScope>) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// Both scopes in memory; nothing touches disk.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryScope::new()), Box::new(MemoryScope::new()))
    }

    /// Scopes chosen from configuration: the persistent scope is the keychain
    /// or a file in the cache directory, the session scope is a file in the
    /// per-login runtime directory.
    pub fn for_config(config: &Config) -> Result<Self> {
        let persistent: Box<dyn TokenScope> = match config.token_backend {
            TokenBackend::Keyring => Box::new(KeyringScope),
            TokenBackend::File => Box::new(FileScope::new(
                config.cache_dir()?.join(PERSISTENT_TOKEN_FILE),
            )),
        };
        Ok(Self::new(persistent, session_scope(config.session_dir())))
    }

    /// Store the credential in one scope. The other scope is left alone.
    pub fn set(&self, value: &str, persistent: bool) {
        self.set_entry(ACCESS_TOKEN_KEY, value, Scope::from_remember(persistent));
    }

    /// The authoritative credential: persistent first, then session.
    pub fn get(&self) -> Option<String> {
        self.get_entry(ACCESS_TOKEN_KEY)
    }

    /// Remove every stored credential from both scopes.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            for scope in [Scope::Persistent, Scope::Session] {
                self.remove_entry(key, scope);
            }
        }
    }

    /// Which scope the authoritative credential came from.
    pub fn current_scope(&self) -> Option<Scope> {
        if Self::read(self.persistent.as_ref(), ACCESS_TOKEN_KEY).is_some() {
            Some(Scope::Persistent)
        } else if Self::read(self.session.as_ref(), ACCESS_TOKEN_KEY).is_some() {
            Some(Scope::Session)
        } else {
            None
        }
    }

    pub(crate) fn set_entry(&self, key: &str, value: &str, scope: Scope) {
        let backend = self.scope(scope);
        match backend.write(key, value) {
            Ok(()) => debug!(key, scope = ?scope, backend = %backend.describe(), "Stored token"),
            Err(e) => warn!(key, scope = ?scope, error = %e, "Failed to store token"),
        }
    }

    pub(crate) fn get_entry(&self, key: &str) -> Option<String> {
        Self::read(self.persistent.as_ref(), key).or_else(|| Self::read(self.session.as_ref(), key))
    }

    fn remove_entry(&self, key: &str, scope: Scope) {
        if let Err(e) = self.scope(scope).remove(key) {
            warn!(key, scope = ?scope, error = %e, "Failed to remove token");
        }
    }

    fn scope(&self, scope: Scope) -> &dyn TokenScope {
        match scope {
            Scope::Persistent => self.persistent.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    /// Empty values count as absent.
    fn read(backend: &dyn TokenScope, key: &str) -> Option<String> {
        match backend.read(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, backend = %backend.describe(), error = %e, "Failed to read token");
                None
            }
        }
    }
}

/// File in the runtime directory, or process memory where there is none.
/// Shared directories such as the system temp dir are never used.
fn session_scope(runtime_dir: Option<PathBuf>) -> Box<dyn TokenScope> {
    match runtime_dir {
        Some(dir) => Box::new(FileScope::new(dir.join(SESSION_TOKEN_FILE))),
        None => {
            debug!("No runtime directory, session tokens last for this process only");
            Box::new(MemoryScope::new())
        }
    }
}
