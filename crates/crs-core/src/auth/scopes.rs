//! Storage backends a credential scope can live in.

use std::collections::BTreeMap;
use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};
use keyring::Entry;

/// Keychain service name for stored tokens
const SERVICE_NAME: &str = "crs-client";

/// Token files are readable by their owner only
#[cfg(unix)]
const PRIVATE_FILE_MODE: u32 = 0o600;

/// Directories created for token files
#[cfg(unix)]
const PRIVATE_DIR_MODE: u32 = 0o700;

/// A key/value slot for credentials. Implementations may fail; the
/// `TokenStore` above them absorbs those failures.
pub trait TokenScope: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Short name for log lines
    fn describe(&self) -> String;
}

/// Process-lifetime storage.
#[derive(Debug, Default)]
pub struct MemoryScope {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenScope for MemoryScope {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| anyhow!("memory scope lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("memory scope lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("memory scope lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// A JSON object on disk, one property per key.
/// The file is deleted once its last key is removed. On unix the file is
/// kept at mode 0600 and missing directories are created at 0700.
#[derive(Debug, Clone)]
pub struct FileScope {
    path: PathBuf,
}

impl FileScope {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token file {}", self.path.display()))
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        write_private_file(&self.path, contents.as_bytes())
            .with_context(|| format!("Failed to write token file {}", self.path.display()))
    }
}

fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PRIVATE_DIR_MODE);
    }
    builder
        .create(dir)
        .with_context(|| format!("Failed to create token directory {}", dir.display()))
}

fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_FILE_MODE);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten files left by older runs
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(PRIVATE_FILE_MODE))?;
    }
    file.write_all(contents)?;
    Ok(())
}

impl TokenScope for FileScope {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        // An unreadable file is replaced rather than blocking the write
        let mut entries = self.load().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load().unwrap_or_default();
        entries.remove(key);
        self.store(&entries)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// OS keychain, one entry per key under the `crs-client` service.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringScope;

impl KeyringScope {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl TokenScope for KeyringScope {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }

    fn describe(&self) -> String {
        "keyring".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_scope_round_trip() {
        let scope = MemoryScope::new();
        assert_eq!(scope.read("accessToken").unwrap(), None);
        scope.write("accessToken", "abc").unwrap();
        assert_eq!(scope.read("accessToken").unwrap().as_deref(), Some("abc"));
        scope.remove("accessToken").unwrap();
        assert_eq!(scope.read("accessToken").unwrap(), None);
    }

    #[test]
    fn test_file_scope_keeps_keys_independent() {
        let dir = TempDir::new().unwrap();
        let scope = FileScope::new(dir.path().join("nested").join("tokens.json"));

        scope.write("accessToken", "a1").unwrap();
        scope.write("refreshToken", "r1").unwrap();
        assert_eq!(scope.read("accessToken").unwrap().as_deref(), Some("a1"));

        scope.remove("accessToken").unwrap();
        assert_eq!(scope.read("accessToken").unwrap(), None);
        assert_eq!(scope.read("refreshToken").unwrap().as_deref(), Some("r1"));
        assert!(scope.path().exists());
    }

    #[test]
    fn test_file_scope_deletes_empty_file() {
        let dir = TempDir::new().unwrap();
        let scope = FileScope::new(dir.path().join("tokens.json"));
        scope.write("accessToken", "a1").unwrap();
        scope.remove("accessToken").unwrap();
        assert!(!scope.path().exists());
        // Removing again from a missing file is fine
        scope.remove("accessToken").unwrap();
    }

    #[test]
    fn test_file_scope_rejects_corrupt_file_on_read_but_overwrites_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();
        let scope = FileScope::new(&path);

        assert!(scope.read("accessToken").is_err());
        scope.write("accessToken", "fresh").unwrap();
        assert_eq!(scope.read("accessToken").unwrap().as_deref(), Some("fresh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_scope_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let token_dir = dir.path().join("crs-client");
        let scope = FileScope::new(token_dir.join("session-token.json"));
        scope.write("accessToken", "secret-token").unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(scope.path()), 0o600);
        assert_eq!(mode(&token_dir), 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_scope_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileScope::new(&path).write("accessToken", "secret-token").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
