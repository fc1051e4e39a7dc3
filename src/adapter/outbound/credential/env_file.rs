//! Dotenv-file credential storage.
//!
//! Credentials are read from the configured env file, falling back to the
//! process environment for keys the file does not set. Rotated tokens are
//! written back into the same file, preserving every unrelated line.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapter::outbound::atomic::write_atomic;
use crate::domain::Credentials;
use crate::error::{ConfigError, PersistenceError, Result};
use crate::port::CredentialPersistence;

pub const CLIENT_ID_KEY: &str = "UPWORK_API_KEY";
pub const CLIENT_SECRET_KEY: &str = "UPWORK_API_SECRET";
pub const ACCESS_TOKEN_KEY: &str = "UPWORK_ACCESS_TOKEN";
pub const REFRESH_TOKEN_KEY: &str = "UPWORK_ACCESS_TOKEN_REFRESH";

/// Build credentials from a key lookup, stripping surrounding quotes.
///
/// Missing keys become empty strings; use [`Credentials::validate`] to
/// reject incomplete sets.
fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Credentials {
    let read = |key: &str| {
        lookup(key)
            .map(|v| unquote(&v).to_string())
            .unwrap_or_default()
    };
    Credentials {
        client_id: read(CLIENT_ID_KEY),
        client_secret: read(CLIENT_SECRET_KEY),
        access_token: read(ACCESS_TOKEN_KEY),
        refresh_token: read(REFRESH_TOKEN_KEY),
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '\'' || c == '"')
}

/// Persists rotated tokens into a dotenv file.
pub struct EnvFileCredentials {
    path: PathBuf,
}

impl EnvFileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials, preferring values from the file over the process
    /// environment. The file holds the latest rotated tokens, which an
    /// older exported value must not shadow.
    ///
    /// A missing file falls back to the environment alone.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file exists but cannot be parsed.
    pub fn load(&self) -> Result<Credentials> {
        let file = self.read_assignments()?;
        Ok(credentials_from(|key| {
            file.get(key).cloned().or_else(|| std::env::var(key).ok())
        }))
    }

    fn read_assignments(&self) -> Result<HashMap<String, String>> {
        let iter = match dotenvy::from_path_iter(&self.path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!(path = %self.path.display(), "Env file not found; using process environment");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(invalid_env_file(&e)),
        };

        let mut assignments = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| invalid_env_file(&e))?;
            assignments.insert(key, value);
        }
        Ok(assignments)
    }
}

fn invalid_env_file(err: &dotenvy::Error) -> crate::error::Error {
    ConfigError::InvalidValue {
        field: "upwork.env_file",
        reason: err.to_string(),
    }
    .into()
}

impl CredentialPersistence for EnvFileCredentials {
    fn save(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(PersistenceError::Write {
                    path: self.path.clone(),
                    source,
                }
                .into())
            }
        };

        let updated = upsert(
            &existing,
            &[
                (ACCESS_TOKEN_KEY, access_token),
                (REFRESH_TOKEN_KEY, refresh_token),
            ],
        );
        write_atomic(&self.path, updated.as_bytes())?;
        debug!(path = %self.path.display(), "Persisted rotated tokens");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Replace (or append) `KEY='value'` assignments, keeping other lines as-is.
fn upsert(content: &str, pairs: &[(&str, &str)]) -> String {
    let mut written = vec![false; pairs.len()];
    let mut lines: Vec<String> = Vec::new();

    for line in content.lines() {
        let replaced = assignment_key(line)
            .and_then(|key| pairs.iter().position(|(k, _)| *k == key))
            .map(|idx| {
                written[idx] = true;
                render(pairs[idx].0, pairs[idx].1)
            });
        lines.push(replaced.unwrap_or_else(|| line.to_string()));
    }

    for (idx, (key, value)) in pairs.iter().enumerate() {
        if !written[idx] {
            lines.push(render(key, value));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn assignment_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, _) = trimmed.split_once('=')?;
    Some(key.trim())
}

fn render(key: &str, value: &str) -> String {
    format!("{key}='{value}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_existing_keys_in_place() {
        let content = "# upwork\nUPWORK_API_KEY=abc\nUPWORK_ACCESS_TOKEN='old'\nOTHER=1\nUPWORK_ACCESS_TOKEN_REFRESH=\"old-r\"\n";

        let updated = upsert(
            content,
            &[(ACCESS_TOKEN_KEY, "new"), (REFRESH_TOKEN_KEY, "new-r")],
        );

        assert_eq!(
            updated,
            "# upwork\nUPWORK_API_KEY=abc\nUPWORK_ACCESS_TOKEN='new'\nOTHER=1\nUPWORK_ACCESS_TOKEN_REFRESH='new-r'\n"
        );
    }

    #[test]
    fn upsert_appends_missing_keys() {
        let updated = upsert("UPWORK_API_KEY=abc", &[(ACCESS_TOKEN_KEY, "tok")]);
        assert_eq!(updated, "UPWORK_API_KEY=abc\nUPWORK_ACCESS_TOKEN='tok'\n");
    }

    #[test]
    fn upsert_handles_export_prefix_and_ignores_comments() {
        let content = "#UPWORK_ACCESS_TOKEN=commented\nexport UPWORK_ACCESS_TOKEN=old\n";
        let updated = upsert(content, &[(ACCESS_TOKEN_KEY, "new")]);
        assert_eq!(
            updated,
            "#UPWORK_ACCESS_TOKEN=commented\nUPWORK_ACCESS_TOKEN='new'\n"
        );
    }

    #[test]
    fn prefix_keys_are_not_confused() {
        // UPWORK_ACCESS_TOKEN is a prefix of UPWORK_ACCESS_TOKEN_REFRESH.
        let content = "UPWORK_ACCESS_TOKEN_REFRESH=keep\n";
        let updated = upsert(content, &[(ACCESS_TOKEN_KEY, "a")]);
        assert_eq!(
            updated,
            "UPWORK_ACCESS_TOKEN_REFRESH=keep\nUPWORK_ACCESS_TOKEN='a'\n"
        );
    }

    #[test]
    fn unquote_strips_both_quote_styles() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote(" abc "), "abc");
    }

    #[test]
    fn save_creates_and_then_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "UPWORK_API_KEY=id\n").unwrap();
        let store = EnvFileCredentials::new(&path);

        store.save("a1", "r1").unwrap();
        store.save("a2", "r2").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "UPWORK_API_KEY=id\nUPWORK_ACCESS_TOKEN='a2'\nUPWORK_ACCESS_TOKEN_REFRESH='r2'\n"
        );
    }

    #[test]
    fn load_reads_rotation_from_non_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets").join("upwork.env");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "UPWORK_API_KEY='client-id'\nUPWORK_API_SECRET=\"client-secret\"\nUPWORK_ACCESS_TOKEN=a0\nUPWORK_ACCESS_TOKEN_REFRESH=r0\n",
        )
        .unwrap();
        let store = EnvFileCredentials::new(&path);

        store.save("a1", "r1-rotated").unwrap();
        let credentials = store.load().unwrap();

        assert_eq!(credentials.client_id, "client-id");
        assert_eq!(credentials.client_secret, "client-secret");
        assert_eq!(credentials.access_token, "a1");
        assert_eq!(credentials.refresh_token, "r1-rotated");
    }

    #[test]
    fn load_without_file_falls_back_to_environment_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvFileCredentials::new(dir.path().join("absent.env"));

        assert!(store.read_assignments().unwrap().is_empty());
        assert!(store.load().is_ok());
    }

    #[test]
    fn file_values_take_precedence_over_lookup() {
        let mut file = HashMap::new();
        file.insert(REFRESH_TOKEN_KEY.to_string(), "from-file".to_string());

        let credentials = credentials_from(|key| {
            file.get(key)
                .cloned()
                .or_else(|| Some(format!("'env-{key}'")))
        });

        assert_eq!(credentials.refresh_token, "from-file");
        assert_eq!(credentials.client_id, format!("env-{CLIENT_ID_KEY}"));
    }
}
