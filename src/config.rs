//! Provisioning configuration: `provision.toml` and fetch credentials.
//!
//! The config file lives at the project root and is read once at the start of
//! a run:
//!
//! ```toml
//! setup_url = "https://example.com/setup.tar.gz"
//! salts_url = "https://example.com/salts"        # optional
//! licenses_url = "https://example.com/licenses"  # optional
//!
//! [setup_map]                                    # optional, order matters
//! "config" = "config"
//! "web" = "public"
//! ".env" = ".env"
//! ```
//!
//! Credentials are never stored in the file; they come from environment
//! variables read at fetch time (see [`Credentials`]).

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::de::{MapAccess, Visitor};

use crate::error::{ProvisionError, Result};

/// Environment variable holding a pre-encoded Basic-Auth token.
pub const AUTH_TOKEN_VAR: &str = "BVDB_AUTH";
/// Environment variable holding the Basic-Auth username.
pub const AUTH_USER_VAR: &str = "BVDB_AUTH_USER";
/// Environment variable holding the Basic-Auth password.
pub const AUTH_PASSWORD_VAR: &str = "BVDB_AUTH_PASSWORD";

/// Immutable input for one provisioning run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisionConfig {
    /// URL of the setup archive (gzip-compressed tar). Required.
    #[serde(default)]
    pub setup_url: String,
    /// URL returning the salts block injected at the `WPSALTS` marker.
    #[serde(default)]
    pub salts_url: String,
    /// URL returning the licenses block injected at the `WPLICENSES` marker.
    #[serde(default)]
    pub licenses_url: String,
    /// Ordered relative-source → relative-destination copy map.
    #[serde(default)]
    pub setup_map: SetupMap,
}

impl ProvisionConfig {
    /// Load the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Io`] if the file cannot be read and
    /// [`ProvisionError::Config`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProvisionError::io("reading config file", path, e))?;
        toml::from_str(&text)
            .map_err(|e| ProvisionError::Config(format!("{}: {e}", path.display())))
    }

    /// Check that every required field is present.
    ///
    /// Runs before any network or filesystem work so that a missing archive
    /// URL never triggers a fetch attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] when `setup_url` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.setup_url.trim().is_empty() {
            return Err(ProvisionError::Config("missing setup_url".to_string()));
        }
        Ok(())
    }
}

/// Ordered source → destination mapping with unique keys.
///
/// TOML tables do not guarantee an iteration order through a plain
/// `HashMap`, so entries are kept in a `Vec` in document order; the map-copy
/// step applies them in exactly this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupMap(Vec<(String, String)>);

impl SetupMap {
    /// Build a map from ordered `(source, destination)` pairs. Test helper
    /// and programmatic entry point; duplicates are not checked here.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, d)| (s.as_str(), d.as_str()))
    }

    /// Destination for an exact source key, if mapped.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, d)| d.as_str())
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'de> Deserialize<'de> for SetupMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SetupMapVisitor;

        impl<'de> Visitor<'de> for SetupMapVisitor {
            type Value = SetupMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of relative source paths to destination paths")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, String)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate setup_map entry '{key}'"
                        )));
                    }
                    entries.push((key, value));
                }
                Ok(SetupMap(entries))
            }
        }

        deserializer.deserialize_map(SetupMapVisitor)
    }
}

/// Basic-Auth credentials for remote fetches, read from the environment.
///
/// A pre-encoded token ([`AUTH_TOKEN_VAR`]) wins over a username/password
/// pair; unset or empty variables count as absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Credentials {
    /// Read credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            token: non_empty_var(AUTH_TOKEN_VAR),
            user: non_empty_var(AUTH_USER_VAR),
            password: non_empty_var(AUTH_PASSWORD_VAR),
        }
    }

    /// Construct credentials directly (used by tests).
    #[must_use]
    pub fn new(token: Option<String>, user: Option<String>, password: Option<String>) -> Self {
        Self {
            token,
            user,
            password,
        }
    }

    /// The `Authorization` header value, if any credentials are configured.
    ///
    /// A pre-encoded token is used verbatim after the `Basic ` prefix;
    /// otherwise a username/password pair is base64-encoded as `user:pass`.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        use base64::Engine as _;

        if let Some(token) = &self.token {
            return Some(format!("Basic {token}"));
        }
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => {
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        }
    }
}
