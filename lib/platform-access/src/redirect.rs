//! Post-authentication redirect validation.
//!
//! Clients supply a redirect target before logging in; after the
//! provider round-trip the server must only redirect to targets on the
//! configured allow-list. Entries are compared by host and port alone,
//! deliberately ignoring scheme, path, and query so clients can vary
//! paths without configuration churn while staying on trusted hosts.

use crate::error::ConfigurationError;
use url::Url;

/// Host+port key a redirect target is reduced to for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RedirectKey {
    /// Lowercased host.
    host: String,
    /// Explicit port; `None` when absent or equal to the scheme default.
    port: Option<u16>,
}

impl RedirectKey {
    fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        Some(Self {
            host,
            port: url.port(),
        })
    }
}

/// Process-wide set of authorized redirect targets.
///
/// Built once at startup from configuration and immutable thereafter.
#[derive(Debug, Clone)]
pub struct AllowedRedirectSet {
    entries: Vec<RedirectKey>,
}

impl AllowedRedirectSet {
    /// Parses the configured allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MalformedRedirectEntry`] if any
    /// entry is not an absolute URI with a host. A bad allow-list is a
    /// deployment mistake and must fail the process at startup, not be
    /// skipped silently.
    pub fn from_uris<I, S>(uris: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for uri in uris {
            let uri = uri.as_ref();
            let url = Url::parse(uri).map_err(|e| ConfigurationError::MalformedRedirectEntry {
                entry: uri.to_string(),
                reason: e.to_string(),
            })?;
            let key =
                RedirectKey::of(&url).ok_or_else(|| ConfigurationError::MalformedRedirectEntry {
                    entry: uri.to_string(),
                    reason: "no host component".to_string(),
                })?;
            entries.push(key);
        }
        Ok(Self { entries })
    }

    /// Returns true iff the candidate's host and port match some entry.
    ///
    /// Unparsable candidates are unauthorized; this function never
    /// fails past the boundary. Pure over in-memory data, no network
    /// access.
    #[must_use]
    pub fn is_authorized(&self, candidate: &str) -> bool {
        let Ok(url) = Url::parse(candidate) else {
            return false;
        };
        let Some(key) = RedirectKey::of(&url) else {
            return false;
        };
        self.entries.contains(&key)
    }

    /// Number of configured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
