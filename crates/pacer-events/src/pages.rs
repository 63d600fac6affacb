//! Page-type → URL mapping with environment-aware rewriting.
//!
//! The mapping table is plain configuration (deserializable entries); URLs in
//! the table may point at any of the site's known hosts and are rewritten to
//! the active environment's base URL at load time.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EventError, EventResult};

/// Deployment environment the automation runs against.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Environment {
    #[default]
    Dev,
    Qat,
    Prod,
}

impl Environment {
    /// Returns the environment as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qat => "qat",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = EventError;
    fn from_str(s: &str) -> EventResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "dev" => Ok(Environment::Dev),
            "qat" => Ok(Environment::Qat),
            "prod" => Ok(Environment::Prod),
            other => Err(EventError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// One row of the page-type table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTypeEntry {
    pub page_type: String,
    pub url: String,
}

/// Lookup table from lowercased page type to environment-specific URL.
#[derive(Debug, Clone)]
pub struct PageTypeMap {
    base_url: String,
    known_hosts: Vec<String>,
    pages: BTreeMap<String, String>,
}

impl PageTypeMap {
    /// Empty map for the given environment base URL.
    ///
    /// `known_hosts` lists the site's host prefixes (all environments);
    /// table URLs starting with any of them are rebased onto `base_url`.
    /// URLs of foreign hosts are kept as-is.
    pub fn new<I, S>(base_url: impl Into<String>, known_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_url: base_url.into(),
            known_hosts: known_hosts.into_iter().map(Into::into).collect(),
            pages: BTreeMap::new(),
        }
    }

    /// Load table entries, rewriting each URL for the active environment.
    ///
    /// Page types are lowercased; blank page types or URLs are skipped.
    /// Returns `self` for chaining.
    pub fn load<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = PageTypeEntry>,
    {
        for entry in entries {
            let page_type = entry.page_type.trim().to_ascii_lowercase();
            let url = entry.url.trim();
            if page_type.is_empty() || url.is_empty() {
                continue;
            }
            let rewritten = self.rewrite_url(url);
            self.pages.insert(page_type, rewritten);
        }
        debug!(mappings = self.pages.len(), "page type table loaded");
        self
    }

    /// Environment base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for a page type, if mapped. Lookup is case-insensitive.
    pub fn url_for(&self, page_type: &str) -> Option<&str> {
        self.pages
            .get(&page_type.trim().to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Number of mapped page types.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if no page types are mapped.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Rewrite a table URL for the active environment.
    ///
    /// Rules:
    /// - empty or `undefined` → the base URL itself;
    /// - a known-host prefix is replaced by the base URL;
    /// - other absolute URLs are kept unchanged;
    /// - relative paths are joined onto the base URL.
    pub fn rewrite_url(&self, url: &str) -> String {
        if url.is_empty() || url == "undefined" {
            return self.base_url.clone();
        }

        for host in &self.known_hosts {
            if let Some(path) = url.strip_prefix(host.as_str()) {
                let path = path.trim_start_matches('/');
                return format!("{}/{}", self.base_url.trim_end_matches('/'), path);
            }
        }

        if url.starts_with("https://") || url.starts_with("http://") {
            return url.to_string();
        }

        let path = url.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}
