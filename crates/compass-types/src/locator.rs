//! Source locators: simplified RFC 3986 references for journal entries.
//!
//! A [`Locator`] records *what* an entry navigated to. Object-only
//! navigations have no locator at all; everything else carries one so
//! the entry can be replayed after the journal is persisted and
//! reloaded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// A parsed source locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    /// Scheme component (e.g. `"app"`, `"http"`, `"pack"`).
    pub scheme: String,
    /// Host component; for pack-relative locators this is the first
    /// path segment.
    pub host: String,
    /// Optional explicit port number.
    pub port: Option<u16>,
    /// Path component starting with `/`.
    pub path: String,
    /// Optional query string (without the leading `?`).
    pub query: Option<String>,
    /// Optional fragment (without the leading `#`).
    pub fragment: Option<String>,
}

impl Locator {
    /// Parse a locator string.
    ///
    /// Handles full references (`scheme://host/path?q#frag`),
    /// protocol-relative (`//host/path`), and fragment-only (`#section`)
    /// forms.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NavError::Locator("empty locator".into()));
        }

        // Fragment-only reference.
        if let Some(frag) = raw.strip_prefix('#') {
            return Ok(Self {
                scheme: String::new(),
                host: String::new(),
                port: None,
                path: String::new(),
                query: None,
                fragment: Some(frag.to_string()),
            });
        }

        // Protocol-relative: //host/path
        if let Some(rest) = raw.strip_prefix("//") {
            return Self::parse_authority_and_path("", rest);
        }

        // Full reference with scheme.
        if let Some(idx) = raw.find("://") {
            let scheme = &raw[..idx];
            let rest = &raw[idx + 3..];
            return Self::parse_authority_and_path(scheme, rest);
        }

        Err(NavError::Locator(format!("no scheme in {raw:?}")))
    }

    /// Parse `host[:port]/path?query#fragment` after the scheme has been
    /// stripped.
    fn parse_authority_and_path(scheme: &str, rest: &str) -> Result<Locator> {
        // Split authority from path, then path from query/fragment.
        let (authority, tail) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        let (path, query, fragment) = split_path_query_fragment(tail);

        // Parse host and optional port from authority.
        let (host, port) = match authority.rfind(':') {
            Some(i) => {
                let maybe_port = &authority[i + 1..];
                if let Ok(p) = maybe_port.parse::<u16>() {
                    (&authority[..i], Some(p))
                } else {
                    (authority, None)
                }
            },
            None => (authority, None),
        };

        let path = if path.is_empty() { "/".to_string() } else { path };

        Ok(Self {
            scheme: scheme.to_lowercase(),
            host: host.to_string(),
            port,
            path,
            query,
            fragment,
        })
    }

    /// Resolve a relative reference against this base locator.
    ///
    /// Handles absolute references (returned as-is), protocol-relative
    /// (`//host/path`), absolute paths (`/path`), relative paths
    /// (`path`, `../path`), query-only (`?q=x`), and fragment-only
    /// (`#frag`) references.
    pub fn resolve(&self, relative: &str) -> Result<Locator> {
        let relative = relative.trim();
        if relative.is_empty() {
            return Ok(self.clone());
        }

        // Absolute reference (has scheme).
        if relative.contains("://") {
            return Locator::parse(relative);
        }

        // Protocol-relative.
        if relative.starts_with("//") {
            return Locator::parse(&format!("{}:{}", self.scheme, relative));
        }

        // Fragment-only.
        if let Some(frag) = relative.strip_prefix('#') {
            let mut resolved = self.clone();
            resolved.fragment = Some(frag.to_string());
            return Ok(resolved);
        }

        // Query-only.
        if let Some(query) = relative.strip_prefix('?') {
            let mut resolved = self.clone();
            resolved.query = Some(query.to_string());
            resolved.fragment = None;
            return Ok(resolved);
        }

        let (rel_path, query, fragment) = split_path_query_fragment(relative);
        let path = if relative.starts_with('/') {
            rel_path
        } else {
            resolve_path(self.directory(), &rel_path)
        };

        Ok(Self {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path,
            query,
            fragment,
        })
    }

    /// Directory portion of the path (everything up to and including the
    /// last `/`).
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "/",
        }
    }

    /// Whether two locators address the same document, ignoring the
    /// fragment. Fragment-only navigations within one document replay
    /// state rather than reloading content.
    pub fn same_document(&self, other: &Locator) -> bool {
        self.scheme == other.scheme
            && self.host == other.host
            && self.port == other.port
            && self.path == other.path
            && self.query == other.query
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scheme.is_empty() && self.host.is_empty() {
            if let Some(ref frag) = self.fragment {
                return write!(f, "#{frag}");
            }
        }
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.path)?;
        if let Some(ref q) = self.query {
            write!(f, "?{q}")?;
        }
        if let Some(ref frag) = self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Split a (possibly relative) path string into `(path, query, fragment)`.
fn split_path_query_fragment(s: &str) -> (String, Option<String>, Option<String>) {
    let (s, fragment) = match s.find('#') {
        Some(i) => (&s[..i], Some(s[i + 1..].to_string())),
        None => (s, None),
    };
    let (path, query) = match s.find('?') {
        Some(i) => (s[..i].to_string(), Some(s[i + 1..].to_string())),
        None => (s.to_string(), None),
    };
    (path, query, fragment)
}

/// Resolve a relative path against a base directory, normalizing `.`
/// and `..` segments.
fn resolve_path(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for seg in relative.split('/') {
        match seg {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }

    let mut path = String::from("/");
    path.push_str(&segments.join("/"));
    if relative.ends_with('/') && path.len() > 1 {
        path.push('/');
    }
    path
}
