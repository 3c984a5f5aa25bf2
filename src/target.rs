//! Target URL decomposition
//!
//! Only the literal prefixes `http://` and `https://` are recognized. The
//! remainder is split into a host (a name, an address, or a bracketed IPv6
//! literal) and a path; there is no port, query or userinfo handling.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest host copied out of a URL; excess bytes are dropped.
pub const MAX_HOST_LEN: usize = 16383;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// URL scheme of a probe target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Port implied by the scheme
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// A decomposed probe target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub scheme: Scheme,
    /// Host name, IPv4 address, or IPv6 literal without brackets
    pub host: String,
    /// Request path, never empty
    pub path: String,
}

impl Target {
    /// Decompose a raw URL string
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix(HTTPS_PREFIX) {
            (Scheme::Https, rest)
        } else if let Some(rest) = url.strip_prefix(HTTP_PREFIX) {
            (Scheme::Http, rest)
        } else {
            return Err(AppError::unsupported_scheme(format!(
                "'{}' (only http:// and https:// are supported)",
                url
            )));
        };

        let (host, path) = match rest.strip_prefix('[') {
            Some(literal) => {
                let end = scan_limit(literal, |b| b == b']');
                if literal.as_bytes().get(end) != Some(&b']') {
                    return Err(AppError::malformed_url(format!(
                        "'{}' has an unterminated IPv6 literal",
                        url
                    )));
                }
                (bounded_host(&literal[..end]), &literal[end + 1..])
            }
            None => {
                let end = rest.find('/').unwrap_or(rest.len());
                (bounded_host(&rest[..end]), &rest[end..])
            }
        };

        let path = if path.is_empty() { "/" } else { path };

        Ok(Self {
            scheme,
            host,
            path: path.to_string(),
        })
    }

    /// Whether the transport must be wrapped in TLS
    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// Port implied by the scheme
    pub fn default_port(&self) -> u16 {
        self.scheme.default_port()
    }

    /// Host as it would appear in a URL authority
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority(), self.path)
    }
}

/// Index of the first byte matching `stop`, looking at no more than
/// `MAX_HOST_LEN` bytes; returns the scan position where it gave up otherwise.
fn scan_limit(s: &str, stop: impl Fn(u8) -> bool) -> usize {
    s.bytes()
        .take(MAX_HOST_LEN)
        .position(stop)
        .unwrap_or_else(|| s.len().min(MAX_HOST_LEN))
}

/// Copy at most `MAX_HOST_LEN` bytes, cutting on a char boundary.
fn bounded_host(host: &str) -> String {
    if host.len() <= MAX_HOST_LEN {
        return host.to_string();
    }
    let mut end = MAX_HOST_LEN;
    while !host.is_char_boundary(end) {
        end -= 1;
    }
    host[..end].to_string()
}
