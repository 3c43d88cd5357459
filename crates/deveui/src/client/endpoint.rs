use crate::{Error, Result};
use core::fmt;
use reqwest::Url;

/// A validated registration API address.
///
/// If the configured address carries no scheme, `http://` is assumed. The
/// normalized string is kept as given otherwise, so `example.com/register`
/// becomes `http://example.com/register`.
///
/// # Example
/// ```
/// use deveui::Endpoint;
///
/// let endpoint = Endpoint::parse("example.com/register").unwrap();
/// assert_eq!(endpoint.as_str(), "http://example.com/register");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    normalized: String,
    url: Url,
}

impl Endpoint {
    /// Normalizes and validates a registration API address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the address is empty, uses a
    /// scheme other than `http`/`https`, or does not parse as a URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidEndpoint {
                endpoint: raw.to_string(),
                reason: "registration API address is required".to_string(),
            });
        }

        let normalized = if has_scheme(trimmed) {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let url = Url::parse(&normalized).map_err(|e| Error::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidEndpoint {
                endpoint: raw.to_string(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        Ok(Self { normalized, url })
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The parsed URL requests are sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Returns `true` if `address` starts with `scheme://`.
///
/// Only the text before the first `://` counts, and it must be a valid URL
/// scheme, so `host/path?next=http://other` has none.
fn has_scheme(address: &str) -> bool {
    let Some((scheme, _)) = address.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint({})", self.normalized)
    }
}
