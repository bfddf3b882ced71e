//! URL parsing helpers for identifiers.

use std::collections::HashMap;
use url::Url;

use crate::error::LoadError;

/// Path and query parameters of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInfo {
    /// URL path, always starting with `/`.
    pub path: String,
    /// Decoded query parameters. The first occurrence of a name wins.
    pub parameters: HashMap<String, String>,
}

impl UrlInfo {
    /// Parses `identifier`, assuming `https://` when it has no scheme.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidUrl`] if the identifier is not a URL.
    pub fn parse(identifier: &str) -> Result<Self, LoadError> {
        let url = if identifier.starts_with("http://") || identifier.starts_with("https://") {
            Url::parse(identifier)
        } else {
            Url::parse(&format!("https://{identifier}"))
        }
        .map_err(|e| LoadError::InvalidUrl(format!("{identifier}: {e}")))?;

        let mut parameters = HashMap::new();
        for (name, value) in url.query_pairs() {
            parameters
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        Ok(Self {
            path: url.path().to_string(),
            parameters,
        })
    }

    /// Returns a parameter value.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}
