//! Per-interface request context.
//!
//! Every scoped [`HttpInterface`](crate::host::http::HttpInterface) owns one
//! context. Filters read it to decide how to decorate a request, and the
//! interface records the redirects it followed into it.

use std::collections::HashMap;
use url::Url;

/// Attribute set before each client attempt: whether the client may use OAuth.
pub const OAUTH_CLIENT_ATTRIBUTE: &str = "yt-oauth-client";

// ============================================================================
// Attribute Value
// ============================================================================

/// A value stored in the request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Boolean flag.
    Flag(bool),
    /// Free-form text.
    Text(String),
}

// ============================================================================
// Request Context
// ============================================================================

/// Mutable state attached to one scoped HTTP interface.
#[derive(Debug, Clone)]
pub struct RequestContext {
    attributes: HashMap<String, AttributeValue>,
    redirect_locations: Vec<Url>,
    follow_redirects: bool,
}

impl RequestContext {
    /// Creates an empty context that follows redirects.
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
            redirect_locations: Vec::new(),
            follow_redirects: true,
        }
    }

    /// Sets an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Sets a boolean attribute.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.set_attribute(name, AttributeValue::Flag(value));
    }

    /// Returns an attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Returns a boolean attribute, if set and boolean.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.attributes.get(name) {
            Some(AttributeValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    /// Removes an attribute.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    /// Redirect targets seen by the most recent `execute`, in order.
    pub fn redirect_locations(&self) -> &[Url] {
        &self.redirect_locations
    }

    pub(crate) fn record_redirect(&mut self, location: Url) {
        self.redirect_locations.push(location);
    }

    pub(crate) fn clear_redirects(&mut self) {
        self.redirect_locations.clear();
    }

    /// Whether `execute` follows redirects.
    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// Enables or disables redirect following for subsequent requests.
    ///
    /// The first redirect target is recorded either way.
    pub fn set_follow_redirects(&mut self, follow: bool) {
        self.follow_redirects = follow;
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
