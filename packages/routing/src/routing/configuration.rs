// packages/routing/src/routing/configuration.rs
//! Routing configuration
//!
//! Holds the two namespace roots (native repository and proxy/intercept) and
//! the endpoint templates used to build exposed-service and service-document
//! URIs. A configuration is validated once and never mutated afterwards.

use crate::utils::errors::{Result, RoutingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use url::{Position, Url};

/// Fixed path segments used when composing endpoint URIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointTemplates {
    /// Segment under the proxy root for resource-scoped services
    pub resource_segment: String,

    /// Segment under the proxy root for repository-wide services
    pub global_segment: String,

    /// Prefix of the extension identifier segment
    pub service_marker: String,

    /// Segment appended to a resource for its service document
    pub service_doc_segment: String,
}

impl Default for EndpointTemplates {
    fn default() -> Self {
        Self {
            resource_segment: "services".to_string(),
            global_segment: "repository".to_string(),
            service_marker: "svc:".to_string(),
            service_doc_segment: "svc:services".to_string(),
        }
    }
}

impl EndpointTemplates {
    /// Validate the templates
    pub fn validate(&self) -> Result<()> {
        let segments = [
            ("resource_segment", &self.resource_segment),
            ("global_segment", &self.global_segment),
            ("service_marker", &self.service_marker),
            ("service_doc_segment", &self.service_doc_segment),
        ];

        for (name, value) in segments {
            if value.is_empty() {
                return Err(RoutingError::InvalidConfiguration(format!(
                    "{} cannot be empty",
                    name
                )));
            }
            if value.contains(['/', '?', '#']) {
                return Err(RoutingError::InvalidConfiguration(format!(
                    "{} must be a single path segment, got '{}'",
                    name, value
                )));
            }
        }

        if self.resource_segment == self.global_segment {
            return Err(RoutingError::InvalidConfiguration(format!(
                "resource and global segments must differ (both '{}')",
                self.resource_segment
            )));
        }

        Ok(())
    }
}

/// Which of the two configured namespaces a URI belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// The repository's own URI space
    Native,

    /// The intercept URI space client traffic enters through
    Proxy,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Native => f.write_str("native"),
            Namespace::Proxy => f.write_str("proxy"),
        }
    }
}

/// A validated namespace root
///
/// `prefix` is the serialized root up to the end of its path, without a
/// trailing `/`. A URI lies under the root when it starts with `prefix` and
/// the remainder is empty or starts with `/`, `?` or `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamespaceRoot {
    url: Url,
    prefix: String,
}

impl NamespaceRoot {
    fn parse(namespace: Namespace, url: Url) -> Result<Self> {
        if url.cannot_be_a_base() {
            return Err(RoutingError::InvalidConfiguration(format!(
                "{} root '{}' is not hierarchical",
                namespace, url
            )));
        }
        if url.host().is_none() {
            return Err(RoutingError::InvalidConfiguration(format!(
                "{} root '{}' has no authority",
                namespace, url
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(RoutingError::InvalidConfiguration(format!(
                "{} root '{}' must not carry a query or fragment",
                namespace, url
            )));
        }

        let prefix = url[..Position::AfterPath].trim_end_matches('/').to_string();

        Ok(Self { url, prefix })
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True when the root has no path of its own, e.g. `http://localhost:8080/`
    ///
    /// Such a root can only address its root resource as `/`, while a root
    /// with a path addresses it with an empty remainder.
    pub(crate) fn is_host_only(&self) -> bool {
        self.prefix.len() == self.url[..Position::BeforePath].len()
    }

    /// Remainder of `uri` after this root, if `uri` lies under it
    pub(crate) fn remainder<'a>(&self, uri: &'a str) -> Option<&'a str> {
        let rest = uri.strip_prefix(self.prefix.as_str())?;
        match rest.as_bytes().first() {
            None | Some(b'/') | Some(b'?') | Some(b'#') => Some(rest),
            _ => None,
        }
    }
}

/// Immutable routing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfiguration {
    native: NamespaceRoot,
    proxy: NamespaceRoot,
    templates: EndpointTemplates,
}

impl RoutingConfiguration {
    /// Build a configuration from two absolute URI strings with default templates
    pub fn new(native_root: &str, proxy_root: &str) -> Result<Self> {
        Self::with_templates(native_root, proxy_root, EndpointTemplates::default())
    }

    /// Build a configuration from two absolute URI strings and custom templates
    pub fn with_templates(
        native_root: &str,
        proxy_root: &str,
        templates: EndpointTemplates,
    ) -> Result<Self> {
        let native = parse_absolute(Namespace::Native, native_root)?;
        let proxy = parse_absolute(Namespace::Proxy, proxy_root)?;
        Self::build(native, proxy, templates)
    }

    /// Build a configuration from already parsed URLs with default templates
    pub fn from_urls(native_root: Url, proxy_root: Url) -> Result<Self> {
        Self::build(native_root, proxy_root, EndpointTemplates::default())
    }

    fn build(native_root: Url, proxy_root: Url, templates: EndpointTemplates) -> Result<Self> {
        let native = NamespaceRoot::parse(Namespace::Native, native_root)?;
        let proxy = NamespaceRoot::parse(Namespace::Proxy, proxy_root)?;

        if native.prefix == proxy.prefix {
            return Err(RoutingError::InvalidConfiguration(format!(
                "native and proxy roots are identical ({})",
                native.url
            )));
        }

        // Overlapping roots would make every translation ambiguous
        if native.remainder(&proxy.prefix).is_some() || proxy.remainder(&native.prefix).is_some()
        {
            return Err(RoutingError::InvalidConfiguration(format!(
                "native root {} and proxy root {} overlap",
                native.url, proxy.url
            )));
        }

        templates.validate()?;

        info!(
            native_root = %native.url,
            proxy_root = %proxy.url,
            "Routing configuration created"
        );

        Ok(Self {
            native,
            proxy,
            templates,
        })
    }

    /// Base URI of the repository's native namespace
    pub fn native_root(&self) -> &Url {
        self.native.url()
    }

    /// Base URI of the intercept namespace
    pub fn proxy_root(&self) -> &Url {
        self.proxy.url()
    }

    /// Endpoint templates
    pub fn templates(&self) -> &EndpointTemplates {
        &self.templates
    }

    pub(crate) fn root(&self, namespace: Namespace) -> &NamespaceRoot {
        match namespace {
            Namespace::Native => &self.native,
            Namespace::Proxy => &self.proxy,
        }
    }
}

fn parse_absolute(namespace: Namespace, raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RoutingError::InvalidConfiguration(format!(
            "{} root is missing",
            namespace
        )));
    }

    Url::parse(trimmed).map_err(|e| {
        RoutingError::InvalidConfiguration(format!(
            "{} root '{}' is not an absolute URI: {}",
            namespace, trimmed, e
        ))
    })
}
