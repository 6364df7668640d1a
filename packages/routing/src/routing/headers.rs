// packages/routing/src/routing/headers.rs
//! Context header protocol
//!
//! The proxy passes addressing context to extension services in six
//! headers. An extension can recover the native identity of the resource it
//! was invoked for, and call back through the proxy without re-deriving
//! anything. Header lookups are case-insensitive; `as_str` gives the
//! canonical spelling.

use crate::utils::errors::{Result, RoutingError};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// The fixed set of context headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextHeader {
    /// Native repository resource URI relevant to the call
    RepositoryResourceUri,

    /// Proxy-translated resource URI relevant to the call
    ApixResourceUri,

    /// Native resource path (no scheme/authority)
    RepositoryResourcePath,

    /// URI of the exposed service invoked
    ExposedServiceUri,

    /// Configured native namespace root
    RepositoryRootUri,

    /// Configured proxy namespace root
    ApixRootUri,
}

impl ContextHeader {
    pub const ALL: [ContextHeader; 6] = [
        ContextHeader::RepositoryResourceUri,
        ContextHeader::ApixResourceUri,
        ContextHeader::RepositoryResourcePath,
        ContextHeader::ExposedServiceUri,
        ContextHeader::RepositoryRootUri,
        ContextHeader::ApixRootUri,
    ];

    /// Wire spelling of the header
    pub const fn as_str(self) -> &'static str {
        match self {
            ContextHeader::RepositoryResourceUri => "Apix-Ldp-Resource",
            ContextHeader::ApixResourceUri => "Apix-Resource",
            ContextHeader::RepositoryResourcePath => "Apix-Ldp-Resource-Path",
            ContextHeader::ExposedServiceUri => "Apix-Exposed-Uri",
            ContextHeader::RepositoryRootUri => "Apix-Ldp-Root",
            ContextHeader::ApixRootUri => "Apix-Root",
        }
    }

    /// Header name for use with `HeaderMap`
    pub fn header_name(self) -> HeaderName {
        // HeaderName::from_static only accepts lowercase names
        let name = match self {
            ContextHeader::RepositoryResourceUri => "apix-ldp-resource",
            ContextHeader::ApixResourceUri => "apix-resource",
            ContextHeader::RepositoryResourcePath => "apix-ldp-resource-path",
            ContextHeader::ExposedServiceUri => "apix-exposed-uri",
            ContextHeader::RepositoryRootUri => "apix-ldp-root",
            ContextHeader::ApixRootUri => "apix-root",
        };
        HeaderName::from_static(name)
    }

    /// Headers that only apply to resource-scoped calls
    pub fn is_resource_scoped(self) -> bool {
        matches!(
            self,
            ContextHeader::RepositoryResourceUri
                | ContextHeader::ApixResourceUri
                | ContextHeader::RepositoryResourcePath
        )
    }
}

impl fmt::Display for ContextHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextHeader {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self> {
        ContextHeader::ALL
            .into_iter()
            .find(|header| header.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RoutingError::Header(format!("unknown context header '{}'", s)))
    }
}

/// Identity of the resource a resource-scoped service was invoked on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContext {
    pub native_uri: Url,
    pub proxy_uri: Url,
    pub path: String,
}

/// Addressing context carried by one proxy-to-extension call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingContext {
    /// Present for resource-scoped services only
    ///
    /// The three resource headers (`Apix-Ldp-Resource`, `Apix-Resource`,
    /// `Apix-Ldp-Resource-Path`) describe the resource a service was invoked on,
    /// so repository-wide calls carry only the exposed URI and the two roots.
    /// A receiver must not treat their absence on such a call as an error.
    pub resource: Option<ResourceContext>,
    pub exposed_uri: Url,
    pub native_root: Url,
    pub proxy_root: Url,
}

impl RoutingContext {
    /// Header/value pairs in protocol order
    pub fn header_values(&self) -> Vec<(ContextHeader, String)> {
        let mut values = Vec::with_capacity(ContextHeader::ALL.len());

        if let Some(resource) = &self.resource {
            values.push((
                ContextHeader::RepositoryResourceUri,
                resource.native_uri.to_string(),
            ));
            values.push((ContextHeader::ApixResourceUri, resource.proxy_uri.to_string()));
            values.push((ContextHeader::RepositoryResourcePath, resource.path.clone()));
        }

        values.push((ContextHeader::ExposedServiceUri, self.exposed_uri.to_string()));
        values.push((ContextHeader::RepositoryRootUri, self.native_root.to_string()));
        values.push((ContextHeader::ApixRootUri, self.proxy_root.to_string()));

        values
    }

    /// Set the context headers on an outbound request
    ///
    /// Existing values are replaced. Resource headers left over from the
    /// inbound request are removed when the call is not resource-scoped.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        if self.resource.is_none() {
            for header in ContextHeader::ALL.into_iter().filter(|h| h.is_resource_scoped()) {
                headers.remove(header.header_name());
            }
        }

        for (header, value) in self.header_values() {
            let value = HeaderValue::from_str(&value).map_err(|e| {
                RoutingError::Header(format!("cannot encode {}: {}", header, e))
            })?;
            headers.insert(header.header_name(), value);
        }

        Ok(())
    }

    /// Read the context back from the headers of an incoming call
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let exposed_uri = required_uri(headers, ContextHeader::ExposedServiceUri)?;
        let native_root = required_uri(headers, ContextHeader::RepositoryRootUri)?;
        let proxy_root = required_uri(headers, ContextHeader::ApixRootUri)?;

        let native_uri = read(headers, ContextHeader::RepositoryResourceUri)?;
        let proxy_uri = read(headers, ContextHeader::ApixResourceUri)?;
        let path = read(headers, ContextHeader::RepositoryResourcePath)?;

        let resource = match (native_uri, proxy_uri, path) {
            (None, None, None) => None,
            (Some(native_uri), Some(proxy_uri), Some(path)) => Some(ResourceContext {
                native_uri: parse_uri(ContextHeader::RepositoryResourceUri, native_uri)?,
                proxy_uri: parse_uri(ContextHeader::ApixResourceUri, proxy_uri)?,
                path: path.to_string(),
            }),
            _ => {
                return Err(RoutingError::Header(
                    "resource headers must be sent together".to_string(),
                ))
            }
        };

        Ok(Self {
            resource,
            exposed_uri,
            native_root,
            proxy_root,
        })
    }
}

fn read(headers: &HeaderMap, header: ContextHeader) -> Result<Option<&str>> {
    headers
        .get(header.header_name())
        .map(|value| {
            value
                .to_str()
                .map_err(|e| RoutingError::Header(format!("{} is not text: {}", header, e)))
        })
        .transpose()
}

fn required_uri(headers: &HeaderMap, header: ContextHeader) -> Result<Url> {
    let value = read(headers, header)?
        .ok_or_else(|| RoutingError::Header(format!("{} is missing", header)))?;
    parse_uri(header, value)
}

fn parse_uri(header: ContextHeader, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| RoutingError::Header(format!("{} is not a URI ('{}'): {}", header, value, e)))
}
