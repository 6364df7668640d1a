// packages/routing/src/routing/endpoint.rs
//! Endpoint resolution for exposed extension services
//!
//! Endpoints always live in the proxy namespace:
//!
//! ```text
//! resource scope: {proxy_root}/{resource_segment}{path}/{marker}{extension}/{operation}
//! global scope:   {proxy_root}/{global_segment}/{marker}{extension}/{operation}
//! service doc:    {proxy_root}{path}/{service_doc_segment}
//! ```

use crate::routing::configuration::Namespace;
use crate::routing::translator::AddressTranslator;
use crate::utils::errors::{Result, RoutingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;
use url::Url;

/// Where an exposed service is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingScope {
    /// Exposed once for the whole repository
    Global,

    /// Exposed on every resource it applies to
    Resource,

    /// Exposed outside the proxy; there is no proxy endpoint for it
    External,
}

impl fmt::Display for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingScope::Global => f.write_str("global"),
            BindingScope::Resource => f.write_str("resource"),
            BindingScope::External => f.write_str("external"),
        }
    }
}

/// Description of one exposed service, as supplied by the extension registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceExposureSpec {
    /// Extension identifier (e.g., "thumbnail")
    pub extension: String,

    /// Operation or service name exposed by the extension
    pub operation: String,

    /// Binding scope
    pub scope: BindingScope,
}

impl ServiceExposureSpec {
    pub fn new(
        extension: impl Into<String>,
        operation: impl Into<String>,
        scope: BindingScope,
    ) -> Self {
        Self {
            extension: extension.into(),
            operation: operation.into(),
            scope,
        }
    }

    /// Service exposed on individual resources
    pub fn resource(extension: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(extension, operation, BindingScope::Resource)
    }

    /// Service exposed once for the repository
    pub fn global(extension: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(extension, operation, BindingScope::Global)
    }
}

/// Computes externally reachable endpoints for exposed services
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    translator: AddressTranslator,
}

impl EndpointResolver {
    pub fn new(translator: AddressTranslator) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &AddressTranslator {
        &self.translator
    }

    /// Endpoint of `spec` exposed on the resource at `resource`
    ///
    /// Returns `Ok(None)` when `spec` has no proxy endpoint. Global specs
    /// ignore the resource entirely.
    pub fn endpoint_for(&self, spec: &ServiceExposureSpec, resource: &Url) -> Result<Option<Url>> {
        match spec.scope {
            BindingScope::Resource => {
                let path = self.translator.resource_path(resource)?;
                self.endpoint_for_path(spec, &path)
            }
            BindingScope::Global | BindingScope::External => self.endpoint_for_path(spec, ""),
        }
    }

    /// Endpoint of `spec` exposed on the resource at `path`
    pub fn endpoint_for_path(
        &self,
        spec: &ServiceExposureSpec,
        path: &str,
    ) -> Result<Option<Url>> {
        let templates = self.translator.config().templates();

        let endpoint = match spec.scope {
            BindingScope::External => return Ok(None),
            BindingScope::Global => {
                let base = format!("/{}", templates.global_segment);
                self.exposed_endpoint(&base, spec)?
            }
            BindingScope::Resource => {
                let path = self.canonical_path(path)?;
                let base = format!("/{}{}", templates.resource_segment, path);
                self.exposed_endpoint(&base, spec)?
            }
        };

        trace!(
            extension = %spec.extension,
            operation = %spec.operation,
            scope = %spec.scope,
            %endpoint,
            "Resolved exposed service endpoint"
        );

        Ok(Some(endpoint))
    }

    /// Service document URI of the resource at `resource`
    pub fn service_doc_for(&self, resource: &Url) -> Result<Url> {
        let path = self.translator.resource_path(resource)?;
        self.service_doc_for_path(&path)
    }

    /// Service document URI of the resource at `path`
    pub fn service_doc_for_path(&self, path: &str) -> Result<Url> {
        let path = self.canonical_path(path)?;
        let mut doc = self.translator.to_uri(&path, Namespace::Proxy)?;
        push_segments(
            &mut doc,
            &[self.translator.config().templates().service_doc_segment.as_str()],
        )?;
        Ok(doc)
    }

    /// Path after dot-segment normalisation, without a trailing `/`
    fn canonical_path(&self, path: &str) -> Result<String> {
        let native = self.translator.to_uri(path, Namespace::Native)?;
        let canonical = self.translator.resource_path(&native)?;
        Ok(canonical.trim_end_matches('/').to_string())
    }

    fn exposed_endpoint(&self, base: &str, spec: &ServiceExposureSpec) -> Result<Url> {
        let marker = &self.translator.config().templates().service_marker;
        let mut endpoint = self.translator.to_uri(base, Namespace::Proxy)?;

        let service = format!("{}{}", marker, spec.extension);
        if spec.operation.is_empty() {
            push_segments(&mut endpoint, &[service.as_str()])?;
        } else {
            push_segments(&mut endpoint, &[service.as_str(), spec.operation.as_str()])?;
        }

        Ok(endpoint)
    }
}

/// Append percent-encoded segments to a hierarchical URL
fn push_segments(url: &mut Url, segments: &[&str]) -> Result<()> {
    let display = url.to_string();
    let mut path = url.path_segments_mut().map_err(|_| {
        RoutingError::ResourceNotFound(format!("{} cannot carry path segments", display))
    })?;
    path.pop_if_empty().extend(segments);
    Ok(())
}
