// packages/routing/src/routing/mod.rs
//! Address translation and endpoint routing
//!
//! - **Configuration**: Immutable namespace roots and endpoint templates
//! - **Translator**: Native <-> proxy URI mapping and resource paths
//! - **Endpoint**: Exposed-service and service-document URIs
//! - **Headers**: Context headers passed to extension services
//!
//! # Architecture
//!
//! ```text
//! Inbound request (proxy namespace)
//!     │
//!     ├─ AddressTranslator → native URI + resource path
//!     ├─ EndpointResolver  → exposed service / service doc URI
//!     └─ RoutingContext    → Apix-* headers on the outbound call
//! ```
//!
//! Everything here is synchronous and side-effect free. `Routing` is cheap
//! to clone and can be shared by any number of request handlers.

pub mod configuration;
pub mod endpoint;
pub mod headers;
pub mod translator;

pub use configuration::{EndpointTemplates, Namespace, RoutingConfiguration};
pub use endpoint::{BindingScope, EndpointResolver, ServiceExposureSpec};
pub use headers::{ContextHeader, ResourceContext, RoutingContext};
pub use translator::AddressTranslator;

use crate::utils::errors::Result;
use std::sync::Arc;
use url::Url;

/// Routing component: translator and resolver over one configuration
#[derive(Debug, Clone)]
pub struct Routing {
    resolver: EndpointResolver,
}

impl Routing {
    pub fn new(config: RoutingConfiguration) -> Self {
        let translator = AddressTranslator::new(Arc::new(config));
        Self {
            resolver: EndpointResolver::new(translator),
        }
    }

    pub fn config(&self) -> &RoutingConfiguration {
        self.translator().config()
    }

    pub fn translator(&self) -> &AddressTranslator {
        self.resolver.translator()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub fn resource_path(&self, resource: &Url) -> Result<String> {
        self.translator().resource_path(resource)
    }

    pub fn intercept_uri_for(&self, resource: &Url) -> Result<Url> {
        self.translator().intercept_uri_for(resource)
    }

    pub fn non_proxy_uri_for(&self, resource: &Url) -> Result<Url> {
        self.translator().non_proxy_uri_for(resource)
    }

    pub fn to_uri(&self, path: &str, namespace: Namespace) -> Result<Url> {
        self.translator().to_uri(path, namespace)
    }

    pub fn endpoint_for(&self, spec: &ServiceExposureSpec, resource: &Url) -> Result<Option<Url>> {
        self.resolver.endpoint_for(spec, resource)
    }

    pub fn endpoint_for_path(&self, spec: &ServiceExposureSpec, path: &str) -> Result<Option<Url>> {
        self.resolver.endpoint_for_path(spec, path)
    }

    pub fn service_doc_for(&self, resource: &Url) -> Result<Url> {
        self.resolver.service_doc_for(resource)
    }

    pub fn service_doc_for_path(&self, path: &str) -> Result<Url> {
        self.resolver.service_doc_for_path(path)
    }

    /// Context for an outbound call to the service described by `spec`
    ///
    /// For resource-scoped specs `resource` defaults to the repository root;
    /// other specs ignore it. Returns `Ok(None)` when `spec` has no proxy endpoint.
    pub fn context_for(
        &self,
        spec: &ServiceExposureSpec,
        resource: Option<&Url>,
    ) -> Result<Option<RoutingContext>> {
        let (endpoint, resource) = match spec.scope {
            BindingScope::Resource => {
                let uri = resource.unwrap_or_else(|| self.config().native_root());
                let endpoint = self.endpoint_for(spec, uri)?;
                let context = ResourceContext {
                    native_uri: self.non_proxy_uri_for(uri)?,
                    proxy_uri: self.intercept_uri_for(uri)?,
                    path: self.resource_path(uri)?,
                };
                (endpoint, Some(context))
            }
            BindingScope::Global | BindingScope::External => {
                (self.endpoint_for_path(spec, "")?, None)
            }
        };

        Ok(endpoint.map(|exposed_uri| RoutingContext {
            resource,
            exposed_uri,
            native_root: self.config().native_root().clone(),
            proxy_root: self.config().proxy_root().clone(),
        }))
    }
}
