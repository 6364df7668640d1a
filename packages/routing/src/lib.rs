// packages/routing/src/lib.rs
//! API-X Routing Library
//!
//! Address translation and endpoint routing for a proxy that injects
//! extension services in front of a resource repository.
//!
//! # Architecture
//!
//! The library is structured into a few modules:
//!
//! - **routing**: Namespace translation, endpoint resolution, context headers
//! - **observability**: Tracing setup for binaries
//! - **utils**: Settings loading and error types
//!
//! # Example
//!
//! ```
//! use apix_routing::{Routing, RoutingConfiguration, ServiceExposureSpec};
//! use url::Url;
//!
//! let config = RoutingConfiguration::new(
//!     "http://repo.example/fcrepo/rest",
//!     "http://proxy.example/apix",
//! )?;
//! let routing = Routing::new(config);
//!
//! let resource = Url::parse("http://repo.example/fcrepo/rest/obj1").unwrap();
//! assert_eq!(routing.resource_path(&resource)?, "/obj1");
//! assert_eq!(
//!     routing.intercept_uri_for(&resource)?.as_str(),
//!     "http://proxy.example/apix/obj1"
//! );
//!
//! let spec = ServiceExposureSpec::resource("thumbnail", "render");
//! let endpoint = routing.endpoint_for(&spec, &resource)?;
//! assert!(endpoint.is_some());
//! # Ok::<(), apix_routing::RoutingError>(())
//! ```

pub mod observability;
pub mod routing;
pub mod utils;

// Re-export commonly used types
pub use routing::{
    AddressTranslator, BindingScope, ContextHeader, EndpointResolver, EndpointTemplates,
    Namespace, ResourceContext, Routing, RoutingConfiguration, RoutingContext,
    ServiceExposureSpec,
};
pub use utils::config::RoutingSettings;
pub use utils::errors::{Result, RoutingError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
