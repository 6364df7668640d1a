// packages/routing/src/routing/translator.rs
//! Address translation between the native and proxy namespaces
//!
//! Every operation first locates the input under one of the two configured
//! roots. Translating a URI that is already in the target namespace returns
//! it unchanged, so translations can be applied speculatively to URIs of
//! unknown provenance without double-wrapping them.
//!
//! A root without a path of its own (`http://localhost:8080/`) can only spell
//! its root resource as `/`, where a root with a path uses an empty
//! remainder. Both spellings name the same resource, so translation emits
//! whichever one the target root uses.

use crate::routing::configuration::{Namespace, NamespaceRoot, RoutingConfiguration};
use crate::utils::errors::{Result, RoutingError};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// Bidirectional mapping between native and proxy URIs
#[derive(Debug, Clone)]
pub struct AddressTranslator {
    config: Arc<RoutingConfiguration>,
}

impl AddressTranslator {
    /// Create a translator over a shared configuration
    pub fn new(config: Arc<RoutingConfiguration>) -> Self {
        Self { config }
    }

    /// Configuration the translator works against
    pub fn config(&self) -> &RoutingConfiguration {
        &self.config
    }

    /// Namespace `uri` belongs to, if any
    pub fn namespace_of(&self, uri: &Url) -> Option<Namespace> {
        self.locate(uri).map(|(namespace, _)| namespace)
    }

    /// Path of a native or proxy resource relative to its root
    ///
    /// The path is returned in serialized (percent-encoded) form. The root
    /// resource itself has an empty path, whatever the shape of its root.
    ///
    /// Query and fragment are stripped, so `to_uri(&resource_path(r)?, ns)`
    /// reproduces `r` (or its translation) only when `r` has neither.
    pub fn resource_path(&self, uri: &Url) -> Result<String> {
        let (namespace, rest) = self.locate_or_not_found(uri)?;
        let rest = root_relative(self.config.root(namespace), rest);
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        Ok(rest[..end].to_string())
    }

    /// Proxy form of `uri`; proxy URIs are returned unmodified
    pub fn intercept_uri_for(&self, uri: &Url) -> Result<Url> {
        self.translate(uri, Namespace::Proxy)
    }

    /// Native form of `uri`; native URIs are returned unmodified
    pub fn non_proxy_uri_for(&self, uri: &Url) -> Result<Url> {
        self.translate(uri, Namespace::Native)
    }

    /// Re-compose a resource path under one of the roots
    pub fn to_uri(&self, path: &str, namespace: Namespace) -> Result<Url> {
        let path = normalize_path(path)?;
        let root = self.config.root(namespace);

        let url = compose_under(root, &path)?;

        // Dot segments can climb out of the root during parsing
        if root.remainder(url.as_str()).is_none() {
            return Err(not_found(format!(
                "path '{}' escapes the {} root",
                path, namespace
            )));
        }

        Ok(url)
    }

    fn translate(&self, uri: &Url, target: Namespace) -> Result<Url> {
        let (namespace, rest) = self.locate_or_not_found(uri)?;

        if namespace == target {
            trace!(%uri, %target, "URI already in target namespace");
            return Ok(uri.clone());
        }

        let rest = root_relative(self.config.root(namespace), rest);
        let translated = compose_under(self.config.root(target), rest)?;
        trace!(%uri, %translated, "Translated URI");
        metrics::counter!("apix_routing_translations_total", "target" => target.to_string())
            .increment(1);

        Ok(translated)
    }

    fn locate<'a>(&self, uri: &'a Url) -> Option<(Namespace, &'a str)> {
        let raw = uri.as_str();
        [Namespace::Proxy, Namespace::Native]
            .into_iter()
            .find_map(|namespace| {
                self.config
                    .root(namespace)
                    .remainder(raw)
                    .map(|rest| (namespace, rest))
            })
    }

    fn locate_or_not_found<'a>(&self, uri: &'a Url) -> Result<(Namespace, &'a str)> {
        self.locate(uri).ok_or_else(|| {
            debug!(
                %uri,
                native_root = %self.config.native_root(),
                proxy_root = %self.config.proxy_root(),
                "URI is not under a configured root"
            );
            not_found(format!("{} is not under a configured root", uri))
        })
    }
}

/// Make `path` root-relative, rejecting anything that is not a plain path
pub(crate) fn normalize_path(path: &str) -> Result<Cow<'_, str>> {
    if path.contains(['?', '#']) {
        return Err(not_found(format!(
            "path '{}' carries a query or fragment",
            path
        )));
    }

    if path.is_empty() || path.starts_with('/') {
        return Ok(Cow::Borrowed(path));
    }

    if Url::parse(path).is_ok() {
        return Err(not_found(format!(
            "'{}' is an absolute URI, not a path",
            path
        )));
    }

    Ok(Cow::Owned(format!("/{}", path)))
}

/// True when `rest` addresses the root resource itself
fn is_root_resource(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(['?', '#'])
}

/// Remainder with a host-only root's own `/` removed from the root resource
fn root_relative<'a>(root: &NamespaceRoot, rest: &'a str) -> &'a str {
    match rest.strip_prefix('/') {
        Some(tail) if root.is_host_only() && is_root_resource(tail) => tail,
        _ => rest,
    }
}

/// Re-attach a root-relative remainder to `root` in the root's own shape
fn compose_under(root: &NamespaceRoot, rest: &str) -> Result<Url> {
    if root.is_host_only() && is_root_resource(rest) {
        return compose(root.prefix(), &format!("/{}", rest));
    }
    compose(root.prefix(), rest)
}

fn compose(prefix: &str, rest: &str) -> Result<Url> {
    let composed = format!("{}{}", prefix, rest);
    Url::parse(&composed).map_err(|e| not_found(format!("cannot compose '{}': {}", composed, e)))
}

fn not_found(message: String) -> RoutingError {
    metrics::counter!("apix_routing_resource_not_found_total").increment(1);
    RoutingError::ResourceNotFound(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> AddressTranslator {
        let config = RoutingConfiguration::new(
            "http://repo.example/fcrepo/rest",
            "http://proxy.example/apix",
        )
        .unwrap();
        AddressTranslator::new(Arc::new(config))
    }

    fn translator_over(native: &str, proxy: &str) -> AddressTranslator {
        let config = RoutingConfiguration::new(native, proxy).unwrap();
        AddressTranslator::new(Arc::new(config))
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_resource_path_native() {
        let t = translator();
        let path = t
            .resource_path(&url("http://repo.example/fcrepo/rest/obj1"))
            .unwrap();
        assert_eq!(path, "/obj1");
    }

    #[test]
    fn test_resource_path_proxy() {
        let t = translator();
        let path = t
            .resource_path(&url("http://proxy.example/apix/a/b/c?x=1#frag"))
            .unwrap();
        assert_eq!(path, "/a/b/c");
    }

    #[test]
    fn test_resource_path_of_root() {
        let t = translator();
        assert_eq!(
            t.resource_path(&url("http://repo.example/fcrepo/rest")).unwrap(),
            ""
        );
        assert_eq!(
            t.resource_path(&url("http://repo.example/fcrepo/rest/")).unwrap(),
            "/"
        );
    }

    #[test]
    fn test_resource_path_foreign_uri() {
        let t = translator();
        let err = t
            .resource_path(&url("http://elsewhere.example/fcrepo/rest/obj1"))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = t
            .resource_path(&url("http://repo.example/fcrepo/restore/obj1"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_intercept_uri_for() {
        let t = translator();
        let proxied = t
            .intercept_uri_for(&url("http://repo.example/fcrepo/rest/obj1?view=full#f"))
            .unwrap();
        assert_eq!(proxied.as_str(), "http://proxy.example/apix/obj1?view=full#f");
    }

    #[test]
    fn test_intercept_uri_for_is_idempotent() {
        let t = translator();
        let once = t
            .intercept_uri_for(&url("http://repo.example/fcrepo/rest/obj1"))
            .unwrap();
        let twice = t.intercept_uri_for(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_proxy_uri_for() {
        let t = translator();
        let native = t
            .non_proxy_uri_for(&url("http://proxy.example/apix/obj1/child"))
            .unwrap();
        assert_eq!(native.as_str(), "http://repo.example/fcrepo/rest/obj1/child");

        let again = t.non_proxy_uri_for(&native).unwrap();
        assert_eq!(native, again);
    }

    #[test]
    fn test_translation_of_foreign_uri_fails() {
        let t = translator();
        assert!(t
            .intercept_uri_for(&url("https://repo.example/fcrepo/rest/obj1"))
            .unwrap_err()
            .is_not_found());
        assert!(t
            .non_proxy_uri_for(&url("http://proxy.example:8080/apix/obj1"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_namespace_of() {
        let t = translator();
        assert_eq!(
            t.namespace_of(&url("http://repo.example/fcrepo/rest/x")),
            Some(Namespace::Native)
        );
        assert_eq!(
            t.namespace_of(&url("http://proxy.example/apix")),
            Some(Namespace::Proxy)
        );
        assert_eq!(t.namespace_of(&url("http://proxy.example/other")), None);
    }

    #[test]
    fn test_to_uri() {
        let t = translator();
        assert_eq!(
            t.to_uri("/obj1", Namespace::Native).unwrap().as_str(),
            "http://repo.example/fcrepo/rest/obj1"
        );
        assert_eq!(
            t.to_uri("obj1", Namespace::Proxy).unwrap().as_str(),
            "http://proxy.example/apix/obj1"
        );
        assert_eq!(
            t.to_uri("", Namespace::Native).unwrap().as_str(),
            "http://repo.example/fcrepo/rest"
        );
    }

    #[test]
    fn test_to_uri_rejects_ambiguous_paths() {
        let t = translator();
        assert!(t.to_uri("/obj1?x=1", Namespace::Native).is_err());
        assert!(t.to_uri("/obj1#f", Namespace::Native).is_err());
        assert!(t.to_uri("/../../escape", Namespace::Native).is_err());
        assert!(t
            .to_uri("http://repo.example/fcrepo/rest/obj1", Namespace::Native)
            .is_err());
    }

    #[test]
    fn test_to_uri_reverses_resource_path() {
        let t = translator();
        let native = url("http://repo.example/fcrepo/rest/a%20b/c");
        let path = t.resource_path(&native).unwrap();
        assert_eq!(t.to_uri(&path, Namespace::Native).unwrap(), native);
    }

    #[test]
    fn test_root_resource_round_trips_to_host_only_proxy() {
        let t = translator_over("http://repo.example/fcrepo/rest", "http://proxy.example/");

        for native in [
            "http://repo.example/fcrepo/rest",
            "http://repo.example/fcrepo/rest?x=1",
            "http://repo.example/fcrepo/rest#top",
        ] {
            let native = url(native);
            let proxied = t.intercept_uri_for(&native).unwrap();
            assert_eq!(t.non_proxy_uri_for(&proxied).unwrap(), native);
        }

        let proxied = t
            .intercept_uri_for(&url("http://repo.example/fcrepo/rest?x=1"))
            .unwrap();
        assert_eq!(proxied.as_str(), "http://proxy.example/?x=1");

        let proxied = t
            .intercept_uri_for(&url("http://repo.example/fcrepo/rest/obj1"))
            .unwrap();
        assert_eq!(proxied.as_str(), "http://proxy.example/obj1");
    }

    #[test]
    fn test_root_resource_round_trips_from_host_only_native() {
        let t = translator_over("http://localhost:8080/", "http://proxy.example/apix");

        let proxied = url("http://proxy.example/apix");
        let native = t.non_proxy_uri_for(&proxied).unwrap();
        assert_eq!(native.as_str(), "http://localhost:8080/");
        assert_eq!(t.intercept_uri_for(&native).unwrap(), proxied);

        let proxied = url("http://proxy.example/apix?x=1#f");
        let native = t.non_proxy_uri_for(&proxied).unwrap();
        assert_eq!(native.as_str(), "http://localhost:8080/?x=1#f");
        assert_eq!(t.intercept_uri_for(&native).unwrap(), proxied);
    }

    #[test]
    fn test_root_resource_path_agrees_across_root_shapes() {
        let t = translator_over("http://localhost:8080/", "http://proxy.example/apix");

        assert_eq!(t.resource_path(&url("http://localhost:8080/")).unwrap(), "");
        assert_eq!(t.resource_path(&url("http://proxy.example/apix")).unwrap(), "");
        assert_eq!(
            t.resource_path(&url("http://localhost:8080/obj1")).unwrap(),
            "/obj1"
        );
        assert_eq!(
            t.to_uri("", Namespace::Native).unwrap().as_str(),
            "http://localhost:8080/"
        );
        assert_eq!(
            t.to_uri("", Namespace::Proxy).unwrap().as_str(),
            "http://proxy.example/apix"
        );
    }

    #[test]
    fn test_both_roots_host_only() {
        let t = translator_over("http://localhost:8080/", "https://proxy.example/");

        let native = url("http://localhost:8080/?x=1");
        let proxied = t.intercept_uri_for(&native).unwrap();
        assert_eq!(proxied.as_str(), "https://proxy.example/?x=1");
        assert_eq!(t.non_proxy_uri_for(&proxied).unwrap(), native);
    }

    #[test]
    fn test_resource_path_drops_query_and_fragment() {
        let t = translator();
        let native = url("http://repo.example/fcrepo/rest/obj1?view=full#f");

        let path = t.resource_path(&native).unwrap();
        let recomposed = t.to_uri(&path, Namespace::Native).unwrap();

        assert_eq!(path, "/obj1");
        assert_eq!(recomposed.as_str(), "http://repo.example/fcrepo/rest/obj1");
        assert_ne!(recomposed, native);
    }
}
