// packages/routing/tests/context_headers.rs
//! Context header round trips between proxy and extension

use apix_routing::{
    ContextHeader, Routing, RoutingConfiguration, RoutingContext, ServiceExposureSpec,
};
use hyper::header::{HeaderMap, HeaderValue};
use url::Url;

fn routing() -> Routing {
    let config = RoutingConfiguration::new(
        "http://repo.example/fcrepo/rest",
        "http://proxy.example/apix",
    )
    .unwrap();
    Routing::new(config)
}

#[test]
fn resource_context_round_trip() {
    let routing = routing();
    let spec = ServiceExposureSpec::resource("thumbnail", "render");
    let resource = Url::parse("http://repo.example/fcrepo/rest/images/cat.png").unwrap();

    let context = routing.context_for(&spec, Some(&resource)).unwrap().unwrap();

    let mut headers = HeaderMap::new();
    context.apply(&mut headers).unwrap();

    assert_eq!(headers.len(), 6);
    assert_eq!(
        headers.get("Apix-Ldp-Resource").unwrap(),
        "http://repo.example/fcrepo/rest/images/cat.png"
    );
    assert_eq!(
        headers.get("apix-resource").unwrap(),
        "http://proxy.example/apix/images/cat.png"
    );
    assert_eq!(
        headers.get("Apix-Ldp-Resource-Path").unwrap(),
        "/images/cat.png"
    );
    assert_eq!(
        headers.get("Apix-Exposed-Uri").unwrap(),
        "http://proxy.example/apix/services/images/cat.png/svc:thumbnail/render"
    );
    assert_eq!(
        headers.get("Apix-Ldp-Root").unwrap(),
        "http://repo.example/fcrepo/rest"
    );
    assert_eq!(headers.get("Apix-Root").unwrap(), "http://proxy.example/apix");

    let decoded = RoutingContext::from_headers(&headers).unwrap();
    assert_eq!(decoded, context);
}

#[test]
fn extension_can_call_back_through_proxy() {
    let routing = routing();
    let spec = ServiceExposureSpec::resource("fixity", "check");
    let resource = Url::parse("http://proxy.example/apix/obj1").unwrap();

    let mut headers = HeaderMap::new();
    routing
        .context_for(&spec, Some(&resource))
        .unwrap()
        .unwrap()
        .apply(&mut headers)
        .unwrap();

    // Extension side: rebuild routing from the headers alone
    let context = RoutingContext::from_headers(&headers).unwrap();
    let callback = Routing::new(
        RoutingConfiguration::from_urls(context.native_root.clone(), context.proxy_root.clone())
            .unwrap(),
    );

    let native = &context.resource.as_ref().unwrap().native_uri;
    assert_eq!(callback.intercept_uri_for(native).unwrap(), resource);
}

#[test]
fn global_context_clears_stale_resource_headers() {
    let routing = routing();
    let spec = ServiceExposureSpec::global("search", "query");

    let mut headers = HeaderMap::new();
    headers.insert(
        ContextHeader::RepositoryResourceUri.header_name(),
        HeaderValue::from_static("http://repo.example/fcrepo/rest/stale"),
    );
    headers.insert("accept", HeaderValue::from_static("text/turtle"));

    let context = routing.context_for(&spec, None).unwrap().unwrap();
    context.apply(&mut headers).unwrap();

    assert!(headers
        .get(ContextHeader::RepositoryResourceUri.header_name())
        .is_none());
    assert_eq!(headers.get("accept").unwrap(), "text/turtle");
    assert_eq!(
        headers.get("Apix-Exposed-Uri").unwrap(),
        "http://proxy.example/apix/repository/svc:search/query"
    );

    let decoded = RoutingContext::from_headers(&headers).unwrap();
    assert!(decoded.resource.is_none());
}

#[test]
fn missing_root_header_is_rejected() {
    let routing = routing();
    let spec = ServiceExposureSpec::global("search", "query");

    let mut headers = HeaderMap::new();
    routing
        .context_for(&spec, None)
        .unwrap()
        .unwrap()
        .apply(&mut headers)
        .unwrap();
    headers.remove(ContextHeader::ApixRootUri.header_name());

    let err = RoutingContext::from_headers(&headers).unwrap_err();
    assert!(err.to_string().contains("Apix-Root"));
}

#[test]
fn partial_resource_headers_are_rejected() {
    let routing = routing();
    let spec = ServiceExposureSpec::resource("thumbnail", "render");
    let resource = Url::parse("http://repo.example/fcrepo/rest/obj1").unwrap();

    let mut headers = HeaderMap::new();
    routing
        .context_for(&spec, Some(&resource))
        .unwrap()
        .unwrap()
        .apply(&mut headers)
        .unwrap();
    headers.remove(ContextHeader::RepositoryResourcePath.header_name());

    assert!(RoutingContext::from_headers(&headers).is_err());
}

#[test]
fn unparsable_uri_header_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert("apix-exposed-uri", HeaderValue::from_static("not a uri"));
    headers.insert(
        "apix-ldp-root",
        HeaderValue::from_static("http://repo.example/fcrepo/rest"),
    );
    headers.insert("apix-root", HeaderValue::from_static("http://proxy.example/apix"));

    let err = RoutingContext::from_headers(&headers).unwrap_err();
    assert!(err.to_string().contains("Apix-Exposed-Uri"));
}
