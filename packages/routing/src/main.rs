// packages/routing/src/main.rs
//! API-X Routing Inspector
//!
//! Resolves URIs or resource paths against a routing configuration and
//! prints the native, intercept, service-document and exposed-service URIs
//! as JSON, one report per input.

use anyhow::{bail, Context, Result};
use apix_routing::observability::init_tracing;
use apix_routing::{BindingScope, Namespace, Routing, RoutingSettings, ServiceExposureSpec};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "apix-routing")]
#[command(
    author,
    version,
    about = "Inspect API-X address translation and endpoint routing"
)]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the native repository root
    #[arg(long)]
    native_root: Option<String>,

    /// Override the proxy (intercept) root
    #[arg(long)]
    proxy_root: Option<String>,

    /// Extension whose exposed endpoint should be resolved
    #[arg(long)]
    extension: Option<String>,

    /// Operation exposed by the extension
    #[arg(long, default_value = "")]
    operation: String,

    /// Binding scope of the exposed service
    #[arg(long, value_enum, default_value_t = ScopeArg::Resource)]
    scope: ScopeArg,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Resource URIs (native or proxy) or paths relative to the native root
    #[arg(required = true)]
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    Resource,
    Global,
    External,
}

impl From<ScopeArg> for BindingScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Resource => BindingScope::Resource,
            ScopeArg::Global => BindingScope::Global,
            ScopeArg::External => BindingScope::External,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Report {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<Namespace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    native_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    intercept_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn inspect(
    routing: &Routing,
    input: &str,
    spec: Option<&ServiceExposureSpec>,
) -> apix_routing::Result<Report> {
    let uri = match Url::parse(input) {
        Ok(uri) => uri,
        Err(_) => routing.to_uri(input, Namespace::Native)?,
    };

    let endpoint = match spec {
        Some(spec) => routing.endpoint_for(spec, &uri)?.map(|u| u.to_string()),
        None => None,
    };

    Ok(Report {
        input: input.to_string(),
        namespace: routing.translator().namespace_of(&uri),
        native_uri: Some(routing.non_proxy_uri_for(&uri)?.to_string()),
        intercept_uri: Some(routing.intercept_uri_for(&uri)?.to_string()),
        path: Some(routing.resource_path(&uri)?),
        service_doc: Some(routing.service_doc_for(&uri)?.to_string()),
        endpoint,
        error: None,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut settings = match &args.config {
        Some(path) => RoutingSettings::load_from(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => RoutingSettings::load().context("Failed to load settings")?,
    };

    if let Some(native_root) = &args.native_root {
        settings.native_root = native_root.clone();
    }
    if let Some(proxy_root) = &args.proxy_root {
        settings.proxy_root = proxy_root.clone();
    }

    // Initialize logging
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.level.clone());
    init_tracing(&level, args.json_logs || settings.logging.json)?;

    let config = settings
        .into_configuration()
        .context("Invalid routing configuration")?;
    let routing = Routing::new(config);

    info!(
        native_root = %routing.config().native_root(),
        proxy_root = %routing.config().proxy_root(),
        "Routing inspector v{}",
        apix_routing::VERSION
    );

    let spec = args
        .extension
        .as_ref()
        .map(|extension| ServiceExposureSpec::new(extension, &args.operation, args.scope.into()));

    let mut failures = 0;
    for input in &args.inputs {
        let report = inspect(&routing, input, spec.as_ref()).unwrap_or_else(|e| {
            warn!(input = %input, error = %e, "Cannot resolve input");
            failures += 1;
            Report {
                input: input.clone(),
                error: Some(e.to_string()),
                ..Report::default()
            }
        });

        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if failures > 0 {
        bail!("{} of {} inputs could not be resolved", failures, args.inputs.len());
    }

    Ok(())
}
