//! # Command Line Interface
//!
//! Offline tooling around issuer initialisation. Both commands read an
//! issuer manifest plus a file of `v1/Secret` manifests and run the same
//! resolution path the controller uses.

pub mod output;

use crate::config::AppConfig;
use crate::connector::HttpConnectorFactory;
use crate::domain::{ClientConfig, ConnectorType, GenericIssuer, IssuerType};
use crate::issuer::{ConfigResolver, IssuerDeps, IssuerRegistry, TracingEventSink};
use crate::observability::init_logging;
use crate::secrets::InMemorySecretStore;
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use output::{print_output, OutputFormat};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "venafi-issuer")]
#[command(about = "Venafi issuer credential resolution tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fail when a credentials secret lacks an expected key
    #[arg(long, global = true)]
    pub require_credential_keys: bool,

    /// Namespace ClusterIssuer credentials are read from
    #[arg(long, global = true)]
    pub cluster_resource_namespace: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the client configuration of a Venafi issuer
    Resolve(ManifestArgs),

    /// Initialise a Venafi issuer and its connector
    Init(ManifestArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Issuer or ClusterIssuer manifest
    #[arg(long)]
    pub issuer: PathBuf,

    /// YAML file holding `v1/Secret` manifests
    #[arg(long)]
    pub secrets: PathBuf,
}

/// Connector details printed by `init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSummary {
    pub issuer: String,
    pub issuer_type: IssuerType,
    pub resource_namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<ConnectorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    init_logging(&config.observability)?;

    match &cli.command {
        Commands::Resolve(args) => {
            let resolved = resolve_command(&config, args).await?;
            print_output(&resolved, cli.output)?;
        }
        Commands::Init(args) => {
            let summary = init_command(&config, args).await?;
            print_output(&summary, cli.output)?;
        }
    }

    Ok(())
}

/// Environment configuration with command line overrides applied
pub fn effective_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::from_env()?;

    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    if cli.require_credential_keys {
        config.issuer.require_credential_keys = true;
    }
    if let Some(namespace) = &cli.cluster_resource_namespace {
        config.issuer.cluster_resource_namespace = namespace.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Resolve the issuer's client configuration without creating a connector
pub async fn resolve_command(config: &AppConfig, args: &ManifestArgs) -> anyhow::Result<ClientConfig> {
    let (issuer, namespace, secrets) = load_inputs(config, args)?;
    let spec = issuer
        .spec
        .venafi
        .as_ref()
        .ok_or_else(|| anyhow!("{} has no venafi configuration", issuer.object_ref()))?;

    let resolver = ConfigResolver::new(config.issuer.missing_key_policy());
    let resolved = resolver.resolve(&namespace, spec, &secrets).await?;
    Ok(resolved)
}

/// Build the issuer through the registry and the HTTP connector factory
pub async fn init_command(config: &AppConfig, args: &ManifestArgs) -> anyhow::Result<InitSummary> {
    let (issuer, _, secrets) = load_inputs(config, args)?;

    let registry = IssuerRegistry::with_default_issuers(
        config.issuer.issuer_options(),
        ConfigResolver::new(config.issuer.missing_key_policy()),
    )?;
    let deps = IssuerDeps::new(
        Arc::new(secrets),
        Arc::new(HttpConnectorFactory::new(config.issuer.connector_timeout())),
        Arc::new(TracingEventSink),
    );

    let built = registry.build(&issuer, &deps).await?;
    let connector = built.connector();

    Ok(InitSummary {
        issuer: built.object_ref().to_string(),
        issuer_type: built.issuer_type(),
        resource_namespace: built.resource_namespace().to_string(),
        connector_type: connector.as_ref().map(|c| c.connector_type()),
        base_url: connector.as_ref().map(|c| c.base_url().to_string()),
        zone: connector.as_ref().map(|c| c.zone().to_string()),
    })
}

fn load_inputs(
    config: &AppConfig,
    args: &ManifestArgs,
) -> anyhow::Result<(GenericIssuer, String, InMemorySecretStore)> {
    let raw = std::fs::read_to_string(&args.issuer)
        .with_context(|| format!("Failed to read issuer manifest {}", args.issuer.display()))?;
    let issuer = GenericIssuer::from_yaml(&raw)?;

    let namespace = config.issuer.issuer_options().resource_namespace(&issuer);
    let secrets = InMemorySecretStore::from_manifest_file(&args.secrets, &namespace)?;

    debug!(issuer = %issuer.object_ref(), namespace = %namespace, "Loaded manifests");
    Ok((issuer, namespace, secrets))
}
