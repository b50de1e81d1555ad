//! Command-line interface for building, fetching, and querying the catalog.

use crate::catalog::{CatalogBuilder, Model, Snapshot};
use crate::config::Config;
use crate::fetch;
use crate::resolve::{self, ModelRef};
use crate::select::{self, Capability, SelectQuery};
use crate::store::CatalogStore;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Model metadata catalog: build, query, and refresh provider/model data
#[derive(Parser, Debug)]
#[command(name = "lodestar", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the catalog and publish it to the in-process store
    Build(BuildArgs),
    /// Download the upstream dataset into the data directory
    Fetch(FetchArgs),
    /// Install a fetched dataset as the active snapshot
    Activate(ActivateArgs),
    /// List catalog models
    List(ListArgs),
    /// Resolve a model reference to one provider and model
    Resolve(ResolveArgs),
    /// Select a model by required and forbidden capabilities
    Select(SelectArgs),
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Snapshot file to build from instead of the configured sources
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Upstream URL (defaults to the configured endpoint)
    #[arg(long)]
    pub url: Option<String>,

    /// Output directory (defaults to the data directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ActivateArgs {
    /// Dataset to install (defaults to the last fetch)
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list models of this provider
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Only list models with these capabilities (repeatable)
    #[arg(short, long)]
    pub require: Vec<Capability>,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Model reference: provider:model, or a bare id/alias
    pub spec: String,

    /// Provider scope for bare ids
    #[arg(short, long)]
    pub scope: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Capabilities the model must have (repeatable)
    #[arg(short, long)]
    pub require: Vec<Capability>,

    /// Capabilities the model must not have (repeatable)
    #[arg(short, long)]
    pub forbid: Vec<Capability>,

    /// Restrict candidates to one provider
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Providers to try first, in order (repeatable)
    #[arg(short, long)]
    pub prefer: Vec<String>,
}

/// Dispatch a parsed CLI invocation.
pub async fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Commands::Build(args) => build(args),
        Commands::Fetch(args) => fetch_command(args).await,
        Commands::Activate(args) => activate(args),
        Commands::List(args) => list(args),
        Commands::Resolve(args) => resolve_command(args),
        Commands::Select(args) => select_command(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build(args: BuildArgs) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    if let Some(path) = args.snapshot {
        config.catalog.snapshot_path = Some(path);
    }
    let snapshot = CatalogBuilder::new(config.catalog)
        .build()
        .context("Failed to build catalog")?;
    let providers = snapshot.providers.len();
    let models = snapshot.models.len();
    let epoch = CatalogStore::global().publish(snapshot);
    println!("Built catalog epoch {epoch}: {providers} providers, {models} models");
    Ok(())
}

/// Build a catalog from the current configuration for query commands.
fn load_catalog() -> Result<Snapshot> {
    let config = Config::load().context("Failed to load config")?;
    CatalogBuilder::new(config.catalog)
        .build()
        .context("Failed to build catalog")
}

fn list(args: ListArgs) -> Result<()> {
    let catalog = load_catalog()?;
    let models: Vec<&Model> = match &args.provider {
        Some(raw) => {
            let provider = resolve::parse_provider(&catalog, raw)?;
            catalog.models_for(provider.as_str())
        }
        None => catalog.models.iter().collect(),
    };

    let mut shown = 0;
    for model in models {
        if args.require.iter().all(|c| c.enabled(&model.capabilities)) {
            println!("{}", format_model_line(model));
            shown += 1;
        }
    }
    if shown == 0 {
        println!("No models match");
    }
    Ok(())
}

fn format_model_line(model: &Model) -> String {
    let mut line = format!("{}:{}", model.provider, model.id);
    if let Some(name) = &model.name {
        line.push_str(&format!("  {name}"));
    }
    if let Some(limits) = &model.limits
        && let Some(context) = limits.context
    {
        line.push_str(&format!("  ctx={context}"));
    }
    if let Some(family) = &model.family {
        line.push_str(&format!("  family={family}"));
    }
    if model.deprecated {
        line.push_str("  deprecated");
    }
    line
}

fn resolve_command(args: ResolveArgs) -> Result<()> {
    let catalog = load_catalog()?;
    let reference = ModelRef::parse(&args.spec);
    let found = resolve::resolve(&catalog, &reference, args.scope.as_deref())?;
    println!("{}:{}", found.provider.id, found.model.id);
    if let Some(name) = &found.model.name {
        println!("  name: {name}");
    }
    if let Some(provider_model_id) = &found.model.provider_model_id {
        println!("  provider_model_id: {provider_model_id}");
    }
    Ok(())
}

fn select_command(args: SelectArgs) -> Result<()> {
    let catalog = load_catalog()?;
    let scope = args
        .scope
        .as_deref()
        .map(|raw| resolve::parse_provider(&catalog, raw))
        .transpose()?;
    let prefer = if args.prefer.is_empty() {
        None
    } else {
        let mut providers = Vec::with_capacity(args.prefer.len());
        for raw in &args.prefer {
            providers.push(resolve::parse_provider(&catalog, raw)?);
        }
        Some(providers)
    };

    let query = SelectQuery {
        require: args.require,
        forbid: args.forbid,
        scope,
        prefer,
    };
    let found = select::select_model(&catalog, &query)?;
    println!("{}:{}", found.provider.id, found.model.id);
    Ok(())
}

async fn fetch_command(args: FetchArgs) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let url = args.url.unwrap_or_else(|| config.upstream_url.clone());
    let out = args.out.unwrap_or_else(|| config.data_dir.clone());

    let result = fetch::fetch_upstream(&url)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;
    let (data_path, manifest_path) = fetch::write_fetch(&out, &result)
        .with_context(|| format!("Failed to write dataset to {}", out.display()))?;

    println!(
        "Fetched {} providers, {} models ({} bytes, sha256 {})",
        result.document.providers.len(),
        result.document.models.len(),
        result.manifest.bytes,
        result.manifest.sha256
    );
    println!("  data: {}", data_path.display());
    println!("  manifest: {}", manifest_path.display());
    Ok(())
}

fn activate(args: ActivateArgs) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    let source = args
        .path
        .unwrap_or_else(|| config.data_dir.join("models.json"));
    let target = config.active_snapshot_path();
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&source, &target)
        .with_context(|| format!("Failed to install {}", source.display()))?;
    config.catalog.snapshot_path = Some(target.clone());

    // Build once against the installed snapshot before persisting it, so a
    // broken dataset never becomes the configured base.
    CatalogBuilder::new(config.catalog.clone())
        .build()
        .context("Installed snapshot does not produce a usable catalog")?;

    config.save().context("Failed to save config")?;
    println!("Activated {}", target.display());
    Ok(())
}
