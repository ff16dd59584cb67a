use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use fragpack::assets::AssetBase;
use fragpack::catalog::{default_catalog_url, CatalogClient};
use fragpack::config::Config;
use fragpack::engine::DirectorySink;
use fragpack::error::{FragError, Result};
use fragpack::fetch::HttpFetcher;
use fragpack::loader::{LoadProgress, PackageLoader};

#[derive(Parser)]
#[command(name = "fragpack")]
#[command(about = "Sequential fragment-package loader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog and list its packages
    Catalog {
        /// Catalog URL (overrides config)
        #[arg(long)]
        url: Option<String>,
    },
    /// Download a package and load its fragments into the output directory
    Load {
        /// Package id from the catalog
        package_id: String,
        /// Catalog URL (overrides config)
        #[arg(long)]
        url: Option<String>,
        /// Base URL for relative fragment paths (overrides config)
        #[arg(long)]
        base: Option<String>,
        /// Output directory for loaded fragments
        #[arg(long, default_value = "models")]
        out: PathBuf,
        /// Dispose everything already loaded before loading
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Catalog { url } => run_catalog(&config, url).await,
        Commands::Load {
            package_id,
            url,
            base,
            out,
            replace,
        } => run_load(&config, package_id, url, base, out, replace).await,
    }
}

async fn run_catalog(config: &Config, url: Option<String>) -> Result<()> {
    let explicit_base = config
        .assets
        .base_url
        .as_deref()
        .map(AssetBase::new);
    let catalog_url = resolve_catalog_url(config, url, explicit_base.as_ref())?;

    let client = CatalogClient::new(&config.http)?;
    let catalog = client.load(&catalog_url).await?;

    if catalog.packages().is_empty() {
        println!("Catalog at {catalog_url} has no packages");
        return Ok(());
    }

    println!("Packages at {catalog_url}:");
    for package in catalog.packages() {
        println!(
            "  {}  {} ({} fragment(s))",
            package.id,
            package.label,
            package.fragments.len()
        );
    }

    Ok(())
}

async fn run_load(
    config: &Config,
    package_id: String,
    url: Option<String>,
    base: Option<String>,
    out: PathBuf,
    replace: bool,
) -> Result<()> {
    let explicit_base = base
        .or_else(|| config.assets.base_url.clone())
        .map(|b| AssetBase::new(&b));
    let catalog_url = resolve_catalog_url(config, url, explicit_base.as_ref())?;
    let assets = explicit_base.unwrap_or_else(|| AssetBase::from_resource_url(&catalog_url));

    let client = CatalogClient::new(&config.http)?;
    let catalog = client.load(&catalog_url).await?;

    let package = match catalog.find(&package_id) {
        Some(package) => package.clone(),
        None => {
            let mut message = format!("package \"{package_id}\" is not in the catalog");
            if let Some(suggestion) = catalog.suggest(&package_id) {
                message.push_str(&format!("; did you mean \"{suggestion}\"?"));
            }
            return Err(FragError::Validation(message));
        }
    };

    let engine = Arc::new(
        DirectorySink::new(&out)
            .await
            .map_err(|e| FragError::Engine(e.to_string()))?,
    );
    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
    let loader = Arc::new(PackageLoader::new(engine.clone(), fetcher, assets));

    // First Ctrl-C cancels the in-flight load instead of killing the process.
    let canceller = loader.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel_active_load();
        }
    });

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let progress_bar = bar.clone();
    let mut on_progress = move |event: &LoadProgress| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        progress_bar.set_position((event.overall * 100.0).round() as u64);
        progress_bar.set_message(event.message.clone());
    };

    match loader.load_package(&package, replace, &mut on_progress).await {
        Ok(()) => {
            bar.finish_and_clear();
            let loaded = loader.loaded();
            println!(
                "✓ Loaded package {} ({} model(s)) into {}",
                package.label,
                loaded.len(),
                engine.dir().display()
            );
            for model in loaded {
                println!("  {}  {}", model.model_id, model.fragment_label);
            }
            Ok(())
        }
        Err(e) => {
            bar.finish_and_clear();
            Err(e)
        }
    }
}

fn resolve_catalog_url(
    config: &Config,
    url_flag: Option<String>,
    base: Option<&AssetBase>,
) -> Result<String> {
    if let Some(url) = url_flag {
        return Ok(url);
    }
    if let Some(url) = &config.catalog.url {
        return Ok(url.clone());
    }
    if let Some(base) = base {
        return Ok(default_catalog_url(base));
    }
    Err(FragError::Config(
        "no catalog url configured; pass --url or set catalog.url".to_string(),
    ))
}
