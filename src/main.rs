use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use python_compat::compat::collector::{CollectOptions, collect_packages};
use python_compat::compat::registries::{PypiRegistry, parse_releases};
use python_compat::compat::resolver::{TargetVersions, resolve};
use python_compat::compat::store::JsonStore;
use python_compat::config::{CollectorConfig, DEFAULT_TARGET_VERSIONS};
use python_compat::logging::init_logging;

#[derive(Parser)]
#[command(name = "python-compat")]
#[command(
    version,
    about = "Find the newest release of PyPI packages supporting each Python version"
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch packages from PyPI and write one compatibility file per package
    Collect {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for result files (overrides the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Package to collect; repeatable (overrides the configuration)
        #[arg(long = "package")]
        packages: Vec<String>,
    },
    /// Resolve a saved PyPI JSON document and print the matrix
    Resolve {
        /// Output of `https://pypi.org/pypi/<name>/json`
        #[arg(long)]
        file: PathBuf,

        /// Target Python version; repeatable (defaults to 3.7 through 3.14)
        #[arg(long = "target")]
        targets: Vec<String>,
    },
}

async fn run_collect(
    config: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    packages: Vec<String>,
) -> anyhow::Result<()> {
    let mut config = match config {
        Some(path) => CollectorConfig::load(&path)?,
        None => CollectorConfig::default(),
    };
    if output_dir.is_some() {
        config.output_dir = output_dir;
    }
    if !packages.is_empty() {
        config.packages = packages;
    }

    let targets = TargetVersions::new(&config.targets)?;
    let registry = PypiRegistry::new(
        &config.registry_url,
        Duration::from_millis(config.request_timeout_ms),
    )?;
    let store = JsonStore::new(&config.output_dir())?;
    info!(
        "Resolving {} packages against Python {}; writing results to {}",
        config.packages.len(),
        targets.labels().join(", "),
        store.dir().display()
    );

    let summary = collect_packages(
        &registry,
        &store,
        &config.packages,
        &targets,
        &CollectOptions::from(&config),
    )
    .await?;

    if let Some(index) = summary.index_path {
        info!("Index written to {}", index.display());
    }
    Ok(())
}

fn run_resolve(file: PathBuf, targets: Vec<String>) -> anyhow::Result<()> {
    let targets = if targets.is_empty() {
        TargetVersions::new(DEFAULT_TARGET_VERSIONS)?
    } else {
        TargetVersions::new(&targets)?
    };

    let body = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let releases = parse_releases(&body)?;
    let resolution = resolve(&releases, &targets);

    let output = serde_json::json!({
        "ordering": resolution.mode,
        "python_compatibility": resolution.matrix,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_json, cli.log_file.as_deref())?;

    match cli.command {
        Command::Collect {
            config,
            output_dir,
            packages,
        } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_collect(config, output_dir, packages)),
        Command::Resolve { file, targets } => run_resolve(file, targets),
    }
}
