use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, Subcommand};
use reltools_common::{load_config, load_config_from, AppConfig, BaselineProfile, ExtractorKind, LoadedConfig};
use reltools_core::{versions, RefactorValidator, RelnoteCheck, RelnoteStatus, SystemRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reltools")]
#[command(version = "0.1.0")]
#[command(about = "Release engineering helpers: refactor validation, versions and relnotes", long_about = None)]
struct Cli {
    /// Configuration file (defaults to reltools.toml in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unzip two dist trees, diff them and print what is not baselined
    ValidateRefactor {
        /// Baseline profiles to apply
        profiles: Vec<String>,

        /// Dist tree built before the change
        #[arg(long)]
        old: Option<PathBuf>,

        /// Dist tree built after the change
        #[arg(long)]
        new: Option<PathBuf>,

        /// Concurrent extractions per unzip pass
        #[arg(short, long)]
        workers: Option<usize>,

        /// Archive extractor: unzip or builtin
        #[arg(long)]
        extractor: Option<ExtractorKind>,

        /// Compare classes.jar bytecode with diffuse
        #[arg(long)]
        bytecode_diff: bool,
    },

    /// Version arithmetic for library releases
    #[command(subcommand)]
    Version(VersionCommand),

    /// Check that a commit touching the given paths carries a Relnote: line
    #[command(group(ArgGroup::new("source").args(["message", "message_file"])))]
    Relnote {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Read the commit message from a file
        #[arg(long)]
        message_file: Option<PathBuf>,

        /// Path prefixes that require a relnote (can be specified multiple times)
        #[arg(short, long = "path", required = true)]
        paths: Vec<String>,

        /// Files changed by the commit
        files: Vec<String>,
    },
}

#[derive(Subcommand)]
enum VersionCommand {
    /// Next version on the release train
    Increment {
        version: String,

        /// Stay within the current minor version
        #[arg(long)]
        within_minor: bool,
    },

    /// Print the greater of two versions
    Higher { a: String, b: String },

    /// libraryversions.toml constant names for a group and artifact
    Constants { group_id: String, artifact_id: String },

    /// Whether a group or artifact version should move from OLD to NEW
    #[command(group(ArgGroup::new("target").args(["group", "artifact"]).required(true)))]
    ShouldUpdate {
        old: String,
        new: String,

        #[arg(long)]
        group: Option<String>,

        #[arg(long)]
        artifact: Option<String>,
    },
}

fn main() {
    // Logs go to stderr so the report on stdout can be redirected as is
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ValidateRefactor {
            profiles,
            old,
            new,
            workers,
            extractor,
            bytecode_diff,
        } => run_validate_refactor(
            cli.config,
            profiles,
            old,
            new,
            workers,
            extractor,
            bytecode_diff,
        ),
        Commands::Version(command) => run_version(command),
        Commands::Relnote {
            message,
            message_file,
            paths,
            files,
        } => run_relnote(message, message_file, paths, files),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load(config_path: Option<PathBuf>) -> anyhow::Result<LoadedConfig> {
    let loaded = match config_path {
        Some(path) => load_config_from(&path)?,
        None => load_config(false)?,
    };
    if loaded.exists {
        info!("Using config {}", loaded.path.display());
    }
    Ok(loaded)
}

fn run_validate_refactor(
    config_path: Option<PathBuf>,
    profile_args: Vec<String>,
    old: Option<PathBuf>,
    new: Option<PathBuf>,
    workers: Option<usize>,
    extractor: Option<ExtractorKind>,
    bytecode_diff: bool,
) -> anyhow::Result<()> {
    let invalid: Vec<&str> = profile_args
        .iter()
        .map(String::as_str)
        .filter(|arg| arg.parse::<BaselineProfile>().is_err())
        .collect();
    if !invalid.is_empty() {
        error!("invalid argument(s) for validate-refactor: {}", invalid.join(", "));
        error!("currently recognized arguments: {}", BaselineProfile::recognized_names());
    }
    let profiles = BaselineProfile::parse_all(&profile_args)?;

    let mut config: AppConfig = load(config_path)?.config;
    if let Some(old) = old {
        config.old_root = old;
    }
    if let Some(new) = new {
        config.new_root = new;
    }
    if let Some(workers) = workers {
        anyhow::ensure!(workers > 0, "--workers must be at least 1");
        config.unzip_workers = workers;
    }
    if let Some(extractor) = extractor {
        config.extractor = extractor;
    }
    if bytecode_diff {
        config.bytecode_diff = true;
    }

    for root in [&config.old_root, &config.new_root] {
        anyhow::ensure!(root.is_dir(), "dist tree does not exist: {}", root.display());
    }

    info!("Comparing:");
    info!("  Old: {}", config.old_root.display());
    info!("  New: {}", config.new_root.display());

    let validator = RefactorValidator::new(config, Arc::new(SystemRunner::new()));
    let report = validator.run(&profiles)?;
    if !report.is_empty() {
        println!("{report}");
    }
    Ok(())
}

fn run_version(command: VersionCommand) -> anyhow::Result<()> {
    match command {
        VersionCommand::Increment {
            version,
            within_minor,
        } => {
            let next = if within_minor {
                versions::increment_within_minor(&version)?
            } else {
                versions::increment(&version)?
            };
            println!("{next}");
        }
        VersionCommand::Higher { a, b } => {
            println!("{}", versions::higher(&a, &b)?);
        }
        VersionCommand::Constants {
            group_id,
            artifact_id,
        } => {
            let (group, artifact) = versions::library_constants(&group_id, &artifact_id);
            println!("{group} {artifact}");
        }
        VersionCommand::ShouldUpdate {
            old,
            new,
            group,
            artifact,
        } => {
            let update = match (group, artifact) {
                (Some(group), _) => versions::should_update_group_version(&old, &new, &group)?,
                (None, Some(artifact)) => {
                    versions::should_update_artifact_version(&old, &new, &artifact)?
                }
                (None, None) => bail!("one of --group or --artifact is required"),
            };
            println!("{update}");
        }
    }
    Ok(())
}

fn run_relnote(
    message: Option<String>,
    message_file: Option<PathBuf>,
    paths: Vec<String>,
    files: Vec<String>,
) -> anyhow::Result<()> {
    let message = match (message, message_file) {
        (Some(message), _) => message,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading commit message from {}", path.display()))?,
        (None, None) => std::io::read_to_string(std::io::stdin())
            .context("reading commit message from stdin")?,
    };

    match RelnoteCheck::new(paths.clone()).check(&message, &files) {
        RelnoteStatus::NotRequired => info!("No changes under {}", paths.join(", ")),
        RelnoteStatus::Present => info!("Relnote found"),
        RelnoteStatus::Missing => bail!(
            "Changes under {} need a release note. Add a line such as\n\n    Relnote: Added FooBar API\n\nor \"Relnote: N/A\" if the change is not user visible.",
            paths.join(", ")
        ),
    }
    Ok(())
}
