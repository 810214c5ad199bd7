//! cbom-tools: cryptographic bill of materials builder
//!
//! Scans a directory tree for X.509 certificates and PKCS #7 bundles and
//! writes a `CycloneDX` 1.6 CBOM.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use cbom_tools::{
    cli,
    config::{AppConfig, CONFIG_FILE_NAMES},
    model::ImplementationPlatform,
    pipeline::exit_codes,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nInput files:",
        "\n  Certificates: .pem .cer .cert .der .ca-bundle .crt",
        "\n  PKCS #7:      .p7a .p7b .p7c .p7r .p7s .spc",
        "\n\nOutput format:",
        "\n  CycloneDX 1.6 JSON (cryptographic-asset components)"
    )
}

#[derive(Parser)]
#[command(name = "cbom-tools")]
#[command(author = "Binarly.io")]
#[command(version, long_version = build_long_version())]
#[command(about = "Cryptographic bill of materials builder", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Warnings recorded (with --fail-on-warnings)
    3  Error occurred

EXAMPLES:
    # Scan an extracted image layer and print the CBOM
    cbom-tools scan ./rootfs

    # Extend an existing SBOM with crypto assets
    cbom-tools scan ./rootfs --bom sbom.cdx.json -O cbom.cdx.json

    # Reproducible CI run that fails on unparsable certificates
    cbom-tools scan ./rootfs --compact --fail-on-warnings")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `scan` subcommand
#[derive(Parser)]
struct ScanArgs {
    /// Directory to scan (for example an extracted image layer)
    dir: PathBuf,

    /// Existing CycloneDX JSON document to extend.
    ///
    /// Found assets are appended without checking the document for earlier
    /// scans, so passing a document this tool already wrote for the same tree
    /// duplicates its components (reported as duplicate bom-ref warnings).
    #[arg(long, value_name = "FILE")]
    bom: Option<PathBuf>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Implementation platform recorded on algorithms ("host" for this machine)
    #[arg(long, value_name = "PLATFORM")]
    platform: Option<ImplementationPlatform>,

    /// Decode files on a single thread
    #[arg(long)]
    no_parallel: bool,

    /// Exit with code 1 if the scan recorded warnings
    #[arg(long)]
    fail_on_warnings: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and write a CBOM
    Scan(ScanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .cbom-tools.yaml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout carries the document
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scan(args) => {
            let overrides = AppConfig::builder()
                .output_file(args.output_file)
                .pretty(!args.compact)
                .parallel(!args.no_parallel)
                .implementation_platform(args.platform.unwrap_or_default())
                .quiet(cli.quiet)
                .fail_on_warnings(args.fail_on_warnings)
                .build();
            let (config, loaded_from) =
                AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
            if let Some(path) = &loaded_from {
                tracing::debug!("Using config file {}", path.display());
            }

            let paths = cli::ScanPaths {
                root: args.dir,
                bom: args.bom,
            };
            cli::run_scan(&paths, &config)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "cbom-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = cbom_tools::config::generate_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    cbom_tools::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for path in cbom_tools::config::search_paths() {
                    eprintln!("  {}", path.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match cbom_tools::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".cbom-tools.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = cbom_tools::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
