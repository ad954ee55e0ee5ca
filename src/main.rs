//! CLI entry point for symbolscope.
//!
//! Walks a directory, extracts every enabled-language unit and prints the
//! batch summary, the JSON model, or capability answers.

use anyhow::{Context, Result, bail};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use symbolscope::config::CONFIG_DIR;
use symbolscope::query::SymbolSource;
use symbolscope::{ExtractionEngine, ExtractionResult, FileWalker, Satisfaction, Settings, logging};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Language-agnostic symbol extraction
#[derive(Parser)]
#[command(
    name = "symbolscope",
    version = env!("CARGO_PKG_VERSION"),
    about = "Extract normalized symbol models from Go, Python, Java, TypeScript and JavaScript sources",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .symbolscope/settings.toml
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Extract every source file under a directory
    #[command(
        after_help = "Examples:\n  symbolscope extract src\n  symbolscope extract src --json > model.json\n  symbolscope extract . --threads 1 --fail-fast"
    )]
    Extract {
        /// Directory to walk
        path: PathBuf,

        /// Number of worker threads (overrides config)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Abort on the first failed unit
        #[arg(long)]
        fail_fast: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// List the files that would be extracted and stop
        #[arg(long)]
        dry_run: bool,
    },

    /// Check which types satisfy a capability set
    #[command(
        after_help = "Examples:\n  symbolscope satisfies src Processor\n  symbolscope satisfies src Processor --type Worker"
    )]
    Satisfies {
        /// Directory to walk
        path: PathBuf,

        /// Capability (interface) name, simple or qualified
        capability: String,

        /// Check one type instead of listing every satisfier
        #[arg(long = "type")]
        type_name: Option<String>,
    },

    /// List top-level definitions and types with methods
    Outline {
        /// Directory to walk
        path: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        }),
    };
    logging::init_with_level(logging::effective_level(&settings));

    match cli.command {
        Commands::Init { force } => {
            let path = PathBuf::from(CONFIG_DIR).join("settings.toml");
            if path.exists() && !force {
                bail!(
                    "configuration already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Settings::default()
                .save(&path)
                .map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))?;
            println!("Created configuration file at: {}", path.display());
        }

        Commands::Extract {
            path,
            threads,
            fail_fast,
            json,
            dry_run,
        } => {
            if let Some(threads) = threads {
                settings.extraction.worker_threads = threads;
            }
            settings.extraction.fail_fast |= fail_fast;
            let settings = Arc::new(settings);

            if dry_run {
                let walker = FileWalker::new(Arc::clone(&settings));
                for (file, language) in walker.walk(&path)? {
                    println!("{language:<8} {}", file.display());
                }
                return Ok(());
            }

            let result = extract(&settings, &path)?;
            if json {
                println!("{}", result.to_json()?);
            } else {
                print_failures(&result);
                eprintln!("{}", result.stats.summary());
            }
        }

        Commands::Satisfies {
            path,
            capability,
            type_name,
        } => {
            let result = extract(&Arc::new(settings), &path)?;
            match type_name {
                Some(type_name) => {
                    match result.table.resolve_capability(&type_name, &capability) {
                        Satisfaction::Satisfied => println!("{type_name} satisfies {capability}"),
                        Satisfaction::NotSatisfied {
                            missing,
                            mismatched,
                        } => {
                            println!("{type_name} does not satisfy {capability}");
                            if !missing.is_empty() {
                                println!("  missing: {}", missing.join(", "));
                            }
                            if !mismatched.is_empty() {
                                println!("  mismatched: {}", mismatched.join(", "));
                            }
                        }
                        Satisfaction::UnknownType => bail!("unknown type '{type_name}'"),
                        Satisfaction::UnknownCapability => {
                            bail!("unknown capability '{capability}'")
                        }
                    }
                }
                None => {
                    let satisfiers = result.table.satisfiers(&capability);
                    if satisfiers.is_empty() {
                        println!("No type satisfies {capability}");
                    }
                    for name in satisfiers {
                        println!("{name}");
                    }
                }
            }
        }

        Commands::Outline { path } => {
            let result = extract(&Arc::new(settings), &path)?;
            for symbol in result.table.top_level_definitions() {
                let source = result.table.source_id(symbol.unit).unwrap_or("?");
                println!(
                    "{:<15} {:<40} {source}:{}",
                    format!("{:?}", symbol.kind),
                    symbol.qualified_name,
                    symbol.range.start_line + 1
                );
            }
            let with_methods = result.table.types_with_methods();
            if !with_methods.is_empty() {
                println!("\nTypes with methods:");
                for symbol in with_methods {
                    println!("  {}", symbol.qualified_name);
                }
            }
        }

        Commands::Config => {
            let rendered = toml::to_string_pretty(&settings).context("rendering settings")?;
            println!("{rendered}");
        }
    }

    Ok(())
}

fn extract(settings: &Arc<Settings>, root: &Path) -> Result<ExtractionResult> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }
    let units = FileWalker::new(Arc::clone(settings)).collect_units(root)?;
    let engine = ExtractionEngine::new(Arc::clone(settings));
    Ok(engine.extract(units)?)
}

fn print_failures(result: &ExtractionResult) {
    for report in result.units.iter().filter(|r| r.fatal_diagnostic().is_some()) {
        if let Some(diagnostic) = report.fatal_diagnostic() {
            eprintln!("{}: [{}] {diagnostic}", report.source_id, diagnostic.status_code());
        }
    }
}
