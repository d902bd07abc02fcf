//! ctxcat CLI - bundle a source tree into a single Markdown file for LLM context.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ctxcat::bundle::Bundler;
use ctxcat::errors::{exit_code, BundleError};
use ctxcat::filter::RuleSet;
use serde::Serialize;

/// Warn when the bundle grows past this size; most LLM context windows
/// start dropping content well before a megabyte of raw text.
const SIZE_WARN_BYTES: u64 = 750 * 1024;

#[derive(Parser)]
#[command(name = "ctxcat")]
#[command(about = "Bundle a source tree into a single Markdown file for LLM context")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and write the Markdown bundle
    Bundle {
        /// Root directory to scan
        path: PathBuf,

        /// Output file path (overwritten if it exists)
        #[arg(short, long, default_value = "project_context.md")]
        output: PathBuf,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Prepend a descriptive header to the bundle
        #[arg(long)]
        preamble: bool,

        /// Disable charset detection for non-UTF-8 files
        #[arg(long)]
        no_detect: bool,

        /// Additional extension or filename to include (repeatable)
        #[arg(long = "include-ext")]
        include_ext: Vec<String>,

        /// Additional extension or filename to exclude (repeatable)
        #[arg(long = "exclude-ext")]
        exclude_ext: Vec<String>,

        /// Additional directory name to prune (repeatable)
        #[arg(long = "exclude-dir")]
        exclude_dir: Vec<String>,
    },

    /// Show the default include/exclude rules
    Extensions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Bundle {
            path,
            output,
            json,
            preamble,
            no_detect,
            include_ext,
            exclude_ext,
            exclude_dir,
        } => run_bundle(
            path,
            output,
            json,
            preamble,
            no_detect,
            include_ext,
            exclude_ext,
            exclude_dir,
        ),
        Commands::Extensions { json } => run_extensions(json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "ctxcat", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Bundle { json, .. } => *json,
        Commands::Extensions { json } => *json,
        Commands::Completions { .. } => false,
    }
}

// --- Bundle command ---

#[allow(clippy::too_many_arguments)]
fn run_bundle(
    path: PathBuf,
    output: PathBuf,
    json: bool,
    preamble: bool,
    no_detect: bool,
    include_ext: Vec<String>,
    exclude_ext: Vec<String>,
    exclude_dir: Vec<String>,
) -> Result<(), BundleError> {
    let mut rules = RuleSet::default();
    for entry in &include_ext {
        rules = rules.include(entry);
    }
    for entry in &exclude_ext {
        rules = rules.exclude(entry);
    }
    for name in &exclude_dir {
        rules = rules.exclude_dir(name);
    }

    let report = Bundler::new(&path)
        .rules(rules)
        .detect_encodings(!no_detect)
        .preamble(preamble)
        .write_to(&output)?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    let size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);

    if json {
        #[derive(Serialize)]
        struct Output {
            output: String,
            size_bytes: u64,
            included: usize,
            skipped: usize,
            unlistable_dirs: usize,
        }

        let payload = Output {
            output: output.display().to_string(),
            size_bytes: size,
            included: report.included,
            skipped: report.skipped,
            unlistable_dirs: report.unlistable_dirs,
        };
        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| BundleError::Io(std::io::Error::other(e.to_string())))?;
        println!("{json}");
    } else {
        println!(
            "Wrote {} ({:.2} KB): {} files included, {} skipped",
            output.display(),
            size as f64 / 1024.0,
            report.included,
            report.skipped
        );
    }

    if size > SIZE_WARN_BYTES {
        eprintln!(
            "warning: output is {:.0} KB; it may exceed the context limit of some LLMs",
            size as f64 / 1024.0
        );
    }

    Ok(())
}

// --- Extensions command ---

fn run_extensions(json: bool) -> Result<(), BundleError> {
    let rules = RuleSet::default();

    if json {
        #[derive(Serialize)]
        struct Output {
            included: Vec<String>,
            excluded_dirs: Vec<String>,
            excluded: Vec<String>,
        }

        let payload = Output {
            included: rules.included_entries().map(String::from).collect(),
            excluded_dirs: rules.excluded_dir_entries().map(String::from).collect(),
            excluded: rules.excluded_entries().map(String::from).collect(),
        };
        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| BundleError::Io(std::io::Error::other(e.to_string())))?;
        println!("{json}");
    } else {
        println!("Included extensions/filenames:");
        for entry in rules.included_entries() {
            println!("  {}", entry);
        }
        println!("\nExcluded directories:");
        for entry in rules.excluded_dir_entries() {
            println!("  {}", entry);
        }
        println!("\nExcluded extensions/filenames:");
        for entry in rules.excluded_entries() {
            println!("  {}", entry);
        }
    }

    Ok(())
}
