use std::path::{Path, PathBuf};

use {anyhow::Result, clap::Subcommand};

use nestor_config::{
    NestorConfig, Severity, find_config_file, load_config,
    validate::{validate_config, validate_file},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// File to check (defaults to the discovered config).
        path: Option<PathBuf>,
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration (secrets redacted).
    Show,
}

pub fn handle_config(action: ConfigAction, global_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Check { path, verbose } => {
            check(path.as_deref().or(global_path), verbose)
        },
        ConfigAction::Show => show(global_path),
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(path: Option<&Path>, verbose: bool) -> Result<()> {
    let path = path.map(Path::to_path_buf).or_else(find_config_file);

    let result = match path {
        Some(ref path) => {
            eprintln!("Checking {}\n", path.display());
            validate_file(path)
        },
        None => {
            eprintln!("No config file found; checking defaults.\n");
            nestor_config::ValidationResult {
                diagnostics: validate_config(&NestorConfig::default()),
                config_path: None,
            }
        },
    };

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn show(global_path: Option<&Path>) -> Result<()> {
    let config = match global_path {
        Some(path) => load_config(path)?,
        None => nestor_config::discover_and_load(),
    };
    // The Debug impls redact secret fields.
    println!("{config:#?}");
    Ok(())
}
