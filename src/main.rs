use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use textfix::config::load_from_path;
use textfix::mojibake::{mojibake_rules, DEFAULT_EXTENSIONS};
use textfix::patch::{patch_file, PatchOptions, PatchOutcome};
use textfix::repair::{normalize_extension, repair_dir, FileOutcome, RepairOptions};
use textfix::reset::{reset_detection_rules, DEFAULT_TARGET};
use textfix::RuleSet;

const RESET_FILE_ENV: &str = "TEXTFIX_RESET_FILE";
const PAGES_DIR_ENV: &str = "TEXTFIX_PAGES_DIR";
const DEFAULT_PAGES_DIR: &str = "pages";

#[derive(Parser)]
#[command(name = "textfix")]
#[command(about = "Guarded literal patching and mojibake repair", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch password-reset detection to honor a resetToken query parameter
    ResetPatch {
        /// File to patch (default: $TEXTFIX_RESET_FILE, then ./App.tsx)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// TOML rule file replacing the built-in reset rules
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Dry run - report outcomes without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Repair mojibake in the source files of a directory
    FixEncoding {
        /// Directory to scan (default: $TEXTFIX_PAGES_DIR, then ./pages)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// File suffix to scan; repeatable (default: .tsx and .ts)
        #[arg(short, long = "ext", value_name = "EXT", value_parser = normalize_extension)]
        extensions: Vec<String>,

        /// TOML rule file replacing the built-in mojibake table
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Dry run - report files that would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List a rule table and any ordering hazards in it
    Rules {
        /// TOML rule file to inspect (default: built-in mojibake table)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Inspect the built-in reset rules instead of the mojibake table
        #[arg(long, conflicts_with = "rules")]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::ResetPatch {
            file,
            rules,
            dry_run,
            diff,
        } => cmd_reset_patch(file, rules, dry_run, diff),

        Commands::FixEncoding {
            dir,
            extensions,
            rules,
            dry_run,
            diff,
        } => cmd_fix_encoding(dir, extensions, rules, dry_run, diff),

        Commands::Rules { rules, reset } => cmd_rules(rules, reset),
    }
}

/// Log to stderr so report lines on stdout stay clean.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose { "textfix=debug" } else { "textfix=warn" };

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve a target path.
///
/// Priority order:
/// 1. Explicit flag
/// 2. Environment variable
/// 3. Default relative to the current directory
fn resolve_target(cli_value: Option<PathBuf>, env_var: &str, default: &str) -> PathBuf {
    if let Some(path) = cli_value {
        return path;
    }

    if let Ok(value) = env::var(env_var) {
        if !value.trim().is_empty() {
            return PathBuf::from(value);
        }
    }

    PathBuf::from(default)
}

/// Load rules from a TOML file, or fall back to the built-in table.
fn load_rules(path: Option<&Path>, builtin: fn() -> RuleSet) -> Result<RuleSet> {
    match path {
        Some(path) => {
            let config = load_from_path(path)?;
            tracing::debug!(
                file = %path.display(),
                name = %config.meta.name,
                count = config.rules.len(),
                "loaded rule file"
            );
            Ok(config.to_rule_set())
        }
        None => Ok(builtin()),
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
        if change.missing_newline() {
            println!();
        }
    }
}

fn cmd_reset_patch(
    file: Option<PathBuf>,
    rules: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let target = resolve_target(file, RESET_FILE_ENV, DEFAULT_TARGET);
    let rules = load_rules(rules.as_deref(), reset_detection_rules)?;

    if dry_run {
        println!("{}", "[DRY RUN - file will not be written]".cyan());
    }

    let report = patch_file(&target, &rules, PatchOptions { dry_run })?;

    for outcome in &report.outcomes {
        match outcome {
            PatchOutcome::Applied { .. } => println!("{} {}", "✓".green(), outcome),
            PatchOutcome::NotFound { .. } => println!("{} {}", "✗".red(), outcome),
        }
    }

    if show_diff && report.changed() {
        display_diff(&report.file, &report.before, &report.after);
    }

    if report.written {
        println!("{} Updated {}", "✓".green(), report.file.display());
    } else {
        println!(
            "{} {} not written (dry run)",
            "⊘".cyan(),
            report.file.display()
        );
    }

    Ok(())
}

fn cmd_fix_encoding(
    dir: Option<PathBuf>,
    extensions: Vec<String>,
    rules: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let dir = resolve_target(dir, PAGES_DIR_ENV, DEFAULT_PAGES_DIR);
    let rules = load_rules(rules.as_deref(), mojibake_rules)?;

    let extensions = if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    } else {
        extensions
    };

    if dry_run {
        println!("{}", "[DRY RUN - files will not be written]".cyan());
    }

    let report = repair_dir(
        &dir,
        &rules,
        &RepairOptions {
            extensions,
            dry_run,
        },
    )?;

    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Repaired {
                file,
                replacements,
                before,
                after,
            } => {
                let verb = if dry_run { "Would fix" } else { "Fixing" };
                println!(
                    "{} encoding in {} {}",
                    verb,
                    outcome.file_name(),
                    format!("({replacements} replacements)").dimmed()
                );
                if show_diff {
                    display_diff(file, before, after);
                }
            }
            FileOutcome::Unchanged { .. } => {}
            FileOutcome::Failed { error, .. } => {
                eprintln!("{} {}: {}", "✗".red(), outcome.file_name(), error);
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} repaired",
        format!("{}", report.repaired_count()).green()
    );
    println!(
        "  {} unchanged",
        format!("{}", report.unchanged_count()).normal()
    );
    println!("  {} failed", format!("{}", report.failed_count()).red());

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_rules(rules: Option<PathBuf>, reset: bool) -> Result<()> {
    let set = if reset {
        reset_detection_rules()
    } else {
        load_rules(rules.as_deref(), mojibake_rules)?
    };

    println!("{} ({} rules)", "Rules".bold(), set.len());
    for (idx, rule) in set.rules().iter().enumerate() {
        match &rule.id {
            Some(id) => println!("  {:>3}. {} {}", idx, id.bold(), rule),
            None => println!("  {:>3}. {}", idx, rule),
        }
    }

    let issues = set.shadowing();
    println!();
    if issues.is_empty() {
        println!("{} no ordering hazards", "✓".green());
    } else {
        for issue in &issues {
            println!("{} {}", "⚠".yellow(), issue);
        }
    }

    Ok(())
}
