//! token-manager - CRUD, lint, migration and export for the token registry
//!
//! Usage:
//!   token-manager add brand-teal '#00A3A3' --category color
//!   token-manager rename cosmic-purple vergil-purple
//!   token-manager remove colors.legacy --force
//!   token-manager find 'purple$'
//!   token-manager migrate --from tokens-v1.yaml --format json
//!   token-manager export --check
//!
//! Every successful mutation rewrites all four artifacts.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use token_sync::export::{self, ExportReport};
use token_sync::parsers::yaml_source;
use token_sync::registry::{
    generate_migration_plan, validate_tokens, MutationOutcome, NewToken, TokenRegistry, TokenUpdate,
};
use token_sync::{Category, ExportError, TokenDefinition, TokenSyncConfig};

#[derive(Parser)]
#[command(name = "token-manager")]
#[command(about = "Manage the design token registry")]
struct Cli {
    /// Project root containing token-sync.yaml and the token artifacts
    #[arg(long, global = true, env = "TOKEN_SYNC_ROOT", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a token; the category is inferred when not given
    Add {
        name: String,
        value: String,
        #[arg(long, short)]
        category: Option<Category>,
        /// Full dotted path instead of `<group>.<name>`
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        deprecated: bool,
    },

    /// Remove a token (path, CSS variable or unique name)
    Remove {
        token: String,
        /// Remove even when other tokens reference it
        #[arg(long)]
        force: bool,
    },

    /// Rename a token, rewriting references to it
    Rename { token: String, new_name: String },

    /// Change a token's value, comment or deprecation flag
    Update {
        token: String,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        deprecated: Option<bool>,
    },

    /// Search tokens by regex over path, name, value and CSS variable
    Find { query: String },

    /// List tokens, optionally for one category
    List {
        #[arg(long, short)]
        category: Option<Category>,
        #[arg(long)]
        include_deprecated: bool,
    },

    /// Lint the registry; exits 1 on errors
    Validate,

    /// Plan the migration from an older snapshot to the current registry
    Migrate {
        /// Older YAML snapshot
        #[arg(long)]
        from: PathBuf,
        #[arg(long, value_enum, default_value_t = PlanFormat::Md)]
        format: PlanFormat,
    },

    /// Regenerate all four artifacts from the YAML source
    Export {
        /// Only report artifacts that differ; exits 1 if any do
        #[arg(long)]
        check: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanFormat {
    Md,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = TokenSyncConfig::load(&cli.root)
        .with_context(|| format!("Failed to load config from {}", cli.root.display()))?;
    let mut registry = TokenRegistry::load(&cli.root, &config).context("Failed to load token registry")?;

    match cli.command {
        Command::Add {
            name,
            value,
            category,
            path,
            comment,
            deprecated,
        } => {
            let outcome = registry.add_token(NewToken {
                name,
                value,
                category,
                path,
                comment,
                deprecated,
            })?;
            println!("Added {}", outcome.path);
            finish_mutation(&cli.root, &config, &registry, &outcome)
        }
        Command::Remove { token, force } => {
            let outcome = registry.remove_token(&token, force)?;
            println!("Removed {}", outcome.removed.path);
            if !outcome.dangling.is_empty() {
                println!("Now dangling: {}", outcome.dangling.join(", "));
            }
            write_artifacts(&cli.root, &config, &registry)
        }
        Command::Rename { token, new_name } => {
            let outcome = registry.rename_token(&token, &new_name)?;
            println!("Renamed {} -> {}", outcome.old_path, outcome.new_path);
            println!("  {} -> {}", outcome.old_css_variable, outcome.new_css_variable);
            for path in &outcome.rewritten {
                println!("  updated reference in {}", path);
            }
            write_artifacts(&cli.root, &config, &registry)
        }
        Command::Update {
            token,
            value,
            comment,
            deprecated,
        } => {
            let outcome = registry.update_token(
                &token,
                TokenUpdate {
                    value,
                    comment,
                    deprecated,
                },
            )?;
            if !outcome.changed {
                println!("No changes to {}", outcome.path);
                return Ok(());
            }
            println!("Updated {}", outcome.path);
            finish_mutation(&cli.root, &config, &registry, &outcome)
        }
        Command::Find { query } => {
            let found = registry.find_tokens(&query);
            print_tokens(&found);
            println!("{} match(es)", found.len());
            Ok(())
        }
        Command::List {
            category,
            include_deprecated,
        } => {
            let tokens = registry.list_tokens(category, include_deprecated);
            print_tokens(&tokens);
            println!("{} token(s)", tokens.len());
            Ok(())
        }
        Command::Validate => {
            let diagnostics = validate_tokens(&registry);
            for diagnostic in &diagnostics {
                println!("{}", diagnostic);
            }
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            let warnings = diagnostics.iter().filter(|d| d.is_warning()).count();
            println!("{} error(s), {} warning(s)", errors, warnings);
            if errors > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Migrate { from, format } => {
            let doc = yaml_source::load_source(&from, &config.css_prefix)
                .with_context(|| format!("Failed to read snapshot {}", from.display()))?;
            if !doc.present {
                bail!("Snapshot {} not found", from.display());
            }
            let old = TokenRegistry::from_document(&doc, &config.css_prefix);
            let plan = generate_migration_plan(&old, &registry);
            match format {
                PlanFormat::Md => print!("{}", plan.render_markdown()),
                PlanFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
            Ok(())
        }
        Command::Export { check: true } => {
            let stale = export::stale_artifacts(&cli.root, &config, &registry)?;
            if stale.is_empty() {
                println!("All generated artifacts are up to date");
                return Ok(());
            }
            for format in &stale {
                println!(
                    "Out of date: {} ({})",
                    format,
                    config.artifacts.path_for(*format).display()
                );
            }
            std::process::exit(1);
        }
        Command::Export { check: false } => write_artifacts(&cli.root, &config, &registry),
    }
}

fn finish_mutation(
    root: &Path,
    config: &TokenSyncConfig,
    registry: &TokenRegistry,
    outcome: &MutationOutcome,
) -> Result<()> {
    for warning in &outcome.warnings {
        println!("warning: {}", warning);
    }
    write_artifacts(root, config, registry)
}

fn write_artifacts(root: &Path, config: &TokenSyncConfig, registry: &TokenRegistry) -> Result<()> {
    match export::export_all(root, config, registry) {
        Ok(ExportReport { written }) => {
            for (format, path) in written {
                println!("  wrote {:<10} {}", format.display_name(), path.display());
            }
            Ok(())
        }
        Err(ExportError::Partial { written, failed }) => {
            for format in &written {
                println!("  wrote {}", format.display_name());
            }
            for (format, message) in &failed {
                eprintln!("  FAILED {}: {}", format.display_name(), message);
            }
            bail!("{} of 4 artifacts could not be written", failed.len())
        }
        Err(e) => Err(e).context("Export failed"),
    }
}

fn print_tokens(tokens: &[&TokenDefinition]) {
    for token in tokens {
        println!(
            "{:<40} {:<28} {}{}",
            token.path,
            token.raw_value,
            token.css_variable_name,
            if token.deprecated { "  (deprecated)" } else { "" }
        );
    }
}
