//! VOD preset CLI
//!
//! Entry point for the `vod-preset` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::debug;
use vod_preset::config::env_layer;
use vod_preset::{
    logging, split_urls, Catalog, CatalogError, CatalogOrigin, ConfigError, EffectiveSettings,
    ExplainOutput, PresetError, ResolvedArtifact, RuntimeOverride,
};

/// Resolution or usage failure
const EXIT_USAGE: i32 = 1;

/// Settings or catalog failure
const EXIT_CONFIG: i32 = 2;

#[derive(Parser)]
#[command(name = "vod-preset")]
#[command(about = "Resolve downloader presets into flat option sets", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Catalog file (.toml or .json) instead of the built-in presets
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Settings file (default: ~/.config/vod-preset/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Directory output templates are rooted at (default: current directory)
    #[arg(long, global = true)]
    output_root: Option<String>,

    /// Firefox profile used for cookie extraction
    #[arg(long, global = true)]
    browser_profile: Option<String>,

    /// Increase log verbosity (repeatable)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable presets
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Include internal presets
        #[arg(long)]
        all: bool,
    },

    /// Resolve a preset and emit the options artifact
    Resolve {
        /// Preset name (default: configured default, else the first selectable preset)
        preset: Option<String>,

        /// Rate limit in bytes/s; blank keeps the preset's value
        #[arg(long)]
        ratelimit: Option<String>,

        /// Override a top-level option (key=value, repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Comma-separated URLs to include in the artifact
        #[arg(long)]
        urls: Option<String>,

        /// Write the artifact to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show merge order and where each option comes from
    Explain {
        /// Preset name
        preset: String,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// Validate the catalog and resolve every preset
    Verify,
}

fn main() {
    let cli = Cli::parse();

    let effective = match load_settings(&cli.global) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(EXIT_CONFIG);
        }
    };
    let settings = &effective.settings;

    logging::init(cli.global.verbose, cli.global.quiet, &settings.log_level);
    debug!(layers = effective.sources.len(), "settings loaded");

    let catalog = match Catalog::from_settings(settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            process::exit(EXIT_CONFIG);
        }
    };

    match cli.command {
        Commands::List { json, all } => run_list(&catalog, json, all),
        Commands::Resolve {
            preset,
            ratelimit,
            set,
            urls,
            output,
        } => run_resolve(
            &catalog,
            &effective,
            preset.as_deref(),
            ratelimit,
            &set,
            urls.as_deref(),
            output,
        ),
        Commands::Explain { preset, human } => run_explain(&catalog, &preset, human),
        Commands::Verify => run_verify(&catalog),
    }
}

fn load_settings(global: &GlobalArgs) -> Result<EffectiveSettings, ConfigError> {
    let user_path = match global.config {
        Some(ref path) if !path.exists() => return Err(ConfigError::NotFound(path.clone())),
        Some(ref path) => Some(path.clone()),
        None => EffectiveSettings::default_user_path(),
    };

    let env = env_layer(|name| std::env::var(name).ok());

    let mut cli = Map::new();
    if let Some(ref path) = global.catalog {
        cli.insert(
            "catalog_path".to_string(),
            Value::String(path.to_string_lossy().to_string()),
        );
    }
    if let Some(ref root) = global.output_root {
        cli.insert("output_root".to_string(), Value::String(root.clone()));
    }
    if let Some(ref profile) = global.browser_profile {
        cli.insert("browser_profile".to_string(), Value::String(profile.clone()));
    }
    let cli = if cli.is_empty() {
        None
    } else {
        Some(Value::Object(cli))
    };

    EffectiveSettings::build(user_path.as_deref(), env, cli)
}

fn run_list(catalog: &Catalog, json_output: bool, all: bool) {
    let presets: Vec<_> = catalog
        .registry()
        .iter()
        .filter(|p| all || !p.is_internal())
        .collect();

    if json_output {
        let output: Vec<Value> = presets
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "internal": p.is_internal(),
                    "parents": p.parents,
                    "notice": catalog.notice(&p.name),
                })
            })
            .collect();

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_USAGE);
            }
        }
        return;
    }

    if presets.is_empty() {
        println!("No selectable presets.");
        return;
    }

    for preset in presets {
        let mut line = preset.name.clone();
        if preset.is_internal() {
            line.push_str("  (internal)");
        }
        if !preset.parents.is_empty() {
            line.push_str(&format!("  <- {}", preset.parents.join(", ")));
        }
        println!("{}", line);
    }
}

fn run_resolve(
    catalog: &Catalog,
    effective: &EffectiveSettings,
    requested: Option<&str>,
    ratelimit: Option<String>,
    assignments: &[String],
    urls: Option<&str>,
    output: Option<PathBuf>,
) {
    let settings = &effective.settings;

    let name = match catalog.select(requested, settings.default_preset.as_deref()) {
        Ok(n) => n,
        Err(e) => exit_with_catalog_error(e),
    };

    if let Some(notice) = catalog.notice(&name) {
        eprintln!("WARNING: {}", notice);
    }

    let mut overrides = settings.runtime_overrides();
    if let Some(raw) = ratelimit {
        overrides.push("ratelimit", raw);
    }
    for text in assignments {
        match RuntimeOverride::parse_assignment(text) {
            Ok(o) => overrides.push(o.key, o.raw),
            Err(e) => exit_with_preset_error(e),
        }
    }

    let urls = match urls {
        Some(text) => {
            let list = split_urls(text);
            if list.is_empty() {
                eprintln!("No URLs provided.");
                process::exit(EXIT_USAGE);
            }
            list
        }
        None => Vec::new(),
    };

    let resolved = match catalog.registry().resolver().resolve_with(&name, &overrides) {
        Ok(r) => r,
        Err(e) => exit_with_preset_error(e),
    };

    let artifact =
        ResolvedArtifact::new(resolved, catalog.source().clone(), &overrides).with_urls(urls);

    match output {
        Some(path) => {
            if let Err(e) = artifact.write_to_file(&path) {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(EXIT_USAGE);
            }
            eprintln!(
                "Wrote {} options for '{}' to {}",
                artifact.options.len(),
                name,
                path.display()
            );
        }
        None => match artifact.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_USAGE);
            }
        },
    }
}

fn run_explain(catalog: &Catalog, preset: &str, human: bool) {
    let explanation = match ExplainOutput::for_preset(&catalog.registry().resolver(), preset) {
        Ok(e) => e,
        Err(e) => exit_with_preset_error(e),
    };

    if human {
        println!("{}", explanation.to_human());
    } else {
        match explanation.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_USAGE);
            }
        }
    }
}

fn run_verify(catalog: &Catalog) {
    let registry = catalog.registry();
    let resolver = registry.resolver();

    for preset in registry.iter() {
        if let Err(e) = resolver.resolve(&preset.name) {
            eprintln!("Catalog error: {}", e);
            process::exit(EXIT_CONFIG);
        }
    }

    let selectable = registry.list_selectable_names().len();
    let source = catalog.source();
    match (source.origin, source.path.as_deref()) {
        (CatalogOrigin::File, Some(path)) => println!("Catalog valid: {}", path),
        (CatalogOrigin::Inline, _) => println!("Catalog valid: inline catalog"),
        _ => println!("Catalog valid: built-in presets"),
    }
    println!();
    println!("  Base preset: {}", registry.base().name);
    println!(
        "  Presets: {} ({} selectable, {} internal)",
        registry.len(),
        selectable,
        registry.len() - selectable
    );
    if let Some(ref digest) = source.digest {
        println!("  SHA-256: {}", digest);
    }
}

fn exit_with_catalog_error(err: CatalogError) -> ! {
    match err {
        CatalogError::Engine(e) => exit_with_preset_error(e),
        other => {
            eprintln!("Error: {}", other);
            process::exit(EXIT_USAGE);
        }
    }
}

fn exit_with_preset_error(err: PresetError) -> ! {
    eprintln!("Error: {}", err);
    if let PresetError::UnknownPreset { referenced_by: None, .. } = err {
        eprintln!("Run `vod-preset list` to see available presets.");
    }
    process::exit(EXIT_USAGE);
}
