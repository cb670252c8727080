//! Info command: package details and the effective configuration.

use clap::Args;
use collocate_core::config::{Config, ConfigSources};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    corpus_dir: String,
    results_dir: String,
    ngram_file: String,
    min_count: u64,
    max_n: usize,
    search: SearchInfo,
}

#[derive(Serialize)]
struct SearchInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusion: Option<String>,
    chapter_marker: String,
    unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<Vec<String>>,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            corpus_dir: config.corpus_dir.to_string(),
            results_dir: config.results_dir.to_string(),
            ngram_file: config.ngram_path().to_string(),
            min_count: config.min_count,
            max_n: config.max_n,
            search: SearchInfo {
                query: config.search.query.clone(),
                exclusion: config.search.active_exclusion().map(str::to_string),
                chapter_marker: config.search.chapter_marker.clone(),
                unit: config.search.unit.to_string(),
                documents: config.search.documents.clone(),
            },
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `sources` - Config source metadata from loading
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    let info = PackageInfo::new();

    debug!(json_output = global_json, "executing info command");

    let config_info = ConfigInfo::from_config(config, sources);
    let full_info = FullInfo {
        package: info,
        config: config_info,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
    } else {
        println!(
            "{} {}",
            full_info.package.name.bold(),
            full_info.package.version.green()
        );
        if !full_info.package.description.is_empty() {
            println!("{}", full_info.package.description);
        }
        if !full_info.package.license.is_empty() {
            println!("{}: {}", "License".dimmed(), full_info.package.license);
        }

        // Configuration section
        println!();
        println!("{}", "Configuration".bold().underline());
        if let Some(ref path) = full_info.config.config_file {
            println!("{}: {}", "Config file".dimmed(), path.cyan());
        } else {
            println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
        }
        println!("{}: {}", "Log level".dimmed(), full_info.config.log_level);
        if let Some(ref dir) = full_info.config.log_dir {
            println!("{}: {}", "Log directory".dimmed(), dir);
        }

        println!();
        println!("{}", "Mining".bold().underline());
        println!("{}: {}", "Corpus".dimmed(), full_info.config.corpus_dir);
        println!(
            "{}: {}",
            "Frequency table".dimmed(),
            full_info.config.ngram_file
        );
        println!("{}: {}", "Min count".dimmed(), full_info.config.min_count);
        println!("{}: {}", "Max length".dimmed(), full_info.config.max_n);

        let search = &full_info.config.search;
        println!();
        println!("{}", "Search".bold().underline());
        print_opt("Query", &search.query);
        print_opt("Exclusion", &search.exclusion);
        println!("{}: {}", "Chapter marker".dimmed(), search.chapter_marker);
        println!("{}: {}", "Unit".dimmed(), search.unit);
        match search.documents {
            Some(ref docs) => println!("{}: {}", "Documents".dimmed(), docs.join(", ")),
            None => println!("{}: {}", "Documents".dimmed(), "(all)".dimmed()),
        }
        println!("{}: {}", "Results".dimmed(), full_info.config.results_dir);
    }

    Ok(())
}

/// Print an optional value or "(not set)".
fn print_opt<T: std::fmt::Display>(label: &str, value: &Option<T>) {
    match value {
        Some(v) => println!("{}: {}", label.dimmed(), v),
        None => println!("{}: {}", label.dimmed(), "(not set)".dimmed()),
    }
}
