//! Mine command: build the frequency table for a corpus.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use collocate_core::collocation::PhraseCount;
use collocate_core::config::Config;
use collocate_core::{FrequencyTable, ngrams, table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Arguments for the `mine` subcommand.
#[derive(Args, Debug, Default)]
pub struct MineArgs {
    /// Corpus directory (overrides `corpus_dir`).
    #[arg(long, value_name = "DIR")]
    pub corpus: Option<Utf8PathBuf>,

    /// Minimum corpus-wide count for a phrase to be kept.
    #[arg(long, value_name = "N")]
    pub min_count: Option<u64>,

    /// Maximum phrase length in words.
    #[arg(long, value_name = "N")]
    pub max_n: Option<usize>,

    /// Where to write the table (defaults to the configured table path).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Show the K most frequent phrases of each length.
    #[arg(long, value_name = "K", default_value_t = 5)]
    pub top: usize,
}

#[derive(Debug, Serialize)]
struct LevelSummary {
    length: usize,
    phrases: usize,
    top: Vec<PhraseCount>,
}

#[derive(Debug, Serialize)]
struct MineReport {
    corpus_dir: Utf8PathBuf,
    documents: usize,
    table: Utf8PathBuf,
    min_count: u64,
    max_n: usize,
    total_phrases: usize,
    levels: Vec<LevelSummary>,
}

impl MineReport {
    fn levels(table: &FrequencyTable, top: usize) -> Vec<LevelSummary> {
        (1..=table.max_n())
            .map(|length| {
                let sorted = table.sorted_level(length);
                LevelSummary {
                    length,
                    phrases: sorted.len(),
                    top: sorted
                        .into_iter()
                        .take(top)
                        .map(|(phrase, count)| PhraseCount {
                            phrase: phrase.to_string(),
                            count,
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

/// One tick per mined phrase length.
fn level_progress(visible: bool, max_n: usize) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(max_n as u64);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_prefix("Mining");
    pb
}

/// Apply command-line overrides on top of the loaded configuration.
fn effective_config(args: &MineArgs, config: &Config) -> anyhow::Result<Config> {
    let mut config = config.clone();
    if let Some(ref dir) = args.corpus {
        config.corpus_dir = dir.clone();
    }
    if let Some(min_count) = args.min_count {
        config.min_count = min_count;
    }
    if let Some(max_n) = args.max_n {
        config.max_n = max_n;
    }
    if let Some(ref output) = args.output {
        config.ngram_file = Some(output.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Mine the corpus and write its frequency table.
#[instrument(name = "cmd_mine", skip_all)]
pub fn cmd_mine(
    args: MineArgs,
    global_json: bool,
    show_progress: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let config = effective_config(&args, config)?;
    let params = config.mining_params();
    debug!(corpus = %config.corpus_dir, ?params, "executing mine command");

    let corpus = super::load_corpus(&config.corpus_dir)?;
    let progress = level_progress(show_progress, params.max_n);
    let mined = ngrams::mine_corpus_with(&corpus, &params, |stats| {
        progress.set_message(format!("length {}: {} phrases kept", stats.n, stats.retained));
        progress.inc(1);
    });
    progress.finish_and_clear();

    let table_path = config.ngram_path();
    table::write_table(&table_path, &mined)
        .with_context(|| format!("failed to write frequency table {table_path}"))?;
    info!(path = %table_path, phrases = mined.len(), "mining complete");

    let report = MineReport {
        corpus_dir: config.corpus_dir.clone(),
        documents: corpus.len(),
        table: table_path,
        min_count: params.min_count,
        max_n: params.max_n,
        total_phrases: mined.len(),
        levels: MineReport::levels(&mined, args.top),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} phrases from {} documents (min count {}, up to {} words)",
        "Mined".green().bold(),
        report.total_phrases,
        report.documents,
        report.min_count,
        report.max_n,
    );
    println!("{}: {}", "Table".dimmed(), report.table.cyan());
    for level in report.levels.iter().filter(|l| l.phrases > 0) {
        println!();
        println!(
            "{}",
            format!("Length {} ({} phrases)", level.length, level.phrases)
                .bold()
                .underline()
        );
        for entry in &level.top {
            println!("  {:>6}  {}", entry.count, entry.phrase);
        }
    }

    Ok(())
}
