//! Search command: find pattern hits and tally their collocations.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use collocate_core::config::Config;
use collocate_core::search::{
    self, CollectedMatches, MatchRecord, SearchQuery, SearchSummary, SearchUnit,
};
use collocate_core::{Corpus, HtmlReport, KnownPhrases, ReportPaths, table};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `search` subcommand.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Inclusion pattern, a case-insensitive regular expression (overrides `search.query`).
    pub query: Option<String>,

    /// Suppress hits that also match this pattern.
    #[arg(short = 'x', long, value_name = "PATTERN")]
    pub exclude: Option<String>,

    /// Ignore any configured exclusion pattern.
    #[arg(long, conflicts_with = "exclude")]
    pub no_exclude: bool,

    /// Document to search, by file name (repeatable; defaults to all).
    #[arg(short = 'd', long = "doc", value_name = "NAME")]
    pub documents: Vec<String>,

    /// Scan sentences or lines.
    #[arg(long, value_enum)]
    pub unit: Option<SearchUnit>,

    /// Pattern whose first capture group names the current chapter.
    #[arg(long, value_name = "PATTERN")]
    pub chapter_marker: Option<String>,

    /// Corpus directory (overrides `corpus_dir`).
    #[arg(long, value_name = "DIR")]
    pub corpus: Option<Utf8PathBuf>,

    /// Frequency table to read (defaults to the configured table path).
    #[arg(long, value_name = "FILE")]
    pub ngrams: Option<Utf8PathBuf>,

    /// Directory for the HTML reports (overrides `results_dir`).
    #[arg(long, value_name = "DIR")]
    pub results: Option<Utf8PathBuf>,

    /// Longest phrase to tally (defaults to the longest phrase in the table).
    #[arg(long, value_name = "N")]
    pub max_n: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusion: Option<&'a str>,
    unit: SearchUnit,
    reports: &'a ReportPaths,
    #[serde(flatten)]
    summary: &'a SearchSummary,
    records: &'a [MatchRecord],
}

/// Search parameters after merging arguments over configuration.
#[derive(Debug)]
struct SearchPlan {
    query: String,
    exclusion: Option<String>,
    chapter_marker: String,
    unit: SearchUnit,
    documents: Option<Vec<String>>,
    corpus_dir: Utf8PathBuf,
    table: Utf8PathBuf,
    results_dir: Utf8PathBuf,
    max_n: Option<usize>,
}

impl SearchPlan {
    fn new(args: SearchArgs, config: &Config) -> anyhow::Result<Self> {
        let Some(query) = args.query.or_else(|| config.search.query.clone()) else {
            bail!("no search pattern given; pass one or set `search.query` in the config");
        };
        let exclusion = if args.no_exclude {
            None
        } else {
            args.exclude
                .or_else(|| config.search.active_exclusion().map(str::to_string))
        };
        if args.max_n == Some(0) {
            bail!("--max-n must be at least 1");
        }
        let documents = if args.documents.is_empty() {
            config.search.documents.clone()
        } else {
            Some(args.documents)
        };
        Ok(Self {
            query,
            exclusion,
            chapter_marker: args
                .chapter_marker
                .unwrap_or_else(|| config.search.chapter_marker.clone()),
            unit: args.unit.unwrap_or(config.search.unit),
            documents,
            corpus_dir: args.corpus.unwrap_or_else(|| config.corpus_dir.clone()),
            table: args.ngrams.unwrap_or_else(|| config.ngram_path()),
            results_dir: args.results.unwrap_or_else(|| config.results_dir.clone()),
            max_n: args.max_n,
        })
    }

    /// Documents to scan, in order.
    fn targets(&self, corpus: &Corpus) -> Vec<String> {
        self.documents
            .clone()
            .unwrap_or_else(|| corpus.ids().map(str::to_string).collect())
    }
}

/// Search the corpus and write the contexts and frequencies reports.
#[instrument(name = "cmd_search", skip_all)]
pub fn cmd_search(
    args: SearchArgs,
    global_json: bool,
    show_progress: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let plan = SearchPlan::new(args, config)?;
    debug!(?plan, "executing search command");

    let query = SearchQuery::new(&plan.query, plan.exclusion.as_deref(), &plan.chapter_marker)?;
    let mined = table::read_table(&plan.table).with_context(|| {
        format!(
            "failed to read frequency table {} (run `collocate mine` first)",
            plan.table
        )
    })?;
    let known = KnownPhrases::from_table(&mined);

    let progress = super::spinner(show_progress, "searching");
    let corpus = super::load_corpus(&plan.corpus_dir)?;
    let targets = plan.targets(&corpus);

    let mut sinks = (
        HtmlReport::create(&plan.results_dir)?,
        CollectedMatches::default(),
    );
    let summary = search::search_corpus(
        &corpus,
        &targets,
        &query,
        &known,
        plan.unit,
        plan.max_n.unwrap_or_else(|| mined.max_n()),
        &mut sinks,
    )?;
    let (mut report, collected) = sinks;
    report.write_collocations(&summary.collocations)?;
    let paths = report.finish()?;
    progress.finish_and_clear();

    if global_json {
        let output = SearchOutput {
            query: &plan.query,
            exclusion: plan.exclusion.as_deref(),
            unit: plan.unit,
            reports: &paths,
            summary: &summary,
            records: &collected.records,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for id in &summary.missing {
        eprintln!(
            "{} {id} not found in {}",
            "warning:".yellow().bold(),
            plan.corpus_dir
        );
    }
    println!(
        "{} {} matches in {} documents",
        "Found".green().bold(),
        summary.matches,
        summary.documents_searched,
    );
    for tally in summary.collocations.iter().rev().filter(|t| !t.phrases.is_empty()) {
        let shown: Vec<String> = tally
            .phrases
            .iter()
            .take(3)
            .map(|p| format!("{} ({})", p.phrase, p.count))
            .collect();
        println!(
            "  {} {}",
            format!("length {}:", tally.length).dimmed(),
            shown.join(", ")
        );
    }
    println!("{}: {}", "Contexts".dimmed(), paths.contexts.cyan());
    println!("{}: {}", "Frequencies".dimmed(), paths.frequencies.cyan());

    Ok(())
}
