//! Core library for collocate.
//!
//! Mines frequent word phrases from a directory of plain-text documents and
//! searches those documents for a pattern, tallying which frequent phrases
//! co-occur with each hit.
//!
//! # Modules
//!
//! - [`text`] - Sentence and word segmentation
//! - [`corpus`] - Documents and corpus loading
//! - [`ngrams`] - Level-wise frequent phrase mining
//! - [`table`] - Frequency table file format
//! - [`collocation`] - Collocation tallies over search hits
//! - [`search`] - Pattern search with chapter context
//! - [`report`] - HTML report output
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use collocate_core::{Corpus, MiningParams, ngrams};
//!
//! let corpus = Corpus::load_dir(Utf8Path::new("corpus")).expect("corpus");
//! let table = ngrams::mine_corpus(&corpus, &MiningParams::default());
//! for (phrase, count) in table.sorted_level(1).iter().take(10) {
//!     println!("{phrase}\t{count}");
//! }
//! ```
#![deny(unsafe_code)]

pub mod collocation;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ngrams;
pub mod report;
pub mod search;
pub mod table;
pub mod text;

pub use collocation::{CollocationTally, KnownPhrases, LengthTable, PhraseCount};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel, SearchConfig};
pub use corpus::{Corpus, Document};
pub use error::{
    ConfigError, ConfigResult, CorpusError, CorpusResult, ReportError, ReportResult, SearchError,
    SearchResult, TableError, TableResult,
};
pub use ngrams::{FrequencyTable, LevelStats, MiningParams, PhraseCounts};
pub use report::{HtmlReport, ReportPaths};
pub use search::{MatchRecord, MatchSink, SearchQuery, SearchSummary, SearchUnit};
