//! Error types for collocate-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// A value deserialized fine but is out of range.
    #[error("invalid configuration value for `{key}`: {reason}")]
    Invalid {
        /// The offending key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a corpus from disk. All of them abort the run.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// The corpus directory could not be listed.
    #[error("failed to read corpus directory {path}")]
    ReadDir {
        /// Directory that was being listed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A corpus file could not be read (missing, unreadable, or not UTF-8).
    #[error("failed to read corpus file {path}")]
    ReadFile {
        /// File that was being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A corpus entry has a name that is not valid UTF-8.
    #[error("corpus entry name is not valid UTF-8: {0}")]
    NonUtf8Name(String),

    /// The corpus directory contains no documents.
    #[error("corpus directory {0} contains no documents")]
    Empty(Utf8PathBuf),
}

/// Result type alias using [`CorpusError`].
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Errors raised while reading or writing a frequency table file.
#[derive(Error, Debug)]
pub enum TableError {
    /// The table file could not be read or written.
    #[error("frequency table I/O failed for {path}")]
    Io {
        /// Path of the table file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a record failed (for example, invalid UTF-8).
    #[error("line {line}: failed to read frequency record")]
    Read {
        /// 1-based line number.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record has no tab separating phrase and count.
    #[error("line {line}: missing tab separator in frequency record {record:?}")]
    MissingSeparator {
        /// 1-based line number.
        line: usize,
        /// The offending record.
        record: String,
    },

    /// A record's count is not a non-negative integer.
    #[error("line {line}: invalid count {value:?}")]
    InvalidCount {
        /// 1-based line number.
        line: usize,
        /// The text that failed to parse.
        value: String,
    },

    /// A record has an empty phrase.
    #[error("line {line}: empty phrase")]
    EmptyPhrase {
        /// 1-based line number.
        line: usize,
    },

    /// A phrase has leading, trailing, or repeated spaces.
    #[error("line {line}: phrase {phrase:?} is not single-space separated")]
    MalformedPhrase {
        /// 1-based line number.
        line: usize,
        /// The offending phrase.
        phrase: String,
    },
}

/// Result type alias using [`TableError`].
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while writing report output.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Creating or writing a report file failed.
    #[error("failed to write report {path}")]
    Io {
        /// Report file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`ReportError`].
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors raised by the search engine.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A configured pattern failed to compile.
    #[error("invalid {role} pattern {pattern:?}")]
    InvalidPattern {
        /// Which pattern failed (query, exclusion, chapter marker).
        role: &'static str,
        /// The pattern source text.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },

    /// The match sink failed.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type alias using [`SearchError`].
pub type SearchResult<T> = Result<T, SearchError>;
