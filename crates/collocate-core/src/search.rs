//! Pattern search with chapter context.
//!
//! Each targeted document is scanned unit by unit in order. A unit is a
//! hit when it matches the inclusion pattern and, if an exclusion pattern is
//! set, does not also match it. Hits are handed to a [`MatchSink`] as soon
//! as they are found and their text feeds the collocation tally.
//!
//! Chapter context is a two-state machine per document: no chapter known
//! yet, or chapter `C`. It always runs over the document's lines, whatever
//! the unit: every line up to and including the one a unit starts on is
//! checked against the chapter marker before the unit is tested. A matching
//! line moves to the captured chapter, which then sticks until the next
//! marker.

use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collocation::{CollocationTally, KnownPhrases, LengthTable};
use crate::corpus::{Corpus, Document};
use crate::error::{ReportResult, SearchError, SearchResult};

/// Default chapter marker: `BOOK` followed by a word, which becomes the label.
pub const DEFAULT_CHAPTER_MARKER: &str = r"BOOK (\w+)";

/// Label used before any chapter marker has been seen.
pub const NO_CHAPTER: &str = "None";

/// Granularity of the search scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SearchUnit {
    /// The title line followed by each sentence.
    #[default]
    Sentence,
    /// Each non-empty trimmed line.
    Line,
}

impl SearchUnit {
    /// Returns the unit name as used in configuration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sentence => "sentence",
            Self::Line => "line",
        }
    }
}

impl std::fmt::Display for SearchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled search patterns.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    include: Regex,
    exclude: Option<Regex>,
    chapter_marker: Regex,
}

impl SearchQuery {
    /// Compile a query.
    ///
    /// `include` and `exclude` match case-insensitively; `chapter_marker`
    /// matches as written.
    pub fn new(include: &str, exclude: Option<&str>, chapter_marker: &str) -> SearchResult<Self> {
        let include = compile("query", include, true)?;
        let exclude = exclude
            .map(|pattern| compile("exclusion", pattern, true))
            .transpose()?;
        let chapter_marker = compile("chapter marker", chapter_marker, false)?;
        Ok(Self {
            include,
            exclude,
            chapter_marker,
        })
    }

    /// The inclusion pattern.
    pub const fn include(&self) -> &Regex {
        &self.include
    }

    /// The exclusion pattern, if enabled.
    pub const fn exclude(&self) -> Option<&Regex> {
        self.exclude.as_ref()
    }

    /// The chapter marker pattern.
    pub const fn chapter_marker(&self) -> &Regex {
        &self.chapter_marker
    }

    /// Spans of every inclusion match if `text` is a hit, else `None`.
    pub fn hit(&self, text: &str) -> Option<Vec<MatchSpan>> {
        let spans: Vec<MatchSpan> = self
            .include
            .find_iter(text)
            .map(|m| MatchSpan {
                start: m.start(),
                end: m.end(),
            })
            .collect();
        if spans.is_empty() {
            return None;
        }
        if self.exclude.as_ref().is_some_and(|re| re.is_match(text)) {
            return None;
        }
        Some(spans)
    }
}

fn compile(role: &'static str, pattern: &str, case_insensitive: bool) -> SearchResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| SearchError::InvalidPattern {
            role,
            pattern: pattern.to_string(),
            source: e,
        })
}

/// Tracks the current chapter while scanning a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterTracker {
    current: Option<String>,
}

impl ChapterTracker {
    /// Start with no chapter known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the chapter if `text` matches `marker`.
    ///
    /// The label is the first capture group, or the whole match when the
    /// marker has no groups. Returns `true` when the state changed.
    pub fn observe(&mut self, text: &str, marker: &Regex) -> bool {
        let Some(caps) = marker.captures(text) else {
            return false;
        };
        let label = caps
            .get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().to_string());
        let changed = label != self.current;
        self.current = label;
        changed
    }

    /// The current chapter, if one has been seen.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The current chapter, or [`NO_CHAPTER`].
    pub fn label(&self) -> &str {
        self.current().unwrap_or(NO_CHAPTER)
    }
}

/// Byte range of one inclusion match within a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchSpan {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchRecord {
    /// Identifier of the document.
    pub document: String,
    /// Document title followed by its identifier.
    pub title: String,
    /// Chapter in effect at the hit, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    /// The matched unit's text.
    pub text: String,
    /// Every inclusion match in `text`; the first is the primary match.
    pub spans: Vec<MatchSpan>,
    /// Whether this is the first hit reported for its document.
    pub first_in_document: bool,
}

impl MatchRecord {
    /// Chapter label for display.
    pub fn chapter_label(&self) -> &str {
        self.chapter.as_deref().unwrap_or(NO_CHAPTER)
    }

    /// The text of the primary match.
    pub fn matched_text(&self) -> &str {
        self.spans
            .first()
            .and_then(|span| self.text.get(span.start..span.end))
            .unwrap_or_default()
    }
}

/// Receives search output as it is produced.
pub trait MatchSink {
    /// A targeted document does not exist in the corpus.
    fn missing_document(&mut self, id: &str) -> ReportResult<()>;

    /// A hit was found.
    fn record_match(&mut self, record: &MatchRecord) -> ReportResult<()>;
}

/// A sink that keeps everything in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedMatches {
    /// Hits in the order they were found.
    pub records: Vec<MatchRecord>,
    /// Targeted identifiers that were not found.
    pub missing: Vec<String>,
}

impl MatchSink for CollectedMatches {
    fn missing_document(&mut self, id: &str) -> ReportResult<()> {
        self.missing.push(id.to_string());
        Ok(())
    }

    fn record_match(&mut self, record: &MatchRecord) -> ReportResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Fan out to two sinks, first to second.
impl<A: MatchSink, B: MatchSink> MatchSink for (A, B) {
    fn missing_document(&mut self, id: &str) -> ReportResult<()> {
        self.0.missing_document(id)?;
        self.1.missing_document(id)
    }

    fn record_match(&mut self, record: &MatchRecord) -> ReportResult<()> {
        self.0.record_match(record)?;
        self.1.record_match(record)
    }
}

/// Outcome of a search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchSummary {
    /// Documents that were found and scanned.
    pub documents_searched: usize,
    /// Total number of hits.
    pub matches: usize,
    /// Targeted identifiers that were not found.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    /// Collocation tables, shortest phrase length first.
    pub collocations: Vec<LengthTable>,
}

/// Scan one document, reporting hits to `sink` and tallying collocations.
///
/// Returns the number of hits.
#[tracing::instrument(skip_all, fields(document = document.id(), unit = %unit))]
pub fn search_document<S: MatchSink + ?Sized>(
    document: &Document,
    query: &SearchQuery,
    unit: SearchUnit,
    known: &KnownPhrases,
    tally: &mut CollocationTally,
    sink: &mut S,
) -> SearchResult<usize> {
    let lines = document.lines();
    let mut chapter = ChapterTracker::new();
    let mut next_line = 0;
    let mut hits = 0;
    for (line, text) in located_units(document, unit) {
        while next_line <= line && next_line < lines.len() {
            if chapter.observe(&lines[next_line], query.chapter_marker()) {
                debug!(
                    chapter = chapter.label(),
                    line = next_line,
                    "entered chapter"
                );
            }
            next_line += 1;
        }

        let Some(spans) = query.hit(text) else {
            continue;
        };

        let record = MatchRecord {
            document: document.id().to_string(),
            title: document.display_name(),
            chapter: chapter.current().map(str::to_string),
            text: text.to_string(),
            spans,
            first_in_document: hits == 0,
        };
        sink.record_match(&record)?;
        tally.record_line(text, known);
        hits += 1;
    }

    debug!(hits, "document searched");
    Ok(hits)
}

/// Units of `document` paired with the index of the line each starts on.
fn located_units(document: &Document, unit: SearchUnit) -> Vec<(usize, &str)> {
    match unit {
        SearchUnit::Sentence => {
            let title = document.lines().first().map(|title| (0, title.as_str()));
            let sentences = document
                .sentence_lines()
                .iter()
                .copied()
                .zip(document.sentences().iter().map(String::as_str));
            title.into_iter().chain(sentences).collect()
        }
        SearchUnit::Line => document
            .lines()
            .iter()
            .map(String::as_str)
            .enumerate()
            .collect(),
    }
}

/// Search the targeted documents in order.
///
/// Identifiers missing from the corpus are reported to the sink and logged,
/// and the run continues with the remaining targets.
#[tracing::instrument(skip_all, fields(targets = targets.len(), unit = %unit, max_n = max_n))]
pub fn search_corpus<S: MatchSink + ?Sized>(
    corpus: &Corpus,
    targets: &[String],
    query: &SearchQuery,
    known: &KnownPhrases,
    unit: SearchUnit,
    max_n: usize,
    sink: &mut S,
) -> SearchResult<SearchSummary> {
    let mut tally = CollocationTally::new(max_n);
    let mut documents_searched = 0;
    let mut matches = 0;
    let mut missing = Vec::new();

    for id in targets {
        let Some(document) = corpus.get(id) else {
            warn!(document = %id, "document not found in corpus");
            sink.missing_document(id)?;
            missing.push(id.clone());
            continue;
        };
        matches += search_document(document, query, unit, known, &mut tally, sink)?;
        documents_searched += 1;
    }

    Ok(SearchSummary {
        documents_searched,
        matches,
        missing,
        collocations: tally.into_tables(),
    })
}
