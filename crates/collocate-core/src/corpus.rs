//! Corpus loading.
//!
//! A corpus is a directory of UTF-8 text files. Each file is one
//! [`Document`], identified by its file name, whose first line is its title.
//! The whole corpus is loaded into memory up front; any unreadable file
//! aborts the load.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::error::{CorpusError, CorpusResult};
use crate::text;

/// One document of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: String,
    lines: Vec<String>,
    sentences: Vec<String>,
    sentence_lines: Vec<usize>,
}

impl Document {
    /// Build a document from its identifier and raw text.
    pub fn from_text(id: impl Into<String>, raw: &str) -> Self {
        let normalized = text::normalize_document(raw);
        let (line_starts, lines): (Vec<usize>, Vec<String>) =
            text::split_lines_at(&normalized).into_iter().unzip();
        let (sentence_lines, sentences): (Vec<usize>, Vec<String>) =
            text::split_sentences_at(&normalized)
                .into_iter()
                .map(|(start, sentence)| {
                    let line = line_starts
                        .partition_point(|&line_start| line_start <= start)
                        .saturating_sub(1);
                    (line, sentence)
                })
                .unzip();
        Self {
            id: id.into(),
            lines,
            sentences,
            sentence_lines,
        }
    }

    /// Document identifier (its file name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document's first line, or an empty string for an empty document.
    pub fn title(&self) -> &str {
        self.lines.first().map_or("", String::as_str)
    }

    /// Title followed by the identifier, as shown in report headings.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.title(), self.id)
    }

    /// Non-empty trimmed lines in document order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Sentences in document order, original case, without the title.
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Index into [`Self::lines`] of the line each sentence starts on.
    pub fn sentence_lines(&self) -> &[usize] {
        &self.sentence_lines
    }

    /// Title pseudo-sentence followed by every sentence, original case.
    pub fn search_sentences(&self) -> impl Iterator<Item = &str> {
        self.lines
            .first()
            .map(String::as_str)
            .into_iter()
            .chain(self.sentences.iter().map(String::as_str))
    }

    /// Case-folded word lists, one per sentence, for phrase mining.
    ///
    /// The title is a heading rather than part of the text, so it is left
    /// out here; only [`Self::search_sentences`] carries it.
    pub fn mining_sentences(&self) -> Vec<Vec<String>> {
        self.sentences
            .iter()
            .map(|sentence| text::folded_words(sentence))
            .collect()
    }
}

/// All documents of a corpus, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: BTreeMap<String, Document>,
}

impl Corpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any previous document with the same id.
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    /// Look up a document by identifier.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Documents ordered by identifier.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Document identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Load every regular file in `dir` as a document.
    ///
    /// Subdirectories are skipped. Fails if the directory cannot be listed,
    /// any file cannot be read as UTF-8, or no documents are found.
    #[tracing::instrument(skip_all, fields(dir = %dir))]
    pub fn load_dir(dir: &Utf8Path) -> CorpusResult<Self> {
        let entries = std::fs::read_dir(dir.as_std_path()).map_err(|e| CorpusError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut corpus = Self::new();
        for entry in entries {
            let entry = entry.map_err(|e| CorpusError::ReadDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = Utf8PathBuf::from_path_buf(entry.path())
                .map_err(|p| CorpusError::NonUtf8Name(p.display().to_string()))?;
            if !path.is_file() {
                debug!(path = %path, "skipping non-file corpus entry");
                continue;
            }
            let Some(id) = path.file_name().map(str::to_string) else {
                continue;
            };
            let raw = std::fs::read_to_string(path.as_std_path()).map_err(|e| {
                CorpusError::ReadFile {
                    path: path.clone(),
                    source: e,
                }
            })?;
            let document = Document::from_text(id, &raw);
            debug!(
                id = document.id(),
                lines = document.lines().len(),
                sentences = document.sentences().len(),
                "loaded document"
            );
            corpus.insert(document);
        }

        if corpus.is_empty() {
            return Err(CorpusError::Empty(dir.to_path_buf()));
        }
        info!(documents = corpus.len(), "corpus loaded");
        Ok(corpus)
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for document in iter {
            corpus.insert(document);
        }
        corpus
    }
}
