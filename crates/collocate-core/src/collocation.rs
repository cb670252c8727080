//! Collocation tallies.
//!
//! Counts how often known-frequent phrases reappear inside the units a
//! search matched. Every phrase of length `1..=max_n` in a matched unit is
//! generated (no pruning), case-folded to agree with the mined table, and
//! counted when the table knows it.

use std::collections::{BTreeMap, HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ngrams::{FrequencyTable, frequency_order};
use crate::text;

/// The set of phrases a mining run retained, flattened across lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownPhrases {
    phrases: HashSet<String>,
}

impl KnownPhrases {
    /// Collect every phrase retained in `table`.
    pub fn from_table(table: &FrequencyTable) -> Self {
        table.flatten().into_keys().collect()
    }

    /// Whether `phrase` is known.
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase)
    }

    /// Number of known phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether no phrase is known.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl FromIterator<String> for KnownPhrases {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            phrases: iter.into_iter().collect(),
        }
    }
}

/// One phrase and its tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PhraseCount {
    /// Canonical phrase text.
    pub phrase: String,
    /// Occurrences within matched units.
    pub count: u64,
}

/// All tallied phrases of one length, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LengthTable {
    /// Phrase length in words.
    pub length: usize,
    /// Phrases sorted by descending count, ties by ascending phrase.
    pub phrases: Vec<PhraseCount>,
}

/// Running phrase tally for one search run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollocationTally {
    max_n: usize,
    counts: HashMap<String, u64>,
}

impl CollocationTally {
    /// Create an empty tally that considers phrases up to `max_n` words.
    pub fn new(max_n: usize) -> Self {
        Self {
            max_n,
            counts: HashMap::new(),
        }
    }

    /// Count every known phrase occurring in `line`.
    ///
    /// Returns how many phrase occurrences were added.
    pub fn record_line(&mut self, line: &str, known: &KnownPhrases) -> usize {
        let words = text::folded_words(line);
        let mut added = 0;
        for n in 1..=self.max_n.min(words.len()) {
            for start in 0..=words.len() - n {
                let Some(phrase) = text::phrase_at(&words, start, n) else {
                    continue;
                };
                if known.contains(&phrase) {
                    *self.counts.entry(phrase).or_insert(0) += 1;
                    added += 1;
                }
            }
        }
        added
    }

    /// Tally for `phrase`, if it was seen.
    pub fn get(&self, phrase: &str) -> Option<u64> {
        self.counts.get(phrase).copied()
    }

    /// Number of distinct tallied phrases.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing has been tallied.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Fold another tally into this one.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.max_n = self.max_n.max(other.max_n);
        for (phrase, count) in other.counts {
            *self.counts.entry(phrase).or_insert(0) += count;
        }
        self
    }

    /// Group the tally into per-length tables, shortest length first.
    ///
    /// Single words tallied exactly once are dropped, and lengths left with
    /// no phrases are omitted.
    pub fn into_tables(self) -> Vec<LengthTable> {
        let mut by_length: BTreeMap<usize, Vec<(String, u64)>> = BTreeMap::new();
        for (phrase, count) in self.counts {
            let length = text::phrase_len(&phrase);
            if length == 1 && count == 1 {
                continue;
            }
            by_length.entry(length).or_default().push((phrase, count));
        }

        by_length
            .into_iter()
            .map(|(length, mut entries)| {
                entries
                    .sort_by(|a, b| frequency_order((a.0.as_str(), a.1), (b.0.as_str(), b.1)));
                LengthTable {
                    length,
                    phrases: entries
                        .into_iter()
                        .map(|(phrase, count)| PhraseCount { phrase, count })
                        .collect(),
                }
            })
            .collect()
    }
}
