//! Frequent phrase mining.
//!
//! Phrases are mined level by level. Level 1 counts every word. Level `n`
//! only counts the `n`-word phrase starting at offset `i` of a sentence when
//! the `(n - 1)`-word phrase at the same offset survived level `n - 1`, so
//! work at each level is bounded by the surviving candidates rather than by
//! the raw corpus. After a level is fully accumulated, phrases below the
//! minimum count are winnowed away. Pruning removes entries; it never
//! changes the count of a phrase that survives.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::Corpus;
use crate::text;

/// Parameters for a mining run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningParams {
    /// Minimum corpus-wide count for a phrase to be retained.
    pub min_count: u64,
    /// Maximum phrase length in words.
    pub max_n: usize,
}

impl Default for MiningParams {
    fn default() -> Self {
        Self {
            min_count: 2,
            max_n: 10,
        }
    }
}

/// Raw phrase counts for one level, before or after winnowing.
///
/// Counts from separate shards of the corpus can be merged; winnowing is
/// only valid on the merged totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseCounts {
    counts: HashMap<String, u64>,
}

impl PhraseCounts {
    /// Create an empty count map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `phrase`.
    pub fn increment(&mut self, phrase: String) {
        *self.counts.entry(phrase).or_insert(0) += 1;
    }

    /// Count for `phrase`, if seen.
    pub fn get(&self, phrase: &str) -> Option<u64> {
        self.counts.get(phrase).copied()
    }

    /// Number of distinct phrases.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no phrase has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Fold another shard's counts into this one.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        let (mut into, from) = if self.counts.len() >= other.counts.len() {
            (std::mem::take(&mut self.counts), other.counts)
        } else {
            (other.counts, std::mem::take(&mut self.counts))
        };
        for (phrase, count) in from {
            *into.entry(phrase).or_insert(0) += count;
        }
        Self { counts: into }
    }

    /// Drop every phrase whose count is strictly below `min_count`.
    pub fn winnow(&mut self, min_count: u64) {
        self.counts.retain(|_, count| *count >= min_count);
    }

    /// Iterate over `(phrase, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(p, c)| (p.as_str(), *c))
    }

    fn into_inner(self) -> HashMap<String, u64> {
        self.counts
    }
}

/// Order phrases by descending count, ties by ascending phrase text.
pub fn frequency_order(a: (&str, u64), b: (&str, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Mined phrase counts for lengths `1..=max_n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    /// `levels[n - 1]` holds the phrases of length `n`.
    levels: Vec<HashMap<String, u64>>,
}

impl FrequencyTable {
    /// Create a table with `max_n` empty levels.
    pub fn new(max_n: usize) -> Self {
        Self {
            levels: vec![HashMap::new(); max_n],
        }
    }

    /// Number of levels (the maximum phrase length).
    pub fn max_n(&self) -> usize {
        self.levels.len()
    }

    /// Phrases of length `n`, or `None` if `n` is outside `1..=max_n`.
    pub fn level(&self, n: usize) -> Option<&HashMap<String, u64>> {
        n.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// Corpus-wide count for `phrase`, if it was retained.
    pub fn count(&self, phrase: &str) -> Option<u64> {
        self.level(text::phrase_len(phrase))
            .and_then(|level| level.get(phrase).copied())
    }

    /// Whether `phrase` was retained at its length.
    pub fn contains(&self, phrase: &str) -> bool {
        self.count(phrase).is_some()
    }

    /// Record a phrase, growing the table if the phrase is longer than `max_n`.
    pub fn insert(&mut self, phrase: String, count: u64) {
        let n = text::phrase_len(&phrase);
        if n == 0 {
            return;
        }
        if self.levels.len() < n {
            self.levels.resize_with(n, HashMap::new);
        }
        self.levels[n - 1].insert(phrase, count);
    }

    /// Phrases of length `n` in deterministic order (see [`frequency_order`]).
    pub fn sorted_level(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .level(n)
            .into_iter()
            .flatten()
            .map(|(p, c)| (p.as_str(), *c))
            .collect();
        entries.sort_by(|a, b| frequency_order(*a, *b));
        entries
    }

    /// Number of retained phrases per level, shortest first.
    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(HashMap::len).collect()
    }

    /// Total number of retained phrases across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(HashMap::len).sum()
    }

    /// Whether no phrase was retained.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(HashMap::is_empty)
    }

    /// All retained phrases across levels in one map.
    pub fn flatten(&self) -> HashMap<String, u64> {
        self.levels
            .iter()
            .flat_map(|level| level.iter().map(|(p, c)| (p.clone(), *c)))
            .collect()
    }
}

/// Count the phrases of length `n` across `sentences`.
///
/// With `survivors` set, a phrase at offset `i` is only counted when the
/// `(n - 1)`-word phrase at offset `i` is one of the survivors. With `None`
/// every window is counted (no pruning).
pub fn count_level<S: AsRef<str>>(
    sentences: &[Vec<S>],
    n: usize,
    survivors: Option<&HashMap<String, u64>>,
) -> PhraseCounts {
    let mut counts = PhraseCounts::new();
    if n == 0 {
        return counts;
    }

    for words in sentences {
        if words.len() < n {
            continue;
        }
        for start in 0..=words.len() - n {
            let phrase = match survivors {
                Some(shorter) if n > 1 => {
                    let Some(mut prefix) = text::phrase_at(words, start, n - 1) else {
                        continue;
                    };
                    if !shorter.contains_key(&prefix) {
                        continue;
                    }
                    prefix.push(' ');
                    prefix.push_str(words[start + n - 1].as_ref());
                    prefix
                }
                _ => match text::phrase_at(words, start, n) {
                    Some(phrase) => phrase,
                    None => continue,
                },
            };
            counts.increment(phrase);
        }
    }
    counts
}

/// Mine the frequency table of a single batch of sentences.
///
/// Each sentence is a list of already case-folded words.
#[tracing::instrument(skip(sentences), fields(sentences = sentences.len()))]
pub fn mine<S: AsRef<str> + Sync>(sentences: &[Vec<S>], params: &MiningParams) -> FrequencyTable {
    mine_shards(&[sentences], params)
}

/// Mine the frequency table of a whole corpus, one shard per document.
pub fn mine_corpus(corpus: &Corpus, params: &MiningParams) -> FrequencyTable {
    mine_corpus_with(corpus, params, |_| {})
}

/// Like [`mine_corpus`], calling `on_level` after each level is winnowed.
#[tracing::instrument(skip_all, fields(documents = corpus.len(), max_n = params.max_n))]
pub fn mine_corpus_with<F>(corpus: &Corpus, params: &MiningParams, on_level: F) -> FrequencyTable
where
    F: FnMut(LevelStats),
{
    let shards: Vec<Vec<Vec<String>>> = corpus.documents().map(|d| d.mining_sentences()).collect();
    mine_shards_with(&shards, params, on_level)
}

/// Mine across shards, merging every shard's counts before winnowing.
pub fn mine_shards<T, S>(shards: &[T], params: &MiningParams) -> FrequencyTable
where
    T: AsRef<[Vec<S>]> + Sync,
    S: AsRef<str> + Sync,
{
    mine_shards_with(shards, params, |_| {})
}

/// Outcome of one mining level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStats {
    /// Phrase length of the level.
    pub n: usize,
    /// Distinct phrases counted before winnowing.
    pub counted: usize,
    /// Phrases that met the minimum count.
    pub retained: usize,
}

/// Like [`mine_shards`], calling `on_level` after each level is winnowed.
///
/// Mining stops early once a level retains nothing, so `on_level` may be
/// called fewer than `max_n` times.
pub fn mine_shards_with<T, S, F>(
    shards: &[T],
    params: &MiningParams,
    mut on_level: F,
) -> FrequencyTable
where
    T: AsRef<[Vec<S>]> + Sync,
    S: AsRef<str> + Sync,
    F: FnMut(LevelStats),
{
    let mut table = FrequencyTable::new(params.max_n);

    for n in 1..=params.max_n {
        let survivors = if n > 1 {
            let previous = &table.levels[n - 2];
            if previous.is_empty() {
                debug!(n, "no surviving candidates; stopping");
                break;
            }
            Some(previous)
        } else {
            None
        };

        let mut counts = count_shards(shards, n, survivors);
        let counted = counts.len();
        counts.winnow(params.min_count);
        let retained = counts.len();
        debug!(n, counted, retained, "winnowed level");
        table.levels[n - 1] = counts.into_inner();
        on_level(LevelStats {
            n,
            counted,
            retained,
        });
    }

    table
}

#[cfg(feature = "parallel")]
fn count_shards<T, S>(
    shards: &[T],
    n: usize,
    survivors: Option<&HashMap<String, u64>>,
) -> PhraseCounts
where
    T: AsRef<[Vec<S>]> + Sync,
    S: AsRef<str> + Sync,
{
    use rayon::prelude::*;

    shards
        .par_iter()
        .map(|shard| count_level(shard.as_ref(), n, survivors))
        .reduce(PhraseCounts::new, PhraseCounts::merge)
}

#[cfg(not(feature = "parallel"))]
fn count_shards<T, S>(
    shards: &[T],
    n: usize,
    survivors: Option<&HashMap<String, u64>>,
) -> PhraseCounts
where
    T: AsRef<[Vec<S>]> + Sync,
    S: AsRef<str> + Sync,
{
    shards
        .iter()
        .map(|shard| count_level(shard.as_ref(), n, survivors))
        .fold(PhraseCounts::new(), PhraseCounts::merge)
}
