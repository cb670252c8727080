//! Frequency table file format.
//!
//! A table file is UTF-8 text with one `<phrase>\t<count>` record per line.
//! Records are grouped by ascending phrase length and each group is sorted
//! by descending count, ties by ascending phrase. Reading splits each line
//! on its first tab; a record without one is a fatal error.

use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Write};

use camino::Utf8Path;
use tracing::info;

use crate::error::{TableError, TableResult};
use crate::ngrams::FrequencyTable;

/// Conventional table file name for a corpus prefix and threshold.
pub fn table_file_name(prefix: &str, min_count: u64) -> String {
    format!("{prefix}_ngrams_{min_count}.txt")
}

/// Render a table in file format.
pub fn encode(table: &FrequencyTable) -> String {
    let mut out = String::new();
    for n in 1..=table.max_n() {
        for (phrase, count) in table.sorted_level(n) {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{phrase}\t{count}");
        }
    }
    out
}

/// Parse table records from a reader.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn decode<R: BufRead>(reader: R) -> TableResult<FrequencyTable> {
    let mut table = FrequencyTable::default();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| TableError::Read {
            line: line_no,
            source: e,
        })?;
        let record = line.trim_end_matches(['\r', '\n']);
        if record.trim().is_empty() {
            continue;
        }
        let (phrase, count) = parse_record(record, line_no)?;
        table.insert(phrase, count);
    }
    Ok(table)
}

fn parse_record(record: &str, line: usize) -> TableResult<(String, u64)> {
    let Some((phrase, count)) = record.split_once('\t') else {
        return Err(TableError::MissingSeparator {
            line,
            record: record.to_string(),
        });
    };
    if phrase.is_empty() {
        return Err(TableError::EmptyPhrase { line });
    }
    if phrase.split(' ').any(str::is_empty) {
        return Err(TableError::MalformedPhrase {
            line,
            phrase: phrase.to_string(),
        });
    }
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|_| TableError::InvalidCount {
            line,
            value: count.to_string(),
        })?;
    Ok((phrase.to_string(), count))
}

/// Write a table to `path`, replacing any existing file.
#[tracing::instrument(skip_all, fields(path = %path, phrases = table.len()))]
pub fn write_table(path: &Utf8Path, table: &FrequencyTable) -> TableResult<()> {
    let io_err = |e| TableError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent.as_std_path()).map_err(io_err)?;
    }
    let mut file = std::fs::File::create(path.as_std_path()).map_err(io_err)?;
    file.write_all(encode(table).as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    info!("frequency table written");
    Ok(())
}

/// Read a table from `path`.
#[tracing::instrument(skip_all, fields(path = %path))]
pub fn read_table(path: &Utf8Path) -> TableResult<FrequencyTable> {
    let file = std::fs::File::open(path.as_std_path()).map_err(|e| TableError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let table = decode(BufReader::new(file))?;
    info!(phrases = table.len(), "frequency table loaded");
    Ok(table)
}
