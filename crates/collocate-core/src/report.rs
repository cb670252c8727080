//! HTML report output.
//!
//! A search run writes two files into the results directory: a contexts
//! report with every hit grouped under its document, and a frequencies
//! report with the collocation tables. File names get the smallest numeric
//! suffix that is not already taken, so earlier runs are never overwritten.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::debug;

use crate::collocation::LengthTable;
use crate::error::{ReportError, ReportResult};
use crate::search::{MatchRecord, MatchSink};

/// File name prefix of the contexts report.
pub const CONTEXTS_PREFIX: &str = "contexts";

/// File name prefix of the frequencies report.
pub const FREQUENCIES_PREFIX: &str = "frequencies";

const HIGHLIGHT_OPEN: &str = "<b><font color=\"blue\">";
const HIGHLIGHT_CLOSE: &str = "</font></b>";

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Heading written before a document's first hit.
pub fn document_heading(title: &str) -> String {
    format!("<h3>{}</h3>\n", escape_html(title))
}

/// Warning written for a targeted document that does not exist.
pub fn missing_fragment(id: &str) -> String {
    format!("<h2>WARNING: {} not found</h2>\n", escape_html(id))
}

/// One hit: chapter label, then the text with every match highlighted.
pub fn match_fragment(record: &MatchRecord) -> String {
    let mut body = String::new();
    let mut cursor = 0;
    for span in &record.spans {
        let (Some(before), Some(matched)) = (
            record.text.get(cursor..span.start),
            record.text.get(span.start..span.end),
        ) else {
            continue;
        };
        body.push_str(&escape_html(before));
        body.push_str(HIGHLIGHT_OPEN);
        body.push_str(&escape_html(matched));
        body.push_str(HIGHLIGHT_CLOSE);
        cursor = span.end;
    }
    body.push_str(&escape_html(record.text.get(cursor..).unwrap_or_default()));
    format!("<p>{}: {body}</p>\n", escape_html(record.chapter_label()))
}

/// Collocation tables, longest phrase length first.
pub fn collocation_fragment(tables: &[LengthTable]) -> String {
    let mut out = String::new();
    for table in tables.iter().rev() {
        if table.phrases.is_empty() {
            continue;
        }
        // Writing to a String cannot fail.
        let _ = writeln!(out, "<h3>Length {}</h3>", table.length);
        out.push_str("<table>\n");
        for entry in &table.phrases {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&entry.phrase),
                entry.count
            );
        }
        out.push_str("</table>\n");
    }
    out
}

/// Create `<dir>/<prefix><i>.html` for the smallest `i >= 1` not yet taken.
///
/// The directory is created if needed.
pub fn create_unique_file(dir: &Utf8Path, prefix: &str) -> ReportResult<(Utf8PathBuf, File)> {
    std::fs::create_dir_all(dir.as_std_path()).map_err(|e| ReportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut index: u32 = 1;
    loop {
        let path = dir.join(format!("{prefix}{index}.html"));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path.as_std_path())
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => index += 1,
            Err(e) => return Err(ReportError::Io { path, source: e }),
        }
    }
}

/// Paths of the files a report wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    /// Contexts report.
    pub contexts: Utf8PathBuf,
    /// Frequencies report.
    pub frequencies: Utf8PathBuf,
}

struct ReportFile {
    path: Utf8PathBuf,
    writer: BufWriter<File>,
}

impl ReportFile {
    fn create(dir: &Utf8Path, prefix: &str) -> ReportResult<Self> {
        let (path, file) = create_unique_file(dir, prefix)?;
        debug!(path = %path, "created report file");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn write(&mut self, fragment: &str) -> ReportResult<()> {
        self.writer
            .write_all(fragment.as_bytes())
            .map_err(|e| ReportError::Io {
                path: self.path.clone(),
                source: e,
            })
    }

    fn finish(mut self) -> ReportResult<Utf8PathBuf> {
        self.write("</body></html>\n")?;
        self.writer.flush().map_err(|e| ReportError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(self.path)
    }
}

/// Search sink that renders HTML reports.
pub struct HtmlReport {
    contexts: ReportFile,
    frequencies: ReportFile,
}

impl HtmlReport {
    /// Create both report files in `dir` and write their preamble.
    #[tracing::instrument(skip_all, fields(dir = %dir))]
    pub fn create(dir: &Utf8Path) -> ReportResult<Self> {
        let mut contexts = ReportFile::create(dir, CONTEXTS_PREFIX)?;
        let mut frequencies = ReportFile::create(dir, FREQUENCIES_PREFIX)?;
        contexts.write("<html><body>\n")?;
        frequencies.write("<html><body>\n")?;
        Ok(Self {
            contexts,
            frequencies,
        })
    }

    /// Path of the contexts report.
    pub fn contexts_path(&self) -> &Utf8Path {
        &self.contexts.path
    }

    /// Path of the frequencies report.
    pub fn frequencies_path(&self) -> &Utf8Path {
        &self.frequencies.path
    }

    /// Write the collocation tables to the frequencies report.
    pub fn write_collocations(&mut self, tables: &[LengthTable]) -> ReportResult<()> {
        self.frequencies.write(&collocation_fragment(tables))
    }

    /// Close both reports.
    pub fn finish(self) -> ReportResult<ReportPaths> {
        Ok(ReportPaths {
            contexts: self.contexts.finish()?,
            frequencies: self.frequencies.finish()?,
        })
    }
}

impl MatchSink for HtmlReport {
    fn missing_document(&mut self, id: &str) -> ReportResult<()> {
        let fragment = missing_fragment(id);
        self.contexts.write(&fragment)?;
        self.frequencies.write(&fragment)
    }

    fn record_match(&mut self, record: &MatchRecord) -> ReportResult<()> {
        if record.first_in_document {
            self.contexts.write(&document_heading(&record.title))?;
        }
        self.contexts.write(&match_fragment(record))
    }
}
