//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;
use collocate_core::Corpus;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub mod info;
pub mod mine;
pub mod search;

/// Load every document in `dir`.
pub fn load_corpus(dir: &Utf8Path) -> anyhow::Result<Corpus> {
    Corpus::load_dir(dir).with_context(|| format!("failed to load corpus from {dir}"))
}

/// Spinner on stderr, hidden when `visible` is false.
pub fn spinner(visible: bool, message: &'static str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
