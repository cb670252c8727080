//! Configuration loading and discovery.
//!
//! Settings are layered with figment, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config: `~/.config/collocate/config.<ext>`
//! 3. Project config: the closest directory at or above the search root
//!    holding `.collocate.<ext>` or `collocate.<ext>` (dotfile first)
//! 4. Explicit files, in the order given
//! 5. `COLLOCATE_*` environment variables (`__` separates nested keys,
//!    e.g. `COLLOCATE_SEARCH__QUERY`)
//!
//! `<ext>` is one of `toml`, `yaml`, `yml`, `json`. The upward walk stops at
//! a directory containing `.git` unless the boundary is disabled.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use collocate_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
//! let (config, _sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("mining up to {} words", config.max_n);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::ngrams::MiningParams;
use crate::search::{DEFAULT_CHAPTER_MARKER, SearchUnit};
use crate::table;

/// Search settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Inclusion pattern (regular expression, case-insensitive).
    pub query: Option<String>,
    /// Exclusion pattern (regular expression, case-insensitive).
    pub exclusion: Option<String>,
    /// Whether `exclusion` is applied.
    pub use_exclusion: bool,
    /// Pattern whose first capture group names the current chapter.
    pub chapter_marker: String,
    /// Documents to search, by file name. Omit to search every document.
    pub documents: Option<Vec<String>>,
    /// Whether to scan sentences (title first) or lines.
    pub unit: SearchUnit,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: None,
            exclusion: None,
            use_exclusion: false,
            chapter_marker: DEFAULT_CHAPTER_MARKER.to_string(),
            documents: None,
            unit: SearchUnit::default(),
        }
    }
}

impl SearchConfig {
    /// The exclusion pattern, only when exclusion is enabled.
    pub fn active_exclusion(&self) -> Option<&str> {
        self.exclusion.as_deref().filter(|_| self.use_exclusion)
    }
}

/// The configuration for collocate.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Directory holding the corpus documents.
    pub corpus_dir: Utf8PathBuf,
    /// Directory for mined tables and search reports.
    pub results_dir: Utf8PathBuf,
    /// Prefix of the mined table file name.
    pub output_prefix: String,
    /// Minimum corpus-wide count for a phrase to be kept.
    pub min_count: u64,
    /// Maximum phrase length in words.
    pub max_n: usize,
    /// Explicit path of the frequency table (overrides the derived name).
    pub ngram_file: Option<Utf8PathBuf>,
    /// Search settings.
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mining = MiningParams::default();
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            corpus_dir: Utf8PathBuf::from("corpus"),
            results_dir: Utf8PathBuf::from("results"),
            output_prefix: "corpus".to_string(),
            min_count: mining.min_count,
            max_n: mining.max_n,
            ngram_file: None,
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    /// Mining parameters from this configuration.
    pub const fn mining_params(&self) -> MiningParams {
        MiningParams {
            min_count: self.min_count,
            max_n: self.max_n,
        }
    }

    /// Where the frequency table lives: `ngram_file`, or
    /// `<results_dir>/<output_prefix>_ngrams_<min_count>.txt`.
    pub fn ngram_path(&self) -> Utf8PathBuf {
        self.ngram_file.clone().unwrap_or_else(|| {
            self.results_dir
                .join(table::table_file_name(&self.output_prefix, self.min_count))
        })
    }

    /// Reject values that deserialize but cannot drive a run.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_count == 0 {
            return Err(ConfigError::Invalid {
                key: "min_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_n == 0 {
            return Err(ConfigError::Invalid {
                key: "max_n",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.output_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "output_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Which configuration files were merged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project files from the closest matching directory, low→high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Files passed explicitly (e.g. `--config`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// The highest-precedence file that was loaded.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .map(Utf8PathBuf::as_path)
            .or_else(|| self.project_files.last().map(Utf8PathBuf::as_path))
            .or(self.user_file.as_deref())
    }
}

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

const APP_NAME: &str = "collocate";

const ENV_PREFIX: &str = "COLLOCATE_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that includes user config and stops at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for project config.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Include or skip the user config file.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Walk all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Merge `path` after discovered files. Later files win.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge every source and validate the result.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            figment = merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for pc in &project_configs {
                figment = merge_file(figment, pc);
            }
            sources.project_files = project_configs;
        }

        for file in &self.explicit_files {
            figment = merge_file(figment, file);
        }
        sources.explicit_files = self.explicit_files;

        figment = figment.merge(Env::prefixed(ENV_PREFIX).lowercase(true).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        config.validate()?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            min_count = config.min_count,
            max_n = config.max_n,
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Config files in the closest directory that has any, low→high precedence.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let found: Vec<Utf8PathBuf> = [format!(".{APP_NAME}"), APP_NAME.to_string()]
                .iter()
                .flat_map(|stem| CONFIG_EXTENSIONS.iter().map(move |ext| format!("{stem}.{ext}")))
                .map(|name| dir.join(name))
                .filter(|path| path.is_file())
                .collect();

            if !found.is_empty() {
                return found;
            }

            // A config next to the marker still counts; the marker only stops the climb.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let config_dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// Merge a config file, choosing the format from its extension (TOML otherwise).
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// The user config directory (`~/.config/collocate/` on Linux).
///
/// Returns `None` if the home directory cannot be determined.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// The user data directory (`~/.local/share/collocate/` on Linux).
pub fn user_data_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}
