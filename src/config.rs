//! Runtime settings.
//!
//! Every value has a default matching the live Python sites, so the scraper
//! runs without any configuration. A YAML file passed with `--config` can
//! override individual fields:
//!
//! ```yaml
//! main_doc_url: https://docs.python.org/3.12/
//! base_dir: /var/lib/pydocs
//! request_timeout_secs: 10
//! ```

use crate::error::ScrapeError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const PEPS_URL: &str = "https://peps.python.org/numerical/";
pub const PEPS_ROOT_URL: &str = "https://peps.python.org/";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub main_doc_url: String,
    pub peps_url: String,
    /// Base for resolving the relative PEP links on the index page.
    pub peps_root_url: String,
    pub base_dir: PathBuf,
    pub results_dir: String,
    pub downloads_dir: String,
    pub cache_dir: String,
    /// `strftime` pattern used in CSV file names.
    pub datetime_format: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Draw progress bars for long index loops. Not read from YAML.
    #[serde(skip)]
    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_doc_url: MAIN_DOC_URL.to_string(),
            peps_url: PEPS_URL.to_string(),
            peps_root_url: PEPS_ROOT_URL.to_string(),
            base_dir: PathBuf::from("."),
            results_dir: "results".to_string(),
            downloads_dir: "downloads".to_string(),
            cache_dir: ".http_cache".to_string(),
            datetime_format: DATETIME_FORMAT.to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("pydocs_scrape/", env!("CARGO_PKG_VERSION")).to_string(),
            show_progress: true,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ScrapeError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let settings = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ScrapeError> {
        // An empty document deserializes to unit, not to a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn results_path(&self) -> PathBuf {
        self.base_dir.join(&self.results_dir)
    }

    pub fn downloads_path(&self) -> PathBuf {
        self.base_dir.join(&self.downloads_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.base_dir.join(&self.cache_dir)
    }
}
