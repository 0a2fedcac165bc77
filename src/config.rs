use std::collections::HashSet;
use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{DebugLevel, Pipeline, SortKey};
use crate::error::TrendsError;

pub const DEFAULT_WINDOW_DAYS: u32 = 180;

/// Optional `gene-trends.json` in the working directory. Everything has a
/// default; the file only overrides endpoints and the accepted source set.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub wiki_codes: Option<Vec<String>>,
    #[serde(default)]
    pub pageviews_base_url: Option<String>,
    #[serde(default)]
    pub eutils_base_url: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub schema_version: u32,
    pub window_days: u32,
    pub sort_by: SortKey,
    pub only: Option<Vec<Pipeline>>,
    pub debug: DebugLevel,
    pub wiki_codes: HashSet<String>,
    pub pageviews_base_url: String,
    pub eutils_base_url: String,
    pub output_dir: Utf8PathBuf,
}

impl RunConfig {
    pub fn runs(&self, pipeline: Pipeline) -> bool {
        match &self.only {
            Some(selected) => selected.contains(&pipeline),
            None => true,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        days: u32,
        sort_by: SortKey,
        only: Option<Vec<Pipeline>>,
        debug: DebugLevel,
    ) -> Result<RunConfig, TrendsError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from("gene-trends.json"),
        };

        let config = if config_path.as_std_path().exists() {
            let content = fs::read_to_string(config_path.as_std_path())
                .map_err(|_| TrendsError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content)
                .map_err(|err| TrendsError::ConfigParse(err.to_string()))?
        } else if path.is_some() {
            return Err(TrendsError::ConfigRead(config_path));
        } else {
            Config::default()
        };

        Self::resolve_config(config, days, sort_by, only, debug)
    }

    pub fn resolve_config(
        config: Config,
        days: u32,
        sort_by: SortKey,
        only: Option<Vec<Pipeline>>,
        debug: DebugLevel,
    ) -> Result<RunConfig, TrendsError> {
        // A debug run with the stock window shrinks to two days for fast
        // iteration; an explicit non-default --days is honored as given.
        let window_days = if days == DEFAULT_WINDOW_DAYS && debug != DebugLevel::Off {
            2
        } else {
            days
        };

        Ok(RunConfig {
            schema_version: config.schema_version.unwrap_or(1),
            window_days,
            sort_by,
            only,
            debug,
            wiki_codes: config
                .wiki_codes
                .unwrap_or_else(default_wiki_codes)
                .into_iter()
                .collect(),
            pageviews_base_url: config.pageviews_base_url.unwrap_or_else(|| {
                "https://dumps.wikimedia.org/other/pageview_complete".to_string()
            }),
            eutils_base_url: config
                .eutils_base_url
                .unwrap_or_else(|| "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()),
            output_dir: Utf8PathBuf::from(config.output_dir.unwrap_or_else(|| "data".to_string())),
        })
    }
}

pub fn default_wiki_codes() -> Vec<String> {
    vec!["en.wikipedia".to_string()]
}
