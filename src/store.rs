use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use directories::BaseDirs;

use crate::error::TrendsError;

/// Path layout for the run: an output root holding the TSV artifacts and a
/// per-user cache root holding downloaded dump files.
#[derive(Debug, Clone)]
pub struct Store {
    output_root: Utf8PathBuf,
    cache_root: Utf8PathBuf,
}

impl Store {
    pub fn new(output_root: Utf8PathBuf) -> Result<Self, TrendsError> {
        let cache_root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("gene-trends")).ok()
            })
            .ok_or_else(|| {
                TrendsError::Filesystem("unable to resolve cache directory".to_string())
            })?;

        Ok(Self {
            output_root,
            cache_root,
        })
    }

    pub fn new_with_paths(output_root: Utf8PathBuf, cache_root: Utf8PathBuf) -> Self {
        Self {
            output_root,
            cache_root,
        }
    }

    pub fn output_root(&self) -> &Utf8Path {
        &self.output_root
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn page_map_path(&self) -> Utf8PathBuf {
        self.output_root.join("gene_page_map.tsv")
    }

    pub fn views_day_path(&self, date: NaiveDate) -> Utf8PathBuf {
        self.output_root.join(format!(
            "homo-sapiens-wikipedia-views-{}.tsv",
            date.format("%Y-%m-%d")
        ))
    }

    pub fn views_series_path(&self) -> Utf8PathBuf {
        self.output_root.join("homo-sapiens-wikipedia-views.tsv")
    }

    pub fn citations_series_path(&self) -> Utf8PathBuf {
        self.output_root.join("homo-sapiens-pubmed-citations.tsv")
    }

    pub fn trends_path(&self) -> Utf8PathBuf {
        self.output_root.join("homo-sapiens-gene-trends.tsv")
    }

    pub fn dump_path(&self, date: NaiveDate) -> Utf8PathBuf {
        self.cache_root
            .join("views")
            .join(format!("pageviews-{}-user.txt", date.format("%Y%m%d")))
    }

    pub fn ensure_output_root(&self) -> Result<(), TrendsError> {
        fs::create_dir_all(self.output_root.as_std_path())
            .map_err(|err| TrendsError::Filesystem(err.to_string()))
    }

    pub fn ensure_cache_root(&self) -> Result<(), TrendsError> {
        fs::create_dir_all(self.cache_root.join("views").as_std_path())
            .map_err(|err| TrendsError::Filesystem(err.to_string()))
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), TrendsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(tmp_path.as_std_path(), content)
            .map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        fs::rename(tmp_path.as_std_path(), path.as_std_path())
            .map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let store = Store::new_with_paths(Utf8PathBuf::from("data"), Utf8PathBuf::from("cache"));
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        assert_eq!(
            store.views_day_path(date).as_str(),
            "data/homo-sapiens-wikipedia-views-2026-03-14.tsv"
        );
        assert_eq!(
            store.dump_path(date).as_str(),
            "cache/views/pageviews-20260314-user.txt"
        );
        assert_eq!(
            store.trends_path().as_str(),
            "data/homo-sapiens-gene-trends.tsv"
        );
    }
}
