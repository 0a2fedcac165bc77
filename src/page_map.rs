use camino::Utf8Path;
use indexmap::IndexMap;

use crate::domain::{CountTable, GeneSymbol};
use crate::error::TrendsError;

/// Map from Wikipedia page titles to gene symbols, loaded once per run from
/// a two-column TSV (header row skipped). For example the page
/// `Tumor_necrosis_factor` maps to the symbol `TNF`.
#[derive(Debug, Clone)]
pub struct PageMap {
    genes_by_page: IndexMap<String, GeneSymbol>,
}

impl PageMap {
    pub fn load(path: &Utf8Path) -> Result<Self, TrendsError> {
        if !path.as_std_path().exists() {
            return Err(TrendsError::MissingResource(path.to_owned()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_path(path.as_std_path())
            .map_err(|err| TrendsError::Filesystem(err.to_string()))?;

        let mut genes_by_page = IndexMap::new();
        for record in reader.records() {
            let record = record.map_err(|err| TrendsError::Filesystem(err.to_string()))?;
            let (Some(page), Some(gene)) = (record.get(0), record.get(1)) else {
                continue;
            };
            // Last write wins; source data is deduplicated upstream.
            genes_by_page.insert(page.to_string(), gene.parse()?);
        }

        Ok(Self { genes_by_page })
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, GeneSymbol)>,
    {
        Self {
            genes_by_page: entries.into_iter().collect(),
        }
    }

    pub fn gene(&self, page: &str) -> Option<&GeneSymbol> {
        self.genes_by_page.get(page)
    }

    pub fn len(&self) -> usize {
        self.genes_by_page.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes_by_page.is_empty()
    }

    /// Count table seeded at zero, one entry per distinct gene in first-seen
    /// order, so genes with no events still appear with count 0.
    pub fn seed_counts(&self) -> CountTable {
        let mut counts = CountTable::new();
        for gene in self.genes_by_page.values() {
            counts.entry(gene.clone()).or_insert(0);
        }
        counts
    }
}
