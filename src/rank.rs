use std::collections::HashMap;

use camino::Utf8Path;

use crate::domain::{CountTable, GeneSymbol};
use crate::error::TrendsError;
use crate::store::Store;

pub const SNAPSHOT_HEADER: &str = "# gene\tvalue\tvalue_delta\trank\trank_delta";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub gene: GeneSymbol,
    pub value: u64,
    pub value_delta: i64,
    pub rank: usize,
    pub rank_delta: i64,
}

/// One day's fully ranked, delta-annotated gene table, sorted by value
/// descending. Immutable once produced: it is both the persisted per-day
/// artifact and the carried-forward state for the next day's deltas.
///
/// The empty snapshot doubles as the seed state for a fresh window: value
/// lookups default to 0 and rank lookups default to the current rank, so the
/// first day always gets `value_delta = value` and `rank_delta = 0`.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    rows: Vec<SnapshotRow>,
    index: HashMap<GeneSymbol, usize>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_rows(rows: Vec<SnapshotRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(position, row)| (row.gene.clone(), position))
            .collect();
        Self { rows, index }
    }

    /// Rank a completed count table against the previous day's snapshot.
    ///
    /// Sort is stable, so equal values keep the count table's insertion
    /// order; identical inputs always produce identical snapshots.
    /// `rank_delta` is previous rank minus current rank (positive = climbed);
    /// a gene with no previous rank reads as unchanged, not as new.
    pub fn rank(counts: &CountTable, previous: &Snapshot) -> Snapshot {
        let mut entries: Vec<(&GeneSymbol, u64)> =
            counts.iter().map(|(gene, value)| (gene, *value)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        let mut rows = Vec::with_capacity(entries.len());
        for (position, (gene, value)) in entries.into_iter().enumerate() {
            let rank = position + 1;
            let value_delta = value as i64 - previous.value_of(gene).unwrap_or(0) as i64;
            let rank_delta = previous.rank_of(gene).unwrap_or(rank) as i64 - rank as i64;
            rows.push(SnapshotRow {
                gene: gene.clone(),
                value,
                value_delta,
                rank,
                rank_delta,
            });
        }
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, gene: &GeneSymbol) -> Option<&SnapshotRow> {
        self.index.get(gene).map(|position| &self.rows[*position])
    }

    pub fn value_of(&self, gene: &GeneSymbol) -> Option<u64> {
        self.get(gene).map(|row| row.value)
    }

    pub fn rank_of(&self, gene: &GeneSymbol) -> Option<usize> {
        self.get(gene).map(|row| row.rank)
    }

    pub fn write_tsv(&self, path: &Utf8Path) -> Result<(), TrendsError> {
        let mut out = String::with_capacity(self.rows.len() * 32 + SNAPSHOT_HEADER.len() + 1);
        out.push_str(SNAPSHOT_HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                row.gene, row.value, row.value_delta, row.rank, row.rank_delta
            ));
        }
        Store::write_bytes_atomic(path, out.as_bytes())
    }

    /// Read a persisted snapshot back. The merge step consumes the two
    /// series files from disk rather than holding pipelines in memory.
    pub fn read_tsv(path: &Utf8Path) -> Result<Snapshot, TrendsError> {
        if !path.as_std_path().exists() {
            return Err(TrendsError::MissingResource(path.to_owned()));
        }
        let content = std::fs::read_to_string(path.as_std_path())
            .map_err(|err| TrendsError::Filesystem(err.to_string()))?;

        let mut rows = Vec::new();
        for line in content.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let [gene, value, value_delta, rank, rank_delta] = fields.as_slice() else {
                return Err(TrendsError::SnapshotParse {
                    path: path.to_owned(),
                    message: format!("expected 5 fields, got {}", fields.len()),
                });
            };
            let parse_err = |field: &str, err: &dyn std::fmt::Display| TrendsError::SnapshotParse {
                path: path.to_owned(),
                message: format!("bad {field}: {err}"),
            };
            rows.push(SnapshotRow {
                gene: gene.parse()?,
                value: value.parse().map_err(|err| parse_err("value", &err))?,
                value_delta: value_delta
                    .parse()
                    .map_err(|err| parse_err("value_delta", &err))?,
                rank: rank.parse().map_err(|err| parse_err("rank", &err))?,
                rank_delta: rank_delta
                    .parse()
                    .map_err(|err| parse_err("rank_delta", &err))?,
            });
        }
        Ok(Self::from_rows(rows))
    }
}
