use camino::Utf8Path;
use indexmap::IndexMap;

use crate::domain::{GeneSymbol, SortKey};
use crate::error::TrendsError;
use crate::rank::Snapshot;
use crate::store::Store;

pub const TRENDS_HEADER: &str =
    "# gene\tcites\tcite_delta\tcite_rank\tcite_rank_delta\tviews\tview_delta\tview_rank\tview_rank_delta";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub gene: GeneSymbol,
    pub cites: u64,
    pub cite_delta: i64,
    pub cite_rank: usize,
    pub cite_rank_delta: i64,
    pub views: u64,
    pub view_delta: i64,
    pub view_rank: usize,
    pub view_rank_delta: i64,
}

impl MergedRow {
    fn zeroed(gene: GeneSymbol) -> Self {
        Self {
            gene,
            cites: 0,
            cite_delta: 0,
            cite_rank: 0,
            cite_rank_delta: 0,
            views: 0,
            view_delta: 0,
            view_rank: 0,
            view_rank_delta: 0,
        }
    }
}

/// Outer join of the citations and views series on gene symbol: every gene
/// appearing in either series, zeros for the missing side's fields.
pub fn merge(citations: &Snapshot, views: &Snapshot, sort_by: SortKey) -> Vec<MergedRow> {
    let mut merged: IndexMap<GeneSymbol, MergedRow> = IndexMap::new();

    for row in citations.rows() {
        let entry = merged
            .entry(row.gene.clone())
            .or_insert_with(|| MergedRow::zeroed(row.gene.clone()));
        entry.cites = row.value;
        entry.cite_delta = row.value_delta;
        entry.cite_rank = row.rank;
        entry.cite_rank_delta = row.rank_delta;
    }
    for row in views.rows() {
        let entry = merged
            .entry(row.gene.clone())
            .or_insert_with(|| MergedRow::zeroed(row.gene.clone()));
        entry.views = row.value;
        entry.view_delta = row.value_delta;
        entry.view_rank = row.rank;
        entry.view_rank_delta = row.rank_delta;
    }

    let mut rows: Vec<MergedRow> = merged.into_values().collect();
    sort_rows(&mut rows, sort_by);
    rows
}

/// Count and delta order descending; rank and rank_delta ascending (lower
/// rank = more popular). Zero-filled ranks mean the gene is absent from the
/// citation series, so those rows sort last rather than before rank 1.
fn sort_rows(rows: &mut [MergedRow], sort_by: SortKey) {
    match sort_by {
        SortKey::Count => rows.sort_by(|a, b| b.cites.cmp(&a.cites)),
        SortKey::Delta => rows.sort_by(|a, b| b.cite_delta.cmp(&a.cite_delta)),
        SortKey::Rank => rows.sort_by_key(|row| (row.cite_rank == 0, row.cite_rank)),
        SortKey::RankDelta => rows.sort_by_key(|row| (row.cite_rank == 0, row.cite_rank_delta)),
    }
}

pub fn write_trends(rows: &[MergedRow], path: &Utf8Path) -> Result<(), TrendsError> {
    let mut out = String::with_capacity(rows.len() * 48 + TRENDS_HEADER.len() + 1);
    out.push_str(TRENDS_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            row.gene,
            row.cites,
            row.cite_delta,
            row.cite_rank,
            row.cite_rank_delta,
            row.views,
            row.view_delta,
            row.view_rank,
            row.view_rank_delta
        ));
    }
    Store::write_bytes_atomic(path, out.as_bytes())
}
