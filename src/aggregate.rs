use std::collections::HashSet;
use std::io::BufRead;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::domain::{CountTable, GeneSymbol};
use crate::error::TrendsError;
use crate::page_map::PageMap;

/// Outcome of classifying a single raw event row. Classification happens
/// before any accumulation, so the accumulation loop itself never branches
/// on error conditions.
#[derive(Debug, PartialEq, Eq)]
pub enum RowClass<'a> {
    Accepted { gene: &'a GeneSymbol, hits: u64 },
    FilteredSource,
    UnknownPage,
    Malformed,
}

/// Classify one line of a pageview dump. Rows normally carry six fields
/// (wiki_code, page_title, page_id, agent, daily_hits, hourly_hits); rows
/// without a page ID carry five, a known quirk of the upstream data. Any
/// other field count, or a non-integer hit count, is malformed.
pub fn classify_row<'a>(
    line: &str,
    page_map: &'a PageMap,
    wiki_codes: &HashSet<String>,
) -> RowClass<'a> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (wiki_code, page_title, hits) = match fields.as_slice() {
        [code, title, _, _, hits, _] => (*code, *title, *hits),
        [code, title, _, hits, _] => (*code, *title, *hits),
        _ => return RowClass::Malformed,
    };

    if !wiki_codes.contains(wiki_code) {
        return RowClass::FilteredSource;
    }
    let Some(gene) = page_map.gene(page_title) else {
        return RowClass::UnknownPage;
    };
    match hits.parse::<u64>() {
        Ok(hits) => RowClass::Accepted { gene, hits },
        Err(_) => RowClass::Malformed,
    }
}

/// Advisory throughput numbers for one aggregation pass.
#[derive(Debug, Clone, Copy)]
pub struct AggregateSummary {
    pub lines: u64,
    pub malformed: u64,
    pub elapsed: Duration,
}

impl AggregateSummary {
    pub fn lines_per_sec(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.lines as f64 / secs).round() as u64
        } else {
            0
        }
    }
}

/// Stream one day's dump line by line, adding accepted hit counts to the
/// zero-seeded table. Filtered rows (foreign wiki code, unmapped title) are
/// expected in volume and dropped silently; malformed rows are logged and
/// skipped; no row is ever fatal.
pub fn aggregate_views<R: BufRead>(
    reader: R,
    page_map: &PageMap,
    wiki_codes: &HashSet<String>,
    mut counts: CountTable,
) -> Result<(CountTable, AggregateSummary), TrendsError> {
    let start = Instant::now();
    let mut lines = 0u64;
    let mut malformed = 0u64;

    for line in reader.lines() {
        let line = line.map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        lines += 1;
        match classify_row(&line, page_map, wiki_codes) {
            RowClass::Accepted { gene, hits } => {
                *counts.entry(gene.clone()).or_insert(0) += hits;
            }
            RowClass::Malformed => {
                malformed += 1;
                warn!(row = %line, "skipping malformed row");
            }
            RowClass::FilteredSource | RowClass::UnknownPage => {}
        }
    }

    let summary = AggregateSummary {
        lines,
        malformed,
        elapsed: start.elapsed(),
    };
    Ok((counts, summary))
}
