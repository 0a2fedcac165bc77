use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TrendsError;

/// Canonical short identifier for a gene (e.g. "TNF"). Opaque beyond
/// equality and use as a mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneSymbol(String);

impl GeneSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GeneSymbol {
    type Err = TrendsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(TrendsError::InvalidGeneSymbol(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

/// Per-gene event counts for a single day, one entry per known gene.
/// Insertion order (first appearance in the page map) is the deterministic
/// tie-break order when ranking equal values.
pub type CountTable = IndexMap<GeneSymbol, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    Count,
    Delta,
    Rank,
    RankDelta,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Count => write!(f, "count"),
            SortKey::Delta => write!(f, "delta"),
            SortKey::Rank => write!(f, "rank"),
            SortKey::RankDelta => write!(f, "rank_delta"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Views,
    Citations,
}

/// Dev setting for fast but incomplete data. Level 1 shrinks a default-size
/// day window to two days and reuses downloaded dumps; level 2 additionally
/// reuses computed series files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DebugLevel {
    #[default]
    Off,
    CacheDownloads,
    CacheIntermediate,
}

impl DebugLevel {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => DebugLevel::Off,
            1 => DebugLevel::CacheDownloads,
            _ => DebugLevel::CacheIntermediate,
        }
    }

    pub fn cache_downloads(self) -> bool {
        self >= DebugLevel::CacheDownloads
    }

    pub fn cache_intermediate(self) -> bool {
        self >= DebugLevel::CacheIntermediate
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_gene_symbol_trims() {
        let gene: GeneSymbol = " TNF ".parse().unwrap();
        assert_eq!(gene.as_str(), "TNF");
    }

    #[test]
    fn parse_gene_symbol_rejects_empty() {
        let err = "   ".parse::<GeneSymbol>().unwrap_err();
        assert_matches!(err, TrendsError::InvalidGeneSymbol(_));
    }

    #[test]
    fn sort_key_display_matches_cli_values() {
        assert_eq!(SortKey::Count.to_string(), "count");
        assert_eq!(SortKey::RankDelta.to_string(), "rank_delta");
    }

    #[test]
    fn debug_levels_nest() {
        assert!(!DebugLevel::Off.cache_downloads());
        assert!(DebugLevel::CacheDownloads.cache_downloads());
        assert!(!DebugLevel::CacheDownloads.cache_intermediate());
        assert!(DebugLevel::CacheIntermediate.cache_downloads());
        assert!(DebugLevel::CacheIntermediate.cache_intermediate());
    }
}
