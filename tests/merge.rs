use std::collections::HashSet;

use gene_trends::domain::{CountTable, SortKey};
use gene_trends::merge::merge;
use gene_trends::rank::Snapshot;

fn snapshot(pairs: &[(&str, u64)]) -> Snapshot {
    let counts: CountTable = pairs
        .iter()
        .map(|(gene, value)| (gene.parse().unwrap(), *value))
        .collect();
    Snapshot::rank(&counts, &Snapshot::empty())
}

#[test]
fn merge_covers_genes_from_either_side() {
    let citations = snapshot(&[("TNF", 8), ("TP53", 1)]);
    let views = snapshot(&[("BRCA1", 3), ("TNF", 40)]);

    let rows = merge(&citations, &views, SortKey::Count);
    let genes: HashSet<_> = rows.iter().map(|row| row.gene.as_str().to_string()).collect();
    assert_eq!(
        genes,
        ["TNF", "TP53", "BRCA1"]
            .into_iter()
            .map(str::to_string)
            .collect()
    );
}

#[test]
fn merge_is_commutative_in_gene_coverage() {
    let citations = snapshot(&[("TNF", 8), ("TP53", 1)]);
    let views = snapshot(&[("BRCA1", 3), ("TNF", 40)]);

    let forward = merge(&citations, &views, SortKey::Count);
    let swapped = merge(&views, &citations, SortKey::Count);

    let forward_genes: HashSet<_> = forward.iter().map(|row| row.gene.clone()).collect();
    let swapped_genes: HashSet<_> = swapped.iter().map(|row| row.gene.clone()).collect();
    assert_eq!(forward_genes, swapped_genes);

    // Per-gene values survive the swap with the two sources' columns traded.
    for row in &forward {
        let twin = swapped.iter().find(|other| other.gene == row.gene).unwrap();
        assert_eq!(row.cites, twin.views);
        assert_eq!(row.cite_delta, twin.view_delta);
        assert_eq!(row.cite_rank, twin.view_rank);
        assert_eq!(row.views, twin.cites);
        assert_eq!(row.view_rank, twin.cite_rank);
    }
}

#[test]
fn delta_order_is_descending() {
    let day1 = snapshot(&[("TNF", 5), ("EGFR", 5)]);
    let counts: CountTable = [("TNF", 6u64), ("EGFR", 20u64)]
        .into_iter()
        .map(|(gene, value)| (gene.parse().unwrap(), value))
        .collect();
    let day2 = Snapshot::rank(&counts, &day1);

    let rows = merge(&day2, &snapshot(&[]), SortKey::Delta);
    let order: Vec<_> = rows.iter().map(|row| row.gene.as_str()).collect();
    assert_eq!(order, vec!["EGFR", "TNF"]);
}

#[test]
fn rank_delta_order_is_ascending() {
    let day1 = snapshot(&[("TNF", 9), ("EGFR", 5), ("TP53", 2)]);
    let counts: CountTable = [("TNF", 1u64), ("EGFR", 5u64), ("TP53", 20u64)]
        .into_iter()
        .map(|(gene, value)| (gene.parse().unwrap(), value))
        .collect();
    let day2 = Snapshot::rank(&counts, &day1);

    let rows = merge(&day2, &snapshot(&[]), SortKey::RankDelta);
    // TNF fell from 1 to 3 (delta -2), EGFR held 2 (0), TP53 climbed 3 to 1 (+2)
    let order: Vec<_> = rows.iter().map(|row| row.gene.as_str()).collect();
    assert_eq!(order, vec!["TNF", "EGFR", "TP53"]);
}
