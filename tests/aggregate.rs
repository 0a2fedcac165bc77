use std::collections::HashSet;

use gene_trends::aggregate::aggregate_views;
use gene_trends::domain::GeneSymbol;
use gene_trends::page_map::PageMap;

fn gene(symbol: &str) -> GeneSymbol {
    symbol.parse().unwrap()
}

fn fixture_map() -> PageMap {
    PageMap::from_entries([
        ("Tumor_necrosis_factor".to_string(), "TNF".parse().unwrap()),
        ("BRCA1_page".to_string(), "BRCA1".parse().unwrap()),
    ])
}

fn en_only() -> HashSet<String> {
    ["en.wikipedia".to_string()].into_iter().collect()
}

#[test]
fn day_one_scenario_counts_known_pages_only() {
    let map = fixture_map();
    let stream = "\
en.wikipedia Tumor_necrosis_factor 12345 desktop 5 0
en.wikipedia Unknown_page 99 desktop 9 0
";
    let (counts, summary) =
        aggregate_views(stream.as_bytes(), &map, &en_only(), map.seed_counts()).unwrap();

    assert_eq!(counts.len(), 2);
    assert_eq!(counts[&gene("TNF")], 5);
    assert_eq!(counts[&gene("BRCA1")], 0);
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.malformed, 0);
}

#[test]
fn both_row_shapes_accumulate() {
    let map = fixture_map();
    let stream = "\
en.wikipedia Tumor_necrosis_factor 12345 desktop 7 0
en.wikipedia Tumor_necrosis_factor desktop 3 0
";
    let (counts, _) =
        aggregate_views(stream.as_bytes(), &map, &en_only(), map.seed_counts()).unwrap();
    assert_eq!(counts[&gene("TNF")], 10);
}

#[test]
fn foreign_wiki_codes_are_filtered() {
    let map = fixture_map();
    let stream = "\
de.wikipedia Tumor_necrosis_factor 12345 desktop 50 0
en.wikipedia Tumor_necrosis_factor 12345 desktop 2 0
";
    let (counts, summary) =
        aggregate_views(stream.as_bytes(), &map, &en_only(), map.seed_counts()).unwrap();
    assert_eq!(counts[&gene("TNF")], 2);
    // filtering is expected and silent, not malformed
    assert_eq!(summary.malformed, 0);
}

#[test]
fn one_malformed_row_in_a_thousand_is_skipped() {
    let map = fixture_map();
    let mut stream = String::new();
    for line_number in 0..1000 {
        if line_number == 500 {
            stream.push_str("en.wikipedia broken-row-with three fields-only\n");
        } else {
            stream.push_str("en.wikipedia Tumor_necrosis_factor 12345 desktop 1 0\n");
        }
    }

    let (counts, summary) =
        aggregate_views(stream.as_bytes(), &map, &en_only(), map.seed_counts()).unwrap();

    assert_eq!(summary.lines, 1000);
    assert_eq!(summary.malformed, 1);
    assert_eq!(counts[&gene("TNF")], 999);
}

#[test]
fn non_numeric_count_is_malformed_not_fatal() {
    let map = fixture_map();
    let stream = "\
en.wikipedia Tumor_necrosis_factor 12345 desktop five 0
en.wikipedia BRCA1_page 6 desktop 4 0
";
    let (counts, summary) =
        aggregate_views(stream.as_bytes(), &map, &en_only(), map.seed_counts()).unwrap();
    assert_eq!(summary.malformed, 1);
    assert_eq!(counts[&gene("TNF")], 0);
    assert_eq!(counts[&gene("BRCA1")], 4);
}

#[test]
fn empty_stream_keeps_seeded_zeros() {
    let map = fixture_map();
    let (counts, summary) =
        aggregate_views("".as_bytes(), &map, &en_only(), map.seed_counts()).unwrap();
    assert_eq!(summary.lines, 0);
    assert_eq!(counts.len(), 2);
    assert!(counts.values().all(|count| *count == 0));
}
