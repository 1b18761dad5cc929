//! Deterministic ordering of novelty records
//!
//! Dates are compared lexicographically: the fixed-width ISO-8601 prefix
//! makes string order equal chronological order, and empty dates sort as
//! earliest. All sorts are stable, so full ties keep their aggregation
//! order and repeated runs produce identical output.

use crate::reconcile::NoveltyRecord;

/// Sort one record's specimens by modification date, most recent first
pub fn sort_specimens(record: &mut NoveltyRecord) {
    record
        .specimens
        .sort_by(|a, b| b.modified.cmp(&a.modified));
}

/// Sort records by most-recent modification date (descending), then by
/// occurrence status code (ascending). Assumes per-record specimen sorting
/// has already run, so the first specimen carries the freshest date.
pub fn sort_records(records: &mut [NoveltyRecord]) {
    records.sort_by(|a, b| {
        let a_modified = most_recent_modified(a);
        let b_modified = most_recent_modified(b);
        b_modified
            .cmp(a_modified)
            .then_with(|| a.status.cmp(&b.status))
    });
}

/// Apply both orderings: specimens within each record, then the records
pub fn sort_all(records: &mut Vec<NoveltyRecord>) {
    for record in records.iter_mut() {
        sort_specimens(record);
    }
    sort_records(records);
}

fn most_recent_modified(record: &NoveltyRecord) -> &str {
    record
        .specimens
        .first()
        .map(|s| s.modified.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SpecimenDetail;

    fn specimen(id: &str, modified: &str) -> SpecimenDetail {
        SpecimenDetail {
            id: id.to_string(),
            modified: modified.to_string(),
            gathered: String::new(),
            reliability: String::new(),
        }
    }

    fn record(status: &str, specimens: Vec<SpecimenDetail>) -> NoveltyRecord {
        NoveltyRecord {
            species: "MX.1".to_string(),
            species_name: String::new(),
            region: None,
            status: status.to_string(),
            specimens,
        }
    }

    #[test]
    fn test_specimens_sorted_newest_first() {
        let mut rec = record(
            "",
            vec![
                specimen("a", "2019-03-01"),
                specimen("b", "2021-06-18"),
                specimen("c", "2020-12-31"),
            ],
        );
        sort_specimens(&mut rec);
        let order: Vec<&str> = rec.specimens.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        // non-increasing modification dates
        for pair in rec.specimens.windows(2) {
            assert!(pair[0].modified >= pair[1].modified);
        }
    }

    #[test]
    fn test_specimen_ties_keep_ingestion_order() {
        let mut rec = record(
            "",
            vec![
                specimen("a", "2020-01-01"),
                specimen("b", "2020-01-01"),
                specimen("c", "2021-01-01"),
            ],
        );
        sort_specimens(&mut rec);
        let order: Vec<&str> = rec.specimens.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_modified_date_sorts_last() {
        let mut rec = record("", vec![specimen("a", ""), specimen("b", "1970-01-01")]);
        sort_specimens(&mut rec);
        let order: Vec<&str> = rec.specimens.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_records_sorted_by_date_then_status() {
        let mut records = vec![
            record("MX.typeOfOccurrenceRare", vec![specimen("a", "2020-01-01")]),
            record("MX.typeOfOccurrenceExtirpated", vec![specimen("b", "2021-01-01")]),
            record("MX.typeOfOccurrenceAnthropogenic", vec![specimen("c", "2020-01-01")]),
        ];
        sort_all(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.status.as_str()).collect();
        // freshest record first; equal dates fall back to status order
        assert_eq!(
            order,
            vec![
                "MX.typeOfOccurrenceExtirpated",
                "MX.typeOfOccurrenceAnthropogenic",
                "MX.typeOfOccurrenceRare",
            ]
        );
    }

    #[test]
    fn test_record_without_specimens_sorts_last() {
        let mut records = vec![
            record("", vec![]),
            record("", vec![specimen("a", "1970-01-01")]),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].specimens.len(), 1);
    }

    #[test]
    fn test_sort_all_is_deterministic() {
        let build = || {
            vec![
                record("s2", vec![specimen("a", "2020-01-01"), specimen("b", "2021-01-01")]),
                record("s1", vec![specimen("c", "2021-01-01")]),
            ]
        };
        let mut first = build();
        let mut second = build();
        sort_all(&mut first);
        sort_all(&mut second);
        let ids = |records: &[NoveltyRecord]| -> Vec<String> {
            records
                .iter()
                .flat_map(|r| r.specimens.iter().map(|s| s.id.clone()))
                .collect()
        };
        assert_eq!(ids(&first), ids(&second));
        // date tie between the records, so status order decides
        assert_eq!(ids(&first), vec!["c", "b", "a"]);
    }
}
