//! Staleness filter
//!
//! A province novelty whose reference status says "old records" or
//! "extirpated" is only worth reporting if some specimen is recent enough
//! that the finding cannot be explained by outdated reference data.

use crate::reconcile::NoveltyRecord;

/// Reference statuses that mark a pair as already known but historical
pub const HISTORICAL_CODES: &[&str] = &[
    "MX.typeOfOccurrenceOldRecords",
    "MX.typeOfOccurrenceExtirpated",
];

/// Specimens gathered before this year do not count as recent evidence
pub const CUTOFF_YEAR: u32 = 1940;

/// Year prefix of an ISO-8601-like date; `None` for empty or unparseable
/// dates (an undated specimen is never recent evidence).
fn gathered_year(date: &str) -> Option<u32> {
    date.get(0..4)?.parse().ok()
}

/// Drop historical-status records whose evidence is entirely pre-cutoff.
///
/// Pure predicate over each record; records with any other status pass
/// through untouched, so the filter is idempotent.
pub fn filter_stale(records: Vec<NoveltyRecord>) -> Vec<NoveltyRecord> {
    let before = records.len();
    let kept: Vec<NoveltyRecord> = records
        .into_iter()
        .filter(|record| {
            if !HISTORICAL_CODES.contains(&record.status.as_str()) {
                return true;
            }
            record
                .specimens
                .iter()
                .any(|s| gathered_year(&s.gathered).is_some_and(|y| y >= CUTOFF_YEAR))
        })
        .collect();
    if kept.len() < before {
        tracing::info!(
            dropped = before - kept.len(),
            "Dropped stale historical-status novelties"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SpecimenDetail;

    fn record(status: &str, gathered_dates: &[&str]) -> NoveltyRecord {
        NoveltyRecord {
            species: "MX.Y".to_string(),
            species_name: "Testus testus".to_string(),
            region: Some("ML.C".to_string()),
            status: status.to_string(),
            specimens: gathered_dates
                .iter()
                .map(|g| SpecimenDetail {
                    id: "U.1".to_string(),
                    modified: "2021-06-18".to_string(),
                    gathered: g.to_string(),
                    reliability: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_extirpated_with_only_old_specimens_is_dropped() {
        let kept = filter_stale(vec![record("MX.typeOfOccurrenceExtirpated", &["1930-05-01"])]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_extirpated_with_one_recent_specimen_survives() {
        let kept = filter_stale(vec![record(
            "MX.typeOfOccurrenceExtirpated",
            &["1930-05-01", "1999-05-01"],
        )]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_cutoff_year_itself_is_recent() {
        let kept = filter_stale(vec![record("MX.typeOfOccurrenceOldRecords", &["1940-01-01"])]);
        assert_eq!(kept.len(), 1);
        let kept = filter_stale(vec![record("MX.typeOfOccurrenceOldRecords", &["1939-12-31"])]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_undated_and_garbage_dates_are_not_recent() {
        let kept = filter_stale(vec![record(
            "MX.typeOfOccurrenceOldRecords",
            &["", "19", "not-a-date"],
        )]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_non_historical_status_passes_regardless_of_dates() {
        let kept = filter_stale(vec![record("", &["1850-01-01"])]);
        assert_eq!(kept.len(), 1);
        let kept = filter_stale(vec![record("MX.typeOfOccurrenceRare", &[])]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let input = vec![
            record("MX.typeOfOccurrenceExtirpated", &["1930-05-01"]),
            record("MX.typeOfOccurrenceExtirpated", &["1999-05-01"]),
            record("", &["1900-01-01"]),
        ];
        let once = filter_stale(input);
        let once_statuses: Vec<String> = once.iter().map(|r| r.status.clone()).collect();
        let twice = filter_stale(once);
        let twice_statuses: Vec<String> = twice.iter().map(|r| r.status.clone()).collect();
        assert_eq!(once_statuses, twice_statuses);
        assert_eq!(twice_statuses.len(), 2);
    }
}
