//! Reference distribution index
//!
//! In-memory index of the curated Taxon Editor distributions: which species
//! are known from which biogeographical provinces, and with what occurrence
//! status. Built once at startup and read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use tw_common::client::TaxonEntry;

/// Occurrence status codes interpreted as "the species occurs here".
///
/// There is a bewildering variety of occurrence classifications, see
/// http://schema.laji.fi/alt/MX.typeOfOccurrenceEnum
pub const OCCURS_CODES: &[&str] = &[
    "MX.typeOfOccurrenceOccurs",
    "MX.typeOfOccurrenceStablePopulation",
    "MX.typeOfOccurrenceCommon",
    "MX.typeOfOccurrenceRare",
    "MX.typeOfOccurrenceVeryRare",
    "MX.typeOfOccurrenceImport",
    "MX.typeOfOccurrenceAnthropogenic",
    "MX.typeOfOccurrenceAlienOldResident",
    "MX.typeOfOccurrenceSpontaneousNewEphemeral",
    "MX.typeOfOccurrenceAlienNewEphemeral",
    "MX.typeOfOccurrenceAlienNewResident",
    "MX.typeOfOccurrenceSmallDegreeCultivatedOrigin",
    "MX.typeOfOccurrenceNotableDegreeCultivatedOrigin",
    "MX.typeOfOccurrenceCompletelyCultivatedOrigin",
    "MX.typeOfOccurrenceOnlyCultivated",
];

/// One flat (species, region, status) triple from the reference data
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub species: String,
    pub region: String,
    pub status: String,
}

/// Lookup structures over the reference distribution.
///
/// `present` answers "is this species known to occur in this region";
/// `all` keeps every status code, including absent/uncertain/historical
/// classifications, for reporting.
#[derive(Debug, Default)]
pub struct ReferenceDistribution {
    present: BTreeMap<String, BTreeSet<String>>,
    all: BTreeMap<String, BTreeMap<String, String>>,
}

impl ReferenceDistribution {
    /// Build the index from flat reference triples.
    ///
    /// Missing fields never fail: an empty status is simply not in the
    /// occurs vocabulary, an empty region key never matches a real region.
    pub fn build(records: impl IntoIterator<Item = ReferenceRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Build the index from the taxa endpoint response.
    ///
    /// Species without an `occurrences` field have unknown distribution
    /// (e.g. only presumed present) and are left out of the index entirely;
    /// species with an empty `occurrences` list are indexed with no regions.
    pub fn from_taxon_entries(entries: &[TaxonEntry]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let Some(occurrences) = &entry.occurrences else {
                continue;
            };
            index.ensure_species(&entry.id);
            for occurrence in occurrences {
                index.insert(ReferenceRecord {
                    species: entry.id.clone(),
                    region: occurrence.area.clone().unwrap_or_default(),
                    status: occurrence.status.clone().unwrap_or_default(),
                });
            }
        }
        index
    }

    fn ensure_species(&mut self, species: &str) {
        self.present.entry(species.to_string()).or_default();
        self.all.entry(species.to_string()).or_default();
    }

    fn insert(&mut self, record: ReferenceRecord) {
        if OCCURS_CODES.contains(&record.status.as_str()) {
            self.present
                .entry(record.species.clone())
                .or_default()
                .insert(record.region.clone());
        }
        self.all
            .entry(record.species)
            .or_default()
            .insert(record.region, record.status);
    }

    /// Reference status for a (species, region) pair, if recorded
    pub fn status(&self, species: &str, region: &str) -> Option<&str> {
        self.all
            .get(species)
            .and_then(|regions| regions.get(region))
            .map(String::as_str)
    }

    /// True if the species is known to occur in the region
    pub fn is_present(&self, species: &str, region: &str) -> bool {
        self.present
            .get(species)
            .map(|regions| regions.contains(region))
            .unwrap_or(false)
    }

    /// True if the species has any reference records at all.
    ///
    /// Species without a distribution are excluded from the province-novelty
    /// diff but are the candidates for the country-novelty diff.
    pub fn has_distribution(&self, species: &str) -> bool {
        self.all.contains_key(species)
    }

    /// Number of indexed species
    pub fn species_count(&self) -> usize {
        self.all.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_common::client::TaxonOccurrence;

    fn record(species: &str, region: &str, status: &str) -> ReferenceRecord {
        ReferenceRecord {
            species: species.to_string(),
            region: region.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_present_set_is_exactly_the_occurs_vocabulary_subset() {
        let index = ReferenceDistribution::build(vec![
            record("MX.1", "ML.251", "MX.typeOfOccurrenceOccurs"),
            record("MX.1", "ML.252", "MX.typeOfOccurrenceExtirpated"),
            record("MX.1", "ML.253", "MX.typeOfOccurrenceRare"),
        ]);
        assert!(index.is_present("MX.1", "ML.251"));
        assert!(index.is_present("MX.1", "ML.253"));
        assert!(!index.is_present("MX.1", "ML.252"));
        // the non-occurring region is still visible for status lookup
        assert_eq!(index.status("MX.1", "ML.252"), Some("MX.typeOfOccurrenceExtirpated"));
    }

    #[test]
    fn test_unknown_species() {
        let index = ReferenceDistribution::build(vec![record(
            "MX.1",
            "ML.251",
            "MX.typeOfOccurrenceOccurs",
        )]);
        assert!(!index.has_distribution("MX.2"));
        assert!(!index.is_present("MX.2", "ML.251"));
        assert_eq!(index.status("MX.2", "ML.251"), None);
    }

    #[test]
    fn test_missing_fields_are_not_fatal() {
        let index = ReferenceDistribution::build(vec![
            record("MX.1", "", "MX.typeOfOccurrenceOccurs"),
            record("MX.1", "ML.251", ""),
        ]);
        assert!(index.has_distribution("MX.1"));
        assert!(!index.is_present("MX.1", "ML.251"));
        assert_eq!(index.status("MX.1", "ML.251"), Some(""));
    }

    #[test]
    fn test_taxon_entry_without_occurrences_is_skipped() {
        let entries = vec![
            TaxonEntry {
                id: "MX.1".to_string(),
                scientific_name: None,
                occurrences: None,
            },
            TaxonEntry {
                id: "MX.2".to_string(),
                scientific_name: None,
                occurrences: Some(vec![]),
            },
            TaxonEntry {
                id: "MX.3".to_string(),
                scientific_name: None,
                occurrences: Some(vec![TaxonOccurrence {
                    area: Some("ML.251".to_string()),
                    status: Some("MX.typeOfOccurrenceOccurs".to_string()),
                }]),
            },
        ];
        let index = ReferenceDistribution::from_taxon_entries(&entries);
        // unknown distribution: not indexed, country-novelty candidate
        assert!(!index.has_distribution("MX.1"));
        // empty distribution: indexed with no regions
        assert!(index.has_distribution("MX.2"));
        assert!(!index.is_present("MX.2", "ML.251"));
        assert!(index.is_present("MX.3", "ML.251"));
        assert_eq!(index.species_count(), 2);
    }
}
