//! Occurrence reconciliation
//!
//! Diffs the aggregated observations against the reference index. Two
//! independent queries over the same shape of data: new (species, province)
//! pairs, and species observed in Finland with no reference distribution at
//! all.

use crate::aggregate::{Aggregated, SpecimenDetail};
use crate::reference::ReferenceDistribution;

/// One novelty finding, region-level or country-level
#[derive(Debug, Clone)]
pub struct NoveltyRecord {
    /// Species id (bare, without the URI prefix)
    pub species: String,
    pub species_name: String,
    /// Province id for region novelties, `None` for country novelties
    pub region: Option<String>,
    /// Reference status for the pair; `""` when the reference has no entry
    pub status: String,
    pub specimens: Vec<SpecimenDetail>,
}

/// Find (species, province) pairs observed outside the known distribution.
///
/// Species without any reference records are excluded here; they are either
/// country novelties or mistyped names, not province novelties.
pub fn region_novelties(
    aggregated: &Aggregated,
    reference: &ReferenceDistribution,
) -> Vec<NoveltyRecord> {
    let mut novelties = Vec::new();
    for (species, regions) in aggregated {
        if !reference.has_distribution(species) {
            continue;
        }
        for (region, occurrence) in regions {
            if reference.is_present(species, region) {
                continue;
            }
            novelties.push(NoveltyRecord {
                species: species.clone(),
                species_name: occurrence.species_name.clone(),
                region: Some(region.clone()),
                status: occurrence.status.clone(),
                specimens: occurrence.specimens.clone(),
            });
        }
    }
    tracing::info!(count = novelties.len(), "Found candidate province novelties");
    novelties
}

/// Find species observed in the country with no reference distribution entry.
///
/// Runs over the country-scoped aggregation; all specimens of a species are
/// pooled, with no per-region split and no status concept.
pub fn country_novelties(
    aggregated: &Aggregated,
    reference: &ReferenceDistribution,
) -> Vec<NoveltyRecord> {
    let mut novelties = Vec::new();
    for (species, regions) in aggregated {
        if reference.has_distribution(species) {
            continue;
        }
        let mut species_name = String::new();
        let mut specimens = Vec::new();
        for occurrence in regions.values() {
            if !occurrence.species_name.is_empty() {
                species_name = occurrence.species_name.clone();
            }
            specimens.extend(occurrence.specimens.iter().cloned());
        }
        if specimens.is_empty() {
            continue;
        }
        novelties.push(NoveltyRecord {
            species: species.clone(),
            species_name,
            region: None,
            status: String::new(),
            specimens,
        });
    }
    tracing::info!(count = novelties.len(), "Found candidate country novelties");
    novelties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Grouping, SpecimenAggregator};
    use crate::reference::ReferenceRecord;
    use serde_json::json;

    fn specimen(taxon: &str, province: &str, unit_id: &str, gathered: &str) -> serde_json::Value {
        json!({
            "unit": {
                "unitId": unit_id,
                "linkings": {"taxon": {"id": taxon, "scientificName": "Testus testus"}},
                "interpretations": {"reliability": "RELIABLE"},
            },
            "document": {"documentId": "D.1", "modifiedDate": "2021-06-18"},
            "gathering": {
                "interpretations": {"biogeographicalProvince": province},
                "eventDate": {"end": gathered},
            },
        })
    }

    #[test]
    fn test_new_region_is_reported_with_empty_status() {
        // species X present in A only; observed in A and B; no reference
        // entry for B at all
        let reference = ReferenceDistribution::build(vec![ReferenceRecord {
            species: "MX.X".to_string(),
            region: "ML.A".to_string(),
            status: "MX.typeOfOccurrenceOccurs".to_string(),
        }]);
        let mut aggregator = SpecimenAggregator::new(&reference, Grouping::SpeciesRegion);
        aggregator.ingest(&[
            specimen("MX.X", "ML.A", "U.1", "2000-01-01"),
            specimen("MX.X", "ML.B", "U.2", "1985-01-01"),
            specimen("MX.X", "ML.B", "U.3", "2001-01-01"),
        ]);
        let novelties = region_novelties(&aggregator.finalize(), &reference);

        assert_eq!(novelties.len(), 1);
        let novelty = &novelties[0];
        assert_eq!(novelty.species, "MX.X");
        assert_eq!(novelty.region.as_deref(), Some("ML.B"));
        assert_eq!(novelty.status, "");
        assert_eq!(novelty.specimens.len(), 2);
    }

    #[test]
    fn test_species_without_reference_excluded_from_region_novelty() {
        let reference = ReferenceDistribution::default();
        let mut aggregator = SpecimenAggregator::new(&reference, Grouping::SpeciesRegion);
        aggregator.ingest(&[specimen("MX.Z", "ML.A", "U.1", "2000-01-01")]);
        let novelties = region_novelties(&aggregator.finalize(), &reference);
        assert!(novelties.is_empty());
    }

    #[test]
    fn test_non_present_status_is_a_novelty_with_that_status() {
        let reference = ReferenceDistribution::build(vec![ReferenceRecord {
            species: "MX.Y".to_string(),
            region: "ML.C".to_string(),
            status: "MX.typeOfOccurrenceExtirpated".to_string(),
        }]);
        let mut aggregator = SpecimenAggregator::new(&reference, Grouping::SpeciesRegion);
        aggregator.ingest(&[specimen("MX.Y", "ML.C", "U.1", "1999-05-01")]);
        let novelties = region_novelties(&aggregator.finalize(), &reference);
        assert_eq!(novelties.len(), 1);
        assert_eq!(novelties[0].status, "MX.typeOfOccurrenceExtirpated");
    }

    #[test]
    fn test_country_novelty_only_for_index_absent_species() {
        let reference = ReferenceDistribution::build(vec![ReferenceRecord {
            species: "MX.X".to_string(),
            region: "ML.A".to_string(),
            status: "MX.typeOfOccurrenceOccurs".to_string(),
        }]);
        let mut aggregator = SpecimenAggregator::new(&reference, Grouping::Species);
        aggregator.ingest(&[
            specimen("MX.X", "ML.A", "U.1", "2000-01-01"),
            specimen("MX.Z", "ML.A", "U.2", "2001-01-01"),
            specimen("MX.Z", "ML.B", "U.3", "2002-01-01"),
        ]);
        let novelties = country_novelties(&aggregator.finalize(), &reference);

        assert_eq!(novelties.len(), 1);
        let novelty = &novelties[0];
        assert_eq!(novelty.species, "MX.Z");
        assert_eq!(novelty.region, None);
        assert_eq!(novelty.status, "");
        assert_eq!(novelty.specimens.len(), 2);
    }
}
