//! Specimen aggregation
//!
//! Consumes pages of warehouse unit records and groups them by species and
//! biogeographical province, keeping per-specimen detail for the report.
//! The aggregator is page-count-agnostic: `ingest` may be called any number
//! of times before `finalize`.

use crate::reference::ReferenceDistribution;
use serde_json::Value;
use std::collections::BTreeMap;
use tw_common::records::lookup_str;

/// URI prefix carried by warehouse identifiers; stripped at ingest so the
/// keys match the reference index, re-added by the formatter.
pub const TUN_PREFIX: &str = "http://tun.fi/";

/// Per-specimen detail carried through to the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecimenDetail {
    /// Unit id for multi-species observations, else the document id
    pub id: String,
    /// Date the record was last modified
    pub modified: String,
    /// Date the specimen was gathered (end of the event date)
    pub gathered: String,
    /// How reliable the observation is
    pub reliability: String,
}

/// All observed specimens for one (species, region) key
#[derive(Debug, Clone)]
pub struct AggregatedOccurrence {
    /// Reference status for the pair, looked up when the key is first seen
    /// (`""` when the reference has no entry)
    pub status: String,
    /// Scientific display name, from whichever specimen last supplied one
    pub species_name: String,
    pub specimens: Vec<SpecimenDetail>,
}

/// How incoming specimens are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Province run: key by (species, region), seed the reference status
    SpeciesRegion,
    /// Country run: key by species only, no per-region split, no status
    Species,
}

/// Aggregated occurrences: species → region → detail. The country run uses a
/// single `""` region key per species.
pub type Aggregated = BTreeMap<String, BTreeMap<String, AggregatedOccurrence>>;

pub struct SpecimenAggregator<'a> {
    reference: &'a ReferenceDistribution,
    grouping: Grouping,
    occurrences: Aggregated,
    skipped: u64,
}

impl<'a> SpecimenAggregator<'a> {
    pub fn new(reference: &'a ReferenceDistribution, grouping: Grouping) -> Self {
        Self {
            reference,
            grouping,
            occurrences: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Ingest one page of warehouse unit records.
    ///
    /// Specimens with no resolvable species id (a mistyped species name) are
    /// skipped and counted, never an error.
    pub fn ingest(&mut self, page: &[Value]) {
        for record in page {
            let taxon_id = lookup_str(record, &["unit", "linkings", "taxon", "id"]);
            if taxon_id.is_empty() {
                self.skipped += 1;
                continue;
            }
            let species = strip_tun_prefix(taxon_id).to_string();

            let region = match self.grouping {
                Grouping::SpeciesRegion => strip_tun_prefix(lookup_str(
                    record,
                    &["gathering", "interpretations", "biogeographicalProvince"],
                ))
                .to_string(),
                Grouping::Species => String::new(),
            };

            // prefer the unit id (multi-species observations), fall back to
            // the parent document id
            let mut id = lookup_str(record, &["unit", "unitId"]);
            if id.is_empty() {
                id = lookup_str(record, &["document", "documentId"]);
            }

            let detail = SpecimenDetail {
                id: id.to_string(),
                modified: lookup_str(record, &["document", "modifiedDate"]).to_string(),
                gathered: lookup_str(record, &["gathering", "eventDate", "end"]).to_string(),
                reliability: lookup_str(record, &["unit", "interpretations", "reliability"])
                    .to_string(),
            };
            let species_name =
                lookup_str(record, &["unit", "linkings", "taxon", "scientificName"]);

            let occurrence = self
                .occurrences
                .entry(species.clone())
                .or_default()
                .entry(region.clone())
                .or_insert_with(|| AggregatedOccurrence {
                    status: match self.grouping {
                        Grouping::SpeciesRegion => self
                            .reference
                            .status(&species, &region)
                            .unwrap_or("")
                            .to_string(),
                        Grouping::Species => String::new(),
                    },
                    species_name: String::new(),
                    specimens: Vec::new(),
                });
            if !species_name.is_empty() {
                occurrence.species_name = species_name.to_string();
            }
            occurrence.specimens.push(detail);
        }
    }

    /// Specimens skipped for lack of a resolvable species
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn finalize(self) -> Aggregated {
        if self.skipped > 0 {
            tracing::info!(
                skipped = self.skipped,
                "Skipped specimens without a resolvable species"
            );
        }
        self.occurrences
    }
}

/// Strip the tun.fi URI prefix from an identifier, if present
pub fn strip_tun_prefix(id: &str) -> &str {
    id.strip_prefix(TUN_PREFIX).unwrap_or(id)
}
