//! Result formatting and CSV output
//!
//! Converts novelty records into the flat, human-readable rows the curators
//! work with. Cosmetic identifier handling lives here: the tun.fi URI prefix
//! is re-added to species ids and province ids are replaced with display
//! names. Per-specimen parallel lists are space-joined inside single CSV
//! fields, one row per novelty.

use crate::aggregate::TUN_PREFIX;
use crate::reconcile::NoveltyRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tw_common::Result;

/// Output row for a new (species, province) pair
#[derive(Debug, Serialize)]
pub struct ProvinceRow {
    pub species: String,
    #[serde(rename = "speciesName")]
    pub species_name: String,
    pub province: String,
    #[serde(rename = "occurrenceCode")]
    pub occurrence_code: String,
    pub specimens: String,
    #[serde(rename = "modifiedDate")]
    pub modified_date: String,
    #[serde(rename = "collectedDate")]
    pub collected_date: String,
    pub reliability: String,
}

/// Output row for a species new to the country (no province column)
#[derive(Debug, Serialize)]
pub struct CountryRow {
    pub species: String,
    #[serde(rename = "speciesName")]
    pub species_name: String,
    pub specimens: String,
    #[serde(rename = "modifiedDate")]
    pub modified_date: String,
    #[serde(rename = "collectedDate")]
    pub collected_date: String,
    pub reliability: String,
}

fn join_field(record: &NoveltyRecord, f: impl Fn(&crate::aggregate::SpecimenDetail) -> &str) -> String {
    record
        .specimens
        .iter()
        .map(f)
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Flatten one region novelty, mapping the province id to its display name
/// (the raw id is kept when the universe does not know it).
pub fn province_row(record: &NoveltyRecord, provinces: &HashMap<String, String>) -> ProvinceRow {
    let region = record.region.as_deref().unwrap_or("");
    ProvinceRow {
        species: format!("{}{}", TUN_PREFIX, record.species),
        species_name: record.species_name.clone(),
        province: provinces.get(region).cloned().unwrap_or_else(|| region.to_string()),
        occurrence_code: record.status.clone(),
        specimens: join_field(record, |s| &s.id),
        modified_date: join_field(record, |s| &s.modified),
        collected_date: join_field(record, |s| &s.gathered),
        reliability: join_field(record, |s| &s.reliability),
    }
}

/// Flatten one country novelty
pub fn country_row(record: &NoveltyRecord) -> CountryRow {
    CountryRow {
        species: format!("{}{}", TUN_PREFIX, record.species),
        species_name: record.species_name.clone(),
        specimens: join_field(record, |s| &s.id),
        modified_date: join_field(record, |s| &s.modified),
        collected_date: join_field(record, |s| &s.gathered),
        reliability: join_field(record, |s| &s.reliability),
    }
}

const PROVINCE_HEADER: &[&str] = &[
    "species",
    "speciesName",
    "province",
    "occurrenceCode",
    "specimens",
    "modifiedDate",
    "collectedDate",
    "reliability",
];

const COUNTRY_HEADER: &[&str] = &[
    "species",
    "speciesName",
    "specimens",
    "modifiedDate",
    "collectedDate",
    "reliability",
];

// Headers are written explicitly so an empty result set still produces a
// well-formed file.
fn open_writer(path: &Path, header: &[&str]) -> Result<csv::Writer<std::fs::File>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

/// Write the province-novelty report
pub fn write_province_report(
    path: &Path,
    records: &[NoveltyRecord],
    provinces: &HashMap<String, String>,
) -> Result<()> {
    let mut writer = open_writer(path, PROVINCE_HEADER)?;
    for record in records {
        writer.serialize(province_row(record, provinces))?;
    }
    writer.flush()?;
    tracing::info!(file = %path.display(), rows = records.len(), "Wrote province-novelty report");
    Ok(())
}

/// Write the country-novelty report
pub fn write_country_report(path: &Path, records: &[NoveltyRecord]) -> Result<()> {
    let mut writer = open_writer(path, COUNTRY_HEADER)?;
    for record in records {
        writer.serialize(country_row(record))?;
    }
    writer.flush()?;
    tracing::info!(file = %path.display(), rows = records.len(), "Wrote country-novelty report");
    Ok(())
}
