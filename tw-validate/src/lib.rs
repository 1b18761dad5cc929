//! tw-validate library - species-name validity scan
//!
//! Finds preserved-specimen records in the FinBIF warehouse whose unit has
//! no resolvable taxon linking - typically a mistyped species name. This is
//! the same skip rule the novelty aggregation applies, used standalone: the
//! skipped specimens are the product here.

use serde_json::Value;
use std::path::Path;
use tw_common::client::{LajiClient, UnitQuery};
use tw_common::config::Settings;
use tw_common::records::lookup_str;
use tw_common::Result;

/// Output file for specimen ids with unresolvable species names
pub const REPORT_FILE: &str = "mistyped_speciesnames.csv";

/// Collect the identifiers of specimens in `page` that lack a resolvable
/// species. Prefers the unit id (multi-species observations), falls back to
/// the parent document id.
pub fn collect_invalid(page: &[Value]) -> Vec<String> {
    let mut ids = Vec::new();
    for record in page {
        if !lookup_str(record, &["unit", "linkings", "taxon", "id"]).is_empty() {
            continue;
        }
        let mut id = lookup_str(record, &["unit", "unitId"]);
        if id.is_empty() {
            id = lookup_str(record, &["document", "documentId"]);
        }
        if !id.is_empty() {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Write the sorted specimen ids, one per row under a single header column.
pub fn write_report(path: &Path, mut ids: Vec<String>) -> Result<()> {
    ids.sort();
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(["species"])?;
    for id in &ids {
        writer.write_record([id.as_str()])?;
    }
    writer.flush()?;
    tracing::info!(file = %path.display(), rows = ids.len(), "Wrote mistyped-names report");
    Ok(())
}

/// Run the validity scan once.
///
/// With `only_provinces` the harvest is limited to specimens that could be
/// placed in a Finnish biogeographical province; otherwise every specimen of
/// the configured taxa is checked.
pub async fn run(settings: &Settings, only_provinces: bool) -> Result<()> {
    let client = LajiClient::new(&settings.base_url, &settings.access_token)?;

    let province_ids: Option<Vec<String>> = if only_provinces {
        tracing::info!("Downloading biogeographical provinces");
        let areas = client.fetch_provinces().await?;
        Some(areas.into_iter().map(|a| a.id).collect())
    } else {
        None
    };

    tracing::info!("Downloading specimen data");
    let query = UnitQuery::name_check(&settings.taxa, province_ids.as_deref());
    let mut invalid = Vec::new();
    let pages = client
        .fetch_all_units(&query, |page| {
            invalid.extend(collect_invalid(&page.results))
        })
        .await?;
    tracing::info!(pages, found = invalid.len(), "Specimen scan complete");

    write_report(&settings.output_dir.join(REPORT_FILE), invalid)
}
