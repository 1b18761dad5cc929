//! tw-novelty library - occurrence reconciliation engine
//!
//! Diffs freshly harvested FinBIF specimen records against the curated
//! Taxon Editor reference distribution and reports species observed in a
//! biogeographical province, or in Finland, for the first time.
//!
//! Pipeline: reference fetch → index build → paginated specimen harvest →
//! aggregation → reconciliation → staleness filter → deterministic ordering
//! → CSV reports. All-or-nothing: a failed fetch aborts the run before any
//! file is written.

use std::collections::HashMap;

use tw_common::client::{LajiClient, UnitQuery};
use tw_common::config::Settings;
use tw_common::Result;

pub mod aggregate;
pub mod order;
pub mod reconcile;
pub mod reference;
pub mod report;
pub mod staleness;

use aggregate::{Grouping, SpecimenAggregator};
use reference::ReferenceDistribution;

/// Output file for new (species, province) pairs
pub const PROVINCE_REPORT_FILE: &str = "new_to_bioprovinces.csv";
/// Output file for species new to Finland
pub const COUNTRY_REPORT_FILE: &str = "new_to_fi.csv";

/// Run the full novelty detection pipeline once.
pub async fn run(settings: &Settings) -> Result<()> {
    let client = LajiClient::new(&settings.base_url, &settings.access_token)?;

    tracing::info!("Downloading biogeographical provinces");
    let areas = client.fetch_provinces().await?;
    let province_ids: Vec<String> = areas.iter().map(|a| a.id.clone()).collect();
    let province_names: HashMap<String, String> = areas
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    tracing::info!("Downloading Taxon Editor reference distributions");
    let mut entries = Vec::new();
    for taxon in &settings.taxa {
        entries.extend(client.fetch_reference(taxon).await?);
    }
    let reference = ReferenceDistribution::from_taxon_entries(&entries);
    tracing::info!(species = reference.species_count(), "Built reference index");

    tracing::info!("Downloading specimen data");
    let province_query = UnitQuery::province_scan(&settings.taxa, &province_ids);
    let mut aggregator = SpecimenAggregator::new(&reference, Grouping::SpeciesRegion);
    let pages = client
        .fetch_all_units(&province_query, |page| aggregator.ingest(&page.results))
        .await?;
    tracing::info!(pages, "Specimen harvest complete");
    let aggregated = aggregator.finalize();

    let mut province_records = reconcile::region_novelties(&aggregated, &reference);
    province_records = staleness::filter_stale(province_records);
    order::sort_all(&mut province_records);

    tracing::info!("Downloading data on specimens new to Finland");
    let country_query = UnitQuery::country_scan(&settings.taxa);
    let mut country_aggregator = SpecimenAggregator::new(&reference, Grouping::Species);
    client
        .fetch_all_units(&country_query, |page| {
            country_aggregator.ingest(&page.results)
        })
        .await?;
    let country_aggregated = country_aggregator.finalize();

    let mut country_records = reconcile::country_novelties(&country_aggregated, &reference);
    order::sort_all(&mut country_records);

    // every fetch has succeeded; only now touch the filesystem
    report::write_province_report(
        &settings.output_dir.join(PROVINCE_REPORT_FILE),
        &province_records,
        &province_names,
    )?;
    report::write_country_report(
        &settings.output_dir.join(COUNTRY_REPORT_FILE),
        &country_records,
    )?;

    Ok(())
}
