//! FinBIF (laji.fi) API client
//!
//! Three read-only endpoints feed the tools: the biogeographical-province
//! universe, the Taxon Editor reference distributions, and the paginated
//! warehouse unit list. Responses with a small fixed shape are deserialized
//! into typed structs; warehouse unit records stay `serde_json::Value`
//! because their field set varies per record.

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "taxonwatch/0.1.0 (https://laji.fi)";
const TIMEOUT_SECS: u64 = 30;

/// Country identifier for Finland
pub const COUNTRY_FINLAND: &str = "ML.206";

/// Warehouse fields requested for the novelty harvest
pub const UNIT_FIELDS: &[&str] = &[
    "document.createdDate",
    "document.documentId",
    "document.modifiedDate",
    "gathering.eventDate.end",
    "gathering.interpretations.biogeographicalProvince",
    "unit.interpretations.reliability",
    "unit.linkings.taxon.id",
    "unit.linkings.taxon.scientificName",
    "unit.unitId",
];

/// Warehouse fields requested for the species-name validity scan
pub const NAME_CHECK_FIELDS: &[&str] = &[
    "document.documentId",
    "unit.linkings.taxon.id",
    "unit.unitId",
];

/// One biogeographical province from the areas endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AreaResponse {
    results: Vec<Area>,
}

/// One species entry from the Taxon Editor reference data
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonEntry {
    pub id: String,
    #[serde(rename = "scientificNameDisplayName", default)]
    pub scientific_name: Option<String>,
    /// Absent for species only presumed present (unknown distribution)
    #[serde(default)]
    pub occurrences: Option<Vec<TaxonOccurrence>>,
}

/// One (region, status) reference pair for a species
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonOccurrence {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaxonResponse {
    results: Vec<TaxonEntry>,
}

/// One page of warehouse unit records
#[derive(Debug, Deserialize)]
pub struct UnitPage {
    pub results: Vec<Value>,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "lastPage")]
    pub last_page: u32,
}

impl UnitPage {
    /// True when the pagination loop should stop after this page
    pub fn is_last(&self) -> bool {
        self.current_page >= self.last_page
    }
}

/// Filter set for a warehouse unit list query
#[derive(Debug, Clone)]
pub struct UnitQuery {
    taxa: Vec<String>,
    selected: Vec<&'static str>,
    page_size: u32,
    province_ids: Option<Vec<String>>,
    country_id: Option<String>,
    only_non_finnish: bool,
}

impl UnitQuery {
    /// Full harvest of province-placed specimens for the novelty diff
    pub fn province_scan(taxa: &[String], province_ids: &[String]) -> Self {
        Self {
            taxa: taxa.to_vec(),
            selected: UNIT_FIELDS.to_vec(),
            page_size: 10_000,
            province_ids: Some(province_ids.to_vec()),
            country_id: None,
            only_non_finnish: false,
        }
    }

    /// Finnish specimens of species not marked as occurring in Finland
    pub fn country_scan(taxa: &[String]) -> Self {
        Self {
            taxa: taxa.to_vec(),
            selected: UNIT_FIELDS.to_vec(),
            page_size: 100,
            province_ids: None,
            country_id: Some(COUNTRY_FINLAND.to_string()),
            only_non_finnish: true,
        }
    }

    /// Minimal field set for the species-name validity scan
    pub fn name_check(taxa: &[String], province_ids: Option<&[String]>) -> Self {
        Self {
            taxa: taxa.to_vec(),
            selected: NAME_CHECK_FIELDS.to_vec(),
            page_size: 10_000,
            province_ids: province_ids.map(|p| p.to_vec()),
            country_id: None,
            only_non_finnish: false,
        }
    }

    /// Query parameters for one page request (access token excluded)
    pub fn params(&self, page: u32) -> Vec<(String, String)> {
        let mut params = vec![
            ("selected".to_string(), self.selected.join(",")),
            ("pageSize".to_string(), self.page_size.to_string()),
            ("page".to_string(), page.to_string()),
            ("cache".to_string(), "false".to_string()),
            ("taxonId".to_string(), self.taxa.join(",")),
            ("useIdentificationAnnotations".to_string(), "true".to_string()),
            ("includeSubTaxa".to_string(), "true".to_string()),
            ("includeNonValidTaxa".to_string(), "true".to_string()),
            ("taxonRankId".to_string(), "MX.species".to_string()),
        ];
        if self.only_non_finnish {
            params.push(("finnish".to_string(), "false".to_string()));
        }
        if let Some(country) = &self.country_id {
            params.push(("countryId".to_string(), country.clone()));
        }
        if let Some(provinces) = &self.province_ids {
            params.push(("biogeographicalProvinceId".to_string(), provinces.join(",")));
        }
        params.push(("recordBasis".to_string(), "PRESERVED_SPECIMEN".to_string()));
        params.push(("individualCountMin".to_string(), "1".to_string()));
        params.push(("qualityIssues".to_string(), "NO_ISSUES".to_string()));
        params
    }
}

/// laji.fi API client
pub struct LajiClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl LajiClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "Querying laji.fi API");

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the biogeographical-province universe (small, one page)
    pub async fn fetch_provinces(&self) -> Result<Vec<Area>> {
        let params = vec![
            ("type".to_string(), "biogeographicalProvince".to_string()),
            ("lang".to_string(), "fi".to_string()),
            ("pageSize".to_string(), "50".to_string()),
        ];
        let response: AreaResponse = self.get_json("areas", &params).await?;
        tracing::info!(count = response.results.len(), "Fetched biogeographical provinces");
        Ok(response.results)
    }

    /// Fetch the reference distribution for every species under one taxon
    pub async fn fetch_reference(&self, taxon: &str) -> Result<Vec<TaxonEntry>> {
        let params = vec![
            ("lang".to_string(), "fi".to_string()),
            ("langFallback".to_string(), "true".to_string()),
            ("taxonRanks".to_string(), "MX.species".to_string()),
            ("includeHidden".to_string(), "false".to_string()),
            ("includeMedia".to_string(), "false".to_string()),
            ("includeDescriptions".to_string(), "false".to_string()),
            ("includeRedListEvaluations".to_string(), "false".to_string()),
            (
                "selectedFields".to_string(),
                "id,scientificNameDisplayName,occurrences".to_string(),
            ),
            ("onlyFinnish".to_string(), "true".to_string()),
            ("sortOrder".to_string(), "taxonomic".to_string()),
            ("pageSize".to_string(), "1000".to_string()),
        ];
        let path = format!("taxa/{}/species", taxon);
        let response: TaxonResponse = self.get_json(&path, &params).await?;
        tracing::info!(
            taxon = %taxon,
            count = response.results.len(),
            "Fetched reference distributions"
        );
        Ok(response.results)
    }

    /// Fetch one page of warehouse unit records
    pub async fn fetch_unit_page(&self, query: &UnitQuery, page: u32) -> Result<UnitPage> {
        let page_data: UnitPage = self
            .get_json("warehouse/query/unit/list", &query.params(page))
            .await?;
        tracing::debug!(
            page = page_data.current_page,
            last_page = page_data.last_page,
            records = page_data.results.len(),
            "Fetched warehouse unit page"
        );
        Ok(page_data)
    }

    /// Drive a warehouse query to exhaustion, strictly sequentially.
    ///
    /// Page N+1 is requested only after `on_page` has consumed page N; the
    /// loop stops once the source reports the last page. Returns the number
    /// of pages fetched. Any fetch error aborts the whole harvest.
    pub async fn fetch_all_units(
        &self,
        query: &UnitQuery,
        mut on_page: impl FnMut(&UnitPage),
    ) -> Result<u32> {
        let mut page = 1;
        loop {
            let unit_page = self.fetch_unit_page(query, page).await?;
            on_page(&unit_page);
            if unit_page.is_last() {
                return Ok(page);
            }
            page += 1;
        }
    }
}
