use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::info;

use crate::app::{ProgressEvent, ProgressSink};
use crate::config::RunConfig;
use crate::domain::{CountTable, GeneSymbol};
use crate::dumps::{is_retryable_error, is_retryable_status};
use crate::error::TrendsError;
use crate::page_map::PageMap;
use crate::rank::Snapshot;
use crate::store::Store;

/// External collaborator producing per-gene citation counts for an inclusive
/// date range. Returns one entry per requested gene.
pub trait CitationClient: Send + Sync {
    fn citation_counts(
        &self,
        genes: &[GeneSymbol],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CountTable, TrendsError>;
}

#[derive(Clone)]
pub struct PubmedHttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PubmedHttpClient {
    pub fn new(base_url: String) -> Result<Self, TrendsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gene-trends/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| TrendsError::Filesystem(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(StdDuration::from_secs(60))
            .build()
            .map_err(|err| TrendsError::PubmedHttp(err.to_string()))?;

        let api_key = std::env::var("NCBI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    // E-utilities allows 3 requests/second without an API key, 10 with one.
    fn throttle(&self) -> StdDuration {
        if self.api_key.is_some() {
            StdDuration::from_millis(110)
        } else {
            StdDuration::from_millis(350)
        }
    }

    fn count_for(
        &self,
        gene: &GeneSymbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, TrendsError> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let term = format!("{gene}[Title/Abstract]");
        let mindate = start.format("%Y/%m/%d").to_string();
        let maxdate = end.format("%Y/%m/%d").to_string();

        let response = self.send_with_retries(|| {
            let mut request = self.client.get(&url).query(&[
                ("db", "pubmed"),
                ("term", term.as_str()),
                ("datetype", "pdat"),
                ("mindate", mindate.as_str()),
                ("maxdate", maxdate.as_str()),
                ("rettype", "count"),
                ("retmode", "json"),
            ]);
            if let Some(key) = &self.api_key {
                request = request.query(&[("api_key", key.as_str())]);
            }
            request
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "PubMed request failed".to_string());
            return Err(TrendsError::PubmedStatus { status, message });
        }

        let payload: serde_json::Value = response
            .json()
            .map_err(|err| TrendsError::PubmedHttp(err.to_string()))?;
        payload["esearchresult"]["count"]
            .as_str()
            .and_then(|count| count.parse::<u64>().ok())
            .ok_or_else(|| {
                TrendsError::PubmedHttp(format!("missing esearch count for {gene}"))
            })
    }

    fn send_with_retries<F>(&self, mut make_req: F) -> Result<reqwest::blocking::Response, TrendsError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(StdDuration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(StdDuration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(TrendsError::PubmedHttp(err.to_string()));
                }
            }
        }
    }
}

impl CitationClient for PubmedHttpClient {
    fn citation_counts(
        &self,
        genes: &[GeneSymbol],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CountTable, TrendsError> {
        let mut counts = CountTable::new();
        for gene in genes {
            counts.insert(gene.clone(), self.count_for(gene, start, end)?);
            thread::sleep(self.throttle());
        }
        Ok(counts)
    }
}

/// The current window and the equal-length window immediately before it,
/// both ending before `today`, as inclusive (start, end) pairs.
pub(crate) fn citation_windows(
    today: NaiveDate,
    days: u32,
) -> ((NaiveDate, NaiveDate), (NaiveDate, NaiveDate)) {
    let days = i64::from(days);
    let current_start = today - Duration::days(days);
    let current_end = today - Duration::days(1);
    let previous_start = today - Duration::days(2 * days);
    let previous_end = current_start - Duration::days(1);
    ((previous_start, previous_end), (current_start, current_end))
}

/// Citations pipeline: the same aggregation/ranking contract as the views
/// pipeline, with the preceding window standing in for "yesterday".
pub struct Citations<'a, C: CitationClient> {
    store: &'a Store,
    client: &'a C,
    config: &'a RunConfig,
}

impl<'a, C: CitationClient> Citations<'a, C> {
    pub fn new(store: &'a Store, client: &'a C, config: &'a RunConfig) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    pub fn run(&self, sink: &dyn ProgressSink) -> Result<Snapshot, TrendsError> {
        let series_path = self.store.citations_series_path();
        if self.config.debug.cache_intermediate() && series_path.as_std_path().exists() {
            sink.event(ProgressEvent {
                message: "phase=Store; using cached citations series".to_string(),
                elapsed: None,
            });
            return Snapshot::read_tsv(&series_path);
        }

        let page_map = PageMap::load(&self.store.page_map_path())?;
        self.store.ensure_output_root()?;
        let genes: Vec<GeneSymbol> = page_map.seed_counts().keys().cloned().collect();

        let today = Utc::now().date_naive();
        let ((previous_start, previous_end), (current_start, current_end)) =
            citation_windows(today, self.config.window_days);

        sink.event(ProgressEvent {
            message: format!(
                "phase=Fetch; counting citations for {} genes, {current_start}..{current_end}",
                genes.len()
            ),
            elapsed: None,
        });
        let previous_counts = self
            .client
            .citation_counts(&genes, previous_start, previous_end)?;
        let current_counts = self
            .client
            .citation_counts(&genes, current_start, current_end)?;

        let baseline = Snapshot::rank(&previous_counts, &Snapshot::empty());
        let snapshot = Snapshot::rank(&current_counts, &baseline);
        snapshot.write_tsv(&series_path)?;
        info!(genes = genes.len(), "wrote citations series");
        Ok(snapshot)
    }
}
