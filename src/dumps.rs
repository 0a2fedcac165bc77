use std::fs::{self, File};
use std::thread;
use std::time::Duration;

use camino::Utf8Path;
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::TrendsError;

/// External collaborator that obtains one day's raw pageview dump and leaves
/// the decompressed text at the destination path. Implementations own the
/// transport and decompression; failures surface with the offending date.
pub trait DumpClient: Send + Sync {
    fn fetch(&self, date: NaiveDate, destination: &Utf8Path) -> Result<(), TrendsError>;
}

#[derive(Clone)]
pub struct WikimediaHttpClient {
    client: Client,
    base_url: String,
}

impl WikimediaHttpClient {
    pub fn new(base_url: String) -> Result<Self, TrendsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gene-trends/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| TrendsError::Filesystem(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| TrendsError::WikimediaHttp(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn dump_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}",
            self.base_url,
            date.format("%Y/%Y-%m/pageviews-%Y%m%d-user.gz")
        )
    }

    fn download(&self, url: &str, destination: &Utf8Path) -> Result<(), TrendsError> {
        let response = self.send_with_retries(|| self.client.get(url))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Wikimedia request failed".to_string());
            return Err(TrendsError::WikimediaStatus { status, message });
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        }
        let mut file = File::create(destination.as_std_path())
            .map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        let mut decoder = GzDecoder::new(response);
        std::io::copy(&mut decoder, &mut file)
            .map_err(|err| TrendsError::Filesystem(err.to_string()))?;
        Ok(())
    }

    fn send_with_retries<F>(&self, mut make_req: F) -> Result<reqwest::blocking::Response, TrendsError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 500;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(TrendsError::WikimediaHttp(err.to_string()));
                }
            }
        }
    }
}

impl DumpClient for WikimediaHttpClient {
    fn fetch(&self, date: NaiveDate, destination: &Utf8Path) -> Result<(), TrendsError> {
        let url = self.dump_url(date);
        self.download(&url, destination)
            .map_err(|err| TrendsError::Fetch {
                date,
                message: err.to_string(),
            })
    }
}

pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

pub(crate) fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_url_embeds_date() {
        let client = WikimediaHttpClient::new(
            "https://dumps.wikimedia.org/other/pageview_complete".to_string(),
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            client.dump_url(date),
            "https://dumps.wikimedia.org/other/pageview_complete/2026/2026-03/pageviews-20260314-user.gz"
        );
    }
}
