//! Scryfall metadata client.
//!
//! Scryfall asks clients to:
//! - send a User-Agent and an Accept header
//! - keep 50-100 ms between requests
//!
//! Symbol artwork is downloaded from a separate host, described by a URL
//! template in [`ApiConfig::symbol_url_template`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::retry::RetryPolicy;
use super::spacer::RequestSpacer;
use super::types::{SetCode, SetRecord, SetSummary};
use super::{CatalogError, SetCatalog};
use crate::config::{ApiConfig, Config, RateLimitConfig, RateLimitScope, RetryConfig};

const ACCEPT_VALUE: &str = "application/json;q=0.9,*/*;q=0.8";

/// HTTP client for the Scryfall sets API and the symbol image host.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    client: Client,
    base_url: String,
    symbol_url_template: String,
    retry: RetryPolicy,
    spacer: RequestSpacer,
    scope: RateLimitScope,
}

impl ScryfallClient {
    /// Create a new client.
    pub fn new(
        api: &ApiConfig,
        retry: &RetryConfig,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = Client::builder()
            .user_agent(&api.user_agent)
            .default_headers(headers)
            .timeout(api.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            symbol_url_template: api.symbol_url_template.clone(),
            retry: RetryPolicy::from_config(retry),
            spacer: RequestSpacer::new(Duration::from_millis(rate_limit.min_interval_ms)),
            scope: rate_limit.scope,
        })
    }

    /// Create a client from the full configuration.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Self::new(&config.api, &config.retry, &config.rate_limit)
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn spacer(&self) -> &RequestSpacer {
        &self.spacer
    }

    /// Symbol URL for a set, if symbol downloads are enabled.
    pub fn symbol_uri_for(&self, code: &SetCode) -> Option<String> {
        if self.symbol_url_template.trim().is_empty() {
            None
        } else {
            Some(self.symbol_url_template.replace("{code}", code.as_str()))
        }
    }

    /// A copy of this client whose spacer follows the configured scope.
    fn for_worker(&self) -> Self {
        let mut handle = self.clone();
        handle.spacer = self.spacer.for_worker(self.scope);
        handle
    }

    async fn get(&self, url: &str, not_found: &str) -> Result<Response, CatalogError> {
        self.spacer.wait().await;
        let response = self.client.get(url).send().await?;
        check_status(response, not_found).await
    }

    async fn get_set_once(&self, url: &str, code: &SetCode) -> Result<SetRecord, CatalogError> {
        let response = self.get(url, &format!("set '{}'", code)).await?;
        let body = response.text().await?;

        let set: ScryfallSet = serde_json::from_str(&body).map_err(|e| {
            CatalogError::Malformed(format!("failed to parse set response for {}: {}", code, e))
        })?;

        set.into_record(code.clone(), self.symbol_uri_for(code))
    }

    async fn get_symbol_once(&self, uri: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self.get(uri, &format!("symbol image {}", uri)).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(CatalogError::Malformed(format!(
                "empty symbol image body from {}",
                uri
            )));
        }
        Ok(bytes.to_vec())
    }

    async fn get_set_list_once(&self, url: &str) -> Result<Vec<ScryfallSet>, CatalogError> {
        let response = self.get(url, "set list").await?;
        let body = response.text().await?;
        let list: ScryfallSetList = serde_json::from_str(&body).map_err(|e| {
            CatalogError::Malformed(format!("failed to parse set list response: {}", e))
        })?;
        Ok(list.data)
    }
}

#[async_trait]
impl SetCatalog for ScryfallClient {
    async fn fetch_set_record(&self, code: &SetCode) -> Result<SetRecord, CatalogError> {
        let url = format!(
            "{}/sets/{}",
            self.base_url,
            urlencoding::encode(&code.to_api_form())
        );
        let what = format!("Fetching set info for {}", code);

        self.retry
            .execute(&what, |_| self.get_set_once(&url, code))
            .await
    }

    async fn fetch_symbol_bytes(&self, uri: &str) -> Result<Vec<u8>, CatalogError> {
        let what = format!("Fetching symbol {}", uri);
        self.retry
            .execute(&what, |_| self.get_symbol_once(uri))
            .await
    }

    async fn recent_sets(&self, limit: usize) -> Result<Vec<SetSummary>, CatalogError> {
        let url = format!("{}/sets", self.base_url);
        let sets = self
            .retry
            .execute("Fetching set list", |_| self.get_set_list_once(&url))
            .await?;

        let today = Local::now().date_naive();
        let summaries = released_summaries(sets, today, limit);
        debug!("Set list: {} released sets selected", summaries.len());
        Ok(summaries)
    }

    fn worker_handle(&self) -> Arc<dyn SetCatalog> {
        Arc::new(self.for_worker())
    }
}

/// Map a non-success response to the matching error.
async fn check_status(response: Response, not_found: &str) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(not_found.to_string()));
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(CatalogError::Status {
            status: status.as_u16(),
            retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(CatalogError::Api {
        status: status.as_u16(),
        message: body,
    })
}

/// Released sets (release date on or before `today`), newest first.
fn released_summaries(sets: Vec<ScryfallSet>, today: NaiveDate, limit: usize) -> Vec<SetSummary> {
    let mut summaries: Vec<SetSummary> = sets
        .into_iter()
        .filter_map(|s| {
            let released_at = parse_date(s.released_at.as_deref()?)?;
            if released_at > today {
                return None;
            }
            Some(SetSummary {
                code: s.code.to_ascii_uppercase(),
                name: s.name.unwrap_or_default(),
                released_at,
                set_type: s.set_type.unwrap_or_default(),
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.released_at
            .cmp(&a.released_at)
            .then_with(|| a.code.cmp(&b.code))
    });
    summaries.truncate(limit);
    summaries
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// ============================================================================
// Scryfall API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ScryfallSetList {
    #[serde(default)]
    data: Vec<ScryfallSet>,
}

#[derive(Debug, Deserialize)]
struct ScryfallSet {
    code: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    released_at: Option<String>,
    #[serde(default)]
    set_type: Option<String>,
}

impl ScryfallSet {
    fn into_record(
        self,
        code: SetCode,
        symbol_uri: Option<String>,
    ) -> Result<SetRecord, CatalogError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CatalogError::Malformed(format!("set {} has no name", code)))?;

        let raw_date = self
            .released_at
            .ok_or_else(|| CatalogError::Malformed(format!("set {} has no release date", code)))?;
        let release_date = parse_date(&raw_date).ok_or_else(|| {
            CatalogError::Malformed(format!(
                "set {} has an invalid release date '{}'",
                code, raw_date
            ))
        })?;

        Ok(SetRecord {
            code,
            name,
            release_date,
            symbol_uri,
        })
    }
}
