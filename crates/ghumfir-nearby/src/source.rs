//! Candidate sources queried by the resolver.

use std::future::Future;
use std::time::Duration;

use ghumfir_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::probe::{extract_candidates, RawCandidate};
use crate::request::SearchRequest;

/// One upstream that can answer a nearby search.
///
/// `Ok(vec![])` means the source answered and had nothing. Any `Err` tells
/// the resolver to move on to the next source.
pub trait CandidateSource: Send + Sync {
    /// Stable label used in logs and failure chains.
    fn name(&self) -> &str;

    fn fetch(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<RawCandidate>, SourceError>> + Send;
}

/// JSON-over-HTTP source. POSTs a [`SearchRequest`] and probes the response
/// for a candidate array.
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: String,
    client: Client,
    url: Url,
    timeout_secs: u64,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if `url` does not parse, or
    /// [`SourceError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        name: &str,
        url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        let url = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            name: name.to_string(),
            client,
            url,
            timeout_secs,
        })
    }

    /// The configured chain: `primary`, then `fallback` when one is set.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] raised while building a source.
    pub fn chain_from_config(config: &AppConfig) -> Result<Vec<Self>, SourceError> {
        let mut sources = vec![Self::new(
            "primary",
            &config.primary_source_url,
            config.primary_timeout_secs,
            &config.user_agent,
        )?];
        if let Some(url) = &config.fallback_source_url {
            sources.push(Self::new(
                "fallback",
                url,
                config.fallback_timeout_secs,
                &config.user_agent,
            )?);
        }
        Ok(sources)
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn map_send_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                source_name: self.name.clone(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            SourceError::Http(err)
        }
    }
}

impl CandidateSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<RawCandidate>, SourceError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SourceError::Malformed {
                source_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        extract_candidates(&value).ok_or_else(|| SourceError::Malformed {
            source_name: self.name.clone(),
            reason: "no destinations array in response".to_string(),
        })
    }
}
