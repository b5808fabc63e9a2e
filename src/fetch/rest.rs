//! [`PageFetcher`] backed by the remote REST API.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::page::PageRequest;
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::models::config::ClientConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Forwards list requests to `GET {endpoint}?pageNumber=…` and decodes the body.
pub struct RestPageFetcher<T> {
    http: Client,
    endpoint: String,
    bearer_token: Option<String>,
    _item: PhantomData<fn() -> T>,
}

impl<T> RestPageFetcher<T> {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            bearer_token: None,
            _item: PhantomData,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Builds a fetcher for `resource_path` under the configured API base URL.
    pub fn from_config(config: &ClientConfig, resource_path: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let fetcher = Self::new(http, config.endpoint(resource_path));
        Ok(match &config.bearer_token {
            Some(token) => fetcher.with_bearer_token(token.clone()),
            None => fetcher,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, request: &PageRequest) -> RequestBuilder {
        let builder = self.http.get(&self.endpoint).query(&request.query_pairs());
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl<T> PageFetcher for RestPageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    async fn fetch_page(&self, request: &PageRequest) -> FetchOutcome<T> {
        let response = match self.request(request).send().await {
            Ok(response) => response,
            Err(err) => {
                log::error!("Failed to fetch {}: {err}", self.endpoint);
                return FetchOutcome::failure("The server could not be reached.");
            }
        };

        let status = response.status();
        match response.json::<FetchOutcome<T>>().await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!(
                    "Failed to decode response from {} ({status}): {err}",
                    self.endpoint
                );
                FetchOutcome::failure(format!("Unexpected response from the server ({status})."))
            }
        }
    }
}
