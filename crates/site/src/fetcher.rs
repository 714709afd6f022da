use log::debug;
use reqwest::{header::ACCEPT, Client};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("error sending request: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("{0}")]
    Status(reqwest::Error),
    #[error("error reading response body: {0}")]
    Body(reqwest::Error),
}

/// Shared HTTP client for the upstream services, retrying transient failures
#[derive(Clone)]
pub struct Fetcher {
    client: ClientWithMiddleware,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(Client::builder().user_agent(user_agent).build()?)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Ok(Self { client, timeout })
    }

    /// GET `url` with `query` appended; any non-2xx status is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        debug!("requesting: {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()
            .map_err(FetchError::Status)?;
        response.json::<T>().await.map_err(FetchError::Body)
    }
}
