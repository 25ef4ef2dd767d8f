use crate::core::currency::ExchangeRateTable;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching exchange rates
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Rate source returned status {0}")]
    ApiError(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Body returned by the rate source; only `rates` is used
#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: Option<HashMap<String, f64>>,
}

/// HTTP client for a USD-based exchange-rate endpoint
pub struct RatesClient {
    endpoint: String,
    client: Client,
}

impl RatesClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, RatesError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    /// Fetch the latest rate table
    pub async fn fetch(&self) -> Result<ExchangeRateTable, RatesError> {
        tracing::debug!("Fetching exchange rates from: {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(RatesError::ApiError(response.status().as_u16()));
        }

        let body: LatestRates = response
            .json()
            .await
            .map_err(|e| RatesError::InvalidResponse(e.to_string()))?;

        let rates = body
            .rates
            .ok_or_else(|| RatesError::InvalidResponse("Missing rates object".into()))?;

        Ok(ExchangeRateTable::live(rates))
    }
}

/// Cached view of the rate source with a static fallback
///
/// One entry lives for the refresh interval. Concurrent misses share a single
/// in-flight fetch; a failed fetch is not cached, so the next caller retries.
#[derive(Clone)]
pub struct RatesProvider {
    client: Arc<RatesClient>,
    cache: moka::future::Cache<(), Arc<ExchangeRateTable>>,
}

impl RatesProvider {
    pub fn new(client: RatesClient, refresh: Duration) -> Self {
        let cache = moka::future::CacheBuilder::new(1)
            .time_to_live(refresh)
            .build();

        Self {
            client: Arc::new(client),
            cache,
        }
    }

    /// Current rate table, or the fallback table when the source is unreachable
    pub async fn table(&self) -> Arc<ExchangeRateTable> {
        let client = self.client.clone();
        let result = self
            .cache
            .try_get_with((), async move { client.fetch().await.map(Arc::new) })
            .await;

        match result {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Could not fetch exchange rates, using fallback list: {}", e);
                Arc::new(ExchangeRateTable::fallback())
            }
        }
    }

    /// Drop the cached table so the next call refetches
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{currency_options, RateSource};

    fn provider(url: String) -> RatesProvider {
        let client = RatesClient::new(url, Duration::from_secs(2)).unwrap();
        RatesProvider::new(client, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_fetch_live_rates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/latest/USD")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"base":"USD","rates":{"USD":1.0,"EUR":0.9,"INR":83.0}}"#)
            .create_async()
            .await;

        let provider = provider(format!("{}/v4/latest/USD", server.url()));
        let table = provider.table().await;

        assert_eq!(table.source, RateSource::Live);
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(currency_options(&table), vec!["USD", "EUR", "INR"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_table_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/latest")
            .with_status(200)
            .with_body(r#"{"rates":{"EUR":0.9}}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = provider(format!("{}/latest", server.url()));
        provider.table().await;
        provider.table().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/latest")
            .with_status(503)
            .expect_at_least(2)
            .create_async()
            .await;

        let provider = provider(format!("{}/latest", server.url()));
        let table = provider.table().await;
        assert!(table.is_fallback());
        assert_eq!(
            currency_options(&table),
            vec!["USD", "INR", "EUR", "GBP", "JPY", "CAD", "AUD"]
        );

        // Failures are not cached
        assert!(provider.table().await.is_fallback());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_rates_field_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/latest")
            .with_status(200)
            .with_body(r#"{"result":"error"}"#)
            .create_async()
            .await;

        let client = RatesClient::new(format!("{}/latest", server.url()), Duration::from_secs(2)).unwrap();
        assert!(matches!(client.fetch().await, Err(RatesError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_source_falls_back() {
        // Nothing listens on port 9 locally
        let provider = provider("http://127.0.0.1:9/latest".to_string());
        assert!(provider.table().await.is_fallback());
    }

    #[tokio::test]
    async fn test_stalled_source_times_out_to_fallback() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stall = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = RatesClient::new(format!("http://{}/latest", addr), Duration::from_secs(1)).unwrap();
        let provider = RatesProvider::new(client, Duration::from_secs(3600));

        let started = std::time::Instant::now();
        let table = provider.table().await;
        let elapsed = started.elapsed();

        assert!(table.is_fallback());
        assert!(elapsed >= Duration::from_millis(900), "returned after {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "returned after {:?}", elapsed);

        stall.abort();
    }
}
