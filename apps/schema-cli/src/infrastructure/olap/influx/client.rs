//! # InfluxDB HTTP Client
//!
//! Thin client over the `/query` endpoint. Every statement — `SHOW …`
//! introspection and DDL alike — goes through the same query call; the
//! response is the standard `{"results": [...]}` JSON envelope, where each
//! result entry carries either `series` rows or an `error` field. Both the
//! transport layer and any result-level error field fail the call.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::config::InfluxConfig;
use crate::infrastructure::olap::{ClientError, QueryClient, QueryResults, Series};

use async_trait::async_trait;

pub struct InfluxClient {
    http: Client,
    config: InfluxConfig,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    results: Vec<RawResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    series: Vec<Series>,
    error: Option<String>,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Health check against `/ping`. Run before diffing so an unreachable
    /// instance aborts the run early, with no statements submitted.
    pub async fn ping(&self) -> Result<(), ClientError> {
        let mut request = self.http.get(self.endpoint("/ping"));
        if let Some(user) = &self.config.user {
            request = request.basic_auth(user, self.config.password.as_deref());
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QueryClient for InfluxClient {
    async fn query(&self, statement: &str) -> Result<QueryResults, ClientError> {
        debug!("Executing query: {}", statement);

        let mut request = self
            .http
            .post(self.endpoint("/query"))
            .query(&[("q", statement)]);
        if let Some(user) = &self.config.user {
            request = request.basic_auth(user, self.config.password.as_deref());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let raw: RawResponse = response
            .json()
            .await
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;

        if let Some(error) = raw.error {
            return Err(ClientError::Server(error));
        }

        let mut series = Vec::new();
        for result in raw.results {
            if let Some(error) = result.error {
                return Err(ClientError::Server(error));
            }
            series.extend(result.series);
        }
        Ok(QueryResults { series })
    }
}
