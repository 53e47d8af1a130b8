use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{status_text, ConnectivityError, RequestError};
use crate::model::{HealthStatus, PredictionRequest, PredictionResult, ServiceInfo};
use crate::service::PredictionService;

pub struct HttpService {
    client: Client,
    root: Url,
    health: Url,
    predict: Url,
}

impl HttpService {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            root: cfg.api_endpoint("")?,
            health: cfg.api_endpoint("health")?,
            predict: cfg.api_endpoint("predict")?,
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, String> {
    serde_json::from_str(body).map_err(|e| e.to_string())
}

#[async_trait::async_trait]
impl PredictionService for HttpService {
    async fn health(&self) -> Result<HealthStatus, ConnectivityError> {
        let resp = self
            .client
            .get(self.health.clone())
            .send()
            .await
            .map_err(|e| ConnectivityError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ConnectivityError::Status(status.to_string()));
        }
        let body = resp.text().await.map_err(|e| ConnectivityError::Transport(e.to_string()))?;
        let health: HealthStatus = decode(&body).map_err(ConnectivityError::Payload)?;
        if !health.is_healthy() {
            return Err(ConnectivityError::Unhealthy(health.status));
        }
        Ok(health)
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, RequestError> {
        let resp = self
            .client
            .post(self.predict.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RequestError::Status(status_text(status)));
        }

        let body = resp.text().await.map_err(|e| RequestError::Transport(e.to_string()))?;
        decode(&body).map_err(RequestError::Decode)
    }

    async fn info(&self) -> Result<ServiceInfo> {
        let resp = self.client.get(self.root.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(anyhow!("service info failed: {} - {}", status, body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}
