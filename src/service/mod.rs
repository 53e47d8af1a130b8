use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ConnectivityError, RequestError};
use crate::model::{HealthStatus, PredictionRequest, PredictionResult, ServiceInfo};

mod http;

pub use http::HttpService;

/// The remote pit-strategy prediction service.
#[async_trait]
pub trait PredictionService {
    /// `GET /health`. Any failure is reported, never retried.
    async fn health(&self) -> Result<HealthStatus, ConnectivityError>;
    /// `POST /predict`, one request/response exchange.
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, RequestError>;
    /// `GET /`, model availability.
    async fn info(&self) -> Result<ServiceInfo>;
}

pub fn build(cfg: &Config) -> Result<Box<dyn PredictionService + Send + Sync>> {
    Ok(Box::new(HttpService::new(cfg)?))
}
