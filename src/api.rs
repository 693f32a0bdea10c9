//! HTTP client for the remote thermostat service
//!
//! This module defines the service contract as a trait so the engine can be
//! exercised against a test double, plus the reqwest-backed implementation
//! used in production.

pub mod types;

use crate::config::ServerConfig;
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;
use reqwest::header::AUTHORIZATION;
use types::{Device, OverrideInfo, Period, Session, TemperatureResponse};

/// Operations offered by the thermostat service
#[async_trait::async_trait]
pub trait ThermostatApi: Send + Sync {
    /// Exchange credentials for a session at `POST /token/`
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// List all devices at `GET /api/v3/systems/`; the session is attached when present
    async fn list_systems(&self, session: Option<&Session>) -> Result<Vec<Device>>;

    /// Toggle the heating program at `POST /api/v3/systems/`
    async fn toggle_program(&self, session: &Session, device_id: &str, program: bool)
    -> Result<()>;

    /// Current reading at `GET /api/v3/temperature/{id}/`
    async fn get_temperature(&self, device_id: &str) -> Result<f64>;

    /// Current target and relay state at `GET /api/v3/target/{id}/`
    async fn get_target(&self, device_id: &str) -> Result<OverrideInfo>;

    /// Replace the period list at `POST /api/v3/periods/{id}/`
    async fn set_periods(
        &self,
        session: &Session,
        device_id: &str,
        periods: &[Period],
    ) -> Result<Device>;

    /// Request a temporary override at `POST /api/v3/advance/{id}/`
    async fn trigger_advance(
        &self,
        session: &Session,
        device_id: &str,
        end_time: i64,
    ) -> Result<Device>;
}

/// Reqwest-backed API client
pub struct HttpThermostatApi {
    client: reqwest::Client,
    base_url: String,
    logger: crate::logging::StructuredLogger,
}

impl HttpThermostatApi {
    /// Create a new client for the given server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(HestiaError::config(format!(
                "Base URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let logger = get_logger("api");
        Ok(Self {
            client,
            base_url,
            logger,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-200 response to an error, extracting the service's `detail` message
    async fn error_from_response(response: reqwest::Response) -> HestiaError {
        let status = response.status().as_u16();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or_else(|| format!("status {}", status));
        HestiaError::api(status, message)
    }

    async fn parse_ok<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if response.status().as_u16() != 200 {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl ThermostatApi for HttpThermostatApi {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let url = format!("{}/token/", self.base_url);
        let form = reqwest::multipart::Form::new()
            .text("username", username.to_string())
            .text("password", password.to_string());

        let response = self.client.post(&url).multipart(form).send().await?;
        if response.status().as_u16() != 200 {
            let status = response.status().as_u16();
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or_else(|| format!("status {}", status));
            self.logger.warn(&format!("Login rejected: {}", detail));
            return Err(HestiaError::auth(detail));
        }
        Ok(response.json::<Session>().await?)
    }

    async fn list_systems(&self, session: Option<&Session>) -> Result<Vec<Device>> {
        let url = format!("{}/api/v3/systems/", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(session) = session {
            request = request.header(AUTHORIZATION, session.header_value());
        }
        let response = request.send().await?;
        Self::parse_ok(response).await
    }

    async fn toggle_program(
        &self,
        session: &Session,
        device_id: &str,
        program: bool,
    ) -> Result<()> {
        let url = format!("{}/api/v3/systems/", self.base_url);
        let body = serde_json::json!({ "system_id": device_id, "program": program });
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, session.header_value())
            .json(&body)
            .send()
            .await?;
        // The toggle response body is not part of the contract; only the status matters
        if response.status().as_u16() != 200 {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    async fn get_temperature(&self, device_id: &str) -> Result<f64> {
        let url = format!("{}/api/v3/temperature/{}/", self.base_url, device_id);
        let response = self.client.get(&url).send().await?;
        let body: TemperatureResponse = Self::parse_ok(response).await?;
        Ok(body.temperature)
    }

    async fn get_target(&self, device_id: &str) -> Result<OverrideInfo> {
        let url = format!("{}/api/v3/target/{}/", self.base_url, device_id);
        let response = self.client.get(&url).send().await?;
        Self::parse_ok(response).await
    }

    async fn set_periods(
        &self,
        session: &Session,
        device_id: &str,
        periods: &[Period],
    ) -> Result<Device> {
        let url = format!("{}/api/v3/periods/{}/", self.base_url, device_id);
        let body = serde_json::json!({ "periods": periods });
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, session.header_value())
            .json(&body)
            .send()
            .await?;
        Self::parse_ok(response).await
    }

    async fn trigger_advance(
        &self,
        session: &Session,
        device_id: &str,
        end_time: i64,
    ) -> Result<Device> {
        let url = format!("{}/api/v3/advance/{}/", self.base_url, device_id);
        let body = serde_json::json!({ "end_time": end_time });
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, session.header_value())
            .json(&body)
            .send()
            .await?;
        Self::parse_ok(response).await
    }
}
