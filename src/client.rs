use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::error::WeatherError;
use crate::models::{AirQualityResponse, ForecastResponse, GeocodeCandidate, GeocodingResponse};

/// Query string pairs sent to Open-Meteo
pub type QueryParams = Vec<(&'static str, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Geocoding,
    Forecast,
    AirQuality,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Geocoding => "geocoding",
            Endpoint::Forecast => "forecast",
            Endpoint::AirQuality => "air quality",
        })
    }
}

/// Thin HTTP client for the three Open-Meteo APIs
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Arc<Client>,
    geocoding_url: String,
    forecast_url: String,
    air_quality_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            air_quality_url: config.air_quality_url.clone(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Geocoding => &self.geocoding_url,
            Endpoint::Forecast => &self.forecast_url,
            Endpoint::AirQuality => &self.air_quality_url,
        }
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        let url = self.url(endpoint);
        tracing::debug!("Requesting {} endpoint: {}", endpoint, url);

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "failed" };
                tracing::warn!("{} request {}: {}", endpoint, reason, e);
                WeatherError::upstream(format!("{endpoint} request {reason}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} request returned {}: {}", endpoint, status, body);
            return Err(WeatherError::upstream(format!(
                "{endpoint} request failed with status {status}: {}",
                body.trim()
            )));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Malformed {} response: {}", endpoint, e);
            WeatherError::upstream(format!("Malformed {endpoint} response: {e}"))
        })
    }

    /// Search the geocoder; results come back in upstream order
    pub async fn search(
        &self,
        name: &str,
        count: u32,
        country_code: Option<&str>,
    ) -> Result<Vec<GeocodeCandidate>, WeatherError> {
        let mut params: QueryParams = vec![
            ("name", name.to_string()),
            ("count", count.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(code) = country_code {
            params.push(("countryCode", code.to_string()));
        }

        let response: GeocodingResponse = self.make_request(Endpoint::Geocoding, &params).await?;
        Ok(response.results)
    }

    pub async fn forecast(&self, params: &QueryParams) -> Result<ForecastResponse, WeatherError> {
        self.make_request(Endpoint::Forecast, params).await
    }

    pub async fn air_quality(
        &self,
        params: &QueryParams,
    ) -> Result<AirQualityResponse, WeatherError> {
        self.make_request(Endpoint::AirQuality, params).await
    }
}
