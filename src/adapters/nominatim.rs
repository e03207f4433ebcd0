use crate::domain::model::Coordinate;
use crate::domain::ports::{ConfigProvider, GeocodingService};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
}

/// Nominatim 相容的地址搜尋 API
pub struct NominatimGeocoder {
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        crate::utils::validation::validate_url("geocoder.endpoint", endpoint)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout,
            client,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.geocoder_endpoint(),
            config.geocoder_timeout(),
            config.user_agent(),
        )
    }
}

#[async_trait]
impl GeocodingService for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json")])
            .send()
            .await
            .map_err(|e| SiteError::from_transport(&self.endpoint, e, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteError::GeocodeError {
                message: format!("{} returned HTTP {}", self.endpoint, status.as_u16()),
            });
        }

        let candidates: Vec<Candidate> = response.json().await?;

        // 多筆結果時只取第一筆
        let Some(first) = candidates.first() else {
            return Ok(None);
        };
        let coordinate = match (first.lat.trim().parse::<f64>(), first.lon.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Coordinate::new(lat, lon),
            _ => {
                tracing::debug!(
                    "Unusable candidate for '{}': lat={:?} lon={:?}",
                    address,
                    first.lat,
                    first.lon
                );
                None
            }
        };
        Ok(coordinate)
    }
}
