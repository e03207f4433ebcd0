use crate::domain::model::{Coordinate, Region, TestingSite};
use crate::domain::ports::GeocodingService;

/// 包裝地理編碼服務：組出查詢字串，並把所有失敗收斂成「沒有座標」
pub struct AddressGeocoder<G: GeocodingService> {
    service: G,
}

impl<G: GeocodingService> AddressGeocoder<G> {
    pub fn new(service: G) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    pub async fn geocode(&self, site: &TestingSite, region: Region) -> Option<Coordinate> {
        let address = site.geocode_query(region);
        self.geocode_address(&address).await
    }

    pub async fn geocode_address(&self, address: &str) -> Option<Coordinate> {
        tracing::debug!("Geocoding address: {}", address);

        match self.service.resolve(address).await {
            Ok(Some(coordinate)) => {
                tracing::debug!(
                    "Resolved '{}' to ({}, {})",
                    address,
                    coordinate.latitude,
                    coordinate.longitude
                );
                Some(coordinate)
            }
            Ok(None) => {
                tracing::warn!("🔍 No geocoding match for '{}'", address);
                None
            }
            Err(e) => {
                tracing::warn!("⚠️ Geocoding failed for '{}': {}", address, e);
                None
            }
        }
    }
}
