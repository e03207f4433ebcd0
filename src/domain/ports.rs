use crate::domain::model::{Coordinate, InvalidRecordPolicy, Region};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Raw JSON body of the region's testing site feed.
    async fn fetch(&self, region: Region) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// `Ok(None)` means the provider answered but had no usable match.
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>>;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn geocoder_endpoint(&self) -> &str;
    fn geocoder_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
    fn invalid_record_policy(&self) -> InvalidRecordPolicy;
}
