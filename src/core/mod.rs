pub mod geocoder;
pub mod parser;
pub mod reconciler;
pub mod session;

pub use crate::domain::model::{
    CatalogState, Coordinate, GeocodedSite, Generation, Pin, Region, RegionCatalog, SiteId,
    TestingSite,
};
pub use crate::domain::ports::{CatalogSource, ConfigProvider, GeocodingService};
pub use crate::utils::error::Result;
