pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};

pub use adapters::{NominatimGeocoder, SiteCatalogFetcher};
pub use app::{build_session, HttpSession};
pub use config::toml_config::TomlConfig;
pub use self::core::{
    geocoder::AddressGeocoder,
    parser::{InvalidRecordPolicy, ParseReport, SiteRecordParser},
    reconciler::{AnnotationReconciler, Reconciliation},
    session::{GeocodeCompletion, SiteFinderSession},
};
pub use domain::model::{
    CatalogState, Coordinate, GeocodeStatus, GeocodedSite, Generation, Pin, Region,
    RegionCatalog, SiteId, TestingSite,
};
pub use domain::ports::{CatalogSource, ConfigProvider, GeocodingService};
pub use utils::error::{Result, SiteError};
