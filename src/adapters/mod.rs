// Adapters layer: concrete implementations for external systems (catalog feed, geocoding provider).

pub mod catalog;
pub mod nominatim;

pub use catalog::SiteCatalogFetcher;
pub use nominatim::NominatimGeocoder;
