// Application layer: wires the HTTP adapters into a session from any configuration source.

use crate::adapters::{NominatimGeocoder, SiteCatalogFetcher};
use crate::core::parser::SiteRecordParser;
use crate::core::session::SiteFinderSession;
use crate::core::ConfigProvider;
use crate::utils::error::Result;

pub type HttpSession = SiteFinderSession<SiteCatalogFetcher, NominatimGeocoder>;

pub fn build_session<C: ConfigProvider>(config: &C) -> Result<HttpSession> {
    let fetcher = SiteCatalogFetcher::from_config(config)?;
    let geocoder = NominatimGeocoder::from_config(config)?;
    let parser = SiteRecordParser::new(config.invalid_record_policy());

    tracing::debug!(
        "Session wired: catalog={} geocoder={} timeout={:?} policy={:?}",
        config.catalog_base_url(),
        config.geocoder_endpoint(),
        config.request_timeout(),
        config.invalid_record_policy()
    );
    Ok(SiteFinderSession::new(fetcher, parser, geocoder))
}
