use crate::domain::model::Region;
use crate::domain::ports::{CatalogSource, ConfigProvider};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CATALOG_URL: &str = "https://covid-19-testing.github.io";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// 從公開資料源抓取某州的檢測站 JSON
pub struct SiteCatalogFetcher {
    base_url: Url,
    timeout: Duration,
    client: Client,
}

impl SiteCatalogFetcher {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| SiteError::InvalidConfigValueError {
            field: "catalog.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        // 確保 join 時不會吃掉最後一段路徑
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.catalog_base_url(),
            config.request_timeout(),
            config.user_agent(),
        )
    }

    pub fn catalog_url(&self, region: Region) -> Result<Url> {
        self.base_url
            .join(&format!("locations/{}/complete.json", region.slug()))
            .map_err(|e| SiteError::ConfigError {
                message: format!("Cannot build catalog URL for {}: {}", region, e),
            })
    }
}

#[async_trait]
impl CatalogSource for SiteCatalogFetcher {
    async fn fetch(&self, region: Region) -> Result<Vec<u8>> {
        let url = self.catalog_url(region)?;
        let timeout_secs = self.timeout.as_secs();

        tracing::debug!("Making catalog request to: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SiteError::from_transport(url.as_str(), e, timeout_secs))?;

        let status = response.status();
        tracing::debug!("Catalog response status: {}", status);

        if !status.is_success() {
            return Err(SiteError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SiteError::from_transport(url.as_str(), e, timeout_secs))?;
        Ok(body.to_vec())
    }
}
