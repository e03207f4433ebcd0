use crate::adapters::catalog::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::adapters::nominatim::DEFAULT_GEOCODER_URL;
use crate::config::DEFAULT_USER_AGENT;
use crate::core::ConfigProvider;
use crate::domain::model::InvalidRecordPolicy;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    pub on_invalid_record: Option<InvalidRecordPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_HOST})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("catalog.base_url", self.catalog_base_url())?;
        crate::utils::validation::validate_url("geocoder.endpoint", self.geocoder_endpoint())?;
        crate::utils::validation::validate_range(
            "catalog.timeout_seconds",
            self.request_timeout().as_secs(),
            1,
            300,
        )?;
        crate::utils::validation::validate_range(
            "geocoder.timeout_seconds",
            self.geocoder_timeout().as_secs(),
            1,
            300,
        )?;
        crate::utils::validation::validate_non_empty_string(
            "geocoder.user_agent",
            self.user_agent(),
        )?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_base_url(&self) -> &str {
        self.catalog.base_url.as_deref().unwrap_or(DEFAULT_CATALOG_URL)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn geocoder_endpoint(&self) -> &str {
        self.geocoder.endpoint.as_deref().unwrap_or(DEFAULT_GEOCODER_URL)
    }

    fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn user_agent(&self) -> &str {
        self.geocoder.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn invalid_record_policy(&self) -> InvalidRecordPolicy {
        self.parser.on_invalid_record.unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
