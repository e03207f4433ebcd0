use crate::adapters::catalog::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::adapters::nominatim::DEFAULT_GEOCODER_URL;
use crate::core::ConfigProvider;
use crate::domain::model::{InvalidRecordPolicy, Region};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "site-finder")]
#[command(about = "Find COVID-19 testing sites for a US state and geocode them into map pins")]
pub struct CliConfig {
    #[arg(long, short, default_value = "California")]
    pub region: Region,

    #[arg(long, help = "List the supported states and exit")]
    pub list_regions: bool,

    #[arg(long, help = "Load settings from a TOML file instead of the flags below")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    #[arg(long, default_value = DEFAULT_GEOCODER_URL)]
    pub geocoder_url: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value = crate::config::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, default_value = "skip", help = "skip | stop")]
    pub on_invalid_record: InvalidRecordPolicy,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn catalog_base_url(&self) -> &str {
        &self.catalog_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder_url
    }

    fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn invalid_record_policy(&self) -> InvalidRecordPolicy {
        self.on_invalid_record
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("--catalog-url", &self.catalog_url)?;
        validation::validate_url("--geocoder-url", &self.geocoder_url)?;
        validation::validate_range("--timeout-seconds", self.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("--user-agent", &self.user_agent)?;
        Ok(())
    }
}
