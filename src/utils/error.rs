use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Network error while requesting {url}: {message}")]
    NetworkError { url: String, message: String },

    #[error("Request to {url} timed out after {timeout_secs}s")]
    TimeoutError { url: String, timeout_secs: u64 },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Malformed catalog payload: {message}")]
    ParseError { message: String },

    #[error("Geocoding failed: {message}")]
    GeocodeError { message: String },

    #[error("Unsupported region: {name}")]
    UnsupportedRegionError { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    /// 將 reqwest 傳輸錯誤分成逾時與一般網路錯誤
    pub fn from_transport(url: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            SiteError::TimeoutError {
                url: url.to_string(),
                timeout_secs,
            }
        } else {
            SiteError::NetworkError {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::ApiError(_)
            | SiteError::NetworkError { .. }
            | SiteError::TimeoutError { .. }
            | SiteError::HttpStatusError { .. }
            | SiteError::GeocodeError { .. } => ErrorCategory::Network,
            SiteError::ParseError { .. } | SiteError::SerializationError(_) => ErrorCategory::Data,
            SiteError::UnsupportedRegionError { .. }
            | SiteError::ConfigError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SiteError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 抓取階段的錯誤 (網路、逾時、非 2xx)
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            SiteError::ApiError(_)
                | SiteError::NetworkError { .. }
                | SiteError::TimeoutError { .. }
                | SiteError::HttpStatusError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::TimeoutError { .. } => {
                "The testing site catalog took too long to respond".to_string()
            }
            SiteError::HttpStatusError { status, .. } => {
                format!("The testing site catalog is unavailable (HTTP {})", status)
            }
            SiteError::ApiError(_) | SiteError::NetworkError { .. } => {
                "Could not reach the testing site catalog".to_string()
            }
            SiteError::ParseError { .. } | SiteError::SerializationError(_) => {
                "The testing site catalog returned data in an unexpected format".to_string()
            }
            SiteError::GeocodeError { .. } => "Could not locate an address".to_string(),
            SiteError::UnsupportedRegionError { name } => {
                format!("'{}' is not a supported state", name)
            }
            SiteError::ConfigError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => format!("Invalid configuration: {}", self),
            SiteError::IoError(_) => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Network => {
                "Check your network connection and select the state again".to_string()
            }
            ErrorCategory::Data => {
                "The feed may be temporarily broken; try again later or pick another state"
                    .to_string()
            }
            ErrorCategory::Configuration => match self {
                SiteError::UnsupportedRegionError { .. } => {
                    "Run with --list-regions to see the supported states".to_string()
                }
                _ => "Review the command line flags or the TOML configuration file".to_string(),
            },
            ErrorCategory::System => "Check file permissions and available resources".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_are_network_category() {
        let timeout = SiteError::TimeoutError {
            url: "https://example.com".to_string(),
            timeout_secs: 10,
        };
        let status = SiteError::HttpStatusError {
            url: "https://example.com".to_string(),
            status: 404,
        };

        assert!(timeout.is_fetch_error());
        assert!(status.is_fetch_error());
        assert_eq!(timeout.category(), ErrorCategory::Network);
        assert_eq!(status.severity(), ErrorSeverity::Medium);
        assert!(status.user_friendly_message().contains("404"));
    }

    #[test]
    fn test_parse_error_is_not_fetch_error() {
        let err = SiteError::ParseError {
            message: "expected array".to_string(),
        };
        assert!(!err.is_fetch_error());
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_unsupported_region_suggests_listing() {
        let err = SiteError::UnsupportedRegionError {
            name: "Texas".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("--list-regions"));
    }
}
