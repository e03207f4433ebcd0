#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub const DEFAULT_USER_AGENT: &str = concat!("site-finder/", env!("CARGO_PKG_VERSION"));

#[cfg(feature = "cli")]
pub use cli::{CliConfig, OutputFormat};
