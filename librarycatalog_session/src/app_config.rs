use anyhow::Context;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

use librarycatalog_records::api::BookDefaults;
use librarycatalog_records::search::PageLimits;

const ENV_PREFIX: &str = "LIBRARYCATALOG";

#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct CatalogConfig {
    pub app_name: String,
    pub log_level: String,
    pub placeholder_title: String,
    pub default_copies: u32,
    pub default_available: u32,
    pub search_page_size: usize,
    pub search_max_page_size: usize,
    pub loan_period_days: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            app_name: "librarycatalog".to_string(),
            log_level: "info".to_string(),
            placeholder_title: "Placeholder Title".to_string(),
            default_copies: 1,
            default_available: 1,
            search_page_size: 10,
            search_max_page_size: 100,
            loan_period_days: 14,
        }
    }
}

impl CatalogConfig {
    /// Built-in defaults, overridable with `LIBRARYCATALOG_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        Self::from_builder(
            Self::builder()?.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
        )
    }

    pub fn builder() -> anyhow::Result<ConfigBuilder<DefaultState>> {
        let defaults = Self::default();
        Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("log_level", defaults.log_level)?
            .set_default("placeholder_title", defaults.placeholder_title)?
            .set_default("default_copies", i64::from(defaults.default_copies))?
            .set_default("default_available", i64::from(defaults.default_available))?
            .set_default("search_page_size", defaults.search_page_size as i64)?
            .set_default("search_max_page_size", defaults.search_max_page_size as i64)?
            .set_default("loan_period_days", i64::from(defaults.loan_period_days))
            .context("Failed to set config defaults")
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to build config")?
            .try_deserialize()
            .context("Failed to deserialize config")?;
        if config.default_available > config.default_copies {
            anyhow::bail!(
                "Invalid book defaults: default_available {} is above default_copies {}",
                config.default_available,
                config.default_copies
            );
        }
        tracing::debug!("Loaded config {:?}", config);
        Ok(config)
    }

    pub fn book_defaults(&self) -> BookDefaults {
        BookDefaults {
            placeholder_title: self.placeholder_title.clone(),
            copies: self.default_copies,
            available: self.default_available,
        }
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.search_page_size,
            max_limit: self.search_max_page_size,
        }
    }
}
