use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use log::debug;
use serde::{Deserialize, Serialize};
use spellbook_catalog::CatalogClientConfig;
use spellbook_catalog::types::PageSize;

/// Name of spellbook managed directories
const SPELLBOOK_DIR_NAME: &str = "spellbook";
const SPELLBOOK_CONFIG_DIR_VAR: &str = "SPELLBOOK_CONFIG_DIR";
const SPELLBOOK_ENV_PREFIX: &str = "SPELLBOOK_";
pub const SPELLBOOK_CONFIG_FILE: &str = "spellbook.toml";

/// Describes the configuration of the spellbook CLI
#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Directory the user configuration file is read from (default:
    /// `$XDG_CONFIG_HOME/spellbook`)
    #[serde(default)]
    pub config_dir: Option<PathBuf>,

    /// The URL of the catalog API to use
    // Kept as a string, parsing as `Url` would add a trailing slash
    pub catalog_url: Option<String>,

    /// How many cards a page of search results holds
    #[serde(default)]
    pub page_size: PageSize,

    /// Value of the `user-agent` header sent to the catalog
    pub user_agent: Option<String>,

    /// Seconds to wait for a catalog response
    pub request_timeout_secs: Option<u64>,

    /// Seconds to wait for a connection to the catalog
    pub connect_timeout_secs: Option<u64>,
}

impl Config {
    fn read_raw_config() -> Result<HierarchicalConfig> {
        let config_dir = match env::var(SPELLBOOK_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${SPELLBOOK_CONFIG_DIR_VAR}` set: {v}");
                Some(PathBuf::from(v))
            },
            Err(_) => {
                let config_dir = dirs::config_dir().map(|dir| dir.join(SPELLBOOK_DIR_NAME));
                debug!("`${SPELLBOOK_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };

        let mut builder = HierarchicalConfig::builder()
            .set_default("page_size", i64::from(PageSize::default().get()))?;

        // read from /etc
        builder = builder.add_source(
            config::File::from(
                PathBuf::from("/etc")
                    .join(SPELLBOOK_DIR_NAME)
                    .join(SPELLBOOK_CONFIG_FILE),
            )
            .format(config::FileFormat::Toml)
            .required(false),
        );

        if let Some(config_dir) = config_dir {
            builder = builder
                .add_source(
                    config::File::from(config_dir.join(SPELLBOOK_CONFIG_FILE))
                        .format(config::FileFormat::Toml)
                        .required(false),
                )
                // Added for completeness, the config file cannot change the config dir
                .set_override("config_dir", config_dir.to_string_lossy().as_ref())?;
        }

        // override via env variables
        let spellbook_envs = env::vars()
            .filter(|(k, _)| k != SPELLBOOK_CONFIG_DIR_VAR)
            .filter_map(|(k, v)| {
                k.strip_prefix(SPELLBOOK_ENV_PREFIX)
                    .map(|k| (k.to_owned(), v))
            })
            .collect::<HashMap<_, _>>();

        let final_config = builder
            .add_source(
                Environment::default()
                    .source(Some(spellbook_envs))
                    .try_parsing(true),
            )
            .build()?;

        Ok(final_config)
    }

    /// Creates a [Config] from the config files and the environment
    pub fn parse() -> Result<Config> {
        let config: Config = Self::read_raw_config()?
            .try_deserialize()
            .context("Could not parse config")?;
        debug!("using config: {config:?}");
        Ok(config)
    }

    /// Settings of the catalog client derived from this configuration
    pub fn catalog_client_config(&self) -> CatalogClientConfig {
        let defaults = CatalogClientConfig::default();
        CatalogClientConfig {
            catalog_url: self.catalog_url.clone().unwrap_or(defaults.catalog_url),
            user_agent: Some(self.user_agent.clone().unwrap_or_else(|| {
                format!("{SPELLBOOK_DIR_NAME}/{}", env!("CARGO_PKG_VERSION"))
            })),
            connect_timeout: self
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            ..defaults
        }
    }
}
