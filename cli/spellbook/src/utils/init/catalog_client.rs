use std::path::PathBuf;

use anyhow::{Context, bail};
use spellbook_catalog::{CatalogClient, Client, MockClient, SPELLBOOK_CATALOG_MOCK_DATA_VAR};
use tracing::debug;

use crate::config::Config;

/// Initialize the catalog client
///
/// - Initialize a mock client if `_SPELLBOOK_USE_CATALOG_MOCK` points at a mock data file
/// - Initialize a real client otherwise
pub fn init_catalog_client(config: &Config) -> Result<Client, anyhow::Error> {
    if let Ok(path_str) = std::env::var(SPELLBOOK_CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock catalog client");
        return Ok(MockClient::new(Some(path))
            .context("could not load mock catalog responses")?
            .into());
    }

    let client = CatalogClient::new(config.catalog_client_config())
        .context("could not create catalog client")?;
    debug!(catalog_url = client.catalog_url(), "using catalog client");
    Ok(client.into())
}
