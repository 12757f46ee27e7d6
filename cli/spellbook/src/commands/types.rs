use anyhow::{Result, anyhow};
use bpaf::Bpaf;
use spellbook_catalog::{Client, ClientTrait};
use tracing::instrument;

use crate::utils::message;

// List the card types the catalog knows about
#[derive(Debug, Bpaf, Clone)]
pub struct Types {
    /// Display the types as a JSON array
    #[bpaf(long)]
    pub json: bool,
}

impl Types {
    #[instrument(name = "types", fields(json = self.json), skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        let types = client
            .card_types()
            .await
            .map_err(|err| anyhow!(err.user_message()))?;
        print_labels(&types, self.json)
    }
}

// List the card subtypes the catalog knows about
#[derive(Debug, Bpaf, Clone)]
pub struct Subtypes {
    /// Display the subtypes as a JSON array
    #[bpaf(long)]
    pub json: bool,
}

impl Subtypes {
    #[instrument(name = "subtypes", fields(json = self.json), skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        let subtypes = client
            .card_subtypes()
            .await
            .map_err(|err| anyhow!(err.user_message()))?;
        print_labels(&subtypes, self.json)
    }
}

fn print_labels(labels: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(labels)?);
        return Ok(());
    }

    if labels.is_empty() {
        message::warning("The catalog didn't return any entries.");
        return Ok(());
    }

    for label in labels {
        println!("{label}");
    }
    Ok(())
}
