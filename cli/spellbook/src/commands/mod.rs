mod browse;
mod search;
mod types;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use indoc::indoc;
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_catalog_client;
use crate::utils::message;

static SPELLBOOK_DESCRIPTION: &'_ str = indoc! {"
    Spellbook browses the card catalog and builds decks from the results.\n\n

    Search the catalog by name, color, type, subtype and rules text,
    or start an interactive session to page through cards and collect them into a deck."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, version, descr(SPELLBOOK_DESCRIPTION))]
pub struct SpellbookCli(#[bpaf(external(spellbook_args))] pub SpellbookArgs);

/// Main spellbook args parser
///
/// To parse the whole CLI, use [`SpellbookCli`] through [`spellbook_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)]
pub struct SpellbookArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl SpellbookArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let Some(command) = self.command else {
            message::plain(indoc! {"
                Spellbook browses the card catalog and builds decks.

                Get started with:
                  spellbook search --name <NAME>    Search the catalog
                  spellbook browse                  Browse cards and build a deck
                  spellbook --help                  List all commands
            "});
            return Ok(());
        };

        let client = init_catalog_client(&config)?;
        debug!(?command, "running command");

        match command {
            Commands::Search(args) => args.handle(config, client).await,
            Commands::Types(args) => args.handle(client).await,
            Commands::Subtypes(args) => args.handle(client).await,
            Commands::Browse(args) => args.handle(config, client).await,
        }
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Search the catalog for cards
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),

    /// List the card types the catalog knows about
    #[bpaf(command)]
    Types(#[bpaf(external(types::types))] types::Types),

    /// List the card subtypes the catalog knows about
    #[bpaf(command)]
    Subtypes(#[bpaf(external(types::subtypes))] types::Subtypes),

    /// Page through the catalog and build a deck interactively
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Commands::Search(_) => "search",
            Commands::Types(_) => "types",
            Commands::Subtypes(_) => "subtypes",
            Commands::Browse(_) => "browse",
        };
        write!(f, "{name}")
    }
}
