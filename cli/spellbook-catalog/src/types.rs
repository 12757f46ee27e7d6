//! Catalog interaction types.
//!
//! These types represent the domain model for catalog operations:
//! cards as served by the catalog, the filter criteria a search is
//! narrowed by, and the paging parameters of a search.

use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Result / pagination types
// ---------------------------------------------------------------------------

pub type ResultCount = Option<u64>;

/// Generic paginated result container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPage<T> {
    pub results: Vec<T>,
    /// Total number of matches across all pages, if the catalog reported it.
    pub count: ResultCount,
}

impl<T> Default for ResultsPage<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: None,
        }
    }
}

pub type CardsPage = ResultsPage<Card>;

/// The page sizes a search can be issued with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Ten,
    Twenty,
    Fifty,
    #[default]
    Hundred,
}

#[derive(Debug, Error, PartialEq)]
#[error("page size must be one of 10, 20, 50 or 100, got {0}")]
pub struct PageSizeError(pub String);

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or_else(|| PageSizeError(value.to_string()))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

impl FromStr for PageSize {
    type Err = PageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| PageSizeError(s.to_string()))?;
        PageSize::try_from(value)
    }
}

impl Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Unique identifier of a card in the catalog.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        CardId(value.to_string())
    }
}

/// A card as served by the catalog.
///
/// Cards are read-only snapshots, they are never modified locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Converted mana cost
    #[serde(default)]
    pub cmc: f64,
    #[serde(rename = "type", default)]
    pub type_line: String,
    /// Rules text, empty for cards without any
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
}

/// Body of the card search endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct CardsResponse {
    pub cards: Vec<Card>,
}

/// Body of the type enumeration endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct TypesResponse {
    pub types: Vec<String>,
}

/// Body of the subtype enumeration endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct SubtypesResponse {
    pub subtypes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// The colors a search can be narrowed by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Color {
    Red,
    White,
    Blue,
    Black,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown color '{0}', expected one of Red, White, Blue, Black")]
pub struct ColorParseError(pub String);

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::White, Color::Blue, Color::Black];
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ColorParseError(s.to_string()))
    }
}

/// The predicate a catalog search is narrowed by.
///
/// Submitted as a whole and replaced as a whole,
/// never edited in place once handed to a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Substring of the card name
    pub name: String,
    pub colors: IndexSet<Color>,
    pub types: IndexSet<String>,
    pub subtypes: IndexSet<String>,
    /// Substring of the rules text
    pub text: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Separator for multi-valued query parameters
pub const QUERY_VALUE_SEPARATOR: &str = "|";

/// All parameters of a single card search request.
#[derive(Debug, Clone, PartialEq)]
pub struct CardQuery {
    pub page: NonZeroU32,
    pub page_size: PageSize,
    pub criteria: FilterCriteria,
}

impl CardQuery {
    pub fn new(page: NonZeroU32, page_size: PageSize, criteria: FilterCriteria) -> Self {
        Self {
            page,
            page_size,
            criteria,
        }
    }

    /// Render the query string parameters of this search.
    ///
    /// `page`, `pageSize`, `name` and `text` are always sent.
    /// `colors`, `types` and `subtypes` are only sent if not empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("name", self.criteria.name.clone()),
            ("text", self.criteria.text.clone()),
        ];

        if !self.criteria.colors.is_empty() {
            pairs.push(("colors", join_values(&self.criteria.colors)));
        }
        if !self.criteria.types.is_empty() {
            pairs.push(("types", join_values(&self.criteria.types)));
        }
        if !self.criteria.subtypes.is_empty() {
            pairs.push(("subtypes", join_values(&self.criteria.subtypes)));
        }

        pairs
    }
}

fn join_values<T: Display>(values: &IndexSet<T>) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(QUERY_VALUE_SEPARATOR)
}
