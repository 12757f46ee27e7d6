//! A catalog client that serves canned responses.
//!
//! Responses are consumed in the order they were queued,
//! regardless of the query they answer.
//! They can be pushed programmatically or read from a JSON file
//! holding an array of [Response]s.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::client::ClientTrait;
use crate::error::CatalogClientError;
use crate::types::{CardQuery, CardsPage};

/// If set to the path of a mock data file, the CLI uses a [MockClient]
/// instead of talking to the catalog.
pub const SPELLBOOK_CATALOG_MOCK_DATA_VAR: &str = "_SPELLBOOK_USE_CATALOG_MOCK";

/// A single canned response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Response {
    Cards(CardsPage),
    Types(Vec<String>),
    Subtypes(Vec<String>),
    /// Fail the request with the given HTTP status
    Error { status: u16 },
}

#[derive(Debug, Error)]
pub enum MockDataError {
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    #[error("failed to parse mock response file")]
    ParseJson(#[source] serde_json::Error),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<Response>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<Response> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;
    Ok(deserialized.into())
}

/// A catalog client that can be seeded with mock responses
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    // Shared and locked so the trait can stay `&self`
    mock_responses: Arc<Mutex<VecDeque<Response>>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => {
                debug!(path = %path.as_ref().display(), "reading mock responses");
                read_mock_responses(path)?
            },
            None => VecDeque::new(),
        };
        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
        })
    }

    /// Push a new response into the list of mock responses
    pub fn push_response(&self, resp: Response) {
        if let Ok(mut responses) = self.mock_responses.lock() {
            responses.push_back(resp);
        }
    }

    pub fn push_cards_response(&self, resp: CardsPage) {
        self.push_response(Response::Cards(resp));
    }

    pub fn push_error_response(&self, status: u16) {
        self.push_response(Response::Error { status });
    }

    /// Number of responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.mock_responses
            .lock()
            .map(|responses| responses.len())
            .unwrap_or_default()
    }

    fn next_response(&self, expected: &str) -> Result<Response, CatalogClientError> {
        let next = self
            .mock_responses
            .lock()
            .map_err(|_| CatalogClientError::Other("mock responses poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Response::Error { status }) => Err(CatalogClientError::Status(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            )),
            Some(resp) => Ok(resp),
            None => Err(CatalogClientError::Other(format!(
                "no mock response left, expected {expected} response"
            ))),
        }
    }
}

fn unexpected(expected: &str, found: Response) -> CatalogClientError {
    CatalogClientError::Other(format!(
        "expected {expected} response, found {found:?}"
    ))
}

impl ClientTrait for MockClient {
    async fn search_cards(&self, query: &CardQuery) -> Result<CardsPage, CatalogClientError> {
        debug!(?query, "serving mock card search");
        match self.next_response("cards")? {
            Response::Cards(page) => Ok(page),
            other => Err(unexpected("cards", other)),
        }
    }

    async fn card_types(&self) -> Result<Vec<String>, CatalogClientError> {
        match self.next_response("types")? {
            Response::Types(types) => Ok(types),
            other => Err(unexpected("types", other)),
        }
    }

    async fn card_subtypes(&self) -> Result<Vec<String>, CatalogClientError> {
        match self.next_response("subtypes")? {
            Response::Subtypes(subtypes) => Ok(subtypes),
            other => Err(unexpected("subtypes", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::num::NonZeroU32;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::types::{FilterCriteria, PageSize};

    fn query() -> CardQuery {
        CardQuery::new(NonZeroU32::MIN, PageSize::Ten, FilterCriteria::default())
    }

    #[tokio::test]
    async fn responses_are_served_in_order() {
        let client = MockClient::new(None::<&Path>).unwrap();
        client.push_response(Response::Types(vec!["Creature".to_string()]));
        client.push_error_response(503);
        client.push_cards_response(CardsPage::default());

        assert_eq!(client.card_types().await.unwrap(), ["Creature"]);
        assert_eq!(
            client.card_subtypes().await.unwrap_err().status(),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
        assert_eq!(
            client.search_cards(&query()).await.unwrap(),
            CardsPage::default()
        );
        assert_eq!(client.remaining(), 0);
    }

    #[tokio::test]
    async fn mismatched_or_missing_response_is_an_error() {
        let client = MockClient::default();
        client.push_response(Response::Subtypes(vec![]));

        let mismatched = client.card_types().await;
        assert!(matches!(mismatched, Err(CatalogClientError::Other(_))));

        let exhausted = client.search_cards(&query()).await;
        assert!(matches!(exhausted, Err(CatalogClientError::Other(_))));
    }

    #[tokio::test]
    async fn reads_responses_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data = json!([
            { "kind": "types", "body": ["Land"] },
            { "kind": "cards", "body": {
                "results": [{ "id": "x", "name": "Forest", "type": "Basic Land — Forest" }],
                "count": 1
            }},
            { "kind": "error", "body": { "status": 500 } },
        ]);
        write!(file, "{data}").unwrap();

        let client = MockClient::new(Some(file.path())).unwrap();
        assert_eq!(client.remaining(), 3);
        assert_eq!(client.card_types().await.unwrap(), ["Land"]);

        let page = client.search_cards(&query()).await.unwrap();
        assert_eq!(page.count, Some(1));
        assert_eq!(page.results[0].name, "Forest");

        assert!(client.search_cards(&query()).await.is_err());
    }

    #[test]
    fn unreadable_file_is_reported() {
        let result = MockClient::new(Some("/does/not/exist.json"));
        assert!(matches!(result, Err(MockDataError::ReadMockFile(_))));
    }
}
