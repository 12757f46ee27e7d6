//! Catalog client and the trait shared with its mock.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::mock::MockClient;
use crate::types::*;

const CARDS_ENDPOINT: &str = "cards";
const TYPES_ENDPOINT: &str = "types";
const SUBTYPES_ENDPOINT: &str = "subtypes";

/// Response header carrying the number of cards matching a search
const TOTAL_COUNT_HEADER: &str = "total-count";

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The complete catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: GET requests against the remote catalog via [`CatalogClient`]
/// - **Mock**: Canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one page of cards matching the query's filter criteria.
    async fn search_cards(&self, query: &CardQuery) -> Result<CardsPage, CatalogClientError>;

    /// Fetch every card type known to the catalog.
    async fn card_types(&self) -> Result<Vec<String>, CatalogClientError>;

    /// Fetch every card subtype known to the catalog.
    async fn card_subtypes(&self) -> Result<Vec<String>, CatalogClientError>;
}

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// A client for the remote card catalog.
///
/// Handles:
/// - HTTP client configuration with timeouts
/// - Extra headers and user agent on every request
/// - Mapping transport, status and payload failures to [`CatalogClientError`]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        // Endpoints are joined onto the base, which therefore has to end in a slash.
        let base_url = Url::parse(&format!("{}/", config.catalog_url.trim_end_matches('/')))
            .map_err(|e| {
                CatalogClientError::Other(format!(
                    "invalid catalog url '{}': {e}",
                    config.catalog_url
                ))
            })?;

        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    /// Issue a GET request and reject any unsuccessful status.
    async fn get(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<reqwest::Response, CatalogClientError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| CatalogClientError::Other(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(CatalogClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, endpoint, "catalog returned an error status");
            return Err(CatalogClientError::Status(status));
        }

        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// ClientTrait implementation for CatalogClient
// ---------------------------------------------------------------------------

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(
        page = %query.page,
        page_size = %query.page_size,
        progress = "Searching for cards in catalog"))]
    async fn search_cards(&self, query: &CardQuery) -> Result<CardsPage, CatalogClientError> {
        let pairs = query.query_pairs();
        debug!(?pairs, "sending card search request");

        let response = self.get(CARDS_ENDPOINT, &pairs).await?;
        let count = total_count(response.headers());
        let body: CardsResponse = decode_body(response).await?;

        debug!(n_cards = body.cards.len(), ?count, "received cards");

        Ok(CardsPage {
            results: body.cards,
            count,
        })
    }

    #[instrument(skip_all)]
    async fn card_types(&self) -> Result<Vec<String>, CatalogClientError> {
        let response = self.get(TYPES_ENDPOINT, &[]).await?;
        let body: TypesResponse = decode_body(response).await?;
        debug!(n_types = body.types.len(), "received card types");
        Ok(body.types)
    }

    #[instrument(skip_all)]
    async fn card_subtypes(&self) -> Result<Vec<String>, CatalogClientError> {
        let response = self.get(SUBTYPES_ENDPOINT, &[]).await?;
        let body: SubtypesResponse = decode_body(response).await?;
        debug!(n_subtypes = body.subtypes.len(), "received card subtypes");
        Ok(body.subtypes)
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Read the full body and parse it as JSON.
///
/// The body is read before parsing,
/// so that transport errors and malformed payloads stay distinguishable.
async fn decode_body<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CatalogClientError> {
    let body = response
        .bytes()
        .await
        .map_err(CatalogClientError::Transport)?;
    serde_json::from_slice(&body).map_err(CatalogClientError::InvalidResponse)
}

/// Parse the total number of matches, ignoring a missing or garbled header.
fn total_count(headers: &HeaderMap) -> ResultCount {
    headers
        .get(TOTAL_COUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client used for every catalog request.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}

#[cfg(test)]
pub mod tests {
    use std::collections::BTreeMap;
    use std::num::NonZeroU32;

    use httpmock::MockServer;
    use httpmock::Method::GET;
    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;

    fn client_config(url: &str) -> CatalogClientConfig {
        CatalogClientConfig {
            catalog_url: url.to_string(),
            ..Default::default()
        }
    }

    fn first_page() -> CardQuery {
        CardQuery::new(
            NonZeroU32::MIN,
            PageSize::default(),
            FilterCriteria::default(),
        )
    }

    fn card_json(id: &str, name: &str, cmc: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "cmc": cmc,
            "type": "Creature — Goblin",
            "text": "Haste",
        })
    }

    #[tokio::test]
    async fn search_sends_required_params_and_parses_cards() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cards")
                .query_param("page", "1")
                .query_param("pageSize", "100")
                .query_param("name", "")
                .query_param("text", "");
            then.status(200)
                .header("Total-Count", "2")
                .json_body(json!({
                    "cards": [card_json("a", "Goblin Guide", 1), card_json("b", "Goblin King", 3)]
                }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let page = client.search_cards(&first_page()).await.unwrap();

        mock.assert();
        assert_eq!(page.count, Some(2));
        assert_eq!(
            page.results.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["Goblin Guide", "Goblin King"]
        );
    }

    #[tokio::test]
    async fn search_sends_joined_filter_sets() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cards")
                .query_param("page", "4")
                .query_param("pageSize", "10")
                .query_param("name", "bolt")
                .query_param("text", "damage")
                .query_param("colors", "Red|White")
                .query_param("types", "Instant")
                .query_param("subtypes", "Arcane|Trap");
            then.status(200).json_body(json!({ "cards": [] }));
        });

        let criteria = FilterCriteria {
            name: "bolt".to_string(),
            colors: IndexSet::from([Color::Red, Color::White]),
            types: IndexSet::from(["Instant".to_string()]),
            subtypes: IndexSet::from(["Arcane".to_string(), "Trap".to_string()]),
            text: "damage".to_string(),
        };
        let query = CardQuery::new(NonZeroU32::new(4).unwrap(), PageSize::Ten, criteria);

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let page = client.search_cards(&query).await.unwrap();

        mock.assert();
        assert!(page.results.is_empty());
        assert_eq!(page.count, None);
    }

    #[tokio::test]
    async fn base_url_with_path_keeps_prefix() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/types");
            then.status(200).json_body(json!({ "types": ["Artifact", "Creature"] }));
        });

        let client =
            CatalogClient::new(client_config(&format!("{}/v1/", server.base_url()))).unwrap();
        let types = client.card_types().await.unwrap();

        mock.assert();
        assert_eq!(types, ["Artifact", "Creature"]);
    }

    #[tokio::test]
    async fn subtypes_are_parsed() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/subtypes");
            then.status(200).json_body(json!({ "subtypes": ["Elf", "Goblin"] }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let subtypes = client.card_subtypes().await.unwrap();

        mock.assert();
        assert_eq!(subtypes, ["Elf", "Goblin"]);
    }

    #[tokio::test]
    async fn extra_headers_set_on_all_requests() {
        let mut extra_headers: BTreeMap<String, String> = BTreeMap::new();
        extra_headers.insert("spellbook-test".to_string(), "test-value".to_string());
        extra_headers.insert("spellbook-test2".to_string(), "test-value2".to_string());

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("spellbook-test", "test-value")
                .header("spellbook-test2", "test-value2");
            then.status(200).json_body(json!({ "types": [] }));
        });

        let config = CatalogClientConfig {
            extra_headers,
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.card_types().await;
        mock.assert();
    }

    #[tokio::test]
    async fn user_agent_set_on_all_requests() {
        let expected_agent = "my-custom-user-agent";

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("user-agent", expected_agent);
            then.status(200).json_body(json!({ "subtypes": [] }));
        });

        let config = CatalogClientConfig {
            user_agent: Some(expected_agent.to_owned()),
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.card_subtypes().await;
        mock.assert();
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = CatalogClient::new(client_config("not a url"));
        assert!(
            matches!(result, Err(CatalogClientError::Other(_))),
            "expected CatalogClientError::Other, found: {result:?}"
        );
    }

    // region: Error response handling
    //
    // Any status outside of 2xx is an error, regardless of the body.
    // Successful responses whose body doesn't match the expected shape
    // are reported as `CatalogClientError::InvalidResponse`.

    #[tokio::test]
    async fn server_error_is_status_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(500)
                .header("content-type", "application/json")
                .json_body(json!({ "error": "(╯°□°)╯︵ ┻━┻ " }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.search_cards(&first_page()).await;
        assert!(
            matches!(
                result,
                Err(CatalogClientError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
            ),
            "expected status error, found: {result:?}"
        );
        mock.assert()
    }

    #[tokio::test]
    async fn not_found_is_status_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(404);
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.card_types().await;
        assert_eq!(result.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
        mock.assert()
    }

    #[tokio::test]
    async fn unexpected_shape_is_invalid_response() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(200).json_body(json!({ "unknown": "ceramic" }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.search_cards(&first_page()).await;
        assert!(
            matches!(result, Err(CatalogClientError::InvalidResponse(_))),
            "expected CatalogClientError::InvalidResponse, found: {result:?}"
        );
        mock.assert()
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(200).body("<html>maintenance</html>");
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.card_subtypes().await;
        assert!(
            matches!(result, Err(CatalogClientError::InvalidResponse(_))),
            "expected CatalogClientError::InvalidResponse, found: {result:?}"
        );
        mock.assert()
    }

    /// Nothing listens on the discard port
    #[tokio::test]
    async fn unreachable_catalog_is_transport_error() {
        let client = CatalogClient::new(client_config("http://127.0.0.1:9")).unwrap();
        let result = client.card_types().await;
        assert!(
            matches!(result, Err(CatalogClientError::Transport(_))),
            "expected CatalogClientError::Transport, found: {result:?}"
        );
    }

    // endregion

    #[test]
    fn total_count_ignores_garbage() {
        let mut headers = HeaderMap::new();
        assert_eq!(total_count(&headers), None);
        headers.insert(TOTAL_COUNT_HEADER, "many".parse().unwrap());
        assert_eq!(total_count(&headers), None);
        headers.insert(TOTAL_COUNT_HEADER, "42".parse().unwrap());
        assert_eq!(total_count(&headers), Some(42));
    }
}
