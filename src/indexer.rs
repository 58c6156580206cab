//! Client for the external indexing service.
//!
//! The indexer mirrors chain state with richer historical fields but may
//! lag the chain head, so it is consumed best-effort everywhere: see
//! [`crate::gateway::Gateway::account`] for the reconciliation contract.

use std::time::Duration;

use alloy::primitives::Address;
use fastnum::D256;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::GatewayError, num, types};

/// Bound on any single query/response exchange with the indexer.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

const MARGIN_ACCOUNT_QUERY: &str = "\
query ($user: String!, $perpetual: String!) {
  marginAccounts(where: {user: $user, perpetual: $perpetual}) {
    position
    entryValue
    entryFunding
  }
}";

const SYMBOL_LIST_QUERY: &str = "\
query {
  perpetuals(orderBy: symbol) {
    symbol
  }
}";

#[derive(Debug, Serialize)]
struct GraphQuery {
    query: String,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MarginAccountData {
    #[serde(rename = "marginAccounts")]
    margin_accounts: Vec<MarginAccountRecord>,
}

#[derive(Debug, Deserialize)]
struct MarginAccountRecord {
    position: String,
    #[serde(rename = "entryValue")]
    entry_value: String,
    #[serde(rename = "entryFunding")]
    entry_funding: String,
}

#[derive(Debug, Deserialize)]
struct PerpetualListData {
    perpetuals: Vec<PerpetualSymbol>,
}

#[derive(Debug, Deserialize)]
struct PerpetualSymbol {
    symbol: String,
}

/// One trader's margin-account record as the indexer sees it.
///
/// Lower trust than chain storage: only the entry basis is ever adopted
/// from here, and only under the position-equality rule of
/// [`crate::state::AccountStorage::reconcile`].
#[derive(Clone, Copy, derive_more::Debug)]
pub struct IndexedAccountRecord {
    #[debug("{position}")]
    position: D256,
    #[debug("{entry_value}")]
    entry_value: D256,
    #[debug("{entry_funding}")]
    entry_funding: D256,
}

impl IndexedAccountRecord {
    pub fn new(position: D256, entry_value: D256, entry_funding: D256) -> Self {
        Self {
            position,
            entry_value,
            entry_funding,
        }
    }

    fn from_record(record: &MarginAccountRecord) -> Result<Self, GatewayError> {
        Ok(Self {
            position: parse_decimal(&record.position)?,
            entry_value: parse_decimal(&record.entry_value)?,
            entry_funding: parse_decimal(&record.entry_funding)?,
        })
    }

    pub fn position(&self) -> D256 {
        self.position
    }

    pub fn entry_value(&self) -> D256 {
        self.entry_value
    }

    pub fn entry_funding(&self) -> D256 {
        self.entry_funding
    }
}

fn parse_decimal(value: &str) -> Result<D256, GatewayError> {
    D256::from_str(value, num::context())
        .map_err(|_| GatewayError::IndexerQuery(format!("malformed decimal `{value}` in record")))
}

/// Client for the indexing service's single POST query endpoint.
#[derive(Clone, Debug)]
pub struct IndexerClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl IndexerClient {
    pub fn new(endpoint: Url) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .map_err(|err| GatewayError::Configuration(format!("indexer HTTP client: {err}")))?;
        Ok(Self { endpoint, client })
    }

    /// Indexed margin-account record for `trader` in `market`, or `None`
    /// when the indexer has never seen this account.
    pub async fn margin_account(
        &self,
        trader: Address,
        market: &types::Market,
    ) -> Result<Option<IndexedAccountRecord>, GatewayError> {
        let variables = serde_json::json!({
            "user": format!("{trader:#x}"),
            "perpetual": market.indexer_key(),
        });
        let data: MarginAccountData = self.query(MARGIN_ACCOUNT_QUERY, variables).await?;
        data.margin_accounts
            .first()
            .map(IndexedAccountRecord::from_record)
            .transpose()
    }

    /// Symbols of every market the indexer knows, in index order.
    pub async fn symbols(&self) -> Result<Vec<String>, GatewayError> {
        let data: PerpetualListData = self
            .query(SYMBOL_LIST_QUERY, serde_json::Value::Null)
            .await?;
        Ok(data.perpetuals.into_iter().map(|perp| perp.symbol).collect())
    }

    /// Single query/response exchange against the indexer.
    ///
    /// Transport, timeout, and shape failures are
    /// [`GatewayError::IndexerUnavailable`]; an error envelope with at
    /// least one message is [`GatewayError::IndexerQuery`] carrying the
    /// first message.
    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GraphQuery {
                query: query.to_owned(),
                variables,
            })
            .send()
            .await
            .map_err(|err| GatewayError::IndexerUnavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| GatewayError::IndexerUnavailable(err.to_string()))?;
        let envelope: GraphResponse<T> = response
            .json()
            .await
            .map_err(|err| GatewayError::IndexerUnavailable(err.to_string()))?;
        if let Some(errors) = envelope.errors
            && let Some(first) = errors.into_iter().next()
        {
            return Err(GatewayError::IndexerQuery(first.message));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::IndexerQuery("response carried no data".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::dec256;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };
    use tokio_test::assert_ok;

    use super::*;

    async fn serve_once(body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn trader() -> Address {
        address!("0xdF5B718d8FcC173335185a2a1513eE8151e3c027")
    }

    fn market() -> types::Market {
        types::Market::new(address!("0x9C216D1Ab3e0407b3d6F1d5e9EfFe6d01C326ab7"), 0)
    }

    #[tokio::test]
    async fn test_margin_account_decodes_record() {
        let endpoint = serve_once(
            r#"{"data":{"marginAccounts":[{"position":"-2.5","entryValue":"-5000","entryFunding":"-3"}]}}"#,
        )
        .await;
        let client = IndexerClient::new(endpoint).unwrap();

        let record = assert_ok!(client.margin_account(trader(), &market()).await);
        let record = record.unwrap();
        assert_eq!(record.position(), dec256!(-2.5));
        assert_eq!(record.entry_value(), dec256!(-5000));
        assert_eq!(record.entry_funding(), dec256!(-3));
    }

    #[tokio::test]
    async fn test_margin_account_missing_record_is_none() {
        let endpoint = serve_once(r#"{"data":{"marginAccounts":[]}}"#).await;
        let client = IndexerClient::new(endpoint).unwrap();

        let record = assert_ok!(client.margin_account(trader(), &market()).await);
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_error_envelope_is_query_error_with_message() {
        let endpoint = serve_once(r#"{"errors":[{"message":"indexing degraded"}]}"#).await;
        let client = IndexerClient::new(endpoint).unwrap();

        let err = client.symbols().await.unwrap_err();
        match err {
            GatewayError::IndexerQuery(message) => assert_eq!(message, "indexing degraded"),
            other => panic!("expected IndexerQuery, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_shape_is_unavailable() {
        let endpoint = serve_once(r#"{"data":{"markets":[]}}"#).await;
        let client = IndexerClient::new(endpoint).unwrap();

        let err = client.symbols().await.unwrap_err();
        assert!(matches!(err, GatewayError::IndexerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_symbols_lists_every_market() {
        let endpoint =
            serve_once(r#"{"data":{"perpetuals":[{"symbol":"00001"},{"symbol":"00002"}]}}"#).await;
        let client = IndexerClient::new(endpoint).unwrap();

        let symbols = assert_ok!(client.symbols().await);
        assert_eq!(symbols, vec!["00001", "00002"]);
    }
}
