use alloy::{
    contract,
    primitives::{Address, Bytes},
};
use alloy_sol_types::{Revert, SolError};

/// Revert marker the pool emits when a trade cannot be filled from the
/// liquidity currently available to the AMM.
pub(crate) const LIQUIDITY_MARKER_TEXT: &str = "trade amount exceeds liquidity";
/// Hex-encoded ASCII form of [`LIQUIDITY_MARKER_TEXT`], matched against raw
/// revert payloads that arrive undecoded.
pub(crate) const LIQUIDITY_MARKER_HEX: &str =
    "747261646520616d6f756e742065786365656473206c6971756964697479";

/// Error returned by gateway operations.
///
/// Indexer kinds never cross the reconciliation boundary or
/// [`list_symbols`](crate::gateway::Gateway::list_symbols); every other
/// kind reaches the caller with the underlying revert reason, when the chain
/// provides one, folded into its message.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("symbol not found: {symbol}: {detail}")]
    SymbolNotFound { symbol: String, detail: String },

    #[error("perpetual index {index} out of bounds for pool {pool} ({count} perpetuals)")]
    PerpetualIndexOutOfBounds {
        pool: Address,
        index: u32,
        count: usize,
    },

    #[error("liquidity pool read failed for {pool}: {detail}")]
    PoolRead { pool: Address, detail: String },

    #[error("account read failed for {trader} in {pool}/{index}: {detail}")]
    AccountRead {
        pool: Address,
        index: u32,
        trader: Address,
        detail: String,
    },

    #[error("indexer unavailable: {0}")]
    IndexerUnavailable(String),

    #[error("indexer query failed: {0}")]
    IndexerQuery(String),

    #[error("pool state is not synced; a price cannot be trusted until it is")]
    SyncRequired,

    #[error("trade amount exceeds available liquidity")]
    InsufficientLiquidity,

    #[error("quote failed: {0}")]
    Quote(String),

    #[error("invalid trade amount: {0}")]
    InvalidAmount(String),

    #[error("gas estimation failed: pool reports no perpetuals")]
    GasEstimation,

    #[error("trade submission failed: {0}")]
    TradeSubmission(String),

    #[error("receipt lookup failed: {0}")]
    ReceiptLookup(String),
}

impl GatewayError {
    pub(crate) fn pool_read(pool: Address, err: &contract::Error) -> Self {
        Self::PoolRead {
            pool,
            detail: call_failure_detail(err),
        }
    }

    pub(crate) fn account_read(
        pool: Address,
        index: u32,
        trader: Address,
        err: &contract::Error,
    ) -> Self {
        Self::AccountRead {
            pool,
            index,
            trader,
            detail: call_failure_detail(err),
        }
    }

    pub(crate) fn symbol_not_found(symbol: &str, detail: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            symbol: symbol.to_owned(),
            detail: detail.into(),
        }
    }

    pub(crate) fn trade_submission(err: &contract::Error) -> Self {
        Self::TradeSubmission(call_failure_detail(err))
    }
}

/// Classifies a failed trade simulation: a payload carrying the liquidity
/// marker becomes the distinguished [`GatewayError::InsufficientLiquidity`],
/// anything else stays a [`GatewayError::Quote`] with the reason preserved.
pub(crate) fn classify_quote_failure(err: &contract::Error) -> GatewayError {
    let detail = call_failure_detail(err);
    if is_liquidity_exhausted(&detail) {
        GatewayError::InsufficientLiquidity
    } else {
        GatewayError::Quote(detail)
    }
}

pub(crate) fn is_liquidity_exhausted(detail: &str) -> bool {
    detail.contains(LIQUIDITY_MARKER_TEXT)
        || detail.to_ascii_lowercase().contains(LIQUIDITY_MARKER_HEX)
}

/// Best human-readable cause of a failed contract call: the ABI-decoded
/// revert reason when the payload has one, the raw payload hex when it does
/// not decode, the transport's own message otherwise.
pub(crate) fn call_failure_detail(err: &contract::Error) -> String {
    match revert_data(err) {
        Some(data) => match decode_revert_reason(&data) {
            Some(reason) => reason,
            None => data.to_string(),
        },
        None => err.to_string(),
    }
}

fn revert_data(err: &contract::Error) -> Option<Bytes> {
    match err {
        contract::Error::TransportError(rpc_err) => rpc_err
            .as_error_resp()
            .and_then(|payload| payload.as_revert_data()),
        _ => None,
    }
}

fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data).ok().map(|revert| revert.reason)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::hex;

    use super::*;

    #[test]
    fn test_marker_hex_matches_marker_text() {
        assert_eq!(hex::encode(LIQUIDITY_MARKER_TEXT), LIQUIDITY_MARKER_HEX);
    }

    #[test]
    fn test_decoded_marker_is_liquidity_exhausted() {
        let encoded = Revert::from(format!("{LIQUIDITY_MARKER_TEXT}: 12.5")).abi_encode();
        let reason = decode_revert_reason(&encoded).unwrap();
        assert!(is_liquidity_exhausted(&reason));
    }

    #[test]
    fn test_raw_payload_marker_is_liquidity_exhausted() {
        let encoded = Revert::from(LIQUIDITY_MARKER_TEXT).abi_encode();
        let raw = Bytes::from(encoded).to_string();
        assert!(is_liquidity_exhausted(&raw));
    }

    #[test]
    fn test_other_reverts_keep_their_reason() {
        let encoded = Revert::from("trader margin unsafe").abi_encode();
        let reason = decode_revert_reason(&encoded).unwrap();
        assert!(!is_liquidity_exhausted(&reason));
        assert_eq!(reason, "trader margin unsafe");
    }

    #[test]
    fn test_undecodable_payload_is_not_liquidity_exhausted() {
        assert!(!is_liquidity_exhausted("0xdeadbeef"));
        assert!(!is_liquidity_exhausted("out of gas"));
    }
}
