//! Error types for the trade desk CLI.

use perp_gateway::error::GatewayError;

/// Main error type for the trade desk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Invalid RPC or indexer URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] alloy::primitives::hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(#[from] alloy::signers::local::LocalSignerError),

    #[error("Invalid decimal value `{0}`")]
    InvalidDecimal(String),

    #[error("Invalid transaction hash `{0}`")]
    InvalidTxHash(String),

    #[error("PRIVATE_KEY must be set to submit trades")]
    MissingPrivateKey,

    #[error("No trader address: pass --trader or set PRIVATE_KEY")]
    MissingTrader,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, Error>;
