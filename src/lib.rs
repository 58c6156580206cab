//! Perpetual-futures gateway.
//!
//! # Overview
//!
//! Orchestration layer between four collaborators of a perpetual-futures
//! deployment: the on-chain reader contract (batched pool/account views and
//! simulated trades), the on-chain symbol registry, the GraphQL indexer
//! mirroring chain state, and the liquidity pool contract that accepts
//! trade transactions.
//!
//! Use [`Network::from_name`] to pick a deployment, then drive everything
//! through [`gateway::Gateway`]: resolve a human symbol to a market, read
//! pool and account state, request an execution-price quote, and submit a
//! trade.
//!
//! Account reads reconcile the indexer's record against live chain storage
//! under one rule: indexer values are adopted only while its recorded
//! position equals the on-chain position exactly, and never touch balance
//! fields. A failing indexer degrades account reads, it does not fail them.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Market identifiers are resolved on every request; a registry-backed
//!   cache needs an invalidation story for registry upgrades first.
//!
//! * Trade submission is fire-and-forget: confirmation is the caller's
//!   loop around [`gateway::Gateway::trade_receipt`].
//!
//! # Testing
//!
//! [`testing`] module provides builders that assemble pool snapshots and
//! account storage without a chain connection.

pub mod abi;
pub mod error;
pub mod gateway;
pub mod indexer;
pub mod num;
pub mod state;
pub mod testing;
pub mod trade;
pub mod types;

use alloy::primitives::{Address, address};

use crate::error::GatewayError;

/// Network the gateway is operating on: one chain plus the two well-known
/// contract addresses every other component needs.
#[derive(Clone, Debug)]
pub struct Network {
    name: String,
    chain_id: u64,
    reader: Address,
    symbol_registry: Address,
}

impl Network {
    /// Resolves a supported network by name.
    ///
    /// Unrecognized names are a fatal configuration error: gateway
    /// construction must not proceed without a reader and a registry.
    pub fn from_name(name: &str) -> Result<Self, GatewayError> {
        match name {
            "mainnet" => Ok(Self::mainnet()),
            "kovan" => Ok(Self::kovan()),
            "arbitrum" => Ok(Self::arbitrum()),
            "arb-rinkeby" => Ok(Self::arb_rinkeby()),
            other => Err(GatewayError::Configuration(format!(
                "unsupported network `{other}` (expected one of: mainnet, kovan, arbitrum, arb-rinkeby)"
            ))),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_owned(),
            chain_id: 1,
            reader: address!("0x4ea4bd27dca9f12f57cd563b2c7ecca7af5ba741"),
            symbol_registry: address!("0xa4109d0a36e0e66d64f3b7794c60694ca6d66e22"),
        }
    }

    pub fn kovan() -> Self {
        Self {
            name: "kovan".to_owned(),
            chain_id: 42,
            reader: address!("0x708c17d0901b76cc5550ade4a1a6e3aedb876dcc"),
            symbol_registry: address!("0x02cbc73a8ed917dc4f04d8d0ae5d83ab71f9afa5"),
        }
    }

    pub fn arbitrum() -> Self {
        Self {
            name: "arbitrum".to_owned(),
            chain_id: 42161,
            reader: address!("0xf9ec2e6b0d7c41a875b157d306c580b8c2e0c2b0"),
            symbol_registry: address!("0x5c14afd0c2f2491ba4bd1e34fd05d6e2a5dc0cdb"),
        }
    }

    pub fn arb_rinkeby() -> Self {
        Self {
            name: "arb-rinkeby".to_owned(),
            chain_id: 421611,
            reader: address!("0xd595a0617c29e0d7a3b1bfffc5f1c7a9e1e48c39"),
            symbol_registry: address!("0x07315f8eca5c349716a77a5e69decbaecbdb91a4"),
        }
    }

    /// Private deployment escape hatch; the caller supplies every field.
    pub fn custom(name: String, chain_id: u64, reader: Address, symbol_registry: Address) -> Self {
        Self {
            name,
            chain_id,
            reader,
            symbol_registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn reader(&self) -> Address {
        self.reader
    }

    pub fn symbol_registry(&self) -> Address {
        self.symbol_registry
    }
}
