//! Configuration for the trade desk.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): network, endpoints, keys
//! - CLI arguments: the command to run and its parameters

use clap::{Parser, Subcommand};

/// Environment configuration (connection details, credentials).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Network name (mainnet, kovan, arbitrum, arb-rinkeby)
    pub network: String,

    /// RPC URL for the node
    pub node_rpc_url: String,

    /// GraphQL endpoint of the indexer, if one is deployed
    pub indexer_url: Option<String>,

    /// Private key for signing trades; read-only commands run without it
    pub private_key: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

/// CLI arguments for the trade desk.
#[derive(Debug, Parser)]
#[command(name = "trade-desk")]
#[command(about = "Trade desk for perpetual-futures markets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the resolved network configuration
    Network,

    /// List every market symbol the indexer knows
    Symbols,

    /// Show one market's state and tradability
    Market {
        /// Market symbol (e.g. "00001")
        symbol: String,
    },

    /// Show a trader's margin account for a market
    Account {
        symbol: String,

        /// Trader address; defaults to the wallet address when PRIVATE_KEY is set
        #[arg(long)]
        trader: Option<String>,
    },

    /// Request an execution-price quote without broadcasting anything
    Quote {
        symbol: String,

        /// Signed amount; negative sells
        amount: String,

        /// Trader to simulate for; defaults to the wallet address
        #[arg(long)]
        trader: Option<String>,

        /// Only reduce an existing position
        #[arg(long)]
        close_only: bool,
    },

    /// Sign and broadcast a trade
    Trade {
        symbol: String,

        /// Signed amount; negative sells
        amount: String,

        /// Worst acceptable execution price ("0" disables the bound)
        limit_price: String,

        /// Only reduce an existing position
        #[arg(long)]
        close_only: bool,

        /// Gas price in gwei; defaults to the node's estimate
        #[arg(long)]
        gas_price: Option<String>,
    },

    /// Look up the receipt of a submitted trade
    Receipt {
        /// Transaction hash returned by `trade`
        tx_hash: String,
    },
}
