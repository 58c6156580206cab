//! Trade desk CLI for perpetual-futures markets.
//!
//! This binary resolves markets by symbol, reads pool and account state,
//! requests execution-price quotes, and submits trades through the gateway
//! library. All numeric inputs and outputs are human-decimal strings;
//! fixed-point conversion happens inside the library.

mod config;
mod error;

use std::process::exit;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, TxHash},
    providers::{DynProvider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
};
use clap::Parser;
use fastnum::{D256, UD256};
use itertools::Itertools;
use perp_gateway::{Network, gateway::Gateway, indexer::IndexerClient, num};
use url::Url;

use config::{Cli, Command, EnvConfig};
use error::{Error, Result};

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let env_config = EnvConfig::from_env()?;
    let network = Network::from_name(&env_config.network)?;
    let node_url = Url::parse(&env_config.node_rpc_url)?;

    let signer = env_config
        .private_key
        .as_deref()
        .map(str::parse::<PrivateKeySigner>)
        .transpose()?;
    let wallet_address = signer.as_ref().map(PrivateKeySigner::address);

    let rpc_client = RpcClient::new_http(node_url);
    let provider = match signer {
        Some(signer) => DynProvider::new(
            ProviderBuilder::new()
                .wallet(EthereumWallet::new(signer))
                .connect_client(rpc_client),
        ),
        None => DynProvider::new(ProviderBuilder::new().connect_client(rpc_client)),
    };

    let mut gateway = Gateway::new(network, provider);
    if let Some(indexer_url) = &env_config.indexer_url {
        gateway = gateway.with_indexer(IndexerClient::new(Url::parse(indexer_url)?)?);
    }

    match cli.command {
        Command::Network => {
            let network = gateway.network();
            println!("network:         {} (chain {})", network.name(), network.chain_id());
            println!("reader:          {}", network.reader());
            println!("symbol registry: {}", network.symbol_registry());
        }
        Command::Symbols => {
            println!("{}", gateway.list_symbols().await?.iter().join("\n"));
        }
        Command::Market { symbol } => {
            let market = gateway.resolve(&symbol).await?;
            let view = gateway.market(market).await?;
            let perpetual = view.perpetual();
            println!("pool:            {}", market.pool());
            println!("perpetual index: {}", market.perpetual_index());
            println!("underlying:      {}", perpetual.underlying_symbol());
            println!("state:           {:?}", perpetual.state());
            println!("index price:     {}", perpetual.index_price());
            println!("mark price:      {}", perpetual.mark_price());
            println!("funding rate:    {}", perpetual.funding_rate());
            println!("tradable:        {}", view.is_tradable());
        }
        Command::Account { symbol, trader } => {
            let trader = resolve_trader(trader.as_deref(), wallet_address)?;
            let market = gateway.resolve(&symbol).await?;
            let account = gateway.account(trader, market).await?;
            println!("trader:            {trader}");
            println!("margin balance:    {}", account.margin_balance());
            println!("available margin:  {}", account.available_margin());
            println!("available cash:    {}", account.available_cash_balance());
            println!("liquidation price: {}", account.liquidation_price());
            println!("entry price:       {}", optional(account.entry_price()));
            println!("funding PNL:       {}", optional(account.funding_pnl()));
            println!("PNL:               {}", optional(account.pnl()));
        }
        Command::Quote {
            symbol,
            amount,
            trader,
            close_only,
        } => {
            // Quoting needs no wallet; an anonymous simulation uses the
            // zero address.
            let trader = match trader.as_deref() {
                Some(trader) => trader.parse()?,
                None => wallet_address.unwrap_or(Address::ZERO),
            };
            let market = gateway.resolve(&symbol).await?;
            let quote = gateway
                .quote(market, trader, parse_decimal(&amount)?, close_only)
                .await?;
            println!("price:     {}", quote.price());
            println!("total fee: {}", quote.total_fee());
            println!("cost:      {}", quote.cost());
        }
        Command::Trade {
            symbol,
            amount,
            limit_price,
            close_only,
            gas_price,
        } => {
            let trader = wallet_address.ok_or(Error::MissingPrivateKey)?;
            let market = gateway.resolve(&symbol).await?;
            let gas_price = gas_price.as_deref().map(parse_unsigned_decimal).transpose()?;
            let tx_hash = gateway
                .submit_trade(
                    market,
                    trader,
                    parse_decimal(&amount)?,
                    parse_decimal(&limit_price)?,
                    close_only,
                    gas_price,
                )
                .await?;
            println!("submitted: {tx_hash}");
        }
        Command::Receipt { tx_hash } => {
            let hash = tx_hash
                .parse::<TxHash>()
                .map_err(|_| Error::InvalidTxHash(tx_hash.clone()))?;
            match gateway.trade_receipt(hash).await? {
                Some(receipt) => {
                    println!("status:        {}", if receipt.succeeded() { "success" } else { "reverted" });
                    println!("block:         {}", receipt.block_number());
                    println!("confirmations: {}", receipt.confirmations());
                    println!("gas used:      {}", receipt.gas_used());
                }
                None => println!("pending"),
            }
        }
    }

    Ok(())
}

/// Trader for read paths: an explicit `--trader` wins, otherwise the wallet
/// address.
fn resolve_trader(trader: Option<&str>, wallet_address: Option<Address>) -> Result<Address> {
    match trader {
        Some(trader) => Ok(trader.parse()?),
        None => wallet_address.ok_or(Error::MissingTrader),
    }
}

fn parse_decimal(value: &str) -> Result<D256> {
    D256::from_str(value, num::context()).map_err(|_| Error::InvalidDecimal(value.to_owned()))
}

fn parse_unsigned_decimal(value: &str) -> Result<UD256> {
    UD256::from_str(value, num::context()).map_err(|_| Error::InvalidDecimal(value.to_owned()))
}

fn optional(value: Option<D256>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |value| value.to_string())
}
