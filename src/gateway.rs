//! Gateway orchestration.
//!
//! [`Gateway`] ties the collaborators together: the symbol registry for
//! resolution, the reader contract for batched pool/account views and
//! simulated trades, the indexer for best-effort enrichment, and the pool
//! contract for signed trade transactions.
//!
//! Everything is request-scoped: the only state a [`Gateway`] holds is the
//! immutable [`Network`] and connection handles, all safe for concurrent
//! read-only use.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
};
use fastnum::{D256, UD256};
use tracing::{debug, info, warn};

use crate::{
    Network,
    abi::{pool::LiquidityPool, reader::Reader, registry::SymbolRegistry},
    error::{self, GatewayError},
    indexer::IndexerClient,
    num,
    state::{AccountStorage, ComputedAccount, MarketView, PoolSnapshot, compute_account},
    trade::{self, Quote, TradeIntent, TradeReceipt},
    types,
};

/// Gateway over one network's perpetual markets.
///
/// Construct with [`Gateway::new`], optionally attach an indexer with
/// [`Gateway::with_indexer`]. Without one, account reads serve the plain
/// on-chain view and [`Gateway::list_symbols`] is unavailable.
#[derive(Clone)]
pub struct Gateway<P> {
    network: Network,
    reader: Reader::ReaderInstance<P>,
    registry: SymbolRegistry::SymbolRegistryInstance<P>,
    provider: P,
    indexer: Option<IndexerClient>,
}

impl<P: Provider + Clone> Gateway<P> {
    /// Creates a gateway for `network` over `provider`.
    ///
    /// To submit trades the provider must carry a wallet; read-only use
    /// needs none.
    pub fn new(network: Network, provider: P) -> Self {
        Self {
            reader: Reader::new(network.reader(), provider.clone()),
            registry: SymbolRegistry::new(network.symbol_registry(), provider.clone()),
            provider,
            indexer: None,
            network,
        }
    }

    /// Attaches an indexer client for entry-basis enrichment and symbol
    /// listing.
    pub fn with_indexer(mut self, indexer: IndexerClient) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Resolves a market symbol through the on-chain registry.
    ///
    /// A revert, a zero pool address (the registry's sentinel for "no
    /// mapping"), or an index too large to address all report
    /// [`GatewayError::SymbolNotFound`].
    pub async fn resolve(&self, symbol: &str) -> Result<types::Market, GatewayError> {
        let mapping = self
            .registry
            .getMarketIdentifierForSymbol(symbol.to_owned())
            .call()
            .await
            .map_err(|err| {
                GatewayError::symbol_not_found(symbol, error::call_failure_detail(&err))
            })?;
        if mapping.liquidityPool.is_zero() {
            return Err(GatewayError::symbol_not_found(
                symbol,
                "registry has no mapping for this symbol",
            ));
        }
        let perpetual_index = u32::try_from(mapping.perpetualIndex).map_err(|_| {
            GatewayError::symbol_not_found(
                symbol,
                format!(
                    "registry maps to perpetual index {} which this gateway cannot address",
                    mapping.perpetualIndex
                ),
            )
        })?;
        Ok(types::Market::new(mapping.liquidityPool, perpetual_index))
    }

    /// Symbols of every market the indexer knows.
    pub async fn list_symbols(&self) -> Result<Vec<String>, GatewayError> {
        let indexer = self.indexer.as_ref().ok_or_else(|| {
            GatewayError::IndexerUnavailable("no indexer endpoint configured".to_owned())
        })?;
        indexer.symbols().await
    }

    /// Full storage snapshot of one liquidity pool, in a single batched
    /// read.
    pub async fn read_pool(&self, pool: Address) -> Result<PoolSnapshot, GatewayError> {
        let result = self
            .reader
            .queryLiquidityPool(pool)
            .call()
            .await
            .map_err(|err| GatewayError::pool_read(pool, &err))?;
        Ok(PoolSnapshot::from_storage(pool, result.isSynced, &result.pool))
    }

    /// One trader's raw margin-account storage within a market.
    pub async fn read_account_storage(
        &self,
        market: types::Market,
        trader: Address,
    ) -> Result<AccountStorage, GatewayError> {
        let result = self
            .reader
            .queryAccountStorage(
                market.pool(),
                U256::from(market.perpetual_index()),
                trader,
            )
            .call()
            .await
            .map_err(|err| {
                GatewayError::account_read(market.pool(), market.perpetual_index(), trader, &err)
            })?;
        Ok(AccountStorage::from_storage(&result.accountStorage))
    }

    /// One market's state and tradability, selected out of a fresh pool
    /// snapshot.
    pub async fn market(&self, market: types::Market) -> Result<MarketView, GatewayError> {
        let pool = self.read_pool(market.pool()).await?;
        MarketView::select(market, &pool)
    }

    /// Computed financial view of one trader's account.
    ///
    /// The pool snapshot and raw account storage are read concurrently and
    /// both must succeed. The indexer read runs after them in its own
    /// failure domain: any failure is logged and skipped, never propagated,
    /// and its record is adopted only under the position-equality rule of
    /// [`AccountStorage::reconcile`].
    pub async fn account(
        &self,
        trader: Address,
        market: types::Market,
    ) -> Result<ComputedAccount, GatewayError> {
        let (pool, mut account) = futures::try_join!(
            self.read_pool(market.pool()),
            self.read_account_storage(market, trader),
        )?;

        if let Some(indexer) = &self.indexer {
            match indexer.margin_account(trader, &market).await {
                Ok(Some(record)) => {
                    if account.reconcile(&record) {
                        debug!(%trader, "adopted indexer entry basis");
                    } else {
                        debug!(
                            %trader,
                            chain_position = %account.position_amount(),
                            indexed_position = %record.position(),
                            "indexer position disagrees with chain, keeping the on-chain view"
                        );
                    }
                }
                Ok(None) => debug!(%trader, "indexer has no record for this account"),
                Err(err) => {
                    warn!(%trader, %err, "indexer read failed, serving the on-chain view only");
                }
            }
        }

        compute_account(&pool, market.perpetual_index(), &account)
    }

    /// Execution price quote from a simulated trade. Nothing is broadcast
    /// and the caller spends no gas.
    ///
    /// Fails with [`GatewayError::SyncRequired`] while the pool state is
    /// stale, and with [`GatewayError::InsufficientLiquidity`] when the
    /// simulation reverts with the liquidity marker.
    pub async fn quote(
        &self,
        market: types::Market,
        trader: Address,
        amount: D256,
        is_close_only: bool,
    ) -> Result<Quote, GatewayError> {
        if amount == D256::ZERO {
            return Err(GatewayError::InvalidAmount(
                "quote amount must be non-zero".to_owned(),
            ));
        }
        let wad = num::Converter::wad();
        let result = self
            .reader
            .queryTrade(
                market.pool(),
                U256::from(market.perpetual_index()),
                trader,
                wad.to_signed(amount),
                Address::ZERO,
                trade::trade_flags(is_close_only),
            )
            .call()
            .await
            .map_err(|err| error::classify_quote_failure(&err))?;
        if !result.isSynced {
            return Err(GatewayError::SyncRequired);
        }
        Ok(Quote::new(
            wad.from_signed(result.tradePrice),
            wad.from_signed(result.totalFee),
            wad.from_signed(result.cost),
        ))
    }

    /// Signs and broadcasts a trade for the provider's wallet, returning
    /// the transaction hash without waiting for inclusion.
    ///
    /// At-most-once per invocation: a retry would double-submit. Poll
    /// [`Gateway::trade_receipt`] for the outcome.
    pub async fn submit_trade(
        &self,
        market: types::Market,
        trader: Address,
        amount: D256,
        limit_price: D256,
        is_close_only: bool,
        gas_price: Option<UD256>,
    ) -> Result<TxHash, GatewayError> {
        // Rejected before any network call.
        if amount == D256::ZERO {
            return Err(GatewayError::InvalidAmount(
                "trade amount must be non-zero".to_owned(),
            ));
        }
        let pool = self.read_pool(market.pool()).await?;
        let intent = TradeIntent::build(
            market,
            amount,
            limit_price,
            is_close_only,
            gas_price,
            pool.perpetual_count(),
            unix_now(),
        )?;

        let instance = LiquidityPool::new(market.pool(), self.provider.clone());
        let mut builder = instance
            .trade(
                U256::from(market.perpetual_index()),
                trader,
                intent.amount(),
                intent.limit_price(),
                U256::from(intent.deadline()),
                intent.referer(),
                intent.flags(),
            )
            .gas(intent.gas_limit());
        if let Some(gas_price) = intent.gas_price() {
            builder = builder.gas_price(gas_price);
        }
        let pending = builder
            .send()
            .await
            .map_err(|err| GatewayError::trade_submission(&err))?;
        let tx_hash = *pending.tx_hash();
        info!(
            %trader,
            pool = %market.pool(),
            perpetual_index = market.perpetual_index(),
            amount = %amount,
            %tx_hash,
            "trade submitted"
        );
        Ok(tx_hash)
    }

    /// Receipt of a submitted trade, or `None` while it is still pending.
    /// Idempotent and read-only; poll freely.
    pub async fn trade_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TradeReceipt>, GatewayError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|err| GatewayError::ReceiptLookup(err.to_string()))?;
        let Some(receipt) = receipt else {
            return Ok(None);
        };
        let Some(block_number) = receipt.block_number else {
            return Ok(None);
        };
        let head = self
            .provider
            .get_block_number()
            .await
            .map_err(|err| GatewayError::ReceiptLookup(err.to_string()))?;
        Ok(Some(TradeReceipt::new(
            tx_hash,
            block_number,
            head.saturating_sub(block_number) + 1,
            receipt.status(),
            receipt.gas_used,
        )))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
