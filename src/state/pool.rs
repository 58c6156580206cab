use alloy::primitives::Address;
use fastnum::D256;

use crate::{abi::reader::Reader, error::GatewayError, num, types};

/// Lifecycle state of a perpetual market.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PerpetualState {
    Invalid = 0,
    Initializing = 1,
    Normal = 2,
    Emergency = 3,
    Cleared = 4,
}

impl PerpetualState {
    /// Only normal markets accept trades.
    pub fn is_normal(&self) -> bool {
        matches!(self, PerpetualState::Normal)
    }
}

impl From<u8> for PerpetualState {
    fn from(value: u8) -> Self {
        match value {
            1 => PerpetualState::Initializing,
            2 => PerpetualState::Normal,
            3 => PerpetualState::Emergency,
            4 => PerpetualState::Cleared,
            _ => PerpetualState::Invalid,
        }
    }
}

/// One perpetual market's slice of the pool storage snapshot.
#[derive(Clone, Debug)]
pub struct PerpetualSnapshot {
    state: PerpetualState,
    is_market_closed: bool,
    underlying_symbol: String,
    index_price: D256,
    mark_price: D256,
    funding_rate: D256,
    unit_accumulative_funding: D256,
    initial_margin_rate: D256,
    maintenance_margin_rate: D256,
    operator_fee_rate: D256,
    lp_fee_rate: D256,
    keeper_gas_reward: D256,
}

impl PerpetualSnapshot {
    pub(crate) fn from_storage(storage: &Reader::PerpetualStorage) -> Self {
        let wad = num::Converter::wad();
        Self {
            state: storage.state.into(),
            is_market_closed: storage.isMarketClosed,
            underlying_symbol: storage.underlyingAsset.clone(),
            index_price: wad.from_signed(storage.indexPrice),
            mark_price: wad.from_signed(storage.markPrice),
            funding_rate: wad.from_signed(storage.fundingRate),
            unit_accumulative_funding: wad.from_signed(storage.unitAccumulativeFunding),
            initial_margin_rate: wad.from_signed(storage.initialMarginRate),
            maintenance_margin_rate: wad.from_signed(storage.maintenanceMarginRate),
            operator_fee_rate: wad.from_signed(storage.operatorFeeRate),
            lp_fee_rate: wad.from_signed(storage.lpFeeRate),
            keeper_gas_reward: wad.from_signed(storage.keeperGasReward),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        state: PerpetualState,
        is_market_closed: bool,
        underlying_symbol: String,
        index_price: D256,
        mark_price: D256,
        funding_rate: D256,
        unit_accumulative_funding: D256,
        initial_margin_rate: D256,
        maintenance_margin_rate: D256,
        operator_fee_rate: D256,
        lp_fee_rate: D256,
        keeper_gas_reward: D256,
    ) -> Self {
        Self {
            state,
            is_market_closed,
            underlying_symbol,
            index_price,
            mark_price,
            funding_rate,
            unit_accumulative_funding,
            initial_margin_rate,
            maintenance_margin_rate,
            operator_fee_rate,
            lp_fee_rate,
            keeper_gas_reward,
        }
    }

    /// Lifecycle state of the market.
    pub fn state(&self) -> PerpetualState {
        self.state
    }

    /// Indicates the market is administratively closed for trading.
    pub fn is_market_closed(&self) -> bool {
        self.is_market_closed
    }

    /// Symbol of the underlying asset.
    pub fn underlying_symbol(&self) -> &str {
        &self.underlying_symbol
    }

    /// Oracle index price.
    pub fn index_price(&self) -> D256 {
        self.index_price
    }

    /// Mark price used for margin computations.
    pub fn mark_price(&self) -> D256 {
        self.mark_price
    }

    /// Current funding rate.
    pub fn funding_rate(&self) -> D256 {
        self.funding_rate
    }

    /// Accumulated funding per unit of position since pool inception.
    pub fn unit_accumulative_funding(&self) -> D256 {
        self.unit_accumulative_funding
    }

    /// Margin fraction required to open a position.
    pub fn initial_margin_rate(&self) -> D256 {
        self.initial_margin_rate
    }

    /// Margin fraction required to keep a position.
    pub fn maintenance_margin_rate(&self) -> D256 {
        self.maintenance_margin_rate
    }

    /// Fee rate collected by the pool operator.
    pub fn operator_fee_rate(&self) -> D256 {
        self.operator_fee_rate
    }

    /// Fee rate collected by liquidity providers.
    pub fn lp_fee_rate(&self) -> D256 {
        self.lp_fee_rate
    }

    /// Collateral reserved to pay a keeper while a position is open.
    pub fn keeper_gas_reward(&self) -> D256 {
        self.keeper_gas_reward
    }
}

/// Read replica of one liquidity pool's storage at the most recent synced
/// block. Never mutated by the gateway.
#[derive(Clone, Debug)]
pub struct PoolSnapshot {
    address: Address,
    is_synced: bool,
    is_running: bool,
    collateral: Address,
    vault_fee_rate: D256,
    perpetual_count: u64,
    perpetuals: Vec<PerpetualSnapshot>,
}

impl PoolSnapshot {
    pub(crate) fn from_storage(
        address: Address,
        is_synced: bool,
        storage: &Reader::LiquidityPoolStorage,
    ) -> Self {
        Self {
            address,
            is_synced,
            is_running: storage.isRunning,
            collateral: storage.collateralToken,
            vault_fee_rate: num::Converter::wad().from_signed(storage.vaultFeeRate),
            perpetual_count: storage.perpetualCount.to(), // SC bounds pool size far below u64
            perpetuals: storage
                .perpetuals
                .iter()
                .map(PerpetualSnapshot::from_storage)
                .collect(),
        }
    }

    pub(crate) fn from_parts(
        address: Address,
        is_synced: bool,
        is_running: bool,
        collateral: Address,
        vault_fee_rate: D256,
        perpetuals: Vec<PerpetualSnapshot>,
    ) -> Self {
        Self {
            address,
            is_synced,
            is_running,
            collateral,
            vault_fee_rate,
            perpetual_count: perpetuals.len() as u64,
            perpetuals,
        }
    }

    /// Address of the liquidity pool this snapshot replicates.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Indicates pool storage reflects the chain head it was read at.
    pub fn is_synced(&self) -> bool {
        self.is_synced
    }

    /// Indicates the pool is running (not halted by governance).
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Collateral token of the pool.
    pub fn collateral(&self) -> Address {
        self.collateral
    }

    /// Fee rate collected by the protocol vault.
    pub fn vault_fee_rate(&self) -> D256 {
        self.vault_fee_rate
    }

    /// Number of perpetual markets hosted by the pool.
    pub fn perpetual_count(&self) -> u64 {
        self.perpetual_count
    }

    /// Perpetual markets ordered by perpetual index.
    pub fn perpetuals(&self) -> &[PerpetualSnapshot] {
        &self.perpetuals
    }

    /// Perpetual at `index`, if the pool has one.
    pub fn perpetual(&self, index: types::PerpetualIndex) -> Option<&PerpetualSnapshot> {
        self.perpetuals.get(index as usize)
    }
}

/// One market selected out of its pool snapshot.
#[derive(Clone, Debug)]
pub struct MarketView {
    market: types::Market,
    is_synced: bool,
    is_running: bool,
    perpetual: PerpetualSnapshot,
}

impl MarketView {
    /// Selects `market` out of `pool`, failing when the pool has fewer
    /// perpetuals than the index requires.
    pub fn select(market: types::Market, pool: &PoolSnapshot) -> Result<Self, GatewayError> {
        let perpetual = pool
            .perpetual(market.perpetual_index())
            .cloned()
            .ok_or(GatewayError::PerpetualIndexOutOfBounds {
                pool: market.pool(),
                index: market.perpetual_index(),
                count: pool.perpetuals().len(),
            })?;
        Ok(Self {
            market,
            is_synced: pool.is_synced(),
            is_running: pool.is_running(),
            perpetual,
        })
    }

    pub fn market(&self) -> types::Market {
        self.market
    }

    pub fn is_synced(&self) -> bool {
        self.is_synced
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn perpetual(&self) -> &PerpetualSnapshot {
        &self.perpetual
    }

    /// True when a trade can execute right now: the pool is synced and
    /// running, the perpetual is in its normal state, and the market is not
    /// closed. All four must hold.
    pub fn is_tradable(&self) -> bool {
        self.is_synced
            && self.is_running
            && self.perpetual.state().is_normal()
            && !self.perpetual.is_market_closed()
    }
}
