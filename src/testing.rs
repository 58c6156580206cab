//! Builders assembling pool snapshots and account storage for tests.
//!
//! The builders mirror the production types without touching a chain:
//! [`PoolBuilder`] and [`PerpetualBuilder`] produce the snapshot shapes the
//! reader contract would return, [`AccountBuilder`] produces raw account
//! storage. Defaults describe a healthy, tradable market so a test only
//! states what it cares about.

use alloy::primitives::{Address, address};
use fastnum::{D256, dec256};

use crate::state::{AccountStorage, PerpetualSnapshot, PerpetualState, PoolSnapshot};

/// Pool address used by [`PoolBuilder`] unless overridden.
pub const POOL_ADDRESS: Address = address!("0x9C216D1Ab3e0407b3d6F1d5e9EfFe6d01C326ab7");
/// Collateral token address used by [`PoolBuilder`] unless overridden.
pub const COLLATERAL_ADDRESS: Address = address!("0x5D75eF23e7Ad6fcD3059e8ED7006c7dbE0f35a39");

/// Builds a [`PerpetualSnapshot`] with controlled values.
#[derive(Clone, Debug)]
pub struct PerpetualBuilder {
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

impl Default for PerpetualBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PerpetualBuilder {
    /// A normal, open market with flat prices and no fees.
    pub fn new() -> Self {
        Self {
            state: PerpetualState::Normal,
            is_market_closed: false,
            underlying_symbol: "ETH".to_owned(),
            index_price: dec256!(1),
            mark_price: dec256!(1),
            funding_rate: D256::ZERO,
            unit_accumulative_funding: D256::ZERO,
            initial_margin_rate: dec256!(0.1),
            maintenance_margin_rate: dec256!(0.05),
            operator_fee_rate: D256::ZERO,
            lp_fee_rate: D256::ZERO,
            keeper_gas_reward: D256::ZERO,
        }
    }

    pub fn state(mut self, state: PerpetualState) -> Self {
        self.state = state;
        self
    }

    pub fn is_market_closed(mut self, is_market_closed: bool) -> Self {
        self.is_market_closed = is_market_closed;
        self
    }

    pub fn underlying_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.underlying_symbol = symbol.into();
        self
    }

    pub fn index_price(mut self, price: D256) -> Self {
        self.index_price = price;
        self
    }

    pub fn mark_price(mut self, price: D256) -> Self {
        self.mark_price = price;
        self
    }

    pub fn funding_rate(mut self, rate: D256) -> Self {
        self.funding_rate = rate;
        self
    }

    pub fn unit_accumulative_funding(mut self, funding: D256) -> Self {
        self.unit_accumulative_funding = funding;
        self
    }

    pub fn initial_margin_rate(mut self, rate: D256) -> Self {
        self.initial_margin_rate = rate;
        self
    }

    pub fn maintenance_margin_rate(mut self, rate: D256) -> Self {
        self.maintenance_margin_rate = rate;
        self
    }

    pub fn operator_fee_rate(mut self, rate: D256) -> Self {
        self.operator_fee_rate = rate;
        self
    }

    pub fn lp_fee_rate(mut self, rate: D256) -> Self {
        self.lp_fee_rate = rate;
        self
    }

    pub fn keeper_gas_reward(mut self, reward: D256) -> Self {
        self.keeper_gas_reward = reward;
        self
    }

    pub fn build(self) -> PerpetualSnapshot {
        PerpetualSnapshot::from_parts(
            self.state,
            self.is_market_closed,
            self.underlying_symbol,
            self.index_price,
            self.mark_price,
            self.funding_rate,
            self.unit_accumulative_funding,
            self.initial_margin_rate,
            self.maintenance_margin_rate,
            self.operator_fee_rate,
            self.lp_fee_rate,
            self.keeper_gas_reward,
        )
    }
}

/// Builds a [`PoolSnapshot`] with controlled values.
#[derive(Clone, Debug)]
pub struct PoolBuilder {
    address: Address,
    is_synced: bool,
    is_running: bool,
    collateral: Address,
    vault_fee_rate: D256,
    perpetuals: Vec<PerpetualSnapshot>,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolBuilder {
    /// A synced, running pool with no markets; add them with
    /// [`PoolBuilder::perpetual`].
    pub fn new() -> Self {
        Self {
            address: POOL_ADDRESS,
            is_synced: true,
            is_running: true,
            collateral: COLLATERAL_ADDRESS,
            vault_fee_rate: D256::ZERO,
            perpetuals: vec![],
        }
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn is_synced(mut self, is_synced: bool) -> Self {
        self.is_synced = is_synced;
        self
    }

    pub fn is_running(mut self, is_running: bool) -> Self {
        self.is_running = is_running;
        self
    }

    pub fn collateral(mut self, collateral: Address) -> Self {
        self.collateral = collateral;
        self
    }

    pub fn vault_fee_rate(mut self, rate: D256) -> Self {
        self.vault_fee_rate = rate;
        self
    }

    /// Appends a market at the next perpetual index.
    pub fn perpetual(mut self, perpetual: PerpetualSnapshot) -> Self {
        self.perpetuals.push(perpetual);
        self
    }

    pub fn build(self) -> PoolSnapshot {
        PoolSnapshot::from_parts(
            self.address,
            self.is_synced,
            self.is_running,
            self.collateral,
            self.vault_fee_rate,
            self.perpetuals,
        )
    }
}

/// Builds an [`AccountStorage`] with controlled values.
///
/// Entry fields default to absent, matching a fresh chain read.
#[derive(Clone, Debug, Default)]
pub struct AccountBuilder {
    cash_balance: D256,
    position_amount: D256,
    target_leverage: D256,
    entry_value: Option<D256>,
    entry_funding: Option<D256>,
}

impl AccountBuilder {
    /// An empty account: no cash, no position, no entry basis.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cash_balance(mut self, cash_balance: D256) -> Self {
        self.cash_balance = cash_balance;
        self
    }

    pub fn position_amount(mut self, position_amount: D256) -> Self {
        self.position_amount = position_amount;
        self
    }

    pub fn target_leverage(mut self, target_leverage: D256) -> Self {
        self.target_leverage = target_leverage;
        self
    }

    pub fn entry_value(mut self, entry_value: D256) -> Self {
        self.entry_value = Some(entry_value);
        self
    }

    pub fn entry_funding(mut self, entry_funding: D256) -> Self {
        self.entry_funding = Some(entry_funding);
        self
    }

    pub fn build(self) -> AccountStorage {
        AccountStorage::from_parts(
            self.cash_balance,
            self.position_amount,
            self.target_leverage,
            self.entry_value,
            self.entry_funding,
        )
    }
}
