//! Trade assembly: flag composition, fixed-point conversion, deadline
//! stamping, and the gas budget derived from pool topology.
//!
//! [`TradeIntent::build`] is pure so the whole assembly can be tested
//! without a chain; [`crate::gateway::Gateway::submit_trade`] feeds it the
//! pool's current perpetual count and the wall clock.

use alloy::primitives::{Address, I256, TxHash};
use fastnum::{D256, UD256};

use crate::{error::GatewayError, num, types};

/// Trade executes at the leverage the trader has stored in the pool.
/// Always set by this gateway.
pub const USE_TARGET_LEVERAGE_FLAG: u32 = 0x0800_0000;
/// Trade may only reduce an existing position, never open or increase one.
pub const CLOSE_ONLY_FLAG: u32 = 0x8000_0000;

/// Seconds a submitted trade stays valid; the pool contract rejects it
/// on-chain once the deadline passes.
pub const TRADE_EXPIRY_SECS: u64 = 86_400;

/// Intrinsic gas budget of a trade before per-market costs.
const BASE_TRADE_GAS: u64 = 2_000_000;
/// Extra budget per perpetual hosted by the target pool: settlement touches
/// every market's storage.
const GAS_PER_PERPETUAL: u64 = 100_000;

/// Flag bitmask for a trade. OR-composed so future flags combine.
pub fn trade_flags(is_close_only: bool) -> u32 {
    let mut flags = USE_TARGET_LEVERAGE_FLAG;
    if is_close_only {
        flags |= CLOSE_ONLY_FLAG;
    }
    flags
}

/// Gas limit for a trade against a pool hosting `perpetual_count` markets.
///
/// A zero count means the pool topology was not read (or the pool is
/// empty); nothing sensible can be budgeted for it.
pub fn estimate_gas(perpetual_count: u64) -> Result<u64, GatewayError> {
    if perpetual_count == 0 {
        return Err(GatewayError::GasEstimation);
    }
    Ok(BASE_TRADE_GAS + GAS_PER_PERPETUAL * perpetual_count)
}

/// Execution price quote from a simulated trade, in human decimals.
#[derive(Clone, Copy, derive_more::Debug)]
pub struct Quote {
    #[debug("{price}")]
    price: D256,
    #[debug("{total_fee}")]
    total_fee: D256,
    #[debug("{cost}")]
    cost: D256,
}

impl Quote {
    pub(crate) fn new(price: D256, total_fee: D256, cost: D256) -> Self {
        Self {
            price,
            total_fee,
            cost,
        }
    }

    /// Price the trade would execute at.
    pub fn price(&self) -> D256 {
        self.price
    }

    /// Total fee charged (vault + operator + LP).
    pub fn total_fee(&self) -> D256 {
        self.total_fee
    }

    /// Collateral the trade would consume.
    pub fn cost(&self) -> D256 {
        self.cost
    }
}

/// One fully assembled trade, ready to sign and broadcast.
///
/// Numeric fields are at chain scale; built per request, submitted once,
/// then discarded.
#[derive(Clone, Debug)]
pub struct TradeIntent {
    market: types::Market,
    amount: I256,
    limit_price: I256,
    deadline: u64,
    referer: Address,
    flags: u32,
    gas_price: Option<u128>,
    gas_limit: u64,
}

impl TradeIntent {
    /// Assembles a trade from human-scale inputs.
    ///
    /// `amount` is signed (negative sells) and must be non-zero;
    /// `perpetual_count` is the target pool's current topology; `now` is
    /// the submission time in unix seconds. `gas_price` is in gwei, `None`
    /// leaves the fee to the node's estimate.
    pub fn build(
        market: types::Market,
        amount: D256,
        limit_price: D256,
        is_close_only: bool,
        gas_price: Option<UD256>,
        perpetual_count: u64,
        now: u64,
    ) -> Result<Self, GatewayError> {
        if amount == D256::ZERO {
            return Err(GatewayError::InvalidAmount(
                "trade amount must be non-zero".to_owned(),
            ));
        }
        let wad = num::Converter::wad();
        let gas_price = gas_price
            .map(|gwei| {
                u128::try_from(num::Converter::gwei().to_unsigned(gwei)).map_err(|_| {
                    GatewayError::InvalidAmount(format!(
                        "gas price {gwei} gwei exceeds the chain's fee range"
                    ))
                })
            })
            .transpose()?;
        Ok(Self {
            market,
            amount: wad.to_signed(amount),
            limit_price: wad.to_signed(limit_price),
            deadline: now + TRADE_EXPIRY_SECS,
            referer: Address::ZERO,
            flags: trade_flags(is_close_only),
            gas_price,
            gas_limit: estimate_gas(perpetual_count)?,
        })
    }

    pub fn market(&self) -> types::Market {
        self.market
    }

    /// Signed trade size at chain scale.
    pub fn amount(&self) -> I256 {
        self.amount
    }

    /// Worst acceptable execution price at chain scale.
    pub fn limit_price(&self) -> I256 {
        self.limit_price
    }

    /// Unix second past which the pool contract rejects the trade.
    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn referer(&self) -> Address {
        self.referer
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Gas price in wei, when the caller pinned one.
    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }
}

/// Mined outcome of a submitted trade, from the receipt lookup.
#[derive(Clone, Copy, Debug)]
pub struct TradeReceipt {
    tx_hash: TxHash,
    block_number: u64,
    confirmations: u64,
    succeeded: bool,
    gas_used: u64,
}

impl TradeReceipt {
    pub(crate) fn new(
        tx_hash: TxHash,
        block_number: u64,
        confirmations: u64,
        succeeded: bool,
        gas_used: u64,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            confirmations,
            succeeded,
            gas_used,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Block the trade was included in.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Blocks mined since inclusion, counting the inclusion block.
    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    /// Whether the trade executed (false means it reverted on chain).
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::{dec256, udec256};

    use super::*;

    fn market() -> types::Market {
        types::Market::new(address!("0x9C216D1Ab3e0407b3d6F1d5e9EfFe6d01C326ab7"), 0)
    }

    #[test]
    fn test_flags_compose_by_or() {
        assert_eq!(trade_flags(false), USE_TARGET_LEVERAGE_FLAG);
        assert_eq!(
            trade_flags(true),
            USE_TARGET_LEVERAGE_FLAG | CLOSE_ONLY_FLAG
        );
        // The two masks occupy disjoint bits.
        assert_eq!(USE_TARGET_LEVERAGE_FLAG & CLOSE_ONLY_FLAG, 0);
    }

    #[test]
    fn test_estimate_gas_scales_with_topology() {
        assert_eq!(estimate_gas(1).unwrap(), 2_100_000);
        assert_eq!(estimate_gas(4).unwrap(), 2_400_000);
    }

    #[test]
    fn test_estimate_gas_rejects_unknown_topology() {
        assert!(matches!(
            estimate_gas(0).unwrap_err(),
            GatewayError::GasEstimation
        ));
    }

    #[test]
    fn test_build_rejects_zero_amount() {
        let err = TradeIntent::build(market(), dec256!(0), dec256!(100), false, None, 1, 0)
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAmount(_)));
    }

    #[test]
    fn test_build_stamps_deadline_one_day_out() {
        let intent =
            TradeIntent::build(market(), dec256!(1), dec256!(0), false, None, 1, 1_700_000_000)
                .unwrap();
        assert_eq!(intent.deadline(), 1_700_000_000 + 86_400);
    }

    #[test]
    fn test_build_converts_fields_to_chain_scale() {
        let intent = TradeIntent::build(
            market(),
            dec256!(-2.5),
            dec256!(1800.25),
            true,
            Some(udec256!(1.5)),
            3,
            0,
        )
        .unwrap();
        assert_eq!(
            intent.amount(),
            I256::try_from(-2_500_000_000_000_000_000i128).unwrap()
        );
        assert_eq!(
            intent.limit_price(),
            I256::try_from(1_800_250_000_000_000_000_000i128).unwrap()
        );
        assert_eq!(intent.flags(), USE_TARGET_LEVERAGE_FLAG | CLOSE_ONLY_FLAG);
        assert_eq!(intent.gas_price(), Some(1_500_000_000));
        assert_eq!(intent.gas_limit(), 2_300_000);
        assert_eq!(intent.referer(), Address::ZERO);
    }
}
