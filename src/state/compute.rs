use fastnum::D256;

use crate::{
    error::GatewayError,
    state::{AccountStorage, PoolSnapshot},
    types,
};

/// Derived financial view of one margin account.
///
/// Entry-basis outputs stay absent (not zero) when the underlying entry
/// fields are unknown, so callers can tell "not applicable" from "zero".
#[derive(Clone, derive_more::Debug)]
pub struct ComputedAccount {
    #[debug("{margin_balance}")]
    margin_balance: D256,
    #[debug("{available_margin}")]
    available_margin: D256,
    #[debug("{available_cash_balance}")]
    available_cash_balance: D256,
    #[debug("{liquidation_price}")]
    liquidation_price: D256,
    entry_price: Option<D256>,
    funding_pnl: Option<D256>,
    pnl: Option<D256>,
}

impl ComputedAccount {
    /// Collateral value of the account marked at the current mark price.
    pub fn margin_balance(&self) -> D256 {
        self.margin_balance
    }

    /// Margin left above the initial-margin (or keeper-reserve) requirement.
    pub fn available_margin(&self) -> D256 {
        self.available_margin
    }

    /// Cash balance with unsettled funding applied.
    pub fn available_cash_balance(&self) -> D256 {
        self.available_cash_balance
    }

    /// Estimated mark price at which the position becomes liquidatable;
    /// zero when the position cannot be liquidated by price movement.
    pub fn liquidation_price(&self) -> D256 {
        self.liquidation_price
    }

    /// Average entry price, when the entry basis is known.
    pub fn entry_price(&self) -> Option<D256> {
        self.entry_price
    }

    /// Funding gained since entry, when the entry basis is known.
    pub fn funding_pnl(&self) -> Option<D256> {
        self.funding_pnl
    }

    /// Total unrealized PNL, when the entry basis is known.
    pub fn pnl(&self) -> Option<D256> {
        self.pnl
    }
}

/// Computes the derived account view for the perpetual at
/// `perpetual_index`. Pure: same inputs, same output, no I/O.
pub fn compute_account(
    pool: &PoolSnapshot,
    perpetual_index: types::PerpetualIndex,
    account: &AccountStorage,
) -> Result<ComputedAccount, GatewayError> {
    let perpetual = pool
        .perpetual(perpetual_index)
        .ok_or(GatewayError::PerpetualIndexOutOfBounds {
            pool: pool.address(),
            index: perpetual_index,
            count: pool.perpetuals().len(),
        })?;

    let position = account.position_amount();
    let mark_price = perpetual.mark_price();

    let available_cash_balance =
        account.cash_balance() - position * perpetual.unit_accumulative_funding();
    let margin_balance = available_cash_balance + mark_price * position;

    let position_value = mark_price * abs(position);
    let position_margin = position_value * perpetual.initial_margin_rate();
    let reserved_cash = if position == D256::ZERO {
        D256::ZERO
    } else {
        perpetual.keeper_gas_reward()
    };
    let available_margin = margin_balance - max(position_margin, reserved_cash);

    let liquidation_price = liquidation_price(
        position,
        available_cash_balance,
        reserved_cash,
        perpetual.maintenance_margin_rate(),
    );

    let entry_price = account.entry_value().map(|entry_value| {
        if position == D256::ZERO {
            D256::ZERO
        } else {
            entry_value / position
        }
    });
    let funding_pnl = account
        .entry_funding()
        .map(|entry_funding| entry_funding - position * perpetual.unit_accumulative_funding());
    let pnl = account.entry_value().map(|entry_value| {
        mark_price * position - entry_value + funding_pnl.unwrap_or(D256::ZERO)
    });

    Ok(ComputedAccount {
        margin_balance,
        available_margin,
        available_cash_balance,
        liquidation_price,
        entry_price,
        funding_pnl,
        pnl,
    })
}

/// Mark price at which the margin balance meets the maintenance
/// requirement; zero while no price move can trigger liquidation.
fn liquidation_price(
    position: D256,
    available_cash_balance: D256,
    reserved_cash: D256,
    maintenance_margin_rate: D256,
) -> D256 {
    if position == D256::ZERO {
        return D256::ZERO;
    }
    let price_sensitivity = abs(position) * maintenance_margin_rate - position;
    if price_sensitivity == D256::ZERO {
        return D256::ZERO;
    }
    let price = (available_cash_balance - reserved_cash) / price_sensitivity;
    if price.is_negative() { D256::ZERO } else { price }
}

fn abs(value: D256) -> D256 {
    if value.is_negative() { value.neg() } else { value }
}

fn max(a: D256, b: D256) -> D256 {
    if a >= b { a } else { b }
}

#[cfg(test)]
mod tests {
    use fastnum::dec256;

    use crate::testing::{AccountBuilder, PerpetualBuilder, PoolBuilder};

    use super::*;

    fn pool(keeper_gas_reward: D256) -> PoolSnapshot {
        PoolBuilder::new()
            .perpetual(
                PerpetualBuilder::new()
                    .mark_price(dec256!(2000))
                    .initial_margin_rate(dec256!(0.1))
                    .maintenance_margin_rate(dec256!(0.05))
                    .keeper_gas_reward(keeper_gas_reward)
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_flat_account_is_all_cash() {
        let account = AccountBuilder::new().cash_balance(dec256!(1000)).build();
        let computed = compute_account(&pool(dec256!(0.5)), 0, &account).unwrap();

        assert_eq!(computed.margin_balance(), dec256!(1000));
        assert_eq!(computed.available_margin(), dec256!(1000));
        assert_eq!(computed.available_cash_balance(), dec256!(1000));
        assert_eq!(computed.liquidation_price(), dec256!(0));
        assert_eq!(computed.entry_price(), None);
        assert_eq!(computed.funding_pnl(), None);
        assert_eq!(computed.pnl(), None);
    }

    #[test]
    fn test_leveraged_long_liquidation_price() {
        let account = AccountBuilder::new()
            .cash_balance(dec256!(-950))
            .position_amount(dec256!(1))
            .build();
        let computed = compute_account(&pool(dec256!(0)), 0, &account).unwrap();

        assert_eq!(computed.margin_balance(), dec256!(1050));
        assert_eq!(computed.available_margin(), dec256!(850));
        assert_eq!(computed.liquidation_price(), dec256!(1000));
    }

    #[test]
    fn test_short_liquidation_price() {
        let account = AccountBuilder::new()
            .cash_balance(dec256!(2100))
            .position_amount(dec256!(-1))
            .build();
        let computed = compute_account(&pool(dec256!(0)), 0, &account).unwrap();

        assert_eq!(computed.margin_balance(), dec256!(100));
        assert_eq!(computed.available_margin(), dec256!(-100));
        assert_eq!(computed.liquidation_price(), dec256!(2000));
    }

    #[test]
    fn test_entry_basis_yields_pnl_fields() {
        let pool = PoolBuilder::new()
            .perpetual(
                PerpetualBuilder::new()
                    .mark_price(dec256!(1000))
                    .unit_accumulative_funding(dec256!(10))
                    .initial_margin_rate(dec256!(0.1))
                    .maintenance_margin_rate(dec256!(0.05))
                    .keeper_gas_reward(dec256!(0.5))
                    .build(),
            )
            .build();
        let account = AccountBuilder::new()
            .cash_balance(dec256!(500))
            .position_amount(dec256!(2))
            .entry_value(dec256!(1900))
            .entry_funding(dec256!(5))
            .build();
        let computed = compute_account(&pool, 0, &account).unwrap();

        assert_eq!(computed.available_cash_balance(), dec256!(480));
        assert_eq!(computed.margin_balance(), dec256!(2480));
        assert_eq!(computed.available_margin(), dec256!(2280));
        assert_eq!(computed.entry_price(), Some(dec256!(950)));
        assert_eq!(computed.funding_pnl(), Some(dec256!(-15)));
        assert_eq!(computed.pnl(), Some(dec256!(85)));
        // Richly collateralized long: no price reaches the maintenance bound.
        assert_eq!(computed.liquidation_price(), dec256!(0));
    }

    #[test]
    fn test_keeper_reserve_dominates_tiny_positions() {
        let pool = PoolBuilder::new()
            .perpetual(
                PerpetualBuilder::new()
                    .mark_price(dec256!(1000))
                    .initial_margin_rate(dec256!(0.1))
                    .maintenance_margin_rate(dec256!(0.05))
                    .keeper_gas_reward(dec256!(0.5))
                    .build(),
            )
            .build();
        let account = AccountBuilder::new()
            .cash_balance(dec256!(10))
            .position_amount(dec256!(0.001))
            .build();
        let computed = compute_account(&pool, 0, &account).unwrap();

        // Position margin is 0.1; the 0.5 keeper reserve wins.
        assert_eq!(computed.margin_balance(), dec256!(11));
        assert_eq!(computed.available_margin(), dec256!(10.5));
    }

    #[test]
    fn test_out_of_bounds_perpetual_index() {
        let account = AccountBuilder::new().build();
        let err = compute_account(&pool(dec256!(0)), 7, &account).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::PerpetualIndexOutOfBounds { index: 7, count: 1, .. }
        ));
    }
}
