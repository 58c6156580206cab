//! Account flow over the public API: snapshot fixtures through
//! reconciliation into the computed account view.

use fastnum::{D256, dec256};
use perp_gateway::{
    indexer::IndexedAccountRecord,
    state::compute_account,
    testing::{AccountBuilder, PerpetualBuilder, PoolBuilder},
};

fn pool() -> perp_gateway::state::PoolSnapshot {
    PoolBuilder::new()
        .perpetual(
            PerpetualBuilder::new()
                .mark_price(dec256!(2000))
                .unit_accumulative_funding(dec256!(4))
                .initial_margin_rate(dec256!(0.1))
                .maintenance_margin_rate(dec256!(0.05))
                .keeper_gas_reward(dec256!(0.5))
                .build(),
        )
        .build()
}

#[test]
fn reconciled_entry_basis_flows_into_computed_account() {
    let mut account = AccountBuilder::new()
        .cash_balance(dec256!(500))
        .position_amount(dec256!(-2.5))
        .build();
    let indexed = IndexedAccountRecord::new(dec256!(-2.5), dec256!(-5000), dec256!(-3));

    assert!(account.reconcile(&indexed));
    let computed = compute_account(&pool(), 0, &account).unwrap();

    // Balance fields come from the chain alone.
    assert_eq!(computed.available_cash_balance(), dec256!(510));
    assert_eq!(computed.margin_balance(), dec256!(-4490));
    // Entry-basis fields come from the adopted indexer record.
    assert_eq!(computed.entry_price(), Some(dec256!(2000)));
    assert_eq!(computed.funding_pnl(), Some(dec256!(7)));
    assert_eq!(computed.pnl(), Some(dec256!(7)));
}

#[test]
fn mismatched_position_keeps_the_chain_view() {
    let mut account = AccountBuilder::new()
        .cash_balance(dec256!(500))
        .position_amount(dec256!(-2.5))
        .build();
    // Indexer lags the chain by a partial close.
    let indexed = IndexedAccountRecord::new(dec256!(-3), dec256!(-6000), dec256!(-3.6));

    assert!(!account.reconcile(&indexed));
    let computed = compute_account(&pool(), 0, &account).unwrap();

    assert_eq!(computed.available_cash_balance(), dec256!(510));
    assert_eq!(computed.entry_price(), None);
    assert_eq!(computed.funding_pnl(), None);
    assert_eq!(computed.pnl(), None);
}

#[test]
fn reconciliation_equality_table() {
    let cases = [
        (dec256!(1), dec256!(1), true),
        (dec256!(1), dec256!(1.000000000000000001), false),
        (dec256!(-2.5), dec256!(-2.5), true),
        (dec256!(-2.5), dec256!(2.5), false),
        (D256::ZERO, D256::ZERO, true),
        (D256::ZERO, dec256!(0.1), false),
    ];
    for (chain_position, indexed_position, expect_adopted) in cases {
        let mut account = AccountBuilder::new().position_amount(chain_position).build();
        let indexed = IndexedAccountRecord::new(indexed_position, dec256!(42), dec256!(7));

        assert_eq!(
            account.reconcile(&indexed),
            expect_adopted,
            "chain {chain_position} vs indexed {indexed_position}"
        );
        assert_eq!(
            account.entry_value(),
            expect_adopted.then_some(dec256!(42)),
            "chain {chain_position} vs indexed {indexed_position}"
        );
        // Position is never taken from the indexer.
        assert_eq!(account.position_amount(), chain_position);
    }
}

#[test]
fn unreconciled_account_still_computes_balances() {
    let account = AccountBuilder::new()
        .cash_balance(dec256!(-950))
        .position_amount(dec256!(1))
        .build();
    let pool = PoolBuilder::new()
        .perpetual(
            PerpetualBuilder::new()
                .mark_price(dec256!(2000))
                .initial_margin_rate(dec256!(0.1))
                .maintenance_margin_rate(dec256!(0.05))
                .build(),
        )
        .build();

    let computed = compute_account(&pool, 0, &account).unwrap();
    assert_eq!(computed.margin_balance(), dec256!(1050));
    assert_eq!(computed.available_margin(), dec256!(850));
    assert_eq!(computed.liquidation_price(), dec256!(1000));
    assert_eq!(computed.entry_price(), None);
}
