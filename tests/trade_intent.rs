//! Trade assembly scenarios over the public API.

use alloy::primitives::{Address, I256, address};
use fastnum::{dec256, udec256};
use perp_gateway::{
    error::GatewayError,
    trade::{CLOSE_ONLY_FLAG, TRADE_EXPIRY_SECS, TradeIntent, USE_TARGET_LEVERAGE_FLAG},
    types::Market,
};

fn market() -> Market {
    Market::new(address!("0x9C216D1Ab3e0407b3d6F1d5e9EfFe6d01C326ab7"), 0)
}

#[test]
fn close_only_sell_intent() {
    let now = 1_756_400_000;
    let intent = TradeIntent::build(
        market(),
        dec256!(-2.5),
        dec256!(0),
        true,
        None,
        2,
        now,
    )
    .unwrap();

    // Both flag bits set, composed by OR.
    assert_eq!(intent.flags() & USE_TARGET_LEVERAGE_FLAG, USE_TARGET_LEVERAGE_FLAG);
    assert_eq!(intent.flags() & CLOSE_ONLY_FLAG, CLOSE_ONLY_FLAG);
    // Deadline is exactly one day past submission time.
    assert_eq!(intent.deadline(), now + TRADE_EXPIRY_SECS);
    assert_eq!(TRADE_EXPIRY_SECS, 86_400);
    // Chain-scale fields.
    assert_eq!(
        intent.amount(),
        I256::try_from(-2_500_000_000_000_000_000i128).unwrap()
    );
    assert_eq!(intent.limit_price(), I256::ZERO);
    assert_eq!(intent.referer(), Address::ZERO);
    assert_eq!(intent.market(), market());
}

#[test]
fn open_intent_has_no_close_only_bit() {
    let intent =
        TradeIntent::build(market(), dec256!(1), dec256!(1850), false, None, 1, 0).unwrap();
    assert_eq!(intent.flags(), USE_TARGET_LEVERAGE_FLAG);
    assert_eq!(intent.flags() & CLOSE_ONLY_FLAG, 0);
}

#[test]
fn gas_budget_follows_pool_topology() {
    let one = TradeIntent::build(market(), dec256!(1), dec256!(0), false, None, 1, 0).unwrap();
    let four = TradeIntent::build(market(), dec256!(1), dec256!(0), false, None, 4, 0).unwrap();
    assert_eq!(four.gas_limit() - one.gas_limit(), 3 * 100_000);
}

#[test]
fn unknown_pool_topology_fails_gas_estimation() {
    let err =
        TradeIntent::build(market(), dec256!(1), dec256!(0), false, None, 0, 0).unwrap_err();
    assert!(matches!(err, GatewayError::GasEstimation));
}

#[test]
fn zero_amount_is_rejected() {
    let err =
        TradeIntent::build(market(), dec256!(0), dec256!(100), false, None, 1, 0).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidAmount(_)));
}

#[test]
fn gas_price_is_converted_to_wei() {
    let intent = TradeIntent::build(
        market(),
        dec256!(1),
        dec256!(0),
        false,
        Some(udec256!(2.5)),
        1,
        0,
    )
    .unwrap();
    assert_eq!(intent.gas_price(), Some(2_500_000_000));

    let unpinned = TradeIntent::build(market(), dec256!(1), dec256!(0), false, None, 1, 0).unwrap();
    assert_eq!(unpinned.gas_price(), None);
}
