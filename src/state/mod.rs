//! On-chain state snapshots and the pure account computation over them.
//!
//! [`PoolSnapshot`] and [`AccountStorage`] are read replicas decoded from
//! the reader contract's batched views; [`MarketView`] selects one market
//! out of a pool snapshot; [`compute_account`] derives the financial view
//! of a margin account from the two.

mod account;
mod compute;
mod pool;

pub use account::AccountStorage;
pub use compute::{ComputedAccount, compute_account};
pub use pool::{MarketView, PerpetualSnapshot, PerpetualState, PoolSnapshot};
