use alloy::primitives::Address;

/// Index of a perpetual market within its liquidity pool.
pub type PerpetualIndex = u32;

/// Identifies one perpetual market within a network.
///
/// Produced by symbol resolution; recomputed per request rather than cached,
/// since the registry mapping can move underneath a long-lived process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Market {
    pool: Address,
    perpetual_index: PerpetualIndex,
}

impl Market {
    pub fn new(pool: Address, perpetual_index: PerpetualIndex) -> Self {
        Self {
            pool,
            perpetual_index,
        }
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn perpetual_index(&self) -> PerpetualIndex {
        self.perpetual_index
    }

    /// Composite key the indexer uses for a market, `{pool}-{index}` with
    /// the pool address lower-cased.
    pub fn indexer_key(&self) -> String {
        format!("{:#x}-{}", self.pool, self.perpetual_index)
    }
}
