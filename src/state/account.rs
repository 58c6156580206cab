use fastnum::D256;

use crate::{abi::reader::Reader, indexer::IndexedAccountRecord, num};

/// One trader's raw margin-account storage within a perpetual.
///
/// The entry basis (`entry_value`/`entry_funding`) is not observable on
/// chain; both stay empty until [`AccountStorage::reconcile`] adopts them
/// from the indexer.
#[derive(Clone, derive_more::Debug)]
pub struct AccountStorage {
    #[debug("{cash_balance}")]
    cash_balance: D256,
    #[debug("{position_amount}")]
    position_amount: D256,
    #[debug("{target_leverage}")]
    target_leverage: D256,
    entry_value: Option<D256>,
    entry_funding: Option<D256>,
}

impl AccountStorage {
    pub(crate) fn from_storage(storage: &Reader::MarginAccount) -> Self {
        let wad = num::Converter::wad();
        Self {
            cash_balance: wad.from_signed(storage.cashBalance),
            position_amount: wad.from_signed(storage.positionAmount),
            target_leverage: wad.from_signed(storage.targetLeverage),
            entry_value: None,
            entry_funding: None,
        }
    }

    pub(crate) fn from_parts(
        cash_balance: D256,
        position_amount: D256,
        target_leverage: D256,
        entry_value: Option<D256>,
        entry_funding: Option<D256>,
    ) -> Self {
        Self {
            cash_balance,
            position_amount,
            target_leverage,
            entry_value,
            entry_funding,
        }
    }

    /// Cash balance net of settled funding.
    pub fn cash_balance(&self) -> D256 {
        self.cash_balance
    }

    /// Signed position size; negative is short.
    pub fn position_amount(&self) -> D256 {
        self.position_amount
    }

    /// Leverage the trader asked the pool to maintain.
    pub fn target_leverage(&self) -> D256 {
        self.target_leverage
    }

    /// Collateral value the position was entered at, when known.
    pub fn entry_value(&self) -> Option<D256> {
        self.entry_value
    }

    /// Accumulated funding at position entry, when known.
    pub fn entry_funding(&self) -> Option<D256> {
        self.entry_funding
    }

    /// Adopts the indexer's entry basis, but only while the indexer's
    /// recorded position equals the on-chain position exactly. Any mismatch
    /// (size change, pending close, indexer lag) keeps the on-chain view
    /// untouched. Balance fields are never taken from the indexer.
    ///
    /// Returns whether the entry basis was adopted.
    pub fn reconcile(&mut self, indexed: &IndexedAccountRecord) -> bool {
        if indexed.position() != self.position_amount {
            return false;
        }
        self.entry_value = Some(indexed.entry_value());
        self.entry_funding = Some(indexed.entry_funding());
        true
    }
}
