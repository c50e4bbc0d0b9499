//! Balance arithmetic shared by posting, the ledger projection and reports.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::types::BalanceDelta;

/// Applies deltas to an in-memory balance map.
///
/// Accounts absent from `balances` start at zero.
pub fn apply_deltas(balances: &mut HashMap<AccountId, Decimal>, deltas: &[BalanceDelta]) {
    for delta in deltas {
        *balances.entry(delta.account_id).or_insert(Decimal::ZERO) += delta.delta;
    }
}

/// Running balance information for one step of an ordered history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before this step.
    pub previous_balance: Decimal,
    /// Balance after this step.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Running balance for the first step of a history.
    #[must_use]
    pub fn first_entry(change: Decimal) -> Self {
        Self {
            previous_balance: Decimal::ZERO,
            current_balance: change,
        }
    }

    /// Running balance following `previous`.
    ///
    /// - `current[N] = previous[N] + change`
    /// - `previous[N] = current[N-1]`
    #[must_use]
    pub fn next_entry(previous: &Self, change: Decimal) -> Self {
        Self {
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance + change,
        }
    }

    /// Advances an optional running balance.
    #[must_use]
    pub fn advance(previous: Option<&Self>, change: Decimal) -> Self {
        previous.map_or_else(|| Self::first_entry(change), |p| Self::next_entry(p, change))
    }
}
