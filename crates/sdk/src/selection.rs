//! Coin selection for payments.
//!
//! [`CoinSelector`] is the seam; the controller holds an
//! `Arc<dyn CoinSelector>` and can be given another strategy with
//! [`SessionController::set_coin_selector`](crate::SessionController::set_coin_selector).
//!
//! # Built-in strategies
//!
//! - [`FirstFitSelector`]: walks coins in chain order (default).

use transport::Coin;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One input coin and how much of it the payment uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedCoin {
    pub coin_object_id: String,
    pub balance: u64,
    /// Amount taken from this coin. Equal to `balance` unless the coin is
    /// split.
    pub take: u64,
}

impl SelectedCoin {
    pub fn is_split(&self) -> bool {
        self.take < self.balance
    }
}

/// Result of a successful selection. `total` always equals the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    pub inputs: Vec<SelectedCoin>,
    pub total: u64,
}

impl CoinSelection {
    pub fn coin_ids(&self) -> Vec<String> {
        self.inputs
            .iter()
            .map(|c| c.coin_object_id.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CoinSelector trait
// ---------------------------------------------------------------------------

/// Strategy for covering a payment amount with owned coins.
pub trait CoinSelector: Send + Sync {
    /// Selects coins covering exactly `target`.
    ///
    /// Returns `None` if the coins cannot cover it. `target` is non-zero.
    fn select(&self, coins: &[Coin], target: u64) -> Option<CoinSelection>;
}

// ---------------------------------------------------------------------------
// FirstFitSelector
// ---------------------------------------------------------------------------

/// Chain-order first fit. Stateless, zero-sized.
///
/// The first coin large enough for the remainder is split to exactly that
/// remainder and ends the walk. Smaller coins before it are consumed whole.
pub struct FirstFitSelector;

impl CoinSelector for FirstFitSelector {
    fn select(&self, coins: &[Coin], target: u64) -> Option<CoinSelection> {
        let mut inputs = Vec::new();
        let mut remaining = target;

        for coin in coins {
            if coin.balance == 0 {
                continue;
            }
            let take = coin.balance.min(remaining);
            inputs.push(SelectedCoin {
                coin_object_id: coin.coin_object_id.clone(),
                balance: coin.balance,
                take,
            });
            remaining -= take;
            if remaining == 0 {
                return Some(CoinSelection {
                    inputs,
                    total: target,
                });
            }
        }

        None
    }
}

/// Sum of all coin balances, saturating.
pub fn available_balance(coins: &[Coin]) -> u64 {
    coins
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.balance))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
