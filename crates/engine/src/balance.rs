//! Sign table for wallet balances.
//!
//! A transaction amount is always positive; whether it adds to or subtracts
//! from the wallet depends only on the root of its category tree. The two
//! canonical roots are the first two categories ever created (see
//! [`Engine::initialize`](crate::Engine::initialize)).

/// Identity of the canonical "Income" root category.
pub const INCOME_ROOT_ID: i64 = 1;
/// Identity of the canonical "Expense" root category.
pub const EXPENSE_ROOT_ID: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceEffect {
    Credit,
    Debit,
    Neutral,
}

impl BalanceEffect {
    /// Classify a category tree by its root identity.
    #[must_use]
    pub fn for_root(root_id: i64) -> Self {
        match root_id {
            INCOME_ROOT_ID => Self::Credit,
            EXPENSE_ROOT_ID => Self::Debit,
            _ => Self::Neutral,
        }
    }

    /// Signed delta to add to the balance when applying `amount_minor`.
    #[must_use]
    pub fn delta(self, amount_minor: i64) -> i64 {
        match self {
            Self::Credit => amount_minor,
            Self::Debit => -amount_minor,
            Self::Neutral => 0,
        }
    }

    /// Signed delta that undoes [`delta`](Self::delta).
    #[must_use]
    pub fn reversal(self, amount_minor: i64) -> i64 {
        -self.delta(amount_minor)
    }
}
