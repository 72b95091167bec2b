//! Command structs for engine operations.
//!
//! Creation commands carry the required fields in `new` and the optional ones
//! through builder methods. Patches hold one `Option` per field that can
//! change; `None` means "leave untouched".

use chrono::{DateTime, Utc};

use crate::UserType;

/// Record a transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub wallet_id: i64,
    pub category_id: i64,
    pub user_id: i64,
    pub amount_minor: i64,
    pub person_id: Option<i64>,
    pub person_name: Option<String>,
    pub note: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(wallet_id: i64, category_id: i64, user_id: i64, amount_minor: i64) -> Self {
        Self {
            wallet_id,
            category_id,
            user_id,
            amount_minor,
            person_id: None,
            person_name: None,
            note: None,
            transaction_time: None,
        }
    }

    #[must_use]
    pub fn person_id(mut self, person_id: i64) -> Self {
        self.person_id = Some(person_id);
        self
    }

    #[must_use]
    pub fn person_name(mut self, name: impl Into<String>) -> Self {
        self.person_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn transaction_time(mut self, at: DateTime<Utc>) -> Self {
        self.transaction_time = Some(at);
        self
    }
}

/// Partial update of a transaction.
///
/// `person_id` wins over `person_name` when both are given. A blank `note`
/// clears the stored note.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub wallet_id: Option<i64>,
    pub category_id: Option<i64>,
    pub amount_minor: Option<i64>,
    pub note: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
    pub person_id: Option<i64>,
    pub person_name: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.wallet_id.is_none()
            && self.category_id.is_none()
            && self.amount_minor.is_none()
            && self.note.is_none()
            && self.transaction_time.is_none()
            && self.person_id.is_none()
            && self.person_name.is_none()
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: i64) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn transaction_time(mut self, at: DateTime<Utc>) -> Self {
        self.transaction_time = Some(at);
        self
    }

    #[must_use]
    pub fn person_id(mut self, person_id: i64) -> Self {
        self.person_id = Some(person_id);
        self
    }

    #[must_use]
    pub fn person_name(mut self, name: impl Into<String>) -> Self {
        self.person_name = Some(name.into());
        self
    }
}

/// Create a category inside a wallet.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub wallet_id: i64,
    pub name: String,
    pub icon: String,
    pub parent_id: Option<i64>,
    pub is_global: bool,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(wallet_id: i64, name: impl Into<String>) -> Self {
        Self {
            wallet_id,
            name: name.into(),
            icon: String::new(),
            parent_id: None,
            is_global: false,
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn global(mut self, is_global: bool) -> Self {
        self.is_global = is_global;
        self
    }
}

/// Partial update of a category.
///
/// `parent_id: Some(None)` turns the category into a root.
#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Option<i64>>,
    pub is_global: Option<bool>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.icon.is_none()
            && self.parent_id.is_none()
            && self.is_global.is_none()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn global(mut self, is_global: bool) -> Self {
        self.is_global = Some(is_global);
        self
    }
}

#[derive(Clone, Debug)]
pub struct NewWalletCmd {
    pub name: String,
    pub icon: String,
    pub is_enabled: bool,
    pub balance_minor: i64,
}

impl NewWalletCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: String::new(),
            is_enabled: true,
            balance_minor: 0,
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    /// Opening balance.
    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = balance_minor;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct WalletPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub is_enabled: Option<bool>,
    /// Overrides the cached balance. Meant for reconciliation.
    pub balance_minor: Option<i64>,
}

impl WalletPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.icon.is_none()
            && self.is_enabled.is_none()
            && self.balance_minor.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub user_type: UserType,
    pub default_wallet_id: Option<i64>,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: None,
            email: None,
            user_type: UserType::Human,
            default_wallet_id: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    #[must_use]
    pub fn default_wallet_id(mut self, wallet_id: i64) -> Self {
        self.default_wallet_id = Some(wallet_id);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub user_type: Option<UserType>,
    /// `Some(None)` clears the default wallet.
    pub default_wallet_id: Option<Option<i64>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.name.is_none()
            && self.email.is_none()
            && self.user_type.is_none()
            && self.default_wallet_id.is_none()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub alias: Option<String>,
}

/// Create a user together with a wallet group, a wallet and optionally the
/// default category set.
#[derive(Clone, Debug)]
pub struct SetupUserCmd {
    pub user: NewUserCmd,
    pub wallet_name: Option<String>,
    pub group_name: Option<String>,
    pub with_categories: bool,
}

impl SetupUserCmd {
    #[must_use]
    pub fn new(user: NewUserCmd) -> Self {
        Self {
            user,
            wallet_name: None,
            group_name: None,
            with_categories: false,
        }
    }

    #[must_use]
    pub fn wallet_name(mut self, name: impl Into<String>) -> Self {
        self.wallet_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_categories(mut self, with_categories: bool) -> Self {
        self.with_categories = with_categories;
        self
    }
}

/// First-run setup.
#[derive(Clone, Debug)]
pub struct InitCmd {
    pub admin_username: String,
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub wallet_name: String,
    pub group_name: String,
}

impl Default for InitCmd {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_name: "Admin User".to_string(),
            admin_email: None,
            wallet_name: "Default Wallet".to_string(),
            group_name: "Default".to_string(),
        }
    }
}
