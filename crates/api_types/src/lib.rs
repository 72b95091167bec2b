use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Tells an absent field (`None`) apart from an explicit `null`
/// (`Some(None)`), for fields that can be cleared.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod envelope {
    use super::*;

    /// A secondary step that failed while the write itself succeeded.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Warning {
        pub step: String,
        pub message: String,
    }

    /// Body of every response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApiResponse<T> {
        pub success: bool,
        pub message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<T>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub warnings: Vec<Warning>,
    }

    impl<T> ApiResponse<T> {
        pub fn ok(message: impl Into<String>, data: T) -> Self {
            Self {
                success: true,
                message: message.into(),
                data: Some(data),
                error: None,
                warnings: Vec::new(),
            }
        }

        pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
            self.warnings = warnings;
            self
        }

        pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
            Self {
                success: false,
                message: message.into(),
                data: None,
                error: Some(error.into()),
                warnings: Vec::new(),
            }
        }
    }
}

pub mod init {
    use super::*;

    /// First-run setup. Every field falls back to the built-in default.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InitRequest {
        pub admin_username: Option<String>,
        pub admin_name: Option<String>,
        pub admin_email: Option<String>,
        pub wallet_name: Option<String>,
        pub group_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InitView {
        pub initialized: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub setup: Option<super::user::UserSetupView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InitStatus {
        pub initialized: bool,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub username: String,
        pub name: String,
        pub email: String,
        /// `human` or `bot`.
        pub user_type: String,
        pub default_wallet_id: Option<i64>,
    }

    /// Request body for `POST /users`.
    ///
    /// With `with_wallet` the user also gets a wallet group and a wallet of
    /// their own, and `with_categories` fills that wallet with the default
    /// category set.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub name: Option<String>,
        pub email: Option<String>,
        pub user_type: Option<String>,
        pub default_wallet_id: Option<i64>,
        #[serde(default)]
        pub with_wallet: bool,
        pub wallet_name: Option<String>,
        pub group_name: Option<String>,
        #[serde(default)]
        pub with_categories: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub name: Option<String>,
        pub email: Option<String>,
        pub user_type: Option<String>,
        /// `null` clears the default wallet.
        #[serde(
            default,
            deserialize_with = "super::double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub default_wallet_id: Option<Option<i64>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSetupView {
        pub user: UserView,
        pub wallet: super::wallet::WalletView,
        pub wallet_group: super::wallet_group::WalletGroupView,
        pub root_categories: Vec<super::category::CategoryView>,
    }

    /// Body of `PUT /users/{id}/wallets`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserWalletsReplace {
        pub wallet_ids: Vec<i64>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: i64,
        pub name: String,
        pub icon: String,
        pub is_enabled: bool,
        pub balance_minor: i64,
        /// Decimal rendering of `balance_minor`, e.g. `"-12.50"`.
        pub balance: String,
        pub last_modified_time: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WalletNew {
        pub name: String,
        pub icon: Option<String>,
        pub is_enabled: Option<bool>,
        /// Opening balance.
        pub balance_minor: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WalletUpdate {
        pub name: Option<String>,
        pub icon: Option<String>,
        pub is_enabled: Option<bool>,
        pub balance_minor: Option<i64>,
    }
}

pub mod wallet_group {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WalletGroupView {
        pub id: i64,
        pub name: String,
    }

    /// Create and rename share the same body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletGroupName {
        pub name: String,
    }
}

pub mod person {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PersonView {
        pub id: i64,
        pub name: String,
        pub alias: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PersonNew {
        pub name: String,
        pub alias: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PersonUpdate {
        pub name: Option<String>,
        pub alias: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub wallet_id: i64,
        pub name: String,
        pub icon: String,
        pub parent_id: Option<i64>,
        pub root_id: i64,
        pub is_global: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub icon: Option<String>,
        pub parent_id: Option<i64>,
        #[serde(default)]
        pub is_global: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub icon: Option<String>,
        /// `null` turns the category into a root.
        #[serde(
            default,
            deserialize_with = "super::double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub parent_id: Option<Option<i64>>,
        pub is_global: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNodeView {
        #[serde(flatten)]
        pub category: CategoryView,
        pub children: Vec<CategoryNodeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTreeView {
        pub wallet: super::wallet::WalletView,
        pub roots: Vec<CategoryNodeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncFailureView {
        pub wallet_id: i64,
        pub error: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncReportView {
        pub category_id: i64,
        pub created: Vec<CategoryView>,
        pub skipped_wallets: Vec<i64>,
        pub failed: Vec<SyncFailureView>,
    }
}

pub mod transaction {
    use super::*;

    /// Request body for `POST /transactions`.
    ///
    /// Under `/wallets/{id}/transactions` the wallet comes from the path and
    /// `wallet_id` is ignored.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        #[serde(default)]
        pub wallet_id: i64,
        #[serde(default)]
        pub category_id: i64,
        #[serde(default)]
        pub user_id: i64,
        /// Always positive; the category decides the sign.
        #[serde(default)]
        pub amount_minor: i64,
        /// Decimal amount such as `"12.50"`. Takes precedence over
        /// `amount_minor` when both are sent.
        pub amount: Option<String>,
        pub person_id: Option<i64>,
        pub person_name: Option<String>,
        pub note: Option<String>,
        /// RFC 3339. Defaults to now.
        pub transaction_time: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub wallet_id: Option<i64>,
        pub category_id: Option<i64>,
        pub amount_minor: Option<i64>,
        /// Decimal amount, as in [`TransactionNew::amount`].
        pub amount: Option<String>,
        /// An empty string clears the note.
        pub note: Option<String>,
        pub transaction_time: Option<DateTime<Utc>>,
        pub person_id: Option<i64>,
        pub person_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub wallet_id: i64,
        pub category_id: i64,
        pub user_id: i64,
        pub person_id: Option<i64>,
        pub amount_minor: i64,
        pub amount: String,
        pub note: Option<String>,
        pub transaction_time: DateTime<Utc>,
        pub entry_time: DateTime<Utc>,
        pub last_modified_time: DateTime<Utc>,
        pub category: Option<super::category::CategoryView>,
        pub wallet: Option<super::wallet::WalletView>,
        pub person: Option<super::person::PersonView>,
        pub user: Option<super::user::UserView>,
    }

    /// Query string of the list endpoints.
    ///
    /// `category_ids` may repeat. `amount_op` (`eq|lt|le|gt|ge`) and
    /// `amount_value` only filter when both are present.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionFilterQuery {
        pub start_transaction_time: Option<DateTime<Utc>>,
        pub end_transaction_time: Option<DateTime<Utc>>,
        pub start_entry_time: Option<DateTime<Utc>>,
        pub end_entry_time: Option<DateTime<Utc>>,
        pub start_last_modified_time: Option<DateTime<Utc>>,
        pub end_last_modified_time: Option<DateTime<Utc>>,
        pub user_id: Option<i64>,
        #[serde(default)]
        pub category_ids: Vec<i64>,
        pub wallet_id: Option<i64>,
        pub person_id: Option<i64>,
        pub fuzzy_note: Option<String>,
        pub amount_op: Option<String>,
        pub amount_value: Option<i64>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tells_null_from_absent() {
        let absent: category::CategoryUpdate = serde_json::from_str(r#"{"name":"Food"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let cleared: category::CategoryUpdate =
            serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));

        let set: category::CategoryUpdate = serde_json::from_str(r#"{"parent_id":4}"#).unwrap();
        assert_eq!(set.parent_id, Some(Some(4)));
    }

    #[test]
    fn failure_envelope_omits_data_and_warnings() {
        let body = envelope::ApiResponse::<()>::failure("not found", "\"x\" key not found!");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "message": "not found",
                "error": "\"x\" key not found!",
            })
        );
    }

    #[test]
    fn tree_nodes_flatten_the_category() {
        let node = category::CategoryNodeView {
            category: category::CategoryView {
                id: 2,
                wallet_id: 1,
                name: "Expense".to_string(),
                icon: String::new(),
                parent_id: None,
                root_id: 2,
                is_global: true,
            },
            children: Vec::new(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "Expense");
        assert_eq!(json["children"], serde_json::json!([]));
    }
}
