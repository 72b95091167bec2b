use sea_orm::{DatabaseTransaction, EntityTrait, PaginatorTrait};
use tracing::{info, warn};

use crate::{
    AuxiliaryFailure, Category, EXPENSE_ROOT_ID, EngineError, INCOME_ROOT_ID, InitCmd, NewUserCmd,
    NewWalletCmd, ResultEngine, SetupUserCmd, User, Wallet, WalletGroup, WriteOutcome, users,
};

use super::{
    Engine,
    memberships::{link_group_wallet, link_user_wallet},
    normalize_optional_text, with_tx,
    users::{display_name, insert_user},
    wallet_groups::insert_wallet_group,
    wallets::insert_wallet,
};

/// Everything `setup_user` created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupReport {
    pub user: User,
    pub wallet: Wallet,
    pub wallet_group: WalletGroup,
    /// The Income and Expense roots, when categories were requested.
    pub root_categories: Vec<Category>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitReport {
    /// `false` when a user already existed and nothing was written.
    pub initialized: bool,
    pub setup: Option<SetupReport>,
}

impl Engine {
    /// Create a user with their own wallet group and wallet, linked
    /// together, and optionally the default category set of the wallet.
    pub async fn setup_user(&self, cmd: SetupUserCmd) -> ResultEngine<WriteOutcome<SetupReport>> {
        with_tx!(self, |db_tx| {
            let mut warnings = Vec::new();
            let report = setup_in_tx(&db_tx, cmd, &mut warnings).await?;
            Ok(WriteOutcome::with_warnings(report, warnings))
        })
    }

    /// First-run setup: the admin user, the default wallet and group and the
    /// full category set. Runs only while no user exists, so on a fresh
    /// store the Income and Expense roots get the canonical identities.
    pub async fn initialize(&self, cmd: InitCmd) -> ResultEngine<WriteOutcome<InitReport>> {
        with_tx!(self, |db_tx| {
            if users::Entity::find().count(&db_tx).await? > 0 {
                info!("already initialized, nothing to do");
                return Ok(WriteOutcome::new(InitReport {
                    initialized: false,
                    setup: None,
                }));
            }

            let mut user = NewUserCmd::new(cmd.admin_username).name(cmd.admin_name);
            user.email = normalize_optional_text(cmd.admin_email.as_deref());
            let setup = SetupUserCmd::new(user)
                .wallet_name(cmd.wallet_name)
                .group_name(cmd.group_name)
                .with_categories(true);

            let mut warnings = Vec::new();
            let report = setup_in_tx(&db_tx, setup, &mut warnings).await?;

            let root_ids: Vec<i64> = report.root_categories.iter().map(|c| c.id).collect();
            if root_ids != [INCOME_ROOT_ID, EXPENSE_ROOT_ID] {
                warn!(
                    ?root_ids,
                    "default roots did not get the canonical ids, balances will not move"
                );
            }

            info!(user_id = report.user.id, "store initialized");
            Ok(WriteOutcome::with_warnings(
                InitReport {
                    initialized: true,
                    setup: Some(report),
                },
                warnings,
            ))
        })
    }

    /// `true` once at least one user exists.
    pub async fn init_status(&self) -> ResultEngine<bool> {
        Ok(users::Entity::find().count(&self.database).await? > 0)
    }
}

async fn setup_in_tx(
    db_tx: &DatabaseTransaction,
    cmd: SetupUserCmd,
    warnings: &mut Vec<AuxiliaryFailure>,
) -> ResultEngine<SetupReport> {
    let SetupUserCmd {
        mut user,
        wallet_name,
        group_name,
        with_categories,
    } = cmd;
    if user.username.trim().is_empty() {
        return Err(EngineError::MissingField("username".to_string()));
    }

    let name = normalize_optional_text(user.name.as_deref())
        .unwrap_or_else(|| display_name(user.username.trim()));
    user.name = Some(name.clone());

    let group_name =
        normalize_optional_text(group_name.as_deref()).unwrap_or_else(|| format!("{name}'s Group"));
    let wallet_name = normalize_optional_text(wallet_name.as_deref())
        .unwrap_or_else(|| format!("{name}'s Wallet"));

    let group = insert_wallet_group(db_tx, &group_name).await?;
    let wallet = insert_wallet(db_tx, NewWalletCmd::new(wallet_name).icon("💰")).await?;
    link_group_wallet(db_tx, group.id, wallet.id).await?;

    user.default_wallet_id = Some(wallet.id);
    let user = insert_user(db_tx, user).await?;
    link_user_wallet(db_tx, user.id, wallet.id).await?;

    let root_categories = if with_categories {
        Engine::create_default_categories(db_tx, wallet.id, warnings).await?
    } else {
        Vec::new()
    };

    info!(
        user_id = user.id,
        wallet_id = wallet.id,
        wallet_group_id = group.id,
        "user setup completed"
    );
    Ok(SetupReport {
        user: user.into(),
        wallet: wallet.into(),
        wallet_group: group.into(),
        root_categories,
    })
}
