use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{
    Engine, InitCmd, Money, NewUserCmd, NewWalletCmd, SetupUserCmd, WriteOutcome,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "moneyplanner_admin")]
#[command(about = "Admin utilities for MoneyPlanner (bootstrap, users, wallets)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./moneyplanner.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// First-run setup: admin user, default wallet and its categories.
    Init(InitArgs),
    User(User),
    Wallet(Wallet),
    Category(Category),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    admin_username: Option<String>,
    #[arg(long)]
    wallet_name: Option<String>,
    #[arg(long)]
    wallet_group: Option<String>,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Also create a wallet (and group) owned by the user.
    #[arg(long)]
    wallet_name: Option<String>,
    /// Give the new wallet the default category set. Implies a wallet.
    #[arg(long)]
    with_categories: bool,
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    Create(WalletCreateArgs),
}

#[derive(Args, Debug)]
struct WalletCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    icon: Option<String>,
    /// Opening balance, e.g. `12.50`.
    #[arg(long, allow_hyphen_values = true)]
    balance: Option<Money>,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Mirror a global category into every wallet that lacks it.
    SyncGlobal(SyncGlobalArgs),
}

#[derive(Args, Debug)]
struct SyncGlobalArgs {
    #[arg(long)]
    id: i64,
}

fn init_cmd(args: InitArgs) -> InitCmd {
    let mut cmd = InitCmd::default();
    if let Some(username) = args.admin_username {
        cmd.admin_username = username;
    }
    if let Some(wallet_name) = args.wallet_name {
        cmd.wallet_name = wallet_name;
    }
    if let Some(group_name) = args.wallet_group {
        cmd.group_name = group_name;
    }
    cmd
}

fn report_warnings<T>(outcome: &WriteOutcome<T>) {
    for warning in &outcome.warnings {
        tracing::warn!("{} failed: {}", warning.step, warning.message);
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter("moneyplanner_admin=info,engine=warn")
        .with_writer(std::io::stderr)
        .init();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Init(args) => {
            let outcome = engine.initialize(init_cmd(args)).await?;
            report_warnings(&outcome);
            match outcome.value.setup {
                Some(setup) => println!(
                    "initialized: user {} ({}), wallet {} ({})",
                    setup.user.username, setup.user.id, setup.wallet.name, setup.wallet.id
                ),
                None => println!("already initialized"),
            }
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let mut cmd = NewUserCmd::new(args.username);
            cmd.name = args.name;
            cmd.email = args.email;

            if args.wallet_name.is_none() && !args.with_categories {
                let user = engine.create_user(cmd).await?;
                println!("created user: {} ({})", user.username, user.id);
                return Ok(());
            }

            let mut setup = SetupUserCmd::new(cmd).with_categories(args.with_categories);
            setup.wallet_name = args.wallet_name;
            let outcome = engine.setup_user(setup).await?;
            report_warnings(&outcome);
            let report = outcome.value;
            println!(
                "created user: {} ({}) with wallet {} ({})",
                report.user.username, report.user.id, report.wallet.name, report.wallet.id
            );
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Create(args),
        }) => {
            let mut cmd = NewWalletCmd::new(args.name);
            if let Some(icon) = args.icon {
                cmd = cmd.icon(icon);
            }
            if let Some(balance) = args.balance {
                cmd = cmd.balance_minor(balance.minor());
            }
            let wallet = engine.create_wallet(cmd).await?;
            println!(
                "created wallet: {} ({}), balance {}",
                wallet.name,
                wallet.id,
                wallet.balance()
            );
        }
        Command::Category(Category {
            command: CategoryCommand::SyncGlobal(args),
        }) => {
            let report = engine.sync_global_category(args.id, None).await?;
            for (wallet_id, message) in &report.failed {
                tracing::warn!("wallet {wallet_id}: {message}");
            }
            println!(
                "category {}: {} created, {} skipped, {} failed",
                report.category_id,
                report.created.len(),
                report.skipped_wallets.len(),
                report.failed.len()
            );
        }
    }

    Ok(())
}
