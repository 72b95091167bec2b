//! Bookkeeping engine: wallets, hierarchical categories, persons and
//! transactions, with the wallet balance kept in line with the transactions.
//!
//! Every operation lives on [`Engine`], which owns the database handle.

pub use balance::{BalanceEffect, EXPENSE_ROOT_ID, INCOME_ROOT_ID};
pub use categories::{Category, CategoryNode, CategoryTree};
pub use commands::{
    CategoryPatch, InitCmd, NewCategoryCmd, NewTransactionCmd, NewUserCmd, NewWalletCmd,
    PersonPatch, SetupUserCmd, TransactionPatch, UserPatch, WalletPatch,
};
pub use error::{EngineError, ErrorKind};
pub use money::Money;
pub use ops::{
    AmountFilter, AmountOp, Engine, EngineBuilder, InitReport, SetupReport, SyncReport,
    TimeRange, TransactionListFilter,
};
pub use outcome::{AuxiliaryFailure, AuxiliaryStep, WriteOutcome};
pub use persons::Person;
pub use transactions::{Transaction, TransactionDetail};
pub use users::{User, UserType};
pub use wallet_groups::WalletGroup;
pub use wallets::Wallet;

mod balance;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod outcome;
mod persons;
mod transactions;
mod user_wallets;
mod users;
mod wallet_group_wallets;
mod wallet_groups;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
