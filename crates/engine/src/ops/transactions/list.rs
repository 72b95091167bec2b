use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, QueryFilter};

use crate::{EngineError, ResultEngine, transactions};

/// Inclusive time window. A missing bound leaves that side open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    fn validate(&self, label: &str) -> ResultEngine<()> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(EngineError::InvalidFilter(format!(
                "{label}: start must not be after end"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl AmountOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }
}

impl fmt::Display for AmountOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmountOp {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eq" => Ok(Self::Eq),
            "lt" => Ok(Self::Lt),
            "le" => Ok(Self::Le),
            "gt" => Ok(Self::Gt),
            "ge" => Ok(Self::Ge),
            other => Err(EngineError::InvalidFilter(format!(
                "unknown amount operator '{other}'"
            ))),
        }
    }
}

/// Compare the stored (positive) amount against `value_minor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountFilter {
    pub op: AmountOp,
    pub value_minor: i64,
}

/// Filters for listing transactions. Every set field narrows the result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionListFilter {
    pub transaction_time: TimeRange,
    pub entry_time: TimeRange,
    pub last_modified_time: TimeRange,
    pub user_id: Option<i64>,
    /// Empty means any category.
    pub category_ids: Vec<i64>,
    pub wallet_id: Option<i64>,
    pub person_id: Option<i64>,
    /// Substring the note must contain.
    pub fuzzy_note: Option<String>,
    pub amount: Option<AmountFilter>,
}

impl TransactionListFilter {
    #[must_use]
    pub fn transaction_time(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.transaction_time = TimeRange::new(start, end);
        self
    }

    #[must_use]
    pub fn entry_time(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.entry_time = TimeRange::new(start, end);
        self
    }

    #[must_use]
    pub fn last_modified_time(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.last_modified_time = TimeRange::new(start, end);
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: i64) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.category_ids = ids.into_iter().collect();
        self
    }

    #[must_use]
    pub fn person_id(mut self, person_id: i64) -> Self {
        self.person_id = Some(person_id);
        self
    }

    #[must_use]
    pub fn fuzzy_note(mut self, needle: impl Into<String>) -> Self {
        self.fuzzy_note = Some(needle.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, op: AmountOp, value_minor: i64) -> Self {
        self.amount = Some(AmountFilter { op, value_minor });
        self
    }

    pub(super) fn validate(&self) -> ResultEngine<()> {
        self.transaction_time.validate("transaction_time")?;
        self.entry_time.validate("entry_time")?;
        self.last_modified_time.validate("last_modified_time")?;
        Ok(())
    }
}

pub(super) trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        self = apply_range(
            self,
            transactions::Column::TransactionTime,
            filter.transaction_time,
        );
        self = apply_range(self, transactions::Column::EntryTime, filter.entry_time);
        self = apply_range(
            self,
            transactions::Column::LastModifiedTime,
            filter.last_modified_time,
        );

        if let Some(user_id) = filter.user_id {
            self = self.filter(transactions::Column::UserId.eq(user_id));
        }
        if !filter.category_ids.is_empty() {
            self = self.filter(
                transactions::Column::CategoryId.is_in(filter.category_ids.iter().copied()),
            );
        }
        if let Some(wallet_id) = filter.wallet_id {
            self = self.filter(transactions::Column::WalletId.eq(wallet_id));
        }
        if let Some(person_id) = filter.person_id {
            self = self.filter(transactions::Column::PersonId.eq(person_id));
        }
        if let Some(needle) = filter
            .fuzzy_note
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            self = self.filter(transactions::Column::Note.contains(needle));
        }
        if let Some(AmountFilter { op, value_minor }) = filter.amount {
            let column = transactions::Column::AmountMinor;
            self = self.filter(match op {
                AmountOp::Eq => column.eq(value_minor),
                AmountOp::Lt => column.lt(value_minor),
                AmountOp::Le => column.lte(value_minor),
                AmountOp::Gt => column.gt(value_minor),
                AmountOp::Ge => column.gte(value_minor),
            });
        }

        self
    }
}

fn apply_range<T: QueryFilter>(query: T, column: transactions::Column, range: TimeRange) -> T {
    match (range.start, range.end) {
        (Some(start), Some(end)) => query.filter(column.between(start, end)),
        (Some(start), None) => query.filter(column.gte(start)),
        (None, Some(end)) => query.filter(column.lte(end)),
        (None, None) => query,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn amount_operators_parse() {
        assert_eq!("eq".parse::<AmountOp>().unwrap(), AmountOp::Eq);
        assert_eq!(" GE ".parse::<AmountOp>().unwrap(), AmountOp::Ge);
        assert_eq!(
            "between".parse::<AmountOp>(),
            Err(EngineError::InvalidFilter(
                "unknown amount operator 'between'".to_string()
            ))
        );
    }

    #[test]
    fn reversed_ranges_are_rejected() {
        let early = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let ok = TransactionListFilter::default().transaction_time(Some(early), Some(late));
        assert!(ok.validate().is_ok());

        let same_instant =
            TransactionListFilter::default().transaction_time(Some(early), Some(early));
        assert!(same_instant.validate().is_ok());

        let mut bad = TransactionListFilter::default();
        bad.entry_time = TimeRange::new(Some(late), Some(early));
        assert!(matches!(bad.validate(), Err(EngineError::InvalidFilter(_))));
    }

    #[test]
    fn open_range() {
        assert!(TimeRange::default().is_open());
        assert!(!TimeRange::new(None, Some(Utc::now())).is_open());
    }
}
