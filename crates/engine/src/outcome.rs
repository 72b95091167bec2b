//! Result of a write whose secondary steps may fail independently.
//!
//! The primary row write decides success or failure of an operation. The
//! steps that keep derived state in line (balance, global mirrors, relation
//! reload) run in a savepoint: when one fails it is rolled back, logged and
//! recorded here, while the primary write still commits.

use std::fmt;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxiliaryStep {
    BalanceAdjustment,
    GlobalPropagation,
    RelationReload,
}

impl AuxiliaryStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BalanceAdjustment => "balance_adjustment",
            Self::GlobalPropagation => "global_propagation",
            Self::RelationReload => "relation_reload",
        }
    }
}

impl fmt::Display for AuxiliaryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuxiliaryFailure {
    pub step: AuxiliaryStep,
    pub message: String,
}

impl AuxiliaryFailure {
    pub fn new(step: AuxiliaryStep, err: &EngineError) -> Self {
        Self {
            step,
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WriteOutcome<T> {
    pub value: T,
    pub warnings: Vec<AuxiliaryFailure>,
}

impl<T> WriteOutcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<AuxiliaryFailure>) -> Self {
        Self { value, warnings }
    }

    /// `true` when every auxiliary step succeeded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WriteOutcome<U> {
        WriteOutcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<AuxiliaryFailure>) {
        (self.value, self.warnings)
    }
}

/// Run an auxiliary step inside a savepoint of `$db_tx`.
///
/// `$body` is evaluated with `$sp` bound to the savepoint and may use `?`.
/// Evaluates to `Some(value)` on success. On failure the savepoint is rolled
/// back, the error is logged and pushed to `$warnings`, and the macro
/// evaluates to `None`.
macro_rules! best_effort {
    ($db_tx:expr, $warnings:expr, $step:expr, |$sp:ident| $body:expr) => {{
        let step: $crate::AuxiliaryStep = $step;
        let attempt = async {
            let $sp = sea_orm::TransactionTrait::begin($db_tx).await?;
            let value = $body;
            $sp.commit().await?;
            Ok::<_, $crate::EngineError>(value)
        }
        .await;
        match attempt {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(step = %step, error = %err, "auxiliary step failed");
                $warnings.push($crate::AuxiliaryFailure::new(step, &err));
                None
            }
        }
    }};
}

pub(crate) use best_effort;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_tracks_warnings() {
        let outcome = WriteOutcome::new(7);
        assert!(outcome.is_clean());

        let failure = AuxiliaryFailure::new(
            AuxiliaryStep::BalanceAdjustment,
            &EngineError::KeyNotFound("wallet".to_string()),
        );
        let outcome = WriteOutcome::with_warnings(7, vec![failure.clone()]).map(|v| v * 2);
        assert!(!outcome.is_clean());
        assert_eq!(outcome.value, 14);
        assert_eq!(outcome.warnings, vec![failure]);
        assert_eq!(outcome.warnings[0].message, "\"wallet\" key not found!");
    }

    #[test]
    fn step_names_are_snake_case() {
        assert_eq!(AuxiliaryStep::GlobalPropagation.to_string(), "global_propagation");
    }
}
