//! Error taxonomy for the engine.
//!
//! Mirrors the kind-grouping in `original_source/src/utils/uexception.h`
//! rather than its exception-per-file layout: one `thiserror` enum per
//! operator-internal concern, aggregated into [`EngineError`] at the point
//! where operators render a failure result.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::table::Table`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Field name \"KEY\" is reserved and cannot be used as a column")]
    ReservedFieldName,
    #[error("Column with name \"{0}\" already exists")]
    DuplicateFieldName(String),
    #[error("Field name \"{0}\" doesn't exists")]
    FieldNotFound(String),
    #[error("Key \"{0}\" already exists!")]
    ConflictingKey(String),
    #[error("Key \"{0}\" doesn't exist!")]
    NotFoundKey(String),
    #[error("expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}

/// Errors raised by [`crate::registry::Registry`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Error when inserting table \"{0}\": name already exists")]
    DuplicatedTableName(String),
    #[error("Error accessing table \"{0}\": table not found")]
    TableNameNotFound(String),
}

/// Errors raised while compiling or evaluating a `WHERE` condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("Can only compare equivalence on KEY")]
    KeyNotEquality,
    #[error("\"{0}\" is not a valid condition operator")]
    UnknownOperator(String),
    #[error(transparent)]
    Field(#[from] TableFieldError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Field name \"{0}\" doesn't exists")]
pub struct TableFieldError(pub String);

/// Errors raised while tokenizing or building a query object.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryBuildError {
    #[error("Failed to parse query string: \"{0}\"")]
    NoMatchingBuilder(String),
    #[error("{0}")]
    IllFormed(String),
}

/// Errors raised by the table file format reader/writer (`LOAD`/`DUMP`).
#[derive(Debug, Error)]
pub enum FileFormatError {
    #[error("Cannot open file '{0}'")]
    CannotOpen(PathBuf),
    #[error("Invalid table (from \"{source_name}\") format: {reason}")]
    Malformed { source_name: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Fatal, process-terminating configuration problems (spec.md §7 "Environment errors").
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("threads num can not be negative value {0}")]
    NegativeThreadCount(i64),
    #[error("--listen argument not found, not allowed in production mode")]
    MissingListenInRelease,
    #[error("{0}: no such file or directory")]
    ListenFileNotFound(PathBuf),
}

/// The error type carried by a failed [`crate::result::QueryOutcome`].
///
/// Rendering (`Display`) intentionally reproduces the exact short messages
/// `original_source` wraps in `ErrorMsgResult`, so `lemondb-core::result`
/// can format the full `Query "OP" failed ...` line around it uniformly.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No such table")]
    TableNotFound,
    #[error("Target table name exists")]
    TargetTableExists,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Condition(#[from] ConditionError),
    #[error("Invalid number of operands ({0} operands)")]
    InvalidOperandCount(usize),
    #[error("Invalid operands")]
    InvalidOperands,
    #[error(transparent)]
    Build(#[from] QueryBuildError),
    #[error(transparent)]
    File(#[from] FileFormatError),
    #[error("{0}")]
    Other(String),
}

impl From<RegistryError> for EngineError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::TableNameNotFound(_) => EngineError::TableNotFound,
            RegistryError::DuplicatedTableName(name) => {
                EngineError::Other(format!("Name already exists: \"{name}\""))
            }
        }
    }
}
