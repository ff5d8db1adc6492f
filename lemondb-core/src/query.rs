//! The query object model: one tagged variant per operator.
//!
//! Replaces the virtual `Query`/`ComplexQuery`/`ManageTableQuery` hierarchy
//! in `examples/original_source/src/query/Query.h` with a single enum, per
//! the "Polymorphic query hierarchy" redesign note — dispatch happens once,
//! in [`crate::exec::dispatch::execute`], instead of through a vtable.

use crate::condition::RawCondition;
use crate::value::Value;

/// One query, already fully parsed and validated for shape (but not yet
/// checked against any particular table's schema).
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    List,
    Quit,
    ShowTable { table: String },

    Load { path: String },
    Drop { table: String },
    Truncate { table: String },
    Dump { table: String, path: String },
    CopyTable { src: String, dst: String },
    Listen { path: String },

    Insert { table: String, key: String, values: Vec<Value> },
    Update { table: String, field: String, literal: String, cond: Vec<RawCondition> },
    Delete { table: String, cond: Vec<RawCondition> },
    Select { table: String, fields: Vec<String>, cond: Vec<RawCondition> },
    Count { table: String, cond: Vec<RawCondition> },
    Sum { table: String, fields: Vec<String>, cond: Vec<RawCondition> },
    Min { table: String, fields: Vec<String>, cond: Vec<RawCondition> },
    Max { table: String, fields: Vec<String>, cond: Vec<RawCondition> },
    Add { table: String, fields: Vec<String>, dst: String, cond: Vec<RawCondition> },
    Sub { table: String, f1: String, f2: String, dst: String, cond: Vec<RawCondition> },
    Swap { table: String, fa: String, fb: String, cond: Vec<RawCondition> },
    Duplicate { table: String, cond: Vec<RawCondition> },
}

impl Query {
    /// The uppercase operator name used in rendered success/failure text.
    pub fn name(&self) -> &'static str {
        match self {
            Query::List => "LIST",
            Query::Quit => "QUIT",
            Query::ShowTable { .. } => "SHOWTABLE",
            Query::Load { .. } => "LOAD",
            Query::Drop { .. } => "DROP",
            Query::Truncate { .. } => "TRUNCATE",
            Query::Dump { .. } => "DUMP",
            Query::CopyTable { .. } => "COPYTABLE",
            Query::Listen { .. } => "LISTEN",
            Query::Insert { .. } => "INSERT",
            Query::Update { .. } => "UPDATE",
            Query::Delete { .. } => "DELETE",
            Query::Select { .. } => "SELECT",
            Query::Count { .. } => "COUNT",
            Query::Sum { .. } => "SUM",
            Query::Min { .. } => "MIN",
            Query::Max { .. } => "MAX",
            Query::Add { .. } => "ADD",
            Query::Sub { .. } => "SUB",
            Query::Swap { .. } => "SWAP",
            Query::Duplicate { .. } => "DUPLICATE",
        }
    }

    /// The table this query targets, if any (`LIST`/`QUIT` target none).
    pub fn target_table(&self) -> Option<&str> {
        match self {
            Query::List | Query::Quit => None,
            Query::ShowTable { table }
            | Query::Drop { table }
            | Query::Truncate { table }
            | Query::Dump { table, .. }
            | Query::Insert { table, .. }
            | Query::Update { table, .. }
            | Query::Delete { table, .. }
            | Query::Select { table, .. }
            | Query::Count { table, .. }
            | Query::Sum { table, .. }
            | Query::Min { table, .. }
            | Query::Max { table, .. }
            | Query::Add { table, .. }
            | Query::Sub { table, .. }
            | Query::Swap { table, .. }
            | Query::Duplicate { table, .. } => Some(table),
            Query::CopyTable { src, .. } => Some(src),
            Query::Load { .. } | Query::Listen { .. } => None,
        }
    }

    /// Whether the query must run serially with respect to all other
    /// scheduled work, not just work on its own table.
    pub fn is_instant(&self) -> bool {
        matches!(
            self,
            Query::Load { .. }
                | Query::Drop { .. }
                | Query::Dump { .. }
                | Query::Quit
                | Query::Listen { .. }
        )
    }
}
