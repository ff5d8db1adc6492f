//! Rendering of query outcomes into fixed-format text.
//!
//! Exact wording mirrors `examples/original_source/src/query/QueryResult.h`'s
//! `SuccessMsgResult`/`ErrorMsgResult`/`RecordCountResult`/`TextRowsResult`
//! formatting, generalized into one render function over a small result enum
//! instead of one `QueryResult` subclass per shape.

use itertools::Itertools;

use crate::error::EngineError;
use crate::value::Value;

/// What one query produced on success, before an id/table has been attached.
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySuccess {
    /// No output at all (COPYTABLE, TRUNCATE).
    Null,
    /// `Affected N rows.` (DELETE, UPDATE, ADD, SUB, SWAP, DUPLICATE).
    RecordCount(u64),
    /// `ANSWER = "N".` (COUNT).
    Scalar(i64),
    /// `ANSWER = ( v1 v2 … )` (SUM, MIN, MAX).
    Vector(Vec<Value>),
    /// `Query "OP" success.` or the table-scoped variant (INSERT, DROP, LOAD, DUMP, LIST, SHOWTABLE).
    Ack { message: Option<String> },
    /// `( key v1 v2 … )` lines, already sorted by key (SELECT).
    Rows(Vec<String>),
    /// `ANSWER = ( listening from FILE )` (LISTEN).
    Listening(String),
    /// Raw side-effect text printed verbatim, with no success/failure
    /// template wrapped around it (LIST's table names, SHOWTABLE's dump).
    Raw(String),
}

/// Renders a successful outcome's body text for operator `op` against
/// `table` (when the operator is table-scoped).
pub fn render_success(op: &str, table: Option<&str>, success: &QuerySuccess) -> String {
    match success {
        QuerySuccess::Null => String::new(),
        QuerySuccess::RecordCount(n) => format!("Affected {n} rows."),
        QuerySuccess::Scalar(n) => format!("ANSWER = \"{n}\"."),
        QuerySuccess::Vector(values) => format!("ANSWER = ( {} )", join_values(values)),
        QuerySuccess::Ack { message } => render_ack(op, table, message.as_deref()),
        QuerySuccess::Rows(lines) => lines.join(""),
        QuerySuccess::Listening(file) => format!("ANSWER = ( listening from {file} )"),
        QuerySuccess::Raw(text) => text.clone(),
    }
}

fn render_ack(op: &str, table: Option<&str>, message: Option<&str>) -> String {
    match (table, message) {
        (Some(t), Some(msg)) => format!("Query \"{op}\" success in Table \"{t}\" : {msg}."),
        (None, Some(msg)) => format!("Query \"{op}\" success : {msg}."),
        (Some(t), None) => format!("Query \"{op}\" success in Table \"{t}\"."),
        (None, None) => format!("Query \"{op}\" success."),
    }
}

/// Renders a failed outcome's body text. The `QUERY FAILED:` prefix is added
/// by the output collector; that wording is about *delivery*, not about the
/// query's own result.
pub fn render_failure(op: &str, table: Option<&str>, err: &EngineError) -> String {
    match table {
        Some(t) => format!("Query \"{op}\" failed in Table \"{t}\" : {err}."),
        None => format!("Query \"{op}\" failed : {err}."),
    }
}

fn join_values(values: &[Value]) -> String {
    values.iter().join(" ")
}

/// Formats one `SELECT` row as `( key v1 v2 … )\n`.
pub fn render_row_line(key: &str, cells: &[Value]) -> String {
    if cells.is_empty() {
        format!("( {key} )\n")
    } else {
        format!("( {key} {} )\n", join_values(cells))
    }
}
