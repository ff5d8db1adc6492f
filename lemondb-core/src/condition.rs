//! Compiled `WHERE`-style filter conditions.
//!
//! Grounded on `examples/original_source/src/query/Query.cpp`'s
//! `initCondition`/`evalCondition`/`testKeyCondition` compare logic and on
//! the KEY-equality restriction from `spec.md` §4.2, generalized
//! into a small compiled representation so [`crate::exec`] can fast-path
//! lookups by key and short-circuit unsatisfiable conjunctions the way
//! `examples/clockworklabs-SpacetimeDB/crates/core/src/sql/query_planner`
//! narrows plans ahead of execution.

use crate::error::{ConditionError, TableFieldError};
use crate::table::{Table, KEY};
use crate::value::{parse_int_literal, Value};

/// A single `field OP literal` comparison as parsed from query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCondition {
    pub field: String,
    pub op: Op,
    pub literal: String,
}

/// Comparison operators accepted in a condition clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub fn parse(token: &str) -> Result<Self, ConditionError> {
        match token {
            "=" => Ok(Op::Eq),
            "<>" => Ok(Op::Ne),
            "<" => Ok(Op::Lt),
            "<=" => Ok(Op::Le),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Ge),
            other => Err(ConditionError::UnknownOperator(other.to_string())),
        }
    }

    fn apply(self, lhs: Value, rhs: Value) -> bool {
        match self {
            Op::Eq => lhs == rhs,
            Op::Ne => lhs != rhs,
            Op::Lt => lhs < rhs,
            Op::Le => lhs <= rhs,
            Op::Gt => lhs > rhs,
            Op::Ge => lhs >= rhs,
        }
    }
}

/// One clause compiled against a specific table's schema: either a key
/// comparison (equality only, per spec) or a column-index comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CompiledClause {
    Key(String),
    Field { index: usize, op: Op, value: Value },
}

/// A conjunction of compiled clauses (`AND`-joined `WHERE` condition).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledCondition {
    clauses: Vec<CompiledClause>,
}

impl CompiledCondition {
    /// Compiles a list of raw clauses against `table`'s schema.
    ///
    /// `KEY` may only be compared with `=`; any other operator against `KEY`
    /// is rejected, matching `original_source`'s `Condition::build`.
    pub fn compile(table: &Table, raw: &[RawCondition]) -> Result<Self, ConditionError> {
        let mut clauses = Vec::with_capacity(raw.len());
        for cond in raw {
            if cond.field == KEY {
                if cond.op != Op::Eq {
                    return Err(ConditionError::KeyNotEquality);
                }
                clauses.push(CompiledClause::Key(cond.literal.clone()));
            } else {
                let index = table
                    .field_index(&cond.field)
                    .map_err(|_| TableFieldError(cond.field.clone()))?;
                clauses.push(CompiledClause::Field {
                    index,
                    op: cond.op,
                    value: parse_int_literal(&cond.literal),
                });
            }
        }
        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `true` when the conjunction contains two incompatible KEY-equality
    /// clauses (`KEY = a AND KEY = b` with `a != b`), letting callers skip a
    /// full table scan entirely.
    pub fn is_unsatisfiable(&self) -> bool {
        let mut seen: Option<&str> = None;
        for clause in &self.clauses {
            if let CompiledClause::Key(k) = clause {
                match seen {
                    None => seen = Some(k),
                    Some(prev) if prev != k => return true,
                    _ => {}
                }
            }
        }
        false
    }

    /// If the conjunction pins the row key to a single exact value, returns
    /// it so the caller can do an O(1) `key_index` lookup instead of a full
    /// scan.
    pub fn fast_path_key(&self) -> Option<&str> {
        self.clauses.iter().find_map(|c| match c {
            CompiledClause::Key(k) => Some(k.as_str()),
            _ => None,
        })
    }

    /// Evaluates every clause against one row's key and cells.
    pub fn eval(&self, key: &str, cells: &[Value]) -> bool {
        self.clauses.iter().all(|clause| match clause {
            CompiledClause::Key(expected) => key == expected,
            CompiledClause::Field { index, op, value } => op.apply(cells[*index], *value),
        })
    }

    /// Resolves matching row indices against `table`, taking the
    /// unsatisfiable short-circuit and KEY fast paths described in
    /// `spec.md` §4.3 before falling back to a full scan.
    pub fn matching_indices(&self, table: &Table) -> Vec<usize> {
        if self.is_unsatisfiable() {
            return Vec::new();
        }
        if let Some(key) = self.fast_path_key() {
            return match table.row_index(key) {
                Some(idx) => {
                    let row = table.row_at(idx);
                    if self.eval(&row.key, &row.cells) {
                        vec![idx]
                    } else {
                        Vec::new()
                    }
                }
                None => Vec::new(),
            };
        }
        table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| self.eval(&row.key, &row.cells))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(field: &str, op: Op, literal: &str) -> RawCondition {
        RawCondition { field: field.into(), op, literal: literal.into() }
    }

    fn table() -> Table {
        let mut t = Table::new("Student", vec!["studentID".into(), "class".into()]).unwrap();
        t.insert("Bill_Gates".into(), vec![400812312, 2014]).unwrap();
        t
    }

    #[test]
    fn key_must_use_equality() {
        let t = table();
        let err = CompiledCondition::compile(&t, &[cond("KEY", Op::Gt, "a")]).unwrap_err();
        assert_eq!(err, ConditionError::KeyNotEquality);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let t = table();
        let err = CompiledCondition::compile(&t, &[cond("gpa", Op::Eq, "4")]).unwrap_err();
        assert!(matches!(err, ConditionError::Field(_)));
    }

    #[test]
    fn fast_path_key_detected() {
        let t = table();
        let c = CompiledCondition::compile(
            &t,
            &[cond("KEY", Op::Eq, "Bill_Gates"), cond("class", Op::Eq, "2014")],
        )
        .unwrap();
        assert_eq!(c.fast_path_key(), Some("Bill_Gates"));
        assert!(c.eval("Bill_Gates", &[400812312, 2014]));
        assert!(!c.eval("Bill_Gates", &[400812312, 2015]));
    }

    #[test]
    fn conflicting_key_equalities_are_unsatisfiable() {
        let t = table();
        let c = CompiledCondition::compile(
            &t,
            &[cond("KEY", Op::Eq, "Bill_Gates"), cond("KEY", Op::Eq, "Steve_Jobs")],
        )
        .unwrap();
        assert!(c.is_unsatisfiable());
    }

    #[test]
    fn matching_indices_uses_fast_path_for_single_key_equality() {
        let mut t = table();
        t.insert("Steve_Jobs".into(), vec![400851751, 2014]).unwrap();
        let c = CompiledCondition::compile(&t, &[cond("KEY", Op::Eq, "Steve_Jobs")]).unwrap();
        let idx = c.matching_indices(&t);
        assert_eq!(idx, vec![t.row_index("Steve_Jobs").unwrap()]);
    }

    #[test]
    fn matching_indices_short_circuits_unsatisfiable_conjunction() {
        let t = table();
        let c = CompiledCondition::compile(
            &t,
            &[cond("KEY", Op::Eq, "Bill_Gates"), cond("KEY", Op::Eq, "Nobody")],
        )
        .unwrap();
        assert!(c.matching_indices(&t).is_empty());
    }

    #[test]
    fn field_comparisons_evaluate() {
        let t = table();
        let c = CompiledCondition::compile(&t, &[cond("class", Op::Ge, "2014")]).unwrap();
        assert!(c.eval("x", &[0, 2014]));
        assert!(!c.eval("x", &[0, 2013]));
    }
}
