//! `SELECT` — grounded on `examples/original_source/src/query/data/SelectQuery.cpp`.
//!
//! Output columns: `KEY` always leads, followed by the requested fields in
//! the order given with duplicates removed, sorted by key ascending at
//! emission time (rows are unordered internally, per spec.md §3).

use crate::condition::CompiledCondition;
use crate::error::EngineError;
use crate::result::{render_row_line, QuerySuccess};
use crate::table::{Table, KEY};

pub fn execute(
    table: &Table,
    fields: &[String],
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    if fields.is_empty() {
        return Err(EngineError::InvalidOperands);
    }
    let mut indices = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for field in fields {
        if field == KEY {
            continue;
        }
        if seen.insert(field.clone()) {
            indices.push(table.field_index(field)?);
        }
    }

    let matching = cond.matching_indices(table);
    let mut rows: Vec<(&str, Vec<i32>)> = matching
        .into_iter()
        .map(|idx| {
            let row = table.row_at(idx);
            let cells = indices.iter().map(|&i| row.cells[i]).collect();
            (row.key.as_str(), cells)
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let lines = rows
        .into_iter()
        .map(|(key, cells)| render_row_line(key, &cells))
        .collect();
    Ok(QuerySuccess::Rows(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Op, RawCondition};

    fn student() -> Table {
        let mut t = Table::new("Student", vec!["studentID".into(), "class".into()]).unwrap();
        t.insert("Bill_Gates".into(), vec![400812312, 2014]).unwrap();
        t.insert("Steve_Jobs".into(), vec![400851751, 2014]).unwrap();
        t.insert("Jack_Ma".into(), vec![400882382, 2015]).unwrap();
        t
    }

    #[test]
    fn sorted_by_key_with_key_leading() {
        let t = student();
        let cond = CompiledCondition::compile(&t, &[]).unwrap();
        let out = execute(&t, &["KEY".into(), "class".into(), "studentID".into()], &cond).unwrap();
        match out {
            QuerySuccess::Rows(lines) => {
                assert_eq!(
                    lines.join(""),
                    "( Bill_Gates 2014 400812312 )\n( Jack_Ma 2015 400882382 )\n( Steve_Jobs 2014 400851751 )\n"
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_field_list_is_rejected() {
        let t = student();
        let cond = CompiledCondition::compile(&t, &[]).unwrap();
        let err = execute(&t, &[], &cond).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperands));
    }

    #[test]
    fn duplicate_fields_collapse() {
        let t = student();
        let cond = CompiledCondition::compile(
            &t,
            &[RawCondition { field: "KEY".into(), op: Op::Eq, literal: "Jack_Ma".into() }],
        )
        .unwrap();
        let out = execute(&t, &["class".into(), "class".into()], &cond).unwrap();
        match out {
            QuerySuccess::Rows(lines) => assert_eq!(lines.join(""), "( Jack_Ma 2015 )\n"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
