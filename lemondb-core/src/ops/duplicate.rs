//! `DUPLICATE` — `examples/original_source/src/query/data/DuplicateQuery.cpp`
//! is an unfinished stub (its loop never actually inserts a row); the
//! behavior here follows spec.md §4.4 and §8's non-idempotence property: for
//! each matching row, create a `key + "_copy"` sibling if one doesn't
//! already exist. All matches are collected up front so a row created by
//! this call never itself becomes eligible for duplication within the same
//! execution.

use crate::condition::CompiledCondition;
use crate::error::EngineError;
use crate::result::QuerySuccess;
use crate::table::Table;

pub fn execute(table: &mut Table, cond: &CompiledCondition) -> Result<QuerySuccess, EngineError> {
    let candidates: Vec<(String, Vec<i32>)> = cond
        .matching_indices(table)
        .into_iter()
        .map(|idx| {
            let row = table.row_at(idx);
            (row.key.clone(), row.cells.clone())
        })
        .collect();

    let mut affected = 0u64;
    for (key, cells) in candidates {
        let copy_key = format!("{key}_copy");
        if table.get(&copy_key).is_none() {
            table.insert(copy_key, cells)?;
            affected += 1;
        }
    }
    Ok(QuerySuccess::RecordCount(affected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_rows_without_existing_copy() {
        let mut t = Table::new("T", vec!["a".into()]).unwrap();
        t.insert("k1".into(), vec![1]).unwrap();
        t.insert("k2".into(), vec![2]).unwrap();
        let cond = CompiledCondition::compile(&t, &[]).unwrap();

        let out = execute(&mut t, &cond).unwrap();
        assert_eq!(out, QuerySuccess::RecordCount(2));
        assert_eq!(t.get("k1_copy").unwrap().cells, vec![1]);
        assert_eq!(t.get("k2_copy").unwrap().cells, vec![2]);
    }

    #[test]
    fn second_run_only_copies_the_copies_not_originals() {
        let mut t = Table::new("T", vec!["a".into()]).unwrap();
        t.insert("k1".into(), vec![1]).unwrap();
        let cond = CompiledCondition::compile(&t, &[]).unwrap();

        execute(&mut t, &cond).unwrap();
        let out = execute(&mut t, &cond).unwrap();
        // k1 already has k1_copy (skipped); k1_copy does not yet have
        // k1_copy_copy (created).
        assert_eq!(out, QuerySuccess::RecordCount(1));
        assert!(t.get("k1_copy_copy").is_some());
    }
}
