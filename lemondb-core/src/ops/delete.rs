//! `DELETE` — grounded on `examples/original_source/src/query/data/DeleteQuery.cpp`.
//!
//! Collects matching keys before mutating, since `Table::delete`'s swap-pop
//! invalidates row indices as it goes (spec.md §4.4: "collects matching keys
//! then deletes").

use crate::condition::CompiledCondition;
use crate::error::EngineError;
use crate::result::QuerySuccess;
use crate::table::Table;

pub fn execute(table: &mut Table, cond: &CompiledCondition) -> Result<QuerySuccess, EngineError> {
    let keys: Vec<String> = cond
        .matching_indices(table)
        .into_iter()
        .map(|idx| table.row_at(idx).key.clone())
        .collect();
    for key in &keys {
        table.delete(key)?;
    }
    Ok(QuerySuccess::RecordCount(keys.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Op, RawCondition};

    #[test]
    fn swap_pop_delete_matches_spec_scenario() {
        let mut t = Table::new("T", vec!["age".into(), "score".into()]).unwrap();
        let ages = [18, 19, 20, 21, 22, 23, 24];
        let scores = [80, 85, 55, 50, 58, 90, 95];
        for i in 0..7 {
            t.insert(format!("k{i}"), vec![ages[i], scores[i]]).unwrap();
        }
        let cond = CompiledCondition::compile(
            &t,
            &[
                RawCondition { field: "age".into(), op: Op::Ge, literal: "20".into() },
                RawCondition { field: "score".into(), op: Op::Lt, literal: "60".into() },
            ],
        )
        .unwrap();
        let out = execute(&mut t, &cond).unwrap();
        assert_eq!(out, QuerySuccess::RecordCount(3));
        assert_eq!(t.len(), 4);
        for removed in ["k2", "k3", "k4"] {
            assert!(t.get(removed).is_none());
        }
        for kept in ["k0", "k1", "k5", "k6"] {
            assert!(t.get(kept).is_some());
        }
    }
}
