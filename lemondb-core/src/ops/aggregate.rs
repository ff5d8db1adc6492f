//! `COUNT`, `SUM`, `MIN`, `MAX` — grounded on the corresponding files under
//! `examples/original_source/src/query/data/` (`CountQuery.cpp`,
//! `SumQuery.cpp`, `MinQuery.cpp`, `MaxQuery.cpp`). `SUM`/`MIN`/`MAX` chunk
//! over the table with `rayon::par_chunks`, matching `ops::update`'s
//! read/write split — these are read-only so chunks fold independently with
//! no aliasing concerns at all.

use rayon::prelude::*;

use crate::condition::CompiledCondition;
use crate::error::EngineError;
use crate::exec::worker_pool::WorkerPool;
use crate::ops::DEFAULT_CHUNK_SIZE;
use crate::result::QuerySuccess;
use crate::table::{Table, KEY};

fn resolve_fields(table: &Table, fields: &[String]) -> Result<Vec<usize>, EngineError> {
    if fields.iter().any(|f| f == KEY) {
        return Err(EngineError::InvalidOperands);
    }
    fields
        .iter()
        .map(|f| table.field_index(f).map_err(EngineError::from))
        .collect()
}

pub fn count(table: &Table, cond: &CompiledCondition) -> Result<QuerySuccess, EngineError> {
    Ok(QuerySuccess::Scalar(cond.matching_indices(table).len() as i64))
}

pub fn sum(
    table: &Table,
    pool: &WorkerPool,
    fields: &[String],
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    let indices = resolve_fields(table, fields)?;
    let width = indices.len();
    let totals = pool.install(|| {
        table
            .rows()
            .par_chunks(DEFAULT_CHUNK_SIZE)
            .map(|chunk| {
                let mut local = vec![0i32; width];
                for row in chunk {
                    if cond.eval(&row.key, &row.cells) {
                        for (slot, &idx) in local.iter_mut().zip(indices.iter()) {
                            *slot = slot.wrapping_add(row.cells[idx]);
                        }
                    }
                }
                local
            })
            .reduce(
                || vec![0i32; width],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x = x.wrapping_add(y);
                    }
                    a
                },
            )
    });
    Ok(QuerySuccess::Vector(totals))
}

pub fn min(
    table: &Table,
    pool: &WorkerPool,
    fields: &[String],
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    extremum(table, pool, fields, cond, i32::min)
}

pub fn max(
    table: &Table,
    pool: &WorkerPool,
    fields: &[String],
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    extremum(table, pool, fields, cond, i32::max)
}

fn extremum(
    table: &Table,
    pool: &WorkerPool,
    fields: &[String],
    cond: &CompiledCondition,
    combine: fn(i32, i32) -> i32,
) -> Result<QuerySuccess, EngineError> {
    let indices = resolve_fields(table, fields)?;
    let result: Option<Vec<i32>> = pool.install(|| {
        table
            .rows()
            .par_chunks(DEFAULT_CHUNK_SIZE)
            .map(|chunk| {
                let mut local: Option<Vec<i32>> = None;
                for row in chunk {
                    if cond.eval(&row.key, &row.cells) {
                        let values: Vec<i32> = indices.iter().map(|&i| row.cells[i]).collect();
                        local = Some(match local {
                            None => values,
                            Some(prev) => merge(&prev, &values, combine),
                        });
                    }
                }
                local
            })
            .reduce(
                || None,
                |a, b| match (a, b) {
                    (None, x) | (x, None) => x,
                    (Some(a), Some(b)) => Some(merge(&a, &b, combine)),
                },
            )
    });
    Ok(result.map_or(QuerySuccess::Null, QuerySuccess::Vector))
}

fn merge(a: &[i32], b: &[i32], combine: fn(i32, i32) -> i32) -> Vec<i32> {
    a.iter().zip(b).map(|(&x, &y)| combine(x, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Op, RawCondition};

    fn student() -> Table {
        let mut t = Table::new("Student", vec!["totalCredit".into(), "class".into()]).unwrap();
        t.insert("Bill_Gates".into(), vec![112, 2014]).unwrap();
        t.insert("Steve_Jobs".into(), vec![115, 2014]).unwrap();
        t.insert("Jack_Ma".into(), vec![123, 2015]).unwrap();
        t
    }

    fn pool() -> WorkerPool {
        WorkerPool::new(2).unwrap()
    }

    #[test]
    fn sum_with_key_fast_path() {
        let t = student();
        let cond = CompiledCondition::compile(
            &t,
            &[RawCondition { field: "KEY".into(), op: Op::Eq, literal: "Steve_Jobs".into() }],
        )
        .unwrap();
        let out = sum(&t, &pool(), &["totalCredit".into(), "class".into()], &cond).unwrap();
        assert_eq!(out, QuerySuccess::Vector(vec![115, 2014]));
    }

    #[test]
    fn sum_key_field_is_rejected() {
        let t = student();
        let cond = CompiledCondition::compile(&t, &[]).unwrap();
        let err = sum(&t, &pool(), &["KEY".into()], &cond).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperands));
    }

    #[test]
    fn sum_over_empty_selection_is_zero_vector() {
        let t = student();
        let cond = CompiledCondition::compile(
            &t,
            &[RawCondition { field: "KEY".into(), op: Op::Eq, literal: "Nobody".into() }],
        )
        .unwrap();
        let out = sum(&t, &pool(), &["totalCredit".into()], &cond).unwrap();
        assert_eq!(out, QuerySuccess::Vector(vec![0]));
    }

    #[test]
    fn min_max_over_empty_selection_is_null() {
        let t = student();
        let cond = CompiledCondition::compile(
            &t,
            &[RawCondition { field: "KEY".into(), op: Op::Eq, literal: "Nobody".into() }],
        )
        .unwrap();
        assert_eq!(min(&t, &pool(), &["totalCredit".into()], &cond).unwrap(), QuerySuccess::Null);
        assert_eq!(max(&t, &pool(), &["totalCredit".into()], &cond).unwrap(), QuerySuccess::Null);
    }

    #[test]
    fn min_max_over_whole_table() {
        let t = student();
        let cond = CompiledCondition::compile(&t, &[]).unwrap();
        assert_eq!(
            min(&t, &pool(), &["totalCredit".into()], &cond).unwrap(),
            QuerySuccess::Vector(vec![112])
        );
        assert_eq!(
            max(&t, &pool(), &["totalCredit".into()], &cond).unwrap(),
            QuerySuccess::Vector(vec![123])
        );
    }

    #[test]
    fn count_respects_condition() {
        let t = student();
        let cond = CompiledCondition::compile(
            &t,
            &[RawCondition { field: "class".into(), op: Op::Eq, literal: "2014".into() }],
        )
        .unwrap();
        assert_eq!(count(&t, &cond).unwrap(), QuerySuccess::Scalar(2));
    }
}
