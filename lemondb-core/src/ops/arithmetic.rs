//! `ADD`, `SUB`, `SWAP` — the corresponding `*Query.cpp` files under
//! `examples/original_source/src/query/data/` are unimplemented stubs;
//! semantics here follow spec.md §4.4's operand table exactly. All three
//! chunk over the table's row vector with `rayon::par_chunks_mut`, matching
//! `ops::update`'s fan-out shape.

use rayon::prelude::*;

use crate::condition::CompiledCondition;
use crate::error::EngineError;
use crate::exec::worker_pool::WorkerPool;
use crate::ops::DEFAULT_CHUNK_SIZE;
use crate::result::QuerySuccess;
use crate::table::Table;

/// `dst := f1 + f2 + ... + f_{K-1}` (wrapping), one column index per operand.
pub fn add(
    table: &mut Table,
    pool: &WorkerPool,
    fields: &[String],
    dst: &str,
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    let sources: Vec<usize> = fields.iter().map(|f| table.field_index(f)).collect::<Result<_, _>>()?;
    let dst_index = table.field_index(dst)?;

    let affected = pool.install(|| {
        table
            .rows_mut()
            .par_chunks_mut(DEFAULT_CHUNK_SIZE)
            .map(|chunk| {
                let mut local = 0u64;
                for row in chunk {
                    if cond.eval(&row.key, &row.cells) {
                        let sum = sources.iter().fold(0i32, |acc, &i| acc.wrapping_add(row.cells[i]));
                        row.cells[dst_index] = sum;
                        local += 1;
                    }
                }
                local
            })
            .sum::<u64>()
    });
    Ok(QuerySuccess::RecordCount(affected))
}

/// `dst := f1 - f2` (wrapping).
pub fn sub(
    table: &mut Table,
    pool: &WorkerPool,
    f1: &str,
    f2: &str,
    dst: &str,
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    let i1 = table.field_index(f1)?;
    let i2 = table.field_index(f2)?;
    let dst_index = table.field_index(dst)?;

    let affected = pool.install(|| {
        table
            .rows_mut()
            .par_chunks_mut(DEFAULT_CHUNK_SIZE)
            .map(|chunk| {
                let mut local = 0u64;
                for row in chunk {
                    if cond.eval(&row.key, &row.cells) {
                        row.cells[dst_index] = row.cells[i1].wrapping_sub(row.cells[i2]);
                        local += 1;
                    }
                }
                local
            })
            .sum::<u64>()
    });
    Ok(QuerySuccess::RecordCount(affected))
}

/// Swaps columns `fa`/`fb` on matching rows. `fa == fb` always reports
/// `Affected 0 rows.` regardless of how many rows matched.
pub fn swap(
    table: &mut Table,
    pool: &WorkerPool,
    fa: &str,
    fb: &str,
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    let ia = table.field_index(fa)?;
    let ib = table.field_index(fb)?;
    if ia == ib {
        return Ok(QuerySuccess::RecordCount(0));
    }

    let affected = pool.install(|| {
        table
            .rows_mut()
            .par_chunks_mut(DEFAULT_CHUNK_SIZE)
            .map(|chunk| {
                let mut local = 0u64;
                for row in chunk {
                    if cond.eval(&row.key, &row.cells) {
                        row.cells.swap(ia, ib);
                        local += 1;
                    }
                }
                local
            })
            .sum::<u64>()
    });
    Ok(QuerySuccess::RecordCount(affected))
}
