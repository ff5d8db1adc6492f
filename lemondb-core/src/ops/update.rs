//! `UPDATE` — grounded on `examples/original_source/src/query/data/UpdateQuery.cpp`.
//!
//! Chunked fan-out over `rayon::par_chunks_mut`, run inside the caller's
//! already-held table write lock via [`crate::exec::worker_pool::WorkerPool::install`],
//! per spec.md §5's intra-operator parallelism model.

use rayon::prelude::*;

use crate::condition::CompiledCondition;
use crate::error::EngineError;
use crate::exec::worker_pool::WorkerPool;
use crate::ops::DEFAULT_CHUNK_SIZE;
use crate::result::QuerySuccess;
use crate::table::{Table, KEY};
use crate::value::parse_int_literal;

pub fn execute(
    table: &mut Table,
    pool: &WorkerPool,
    field: &str,
    literal: &str,
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    if field == KEY {
        return rename_matching(table, literal, cond);
    }
    let index = table.field_index(field)?;
    let value = parse_int_literal(literal);

    let affected = pool.install(|| {
        table
            .rows_mut()
            .par_chunks_mut(DEFAULT_CHUNK_SIZE)
            .map(|chunk| {
                let mut local = 0u64;
                for row in chunk {
                    if cond.eval(&row.key, &row.cells) {
                        row.cells[index] = value;
                        local += 1;
                    }
                }
                local
            })
            .sum::<u64>()
    });
    Ok(QuerySuccess::RecordCount(affected))
}

/// `UPDATE (KEY newKey) FROM T WHERE ...` renames each matching row's key.
/// Run serially: renaming two matches to the same literal would race under
/// parallel fan-out, and spec.md's KEY update is intended for a single,
/// uniquely-identified row.
fn rename_matching(
    table: &mut Table,
    literal: &str,
    cond: &CompiledCondition,
) -> Result<QuerySuccess, EngineError> {
    let keys: Vec<String> = cond
        .matching_indices(table)
        .into_iter()
        .map(|idx| table.row_at(idx).key.clone())
        .collect();
    let mut affected = 0u64;
    for key in keys {
        table.set_key(&key, literal.to_string())?;
        affected += 1;
    }
    Ok(QuerySuccess::RecordCount(affected))
}
