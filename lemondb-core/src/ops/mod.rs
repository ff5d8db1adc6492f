//! One module per query operator, grounded on the matching `*Query.cpp` file
//! under `examples/original_source/src/query/data/`.
//!
//! Shared chunked fan-out helper for the "heavy" operators (`spec.md` §5:
//! "an operator divides its row range into fixed-size segments ... submits
//! one task per segment"), implemented with `rayon`'s `par_chunks`/
//! `par_chunks_mut` run under the caller's already-held table lock via
//! [`crate::exec::worker_pool::WorkerPool::install`].

pub mod aggregate;
pub mod arithmetic;
pub mod delete;
pub mod duplicate;
pub mod insert;
pub mod select;
pub mod update;

/// Default chunk size for intra-operator fan-out, matching spec.md §5's
/// "implementation-tunable, default order of a few thousand rows".
pub const DEFAULT_CHUNK_SIZE: usize = 2000;
