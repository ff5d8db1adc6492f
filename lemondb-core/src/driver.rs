//! Splits a script into `;`-terminated queries, submits each to a
//! [`QueryManager`], and recurses into `LISTEN`'d files.
//!
//! Grounded on `examples/original_source/src/utils/MainQueryHelpers.cpp`'s
//! `processQueries`/`handleListenQuery` pair: `extractQueryString` reads up to
//! the next `;` and drops a trailing statement with no terminator, a build
//! failure is swallowed rather than submitted, `QUIT` stops scheduling
//! without being submitted itself, and `LISTEN` is handled inline rather than
//! queued, recursing into the file it names and folding its own scheduled
//! count into the caller's.

use std::path::PathBuf;
use std::sync::Arc;

use crate::builder::build_query;
use crate::error::{EngineError, FileFormatError};
use crate::exec::dispatch::EngineContext;
use crate::exec::manager::QueryManager;
use crate::query::Query;
use crate::result::{render_failure, render_success, QuerySuccess};

/// Runs `text` to completion against `ctx`/`manager`: schedules every
/// statement (recursing into nested `LISTEN`s), tells `manager` the final
/// expected count, and waits for every scheduled query to finish.
pub async fn run(ctx: &Arc<EngineContext>, manager: &Arc<QueryManager>, text: &str) {
    let scheduled = run_script(ctx, manager, text).await;
    manager.set_expected_total(scheduled);
    manager.wait_for_completion().await;
}

/// Schedules every complete statement in `text`, stopping early once `QUIT`
/// has been seen (by this call or an earlier sibling sharing `ctx`). Returns
/// the number of queries scheduled, including everything nested `LISTEN`s
/// scheduled.
async fn run_script(ctx: &Arc<EngineContext>, manager: &Arc<QueryManager>, text: &str) -> u64 {
    let mut scheduled = 0u64;
    for stmt in complete_statements(text) {
        if ctx.registry.end_input() {
            break;
        }
        scheduled += schedule_statement(ctx, manager, stmt).await;
    }
    scheduled
}

/// Splits `text` on `;`. The segment after the last `;` (empty when `text`
/// ends with one, otherwise a partial trailing statement) is always
/// discarded, matching `extractQueryString` throwing on EOF before a
/// terminator is found.
fn complete_statements(text: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = text.split(';').collect();
    parts.pop();
    parts.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect()
}

async fn schedule_statement(ctx: &Arc<EngineContext>, manager: &Arc<QueryManager>, stmt: &str) -> u64 {
    let query = match build_query(stmt) {
        Ok(q) => q,
        Err(_) => return 0,
    };

    match query {
        Query::Quit => {
            ctx.registry.set_end_input();
            0
        }
        Query::Listen { path } => run_listen(ctx, manager, path).await,
        Query::CopyTable { src, dst } => {
            let id = manager.next_query_id();
            manager.submit_copytable(id, src, dst);
            1
        }
        other => {
            let id = manager.next_query_id();
            if other.is_instant() {
                manager.run_instant(id, other).await;
            } else {
                manager.submit(id, other);
            }
            1
        }
    }
}

/// Reads the named file, records its `ANSWER = ( listening from FILE )` (or
/// failure) entry under a fresh id, and recurses into its contents.
fn run_listen<'a>(
    ctx: &'a Arc<EngineContext>,
    manager: &'a Arc<QueryManager>,
    path: String,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = u64> + Send + 'a>> {
    Box::pin(async move {
        let id = manager.next_query_id();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let body = render_success("LISTEN", None, &QuerySuccess::Listening(path.clone()));
                manager.collector().record_ok(id, body);
                1 + run_script(ctx, manager, &text).await
            }
            Err(_) => {
                let err = EngineError::File(FileFormatError::CannotOpen(PathBuf::from(&path)));
                manager.collector().record_err(id, render_failure("LISTEN", None, &err));
                1
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::collector::Entry;
    use crate::table::Table;
    use std::io::Write;

    fn ctx_with_student() -> Arc<EngineContext> {
        let ctx = EngineContext::new(2).unwrap();
        let mut t = Table::new("Student", vec!["studentID".into()]).unwrap();
        t.insert("Bill_Gates".into(), vec![400812312]).unwrap();
        ctx.registry.register(t).unwrap();
        Arc::new(ctx)
    }

    #[tokio::test]
    async fn runs_statements_in_order_and_stops_scheduling_at_quit() {
        let ctx = ctx_with_student();
        let manager = QueryManager::new(ctx.clone());
        run(
            &ctx,
            &manager,
            "INSERT ( Jack_Ma 400882382 ) FROM Student; QUIT; INSERT ( Ghost 0 ) FROM Student;",
        )
        .await;

        let drained = manager.collector().drain_all();
        assert_eq!(drained.len(), 1);
        assert!(matches!(&drained[0].1, Entry::Ok(_)));
        let count = ctx.registry.with_table("Student", |t| t.rows().len()).unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn incomplete_trailing_statement_is_dropped() {
        let ctx = ctx_with_student();
        let manager = QueryManager::new(ctx.clone());
        run(&ctx, &manager, "SELECT ( KEY ) FROM Student; SELECT ( KEY ) FROM Stu").await;
        assert_eq!(manager.collector().drain_all().len(), 1);
    }

    #[tokio::test]
    async fn listen_recurses_and_counts_nested_queries() {
        let ctx = ctx_with_student();
        let manager = QueryManager::new(ctx.clone());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "INSERT ( Jack_Ma 400882382 ) FROM Student; SELECT ( KEY ) FROM Student;")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        run(&ctx, &manager, &format!("LISTEN ( {path} );")).await;

        let drained = manager.collector().drain_all();
        // LISTEN's own ack + the two nested queries it scheduled.
        assert_eq!(drained.len(), 3);
        assert!(matches!(&drained[0].1, Entry::Ok(body) if body.contains("listening from")));
    }

    #[tokio::test]
    async fn listen_on_missing_file_records_a_failure_without_blocking_completion() {
        let ctx = ctx_with_student();
        let manager = QueryManager::new(ctx.clone());
        run(&ctx, &manager, "LISTEN ( /no/such/file );").await;

        let drained = manager.collector().drain_all();
        assert_eq!(drained.len(), 1);
        assert!(matches!(&drained[0].1, Entry::Err(_)));
    }
}
