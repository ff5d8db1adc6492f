//! The six literal end-to-end scenarios an engine session must reproduce
//! exactly: query text in, rendered text out, through the full
//! parse → dispatch → execute path (not just the operator unit in isolation).

use lemondb_core::builder::build_query;
use lemondb_core::exec::dispatch::{execute, EngineContext};
use lemondb_core::result::render_success;
use lemondb_core::table::Table;

fn student_ctx() -> EngineContext {
    let ctx = EngineContext::new(2).unwrap();
    let mut t = Table::new("Student", vec!["studentID".into(), "class".into(), "totalCredit".into()])
        .unwrap();
    t.insert("Bill_Gates".into(), vec![400812312, 2014, 112]).unwrap();
    t.insert("Steve_Jobs".into(), vec![400851751, 2014, 115]).unwrap();
    t.insert("Jack_Ma".into(), vec![400882382, 2015, 123]).unwrap();
    ctx.registry.register(t).unwrap();
    ctx
}

async fn run(ctx: &EngineContext, text: &str) -> String {
    let query = build_query(text).unwrap();
    let op = query.name();
    let table = query.target_table().map(str::to_string);
    let outcome = execute(ctx, query).await.unwrap();
    render_success(op, table.as_deref(), &outcome)
}

#[tokio::test]
async fn sum_with_key_fast_path() {
    let ctx = student_ctx();
    let rendered =
        run(&ctx, "SUM ( totalCredit class ) FROM Student WHERE ( KEY = Steve_Jobs )").await;
    assert_eq!(rendered, "ANSWER = ( 115 2014 )");
}

#[tokio::test]
async fn select_ordered_by_key() {
    let ctx = student_ctx();
    let rendered = run(&ctx, "SELECT ( KEY class studentID ) FROM Student").await;
    assert_eq!(
        rendered,
        "( Bill_Gates 2014 400812312 )\n( Jack_Ma 2015 400882382 )\n( Steve_Jobs 2014 400851751 )\n"
    );
}

#[tokio::test]
async fn swap_restores_on_double_swap() {
    let ctx = student_ctx();
    let first = run(&ctx, "SWAP ( class studentID ) FROM Student").await;
    let second = run(&ctx, "SWAP ( class studentID ) FROM Student").await;
    assert_eq!(first, "Affected 3 rows.");
    assert_eq!(second, "Affected 3 rows.");

    let rendered = run(&ctx, "SELECT ( KEY class studentID ) FROM Student").await;
    assert_eq!(
        rendered,
        "( Bill_Gates 2014 400812312 )\n( Jack_Ma 2015 400882382 )\n( Steve_Jobs 2014 400851751 )\n"
    );
}

#[tokio::test]
async fn copytable_is_independent_of_its_source() {
    let ctx = student_ctx();
    run(&ctx, "COPYTABLE Student Student_Copy").await;
    run(&ctx, "UPDATE ( totalCredit 999 ) FROM Student WHERE ( KEY = Bill_Gates )").await;

    let copy_rendered = run(&ctx, "SELECT ( totalCredit ) FROM Student_Copy WHERE ( KEY = Bill_Gates )").await;
    assert_eq!(copy_rendered, "( Bill_Gates 112 )\n");

    let source_rendered = run(&ctx, "SELECT ( totalCredit ) FROM Student WHERE ( KEY = Bill_Gates )").await;
    assert_eq!(source_rendered, "( Bill_Gates 999 )\n");
}

#[tokio::test]
async fn delete_swap_pop_removes_exactly_the_matching_rows() {
    let ctx = EngineContext::new(2).unwrap();
    let mut t = Table::new("T", vec!["age".into(), "score".into()]).unwrap();
    let ages = [18, 19, 20, 21, 22, 23, 24];
    let scores = [80, 85, 55, 50, 58, 90, 95];
    for i in 0..7 {
        t.insert(format!("k{i}"), vec![ages[i], scores[i]]).unwrap();
    }
    ctx.registry.register(t).unwrap();

    let rendered = run(&ctx, "DELETE FROM T WHERE ( age >= 20 ) ( score < 60 )").await;
    assert_eq!(rendered, "Affected 3 rows.");

    let size = ctx.registry.with_table("T", |t| t.rows().len()).unwrap();
    assert_eq!(size, 4);
    for kept in ["k0", "k1", "k5", "k6"] {
        assert!(ctx.registry.with_table("T", |t| t.get(kept).is_some()).unwrap());
    }
    for removed in ["k2", "k3", "k4"] {
        assert!(!ctx.registry.with_table("T", |t| t.get(removed).is_some()).unwrap());
    }
}

#[tokio::test]
async fn unsatisfiable_key_conjunction_yields_zero_rows() {
    let ctx = EngineContext::new(2).unwrap();
    let mut t = Table::new("T", vec!["v".into()]).unwrap();
    t.insert("a".into(), vec![1]).unwrap();
    t.insert("b".into(), vec![2]).unwrap();
    ctx.registry.register(t).unwrap();

    let rendered = run(&ctx, "SELECT ( KEY ) FROM T WHERE ( KEY = a ) ( KEY = b )").await;
    assert_eq!(rendered, "");
}
