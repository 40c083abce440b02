// Skip / reverse / seize behaviour

use ape::ast::{AssignOp, BinOp, Decl, Expr, Seize, Stmt, VarDecl};
use ape::{Interpreter, InterpreterConfig, RuntimeError, Value};
use proptest::prelude::*;
use tracing_subscriber::EnvFilter;

/// Route interpreter logs to the test harness, filtered by `RUST_LOG`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn println(text: &str) -> Stmt {
    Stmt::expr(Expr::call("println", vec![Expr::string(text)]))
}

fn run_main(decls: Vec<Decl>, body: Vec<Stmt>) -> (Interpreter, Result<Value, RuntimeError>) {
    run_main_with(Interpreter::new(), decls, body)
}

fn run_main_with(
    mut interpreter: Interpreter,
    decls: Vec<Decl>,
    body: Vec<Stmt>,
) -> (Interpreter, Result<Value, RuntimeError>) {
    init_tracing();
    for decl in &decls {
        interpreter.interpret(decl).expect("Declaration failed");
    }
    interpreter
        .interpret(&Decl::func("main", &[], body))
        .expect("Declaration failed");
    let result = interpreter.run_main();
    (interpreter, result)
}

#[test]
fn test_rollback_restores_and_seizes() {
    // x := 0; skip { x = 1; x = 2; reverse x } seize(2) { println("caught") }
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0))],
        vec![Stmt::skip(
            vec![
                Stmt::assign("x", Expr::int(1)),
                Stmt::assign("x", Expr::int(2)),
                Stmt::reverse(Expr::ident("x")),
            ],
            vec![Seize::matching(Expr::int(2), vec![println("caught")])],
        )],
    );
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().get_output(), vec!["caught"]);
    assert_eq!(interpreter.global("x"), Some(Value::Int(0)));
    assert!(!interpreter.is_reversing());
    assert_eq!(interpreter.ledger_len(), 0);
}

#[test]
fn test_seize_clauses_in_source_order() {
    let skip = |payload: i64| {
        Stmt::skip(
            vec![Stmt::reverse(Expr::int(payload))],
            vec![
                Seize::matching(Expr::int(5), vec![println("A")]),
                Seize::matching(Expr::int(6), vec![println("B")]),
            ],
        )
    };

    let (interpreter, result) = run_main(vec![], vec![skip(5)]);
    assert!(result.is_ok());
    assert_eq!(interpreter.terminal().get_output(), vec!["A"]);

    let (interpreter, result) = run_main(vec![], vec![skip(7)]);
    assert_eq!(
        result,
        Err(RuntimeError::UnhandledReversal {
            payload: "7".to_string()
        })
    );
    assert!(interpreter.terminal().get_output().is_empty());
    // A failed run leaves no reversal behind
    assert!(!interpreter.is_reversing());
}

#[test]
fn test_first_matching_seize_wins() {
    let (interpreter, result) = run_main(
        vec![],
        vec![Stmt::skip(
            vec![Stmt::reverse(Expr::string("boom"))],
            vec![
                Seize::matching(Expr::string("boom"), vec![println("first")]),
                Seize::matching(Expr::string("boom"), vec![println("second")]),
            ],
        )],
    );
    assert!(result.is_ok());
    assert_eq!(interpreter.terminal().get_output(), vec!["first"]);
}

#[test]
fn test_bare_seize_is_tried_last() {
    let (interpreter, result) = run_main(
        vec![],
        vec![
            Stmt::skip(
                vec![Stmt::reverse(Expr::int(1))],
                vec![
                    Seize::any(vec![println("default")]),
                    Seize::matching(Expr::int(1), vec![println("one")]),
                ],
            ),
            Stmt::skip(
                vec![Stmt::reverse(Expr::int(2))],
                vec![
                    Seize::any(vec![println("default")]),
                    Seize::matching(Expr::int(1), vec![println("one")]),
                ],
            ),
        ],
    );
    assert!(result.is_ok());
    assert_eq!(interpreter.terminal().get_output(), vec!["one", "default"]);
}

#[test]
fn test_return_inside_skip_discards_without_restoring() {
    // f() { skip { x = 1; return 2 } }
    let f = Decl::func(
        "f",
        &[],
        vec![Stmt::skip(
            vec![Stmt::assign("x", Expr::int(1)), Stmt::ret(Expr::int(2))],
            vec![],
        )],
    );
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0)), f],
        vec![Stmt::ret(Expr::call("f", vec![]))],
    );
    assert_eq!(result, Ok(Value::Int(2)));
    assert_eq!(interpreter.global("x"), Some(Value::Int(1)));
    assert_eq!(interpreter.ledger_len(), 0);
}

#[test]
fn test_reverse_unwinds_through_calls() {
    // bump() { x = x + 10; reverse "undo" }
    let bump = Decl::func(
        "bump",
        &[],
        vec![
            Stmt::assign(
                "x",
                Expr::binary(BinOp::Add, Expr::ident("x"), Expr::int(10)),
            ),
            Stmt::reverse(Expr::string("undo")),
            println("unreachable"),
        ],
    );
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(1)), bump],
        vec![
            Stmt::skip(
                vec![
                    Stmt::increment(Expr::ident("x")),
                    Stmt::expr(Expr::call("bump", vec![])),
                ],
                vec![Seize::matching(Expr::string("undo"), vec![println("seized")])],
            ),
            Stmt::ret(Expr::ident("x")),
        ],
    );
    assert_eq!(result, Ok(Value::Int(1)));
    assert_eq!(interpreter.terminal().get_output(), vec!["seized"]);
}

#[test]
fn test_unmatched_reversal_reaches_outer_skip() {
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0))],
        vec![Stmt::skip(
            vec![
                Stmt::assign("x", Expr::int(1)),
                Stmt::skip(
                    vec![
                        Stmt::assign("x", Expr::int(2)),
                        Stmt::reverse(Expr::string("outer")),
                    ],
                    vec![Seize::matching(Expr::string("inner"), vec![println("inner")])],
                ),
            ],
            vec![Seize::matching(Expr::string("outer"), vec![println("outer")])],
        )],
    );
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().get_output(), vec!["outer"]);
    assert_eq!(interpreter.global("x"), Some(Value::Int(0)));
}

#[test]
fn test_completed_inner_skip_is_rolled_back_by_outer() {
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0))],
        vec![Stmt::skip(
            vec![
                Stmt::skip(vec![Stmt::assign("x", Expr::int(5))], vec![]),
                Stmt::reverse(Expr::int(0)),
            ],
            vec![Seize::any(vec![])],
        )],
    );
    assert!(result.is_ok());
    assert_eq!(interpreter.global("x"), Some(Value::Int(0)));
}

#[test]
fn test_seized_inner_keeps_outer_state() {
    // Only the inner skip's effects are undone
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0)), Decl::var("y", Expr::int(0))],
        vec![Stmt::skip(
            vec![
                Stmt::assign("x", Expr::int(1)),
                Stmt::skip(
                    vec![Stmt::assign("y", Expr::int(1)), Stmt::reverse(Expr::int(9))],
                    vec![Seize::matching(Expr::int(9), vec![])],
                ),
            ],
            vec![],
        )],
    );
    assert!(result.is_ok());
    assert_eq!(interpreter.global("x"), Some(Value::Int(1)));
    assert_eq!(interpreter.global("y"), Some(Value::Int(0)));
}

#[test]
fn test_map_entries_restored_individually() {
    // m := {"a": 1}; skip { m.a = 2; m.b = 3; reverse 0 } seize { }
    let (interpreter, result) = run_main(
        vec![Decl::var(
            "m",
            Expr::Map(vec![(Expr::string("a"), Expr::int(1))]),
        )],
        vec![Stmt::skip(
            vec![
                Stmt::assign_to(Expr::dot(Expr::ident("m"), "a"), AssignOp::Assign, Expr::int(2)),
                Stmt::assign_to(
                    Expr::index(Expr::ident("m"), Expr::string("b")),
                    AssignOp::Assign,
                    Expr::int(3),
                ),
                Stmt::reverse(Expr::int(0)),
            ],
            vec![Seize::any(vec![])],
        )],
    );
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.global("m").map(|m| m.to_string()), Some("a: 1".to_string()));
}

#[test]
fn test_locals_of_rolled_back_scopes_are_dropped() {
    // Breadcrumbs for scopes created inside the skip are discarded silently
    let (interpreter, result) = run_main(
        vec![Decl::var("total", Expr::int(0))],
        vec![Stmt::skip(
            vec![
                Stmt::for_loop(
                    VarDecl::new("i", Some(Expr::int(0))),
                    Expr::binary(BinOp::Lt, Expr::ident("i"), Expr::int(3)),
                    Stmt::increment(Expr::ident("i")),
                    vec![Stmt::assign_to(
                        Expr::ident("total"),
                        AssignOp::AddAssign,
                        Expr::ident("i"),
                    )],
                ),
                Stmt::reverse(Expr::ident("total")),
            ],
            vec![Seize::matching(Expr::int(3), vec![println("three")])],
        )],
    );
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().get_output(), vec!["three"]);
    assert_eq!(interpreter.global("total"), Some(Value::Int(0)));
}

#[test]
fn test_undo_annotation_is_replayed() {
    // login() @undo logout()
    let login = Decl::func("login", &[], vec![Stmt::increment(Expr::ident("sessions"))]);
    let logout = Decl::func("logout", &[], vec![println("logged out")]);
    let (interpreter, result) = run_main(
        vec![Decl::var("sessions", Expr::int(0)), login, logout],
        vec![Stmt::skip(
            vec![
                Stmt::expr_with_undo(
                    Expr::call("login", vec![]),
                    Stmt::expr(Expr::call("logout", vec![])),
                ),
                Stmt::reverse(Expr::bool(true)),
            ],
            vec![Seize::any(vec![println("recovered")])],
        )],
    );
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(
        interpreter.terminal().get_output(),
        vec!["logged out", "recovered"]
    );
    assert_eq!(interpreter.global("sessions"), Some(Value::Int(0)));
}

#[test]
fn test_undo_in_discarded_scope_runs_in_skip_scope() {
    // tag := "job"; skip { { println("work") @undo println("undone ", tag) } reverse 0 } seize {}
    let (interpreter, result) = run_main(
        vec![],
        vec![
            Stmt::var("tag", Expr::string("job")),
            Stmt::skip(
                vec![
                    Stmt::block(vec![Stmt::expr_with_undo(
                        Expr::call("println", vec![Expr::string("work")]),
                        Stmt::expr(Expr::call(
                            "println",
                            vec![Expr::string("undone "), Expr::ident("tag")],
                        )),
                    )]),
                    Stmt::reverse(Expr::int(0)),
                ],
                vec![Seize::any(vec![])],
            ),
        ],
    );
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().get_output(), vec!["work", "undone job"]);
    assert_eq!(interpreter.ledger_len(), 0);
}

#[test]
fn test_failing_undo_aborts_rollback() {
    let (_, result) = run_main(
        vec![],
        vec![Stmt::skip(
            vec![
                Stmt::expr_with_undo(
                    Expr::int(1),
                    Stmt::expr(Expr::call("missing", vec![])),
                ),
                Stmt::reverse(Expr::int(0)),
            ],
            vec![Seize::any(vec![])],
        )],
    );
    assert!(matches!(result, Err(RuntimeError::RestoreFailed { .. })));
}

#[test]
fn test_break_inside_skip_keeps_effects() {
    let (interpreter, result) = run_main(
        vec![Decl::var("n", Expr::int(0))],
        vec![Stmt::while_loop(
            Expr::bool(true),
            vec![Stmt::skip(
                vec![Stmt::assign("n", Expr::int(4)), Stmt::brk()],
                vec![],
            )],
        )],
    );
    assert!(result.is_ok());
    assert_eq!(interpreter.global("n"), Some(Value::Int(4)));
    assert_eq!(interpreter.ledger_len(), 0);
}

#[test]
fn test_nothing_recorded_outside_skip() {
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0))],
        vec![Stmt::assign("x", Expr::int(1)), Stmt::assign("x", Expr::int(2))],
    );
    assert!(result.is_ok());
    assert_eq!(interpreter.ledger_len(), 0);
}

#[test]
fn test_reverse_outside_any_skip() {
    let (_, result) = run_main(vec![], vec![Stmt::reverse(Expr::string("oops"))]);
    assert_eq!(
        result,
        Err(RuntimeError::UnhandledReversal {
            payload: "oops".to_string()
        })
    );
}

#[test]
fn test_ledger_limit() {
    let interpreter =
        Interpreter::with_config(InterpreterConfig::default().with_max_breadcrumbs(4));
    let (_, result) = run_main_with(
        interpreter,
        vec![Decl::var("x", Expr::int(0))],
        vec![Stmt::skip(
            vec![Stmt::while_loop(
                Expr::bool(true),
                vec![Stmt::increment(Expr::ident("x"))],
            )],
            vec![],
        )],
    );
    assert_eq!(result, Err(RuntimeError::LedgerLimitExceeded { limit: 4 }));
}

#[test]
fn test_seize_body_runs_normally_after_rollback() {
    // Effects of a seize body stick, and it can fall through to later code
    let (interpreter, result) = run_main(
        vec![Decl::var("x", Expr::int(0))],
        vec![
            Stmt::skip(
                vec![Stmt::assign("x", Expr::int(1)), Stmt::reverse(Expr::int(1))],
                vec![Seize::matching(
                    Expr::int(1),
                    vec![Stmt::assign_to(Expr::ident("x"), AssignOp::AddAssign, Expr::int(10))],
                )],
            ),
            Stmt::ret(Expr::ident("x")),
        ],
    );
    assert_eq!(result, Ok(Value::Int(10)));
    assert_eq!(interpreter.global("x"), Some(Value::Int(10)));
}

proptest! {
    #[test]
    fn prop_rollback_restores_pre_skip_value(
        initial in any::<i64>(),
        writes in prop::collection::vec(any::<i64>(), 0..16),
    ) {
        let mut body: Vec<Stmt> = writes
            .iter()
            .map(|&w| Stmt::assign("x", Expr::int(w)))
            .collect();
        body.push(Stmt::reverse(Expr::string("back")));

        let (interpreter, result) = run_main(
            vec![Decl::var("x", Expr::int(initial))],
            vec![Stmt::skip(body, vec![Seize::any(vec![])])],
        );
        prop_assert!(result.is_ok());
        prop_assert_eq!(interpreter.global("x"), Some(Value::Int(initial)));
    }
}
