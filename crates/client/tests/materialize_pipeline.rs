use relq_client::{
    asc, cast, col, count_rows, div, gt, in_list, lag, lit_i64, mul, sub, sum, CancelToken,
    JoinKind, LiteralValue, RelqError, RowSet, ScalarType, Session, SessionConfig, SharedSession,
    Value, WindowOrderPolicy,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session_with(config: SessionConfig) -> SharedSession {
    init_tracing();
    Session::open_in_memory(config).unwrap()
}

fn stage_numbers(session: &SharedSession) {
    let rows = RowSet::from_rows(
        vec!["x".to_string(), "y".to_string()],
        (1..=6).map(|i| vec![Value::Integer(i), Value::Integer(i * 10)]),
    )
    .unwrap();
    session.stage("nums", &rows).unwrap();
}

fn stage_visits(session: &SharedSession) {
    let rows = RowSet::from_rows(
        vec!["sID".to_string(), "Adate".to_string(), "Ddate".to_string()],
        [
            ("A", "2024-01-01", "2024-01-05"),
            ("A", "2024-01-15", "2024-01-20"),
            ("B", "2024-02-01", "2024-02-03"),
            ("B", "2024-02-10", "2024-02-12"),
            ("C", "2024-03-01", "2024-03-04"),
            ("C", "2024-03-31", "2024-04-02"),
        ]
        .iter()
        .map(|(s, a, d)| {
            vec![
                Value::Text(s.to_string()),
                Value::Text(a.to_string()),
                Value::Text(d.to_string()),
            ]
        }),
    )
    .unwrap();
    session.stage("patient_db", &rows).unwrap();
}

#[test]
fn readmission_gap_in_days_per_patient() {
    let session = session_with(SessionConfig::default());
    stage_visits(&session);

    let out = session
        .table("patient_db")
        .group_by(vec!["sID"])
        .order_by(vec![asc("sID"), asc("Adate")])
        .mutate(
            "days_between",
            div(
                sub(
                    cast(col("Adate"), ScalarType::Date),
                    lag(cast(col("Ddate"), ScalarType::Date), 1),
                ),
                lit_i64(86400),
            ),
        )
        .collect()
        .unwrap();

    assert_eq!(out.len(), 6);
    assert_eq!(
        out.columns,
        vec!["sID", "Adate", "Ddate", "days_between"]
    );
    // First visit per patient has no prior discharge.
    assert_eq!(out.value(0, "days_between"), Some(&Value::Null));
    assert_eq!(out.value(1, "days_between"), Some(&Value::Real(10.0)));
    assert_eq!(out.value(2, "days_between"), Some(&Value::Null));
    assert_eq!(out.value(3, "days_between"), Some(&Value::Real(7.0)));
    assert_eq!(out.value(4, "days_between"), Some(&Value::Null));
    assert_eq!(out.value(5, "days_between"), Some(&Value::Real(27.0)));
}

#[test]
fn filter_pushdown_does_not_change_results() {
    let strict = session_with(SessionConfig {
        enable_filter_pushdown: false,
        ..SessionConfig::default()
    });
    let pushed = session_with(SessionConfig::default());
    stage_numbers(&strict);
    stage_numbers(&pushed);

    let pipeline = |s: &SharedSession| {
        s.table("nums")
            .mutate("double", mul(col("x"), lit_i64(2)))
            .filter(gt(col("y"), lit_i64(20)))
            .order_by(vec![asc("x")])
    };

    let a = pipeline(&pushed).collect().unwrap();
    let b = pipeline(&strict).collect().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 4);

    // The statements differ in shape even though results agree.
    let sql_pushed = pipeline(&pushed).to_sql().unwrap();
    let sql_strict = pipeline(&strict).to_sql().unwrap();
    assert!(!sql_pushed.contains("AS \"t0\""), "{sql_pushed}");
    assert!(sql_strict.contains("AS \"t0\""), "{sql_strict}");
}

#[test]
fn window_order_policy_is_enforced_end_to_end() {
    let strict = session_with(SessionConfig::default());
    stage_numbers(&strict);
    let err = strict
        .table("nums")
        .mutate("prev", lag(col("x"), 1))
        .collect()
        .unwrap_err();
    assert!(matches!(err, RelqError::PartitionOrderRequired(_)), "{err}");

    let lenient = session_with(SessionConfig {
        window_order: WindowOrderPolicy::EngineOrder,
        ..SessionConfig::default()
    });
    stage_numbers(&lenient);
    let out = lenient
        .table("nums")
        .mutate("prev", lag(col("x"), 1))
        .collect()
        .unwrap();
    assert_eq!(out.len(), 6);
}

#[test]
fn membership_strategies_agree_and_temps_are_cleaned() {
    let inline = session_with(SessionConfig::default());
    let staged = session_with(SessionConfig {
        inline_list_max_len: 3,
        ..SessionConfig::default()
    });
    stage_numbers(&inline);
    stage_numbers(&staged);

    let values: Vec<LiteralValue> = (2..=6).map(LiteralValue::Int64).collect();
    let pipeline = |s: &SharedSession, vs: &[LiteralValue]| {
        s.table("nums")
            .filter(in_list(col("x"), vs.to_vec()))
            .order_by(vec![asc("x")])
    };

    assert!(pipeline(&inline, &values)
        .to_sql()
        .unwrap()
        .contains("IN (2, 3, 4, 5, 6)"));
    assert!(pipeline(&staged, &values)
        .to_sql()
        .unwrap()
        .contains("IN (SELECT \"v\" FROM \"relq_tmp_0\")"));

    let a = pipeline(&inline, &values).collect().unwrap();
    let b = pipeline(&staged, &values).collect().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 5);

    // Per-call staged temporaries never outlive the materialization.
    assert!(staged
        .list_tables()
        .unwrap()
        .iter()
        .all(|t| !t.starts_with("relq_tmp")));
}

#[test]
fn raised_cancel_token_aborts_before_staging() {
    let session = session_with(SessionConfig {
        inline_list_max_len: 3,
        ..SessionConfig::default()
    });
    stage_numbers(&session);

    let values: Vec<LiteralValue> = (1..=5).map(LiteralValue::Int64).collect();
    let cancel = CancelToken::new();
    cancel.raise();
    let err = session
        .table("nums")
        .filter(in_list(col("x"), values))
        .collect_with_cancel(&cancel)
        .unwrap_err();
    assert!(matches!(err, RelqError::Cancelled), "{err}");
    assert!(session
        .list_tables()
        .unwrap()
        .iter()
        .all(|t| !t.starts_with("relq_tmp")));
}

#[test]
fn joining_frames_from_different_sessions_is_rejected() {
    let a = session_with(SessionConfig::default());
    let b = session_with(SessionConfig::default());
    stage_numbers(&a);
    stage_numbers(&b);

    let err = a
        .table("nums")
        .join(
            &b.table("nums"),
            JoinKind::Inner,
            vec![("x".to_string(), "x".to_string())],
        )
        .unwrap_err();
    assert!(matches!(err, RelqError::Unsupported(_)), "{err}");
}

#[test]
fn grouped_summarize_collapses_to_one_row_per_group() {
    let session = session_with(SessionConfig::default());
    let rows = RowSet::from_rows(
        vec!["k".to_string(), "x".to_string()],
        vec![
            vec![Value::Text("a".to_string()), Value::Integer(1)],
            vec![Value::Text("a".to_string()), Value::Integer(2)],
            vec![Value::Text("b".to_string()), Value::Integer(5)],
        ],
    )
    .unwrap();
    session.stage("t", &rows).unwrap();

    let out = session
        .table("t")
        .group_by(vec!["k"])
        .summarize(vec![
            ("n".to_string(), count_rows()),
            ("total".to_string(), sum(col("x"))),
        ])
        .order_by(vec![asc("k")])
        .collect()
        .unwrap();

    assert_eq!(out.columns, vec!["k", "n", "total"]);
    assert_eq!(out.len(), 2);
    assert_eq!(out.value(0, "n"), Some(&Value::Integer(2)));
    assert_eq!(out.value(0, "total"), Some(&Value::Integer(3)));
    assert_eq!(out.value(1, "total"), Some(&Value::Integer(5)));
}
