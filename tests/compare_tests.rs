use chrono::NaiveDate;
use template_tools::compare::values::{CellOutcome, ComparePolicy, compare_cells};
use template_tools::compare::{ColumnMatch, MatchMethod, RowMatchKind, Side, compare_tables};
use template_tools::config::{CompareConfig, PolicySpec};
use template_tools::{CellValue, Table, ToolError};

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn number(value: f64) -> CellValue {
    CellValue::Number(value)
}

fn table(label: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
    Table::new(
        label,
        columns.iter().map(|name| name.to_string()).collect(),
        rows,
    )
    .expect("valid table")
}

fn score_tolerance_config(epsilon: f64) -> CompareConfig {
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];
    config.policies.insert(
        "Score".to_string(),
        PolicySpec::NumericTolerance {
            epsilon: Some(epsilon),
        },
    );
    config
}

#[test]
fn comparing_a_table_to_itself_is_clean() {
    let people = table(
        "people.xlsx",
        &["ID", "Name", "Score"],
        vec![
            vec![number(1.0), text("Alice"), number(90.0)],
            vec![number(2.0), text("Bob"), number(85.0)],
        ],
    );
    let config = CompareConfig::default();

    let result = compare_tables(&people, &people, &config).expect("comparison");

    assert!(result.summary.is_clean());
    assert_eq!(result.summary.columns_matched, 3);
    assert_eq!(result.summary.rows_matched, 2);
    assert_eq!(result.summary.cells_equal, 6);
    assert_eq!(result.summary.cells_unequal, 0);
}

#[test]
fn swapping_inputs_swaps_added_and_removed() {
    let table_a = table(
        "a.xlsx",
        &["ID", "Name"],
        vec![
            vec![number(1.0), text("Alice")],
            vec![number(2.0), text("Bob")],
        ],
    );
    let table_b = table(
        "b.xlsx",
        &["ID", "Name", "Extra"],
        vec![
            vec![number(1.0), text("Alice"), text("x")],
            vec![number(3.0), text("Carol"), text("y")],
        ],
    );
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];

    let forward = compare_tables(&table_a, &table_b, &config).expect("forward comparison");
    let backward = compare_tables(&table_b, &table_a, &config).expect("backward comparison");

    assert_eq!(forward.summary.columns_added, backward.summary.columns_removed);
    assert_eq!(forward.summary.columns_removed, backward.summary.columns_added);
    assert_eq!(forward.summary.rows_added, backward.summary.rows_removed);
    assert_eq!(forward.summary.rows_removed, backward.summary.rows_added);
    assert_eq!(forward.summary.rows_matched, backward.summary.rows_matched);
    assert_eq!(forward.summary.cells_equal, backward.summary.cells_equal);
    assert_eq!(forward.summary.cells_unequal, backward.summary.cells_unequal);

    for (cell_fwd, cell_bwd) in forward.cells.iter().zip(backward.cells.iter()) {
        assert_eq!(cell_fwd.equal, cell_bwd.equal);
        assert_eq!(cell_fwd.value_a, cell_bwd.value_b);
        assert_eq!(cell_fwd.value_b, cell_bwd.value_a);
    }
}

#[test]
fn removed_column_gets_no_cell_diffs() {
    // Scenario: B dropped the Score column entirely.
    let table_a = table(
        "a.xlsx",
        &["ID", "Name", "Score"],
        vec![vec![number(1.0), text("Alice"), number(90.0)]],
    );
    let table_b = table(
        "b.xlsx",
        &["ID", "Name"],
        vec![vec![number(1.0), text("Alice")]],
    );
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    assert!(result.columns.contains(&ColumnMatch::RemovedFromA {
        name: "Score".to_string()
    }));
    assert_eq!(result.summary.columns_removed, 1);
    assert!(result.cells.iter().all(|cell| cell.column_a != "Score"));
}

#[test]
fn numeric_tolerance_reports_signed_magnitude() {
    let table_a = table(
        "a.xlsx",
        &["ID", "Name", "Score"],
        vec![vec![number(1.0), text("Alice"), number(90.0)]],
    );
    let table_b = table(
        "b.xlsx",
        &["ID", "Name", "Score"],
        vec![vec![number(1.0), text("Alice"), number(92.0)]],
    );
    let config = score_tolerance_config(1.0);

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    let diff = result
        .cells
        .iter()
        .find(|cell| cell.column_a == "Score")
        .expect("score cell diff");
    assert!(!diff.equal);
    assert_eq!(diff.magnitude, Some(2.0));
    assert_eq!(result.summary.cells_unequal, 1);
}

#[test]
fn numeric_tolerance_bound_is_inclusive() {
    let policy = ComparePolicy::NumericTolerance { epsilon: 2.0 };
    let formats: Vec<String> = Vec::new();

    assert_eq!(
        compare_cells(&number(90.0), &number(92.0), &policy, &formats),
        CellOutcome::Equal
    );
    match compare_cells(&number(90.0), &number(92.1), &policy, &formats) {
        CellOutcome::Unequal {
            magnitude: Some(delta),
        } => assert!((delta - 2.1).abs() < 1e-9),
        other => panic!("expected unequal outcome, got {other:?}"),
    }
}

#[test]
fn numeric_tolerance_coerces_numeric_text() {
    let policy = ComparePolicy::NumericTolerance { epsilon: 0.0 };
    let formats: Vec<String> = Vec::new();

    assert_eq!(
        compare_cells(&text(" 42 "), &number(42.0), &policy, &formats),
        CellOutcome::Equal
    );
}

#[test]
fn duplicate_keys_are_flagged_and_excluded_from_cell_diffs() {
    // Scenario: A carries the key twice, B once.
    let table_a = table(
        "a.xlsx",
        &["ID", "Name"],
        vec![
            vec![number(1.0), text("Alice")],
            vec![number(1.0), text("Alicia")],
            vec![number(2.0), text("Bob")],
        ],
    );
    let table_b = table(
        "b.xlsx",
        &["ID", "Name"],
        vec![
            vec![number(1.0), text("Alice")],
            vec![number(2.0), text("Bob")],
        ],
    );
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    let duplicate = result
        .rows
        .iter()
        .find(|entry| matches!(entry.kind, RowMatchKind::DuplicateKey { .. }))
        .expect("duplicate key entry");
    assert_eq!(duplicate.key.to_string(), "1");
    match &duplicate.kind {
        RowMatchKind::DuplicateKey { rows_a, rows_b } => {
            assert_eq!(rows_a, &vec![0, 1]);
            assert_eq!(rows_b, &vec![0]);
        }
        other => panic!("expected duplicate key, got {other:?}"),
    }

    // No matched entry and no cell diffs for the duplicated key.
    assert!(!result.rows.iter().any(|entry| {
        matches!(entry.kind, RowMatchKind::Matched { .. }) && entry.key.to_string() == "1"
    }));
    assert!(result.cells.iter().all(|cell| cell.key.to_string() != "1"));
    assert_eq!(result.summary.rows_duplicate, 3);
    assert_eq!(result.summary.rows_matched, 1);
}

#[test]
fn alias_matches_renamed_column() {
    let table_a = table(
        "a.xlsx",
        &["Cust#", "Name"],
        vec![vec![number(7.0), text("Acme")]],
    );
    let table_b = table(
        "b.xlsx",
        &["CustomerID", "Name"],
        vec![vec![number(7.0), text("Acme")]],
    );
    let mut config = CompareConfig::default();
    config
        .aliases
        .insert("Cust#".to_string(), "CustomerID".to_string());

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    assert!(result.columns.contains(&ColumnMatch::Matched {
        name_a: "Cust#".to_string(),
        name_b: "CustomerID".to_string(),
        method: MatchMethod::Alias,
    }));
    assert_eq!(result.summary.columns_matched, 2);
    assert!(result.summary.is_clean());
}

#[test]
fn normalized_header_names_still_match() {
    let table_a = table(
        "a.xlsx",
        &["Customer  Name", "ID"],
        vec![vec![text("Acme"), number(1.0)]],
    );
    let table_b = table(
        "b.xlsx",
        &["customer name", "ID"],
        vec![vec![text("Acme"), number(1.0)]],
    );
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    assert!(result.columns.contains(&ColumnMatch::Matched {
        name_a: "Customer  Name".to_string(),
        name_b: "customer name".to_string(),
        method: MatchMethod::Normalized,
    }));
}

#[test]
fn colliding_normalized_headers_are_rejected() {
    let table_a = table(
        "a.xlsx",
        &["Total Amount", "total  amount"],
        vec![vec![number(1.0), number(2.0)]],
    );
    let table_b = table("b.xlsx", &["Total"], vec![vec![number(1.0)]]);
    let config = CompareConfig::default();

    let error = compare_tables(&table_a, &table_b, &config).expect_err("collision");
    match error {
        ToolError::AmbiguousColumnMatch { first, second } => {
            assert_eq!(first, "Total Amount");
            assert_eq!(second, "total  amount");
        }
        other => panic!("expected AmbiguousColumnMatch, got {other}"),
    }
}

#[test]
fn empty_cells_compare_the_same_under_every_policy() {
    let formats = vec!["%Y-%m-%d".to_string()];
    let policies = [
        ComparePolicy::ExactText,
        ComparePolicy::IgnoreCase,
        ComparePolicy::IgnoreWhitespace,
        ComparePolicy::NumericTolerance { epsilon: 100.0 },
        ComparePolicy::DateTolerance { max_delta_days: 30 },
    ];

    for policy in &policies {
        assert_eq!(
            compare_cells(&CellValue::Empty, &CellValue::Empty, policy, &formats),
            CellOutcome::Equal,
            "empty vs empty under {policy:?}"
        );
        assert_eq!(
            compare_cells(&CellValue::Empty, &number(5.0), policy, &formats),
            CellOutcome::Unequal { magnitude: None },
            "empty vs nonempty under {policy:?}"
        );
        assert_eq!(
            compare_cells(&text("  "), &CellValue::Empty, policy, &formats),
            CellOutcome::Equal,
            "blank text counts as empty under {policy:?}"
        );
    }
}

#[test]
fn text_policies_normalize_as_configured() {
    let formats: Vec<String> = Vec::new();

    assert_eq!(
        compare_cells(
            &text("  Hello   World "),
            &text("hello world"),
            &ComparePolicy::ExactText,
            &formats
        ),
        CellOutcome::Equal
    );
    assert_eq!(
        compare_cells(
            &text("Hello"),
            &text("hello"),
            &ComparePolicy::IgnoreCase,
            &formats
        ),
        CellOutcome::Equal
    );
    // Whitespace stays significant when only case is ignored.
    assert_eq!(
        compare_cells(
            &text("Hello World"),
            &text("hello  world"),
            &ComparePolicy::IgnoreCase,
            &formats
        ),
        CellOutcome::Unequal { magnitude: None }
    );
    assert_eq!(
        compare_cells(
            &text("Hello World"),
            &text("HelloWorld"),
            &ComparePolicy::IgnoreWhitespace,
            &formats
        ),
        CellOutcome::Equal
    );
    assert_eq!(
        compare_cells(
            &text("Hello World"),
            &text("hello world"),
            &ComparePolicy::IgnoreWhitespace,
            &formats
        ),
        CellOutcome::Unequal { magnitude: None }
    );
}

#[test]
fn date_tolerance_parses_text_dates() {
    let formats = vec!["%Y-%m-%d".to_string(), "%d/%m/%Y".to_string()];
    let policy = ComparePolicy::DateTolerance { max_delta_days: 1 };

    assert_eq!(
        compare_cells(&text("2024-01-01"), &text("02/01/2024"), &policy, &formats),
        CellOutcome::Equal
    );
    assert_eq!(
        compare_cells(&text("2024-01-01"), &text("2024-01-03"), &policy, &formats),
        CellOutcome::Unequal {
            magnitude: Some(2.0)
        }
    );
    assert_eq!(
        compare_cells(
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date")),
            &text("2024-01-01"),
            &policy,
            &formats
        ),
        CellOutcome::Equal
    );
}

#[test]
fn uncoercible_values_become_type_mismatch_diagnostics() {
    let table_a = table(
        "a.xlsx",
        &["ID", "Score"],
        vec![vec![number(1.0), text("n/a")]],
    );
    let table_b = table(
        "b.xlsx",
        &["ID", "Score"],
        vec![vec![number(1.0), number(90.0)]],
    );
    let config = score_tolerance_config(0.0);

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    let diff = result
        .cells
        .iter()
        .find(|cell| cell.column_a == "Score")
        .expect("score cell diff");
    assert!(!diff.equal);
    assert_eq!(diff.magnitude, None);
    assert!(diff.note.as_deref().is_some_and(|note| note.contains("type mismatch")));
    assert_eq!(result.summary.cells_type_mismatch, 1);
}

#[test]
fn key_column_missing_from_one_side_marks_rows_unkeyable() {
    let table_a = table(
        "a.xlsx",
        &["ID", "Name"],
        vec![vec![number(1.0), text("Alice")]],
    );
    let table_b = table(
        "b.xlsx",
        &["Name"],
        vec![vec![text("Alice")], vec![text("Bob")]],
    );
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    let unkeyable: Vec<_> = result
        .rows
        .iter()
        .filter_map(|entry| match &entry.kind {
            RowMatchKind::Unkeyable {
                side,
                row,
                missing_column,
            } => Some((*side, *row, missing_column.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        unkeyable,
        vec![
            (Side::B, 0, "ID".to_string()),
            (Side::B, 1, "ID".to_string())
        ]
    );
    assert_eq!(result.summary.rows_unkeyable, 2);
    assert_eq!(result.summary.rows_removed, 1);
    assert_eq!(result.summary.rows_matched, 0);
}

#[test]
fn unknown_key_column_fails_config_validation() {
    let table_a = table("a.xlsx", &["ID"], vec![vec![number(1.0)]]);
    let table_b = table("b.xlsx", &["ID"], vec![vec![number(1.0)]]);
    let mut config = CompareConfig::default();
    config.key_columns = vec!["Nope".to_string()];

    let error = compare_tables(&table_a, &table_b, &config).expect_err("unknown key");
    match error {
        ToolError::InvalidConfig { option, .. } => assert_eq!(option, "key_columns.Nope"),
        other => panic!("expected InvalidConfig, got {other}"),
    }
}

#[test]
fn duplicate_headers_reject_the_table() {
    let error = Table::new(
        "bad.xlsx",
        vec!["ID".to_string(), "ID".to_string()],
        Vec::new(),
    )
    .expect_err("duplicate header");
    match error {
        ToolError::MalformedTable { label, detail } => {
            assert_eq!(label, "bad.xlsx");
            assert!(detail.contains("ID"));
        }
        other => panic!("expected MalformedTable, got {other}"),
    }
}

#[test]
fn ragged_rows_reject_the_table() {
    let error = Table::new(
        "bad.xlsx",
        vec!["ID".to_string(), "Name".to_string()],
        vec![vec![number(1.0)]],
    )
    .expect_err("ragged row");
    assert!(matches!(error, ToolError::MalformedTable { .. }));
}

#[test]
fn added_rows_follow_b_order_after_a_rows() {
    let table_a = table(
        "a.xlsx",
        &["ID"],
        vec![vec![number(2.0)], vec![number(1.0)]],
    );
    let table_b = table(
        "b.xlsx",
        &["ID"],
        vec![vec![number(1.0)], vec![number(4.0)], vec![number(3.0)]],
    );
    let mut config = CompareConfig::default();
    config.key_columns = vec!["ID".to_string()];

    let result = compare_tables(&table_a, &table_b, &config).expect("comparison");

    let keys: Vec<String> = result
        .rows
        .iter()
        .map(|entry| entry.key.to_string())
        .collect();
    assert_eq!(keys, vec!["2", "1", "4", "3"]);
}
