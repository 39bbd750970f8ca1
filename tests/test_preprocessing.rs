mod common;

use common::{generated_table, sample_records, sample_table, table};
use serde_json::{json, Value};
use std::io::Write;
use talentprep::preprocessing::validators::{RequiredColumnsCheck, RowCountCheck};
use talentprep::preprocessing::*;
use talentprep::types::Table;
use talentprep::FrameError;

// ============================================================================
// Table validation
// ============================================================================

#[test]
fn test_valid_table_has_no_errors() {
    let result = validate_input_value(&sample_records());

    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

#[test]
fn test_generated_table_is_valid() {
    let result = validate_input_table(&generated_table(500));
    assert_eq!(result, ValidationResult::valid());
}

#[test]
fn test_missing_statement_column_skips_content_checks() {
    let result = validate_input_value(&json!([{"StaffId": null}, {"StaffId": 4}]));

    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Missing required column: TalentStatement"]);
}

#[test]
fn test_missing_both_columns_reported_alphabetically() {
    let result = validate_input_value(&json!([{"Name": "Ada"}]));

    assert_eq!(
        result.errors,
        vec![
            "Missing required column: StaffId",
            "Missing required column: TalentStatement"
        ]
    );
}

#[test]
fn test_whitespace_statement_names_row() {
    let result = validate_input_value(&json!([
        {"StaffId": "E001", "TalentStatement": "   "},
        {"StaffId": "E002", "TalentStatement": "Lead the platform team"},
        {"StaffId": "E003", "TalentStatement": "\t\n"}
    ]));

    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        vec!["TalentStatement contains empty or whitespace values at rows: [0, 2]"]
    );
}

#[test]
fn test_null_statement_suppresses_blank_check() {
    let result = validate_input_value(&json!([
        {"StaffId": "E001", "TalentStatement": null},
        {"StaffId": "E002", "TalentStatement": "   "}
    ]));

    assert_eq!(
        result.errors,
        vec!["Column TalentStatement must contain strings without nulls."]
    );
}

#[test]
fn test_numeric_staff_id_rejected_by_table_validator() {
    let result = validate_input_value(&json!([{"StaffId": 17, "TalentStatement": "Grow"}]));

    assert_eq!(
        result.errors,
        vec!["Column StaffId must contain strings without nulls."]
    );
}

#[test]
fn test_empty_table_with_columns() {
    let result = validate_input_value(&json!({"StaffId": [], "TalentStatement": []}));
    assert_eq!(result.errors, vec!["InputTable is empty."]);
}

#[test]
fn test_non_tabular_input_fails_once() {
    for input in [json!("text"), json!(42), json!([1, 2, 3]), json!({"StaffId": "E1"})] {
        let result = validate_input_value(&input);
        assert_eq!(result.errors, vec!["InputTable must be a tabular dataset."]);
    }
}

#[test]
fn test_row_count_limit() {
    let rows = vec![vec![Value::Null]; 1_000_001];
    let table = Table::from_rows(vec!["TalentStatement".to_string()], rows).unwrap();

    let result = validate_input_table(&table);

    assert!(result
        .errors
        .contains(&"InputTable exceeds maximum row count of 1,000,000.".to_string()));
    assert!(result
        .errors
        .contains(&"Missing required column: StaffId".to_string()));
}

#[test]
fn test_row_count_upper_bound_is_inclusive() {
    let rows = vec![vec![json!("E1"), json!("Grow")]; 1_000_000];
    let table = Table::from_rows(vec!["StaffId".to_string(), "TalentStatement".to_string()], rows)
        .unwrap();

    assert_eq!(validate_input_table(&table), ValidationResult::valid());
}

#[test]
fn test_duplicate_staff_ids_accepted() {
    let records = json!([
        {"StaffId": "E001", "TalentStatement": "Lead the data team"},
        {"StaffId": "E001", "TalentStatement": "Mentor new analysts"}
    ]);

    assert!(validate_input_value(&records).is_valid);
    assert_eq!(validate_input_frame_value(&records).unwrap().len(), 2);
}

#[test]
fn test_individual_checks_can_run_alone() {
    let validator = TableValidator::with_checks(vec![
        Box::new(RowCountCheck::new()),
        Box::new(RequiredColumnsCheck),
    ]);
    assert_eq!(validator.check_names(), vec!["RowCountCheck", "RequiredColumnsCheck"]);

    // Blank statements are a content problem, not a schema one
    let result = validator.validate(&table(json!([{"StaffId": "E1", "TalentStatement": " "}])));
    assert!(result.is_valid);
}

#[test]
fn test_table_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", sample_records()).unwrap();

    let loaded = Table::load_json(file.path()).unwrap();
    assert_eq!(loaded, sample_table());
}

// ============================================================================
// Job function labels
// ============================================================================

#[test]
fn test_job_functions_dedup_and_title_case() {
    let result = validate_job_function_names(&[
        "data engineering",
        "Product Management",
        "Product management",
    ]);

    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.normalized, vec!["Data Engineering", "Product Management"]);
}

#[test]
fn test_empty_job_function_list() {
    let result = validate_job_functions_value(&json!([]));

    assert!(!result.is_valid);
    assert!(result.normalized.is_empty());
    assert_eq!(
        result.errors,
        vec!["JobFunctionsList must contain between 1 and 200 items."]
    );
}

#[test]
fn test_overlong_job_function() {
    let result = validate_job_function_names(&["A".repeat(61)]);

    assert!(!result.is_valid);
    assert!(result.normalized.is_empty());
    assert_eq!(result.errors, vec!["Job function at index 0 exceeds 60 characters."]);
}

#[test]
fn test_job_function_limit_counts_characters() {
    let result = validate_job_function_names(&["é".repeat(60)]);
    assert!(result.is_valid);
    assert_eq!(result.normalized.len(), 1);
}

#[test]
fn test_job_function_element_errors_accumulate() {
    let result = validate_job_functions_value(&json!(["  ", 3, "Finance", null, " finance "]));

    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        vec![
            "Job function at index 0 must be a non-empty string.",
            "Job function at index 1 must be a non-empty string.",
            "Job function at index 3 must be a non-empty string."
        ]
    );
    assert_eq!(result.normalized, vec!["Finance"]);
}

#[test]
fn test_job_functions_not_a_list() {
    let result = validate_job_functions_value(&json!({"label": "Finance"}));

    assert!(!result.is_valid);
    assert!(result.normalized.is_empty());
    assert_eq!(result.errors, vec!["JobFunctionsList must be a list of strings."]);
}

#[test]
fn test_two_hundred_job_functions_valid() {
    let labels: Vec<String> = (0..200).map(|i| format!("function {}", i)).collect();
    let result = validate_job_function_names(&labels);

    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.normalized.len(), 200);
}

#[test]
fn test_oversized_list_still_normalizes() {
    let labels: Vec<String> = (0..201).map(|i| format!("function {}", i)).collect();
    let result = validate_job_function_names(&labels);

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.normalized.len(), 201);
    assert_eq!(result.normalized[0], "Function 0");
}

// ============================================================================
// Text normalization
// ============================================================================

#[test]
fn test_normalize_statement() {
    let input = table(json!({
        "StaffId": ["E001"],
        "TalentStatement": ["  I   aspire to  lead product.  "]
    }));
    let before = input.clone();

    let once = normalize_text_column(&input).unwrap();
    let twice = normalize_text_column(&once).unwrap();

    assert_eq!(once.get(0, "TalentStatement"), Some(&json!("I aspire to lead product.")));
    assert_eq!(once, twice);
    assert_eq!(input, before);
}

#[test]
fn test_normalize_folds_compatibility_forms() {
    let input = table(json!([
        {"StaffId": "E1", "TalentStatement": "Ｒｕｓｔ\u{00A0}and\u{3000}ﬁnance", "Team": " Ops "}
    ]));

    let normalized = normalize_text_column(&input).unwrap();

    assert_eq!(normalized.get(0, "TalentStatement"), Some(&json!("Rust and finance")));
    assert_eq!(normalized.get(0, "Team"), Some(&json!(" Ops ")));
    assert_eq!(normalized.columns(), input.columns());
}

#[test]
fn test_normalize_requires_columns() {
    let err = normalize_text_column(&table(json!([{"Other": "x"}]))).unwrap_err();

    assert_eq!(err, FrameError::MissingColumns(vec![
        "StaffId".to_string(),
        "TalentStatement".to_string(),
    ]));
    assert_eq!(err.to_string(), "InputFrame missing columns: StaffId, TalentStatement");
}

#[test]
fn test_normalize_rejects_non_string_statement() {
    let err = normalize_text_column(&table(json!([
        {"StaffId": "E1", "TalentStatement": 5}
    ])))
    .unwrap_err();

    assert_eq!(err.to_string(), "TalentStatement column must be string-like");
}

// ============================================================================
// Input frame coercion
// ============================================================================

#[test]
fn test_input_frame_drops_blank_statements() {
    let input = table(json!({
        "staff_id": ["E001", "E002"],
        "talent_statement": ["Data scientist", ""]
    }));

    let output = validate_input_frame(&input).unwrap();

    assert_eq!(output.len(), 1);
    assert_eq!(output.columns(), &["StaffId", "TalentStatement"]);
    assert_eq!(output.get(0, "StaffId"), Some(&json!("E001")));
    assert_eq!(output.get(0, "TalentStatement"), Some(&json!("Data scientist")));
}

#[test]
fn test_input_frame_all_blank_fails() {
    let input = table(json!({
        "staff_id": ["E001", "E002"],
        "talent_statement": ["  ", ""]
    }));

    assert_eq!(
        validate_input_frame(&input).unwrap_err(),
        FrameError::NoNonEmptyStatements
    );
}

#[test]
fn test_input_frame_fuzzy_names_and_coercion() {
    let input = table(json!([
        {"STAFF ID": 1042, "Talent-Statement": "  Mentor juniors  ", "Region": "EU"},
        {"STAFF ID": null, "Talent-Statement": null, "Region": "US"},
        {"STAFF ID": null, "Talent-Statement": "Move to sales", "Region": "US"}
    ]));

    let output = validate_input_frame(&input).unwrap();

    assert_eq!(
        Value::from(output),
        json!([
            {"StaffId": "1042", "TalentStatement": "Mentor juniors"},
            {"StaffId": "null", "TalentStatement": "Move to sales"}
        ])
    );
}

#[test]
fn test_input_frame_null_staff_id_stays_visible() {
    let output = validate_input_frame_value(&json!([
        {"staff_id": null, "talent_statement": "Lead"}
    ]))
    .unwrap();

    assert_eq!(output.get(0, "StaffId"), Some(&json!("null")));
    assert_ne!(output.get(0, "StaffId"), Some(&json!("")));
}

#[test]
fn test_input_frame_fail_fast_errors() {
    assert_eq!(
        validate_input_frame_value(&json!("not a table")).unwrap_err(),
        FrameError::NotTabular
    );
    assert_eq!(
        validate_input_frame_value(&json!([])).unwrap_err(),
        FrameError::NoRows
    );
    assert_eq!(
        validate_input_frame_value(&json!([{"staff": "E1", "statement": "x"}])).unwrap_err(),
        FrameError::MissingRequiredColumns
    );
}

#[test]
fn test_ingest_then_normalize() {
    let input = table(json!({
        "Staff_ID": ["E001", "E002", "E003"],
        "TALENT STATEMENT": ["I   want\tto lead", "", "Ｃｌｏｕｄ  work"]
    }));

    let normalized = normalize_text_column(&validate_input_frame(&input).unwrap()).unwrap();

    assert_eq!(
        Value::from(normalized),
        json!([
            {"StaffId": "E001", "TalentStatement": "I want to lead"},
            {"StaffId": "E003", "TalentStatement": "Cloud work"}
        ])
    );
}
