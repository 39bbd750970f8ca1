//! Common test utilities and fixtures

#![allow(dead_code)]

use serde_json::{json, Value};
use talentprep::types::Table;
use talentprep::PrepConfig;

/// Creates a test configuration with sensible defaults
pub fn test_config() -> PrepConfig {
    PrepConfig {
        llm_api_key: Some("test-key".to_string()),
        probe_timeout_secs: 1,
        ..Default::default()
    }
}

/// Two well-formed staff records
pub fn sample_records() -> Value {
    json!([
        {"StaffId": "S001", "TalentStatement": "I want to move into data engineering."},
        {"StaffId": "S002", "TalentStatement": "Happy in current role."}
    ])
}

pub fn sample_table() -> Table {
    Table::from_json(&sample_records()).expect("sample records are tabular")
}

/// Builds a valid table with `n` rows
pub fn generated_table(n: usize) -> Table {
    let rows = (0..n)
        .map(|i| {
            vec![
                json!(format!("E{:07}", i)),
                json!(format!("Statement   number {} about  growth ", i)),
            ]
        })
        .collect();
    Table::from_rows(vec!["StaffId".to_string(), "TalentStatement".to_string()], rows)
        .expect("rows match the column count")
}

pub fn table(value: Value) -> Table {
    Table::from_json(&value).expect("fixture is tabular")
}
