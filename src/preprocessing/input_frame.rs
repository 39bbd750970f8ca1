use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::FrameError;
use crate::types::{Table, STAFF_ID, TALENT_STATEMENT};

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

const STAFF_ID_KEY: &str = "staffid";
const TALENT_STATEMENT_KEY: &str = "talentstatement";

/// Lowercases a column name and drops everything except `[a-z0-9]`, so
/// "Staff_ID", "STAFF ID" and "staffId" all become "staffid".
pub fn canonical_column_name(name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(&name.to_lowercase(), "").into_owned()
}

/// String form of any cell; null becomes `"null"`.
fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validates a table with loosely named columns and coerces it into the
/// canonical two-column shape.
///
/// Columns are matched after canonicalization (last match wins), `StaffId`
/// values are stringified (a null id becomes `"null"`), statements are
/// stringified and trimmed, and rows without a statement are dropped. Fails
/// on the first violated condition.
pub fn validate_input_frame(table: &Table) -> Result<Table, FrameError> {
    if table.is_empty() {
        return Err(FrameError::NoRows);
    }

    let canonical: HashMap<String, usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| (canonical_column_name(name), i))
        .collect();

    let (staff_index, statement_index) = match (
        canonical.get(STAFF_ID_KEY),
        canonical.get(TALENT_STATEMENT_KEY),
    ) {
        (Some(&s), Some(&t)) => (s, t),
        _ => return Err(FrameError::MissingRequiredColumns),
    };

    let mut validated = Table::new(vec![STAFF_ID.to_string(), TALENT_STATEMENT.to_string()]);
    for row in table.rows() {
        let statement = match &row[statement_index] {
            Value::Null => continue,
            cell => cell_to_string(cell).trim().to_string(),
        };
        if statement.is_empty() {
            continue;
        }

        let staff_id = cell_to_string(&row[staff_index]);
        validated.push_row(vec![Value::String(staff_id), Value::String(statement)])?;
    }

    if validated.is_empty() {
        return Err(FrameError::NoNonEmptyStatements);
    }

    let dropped = table.len() - validated.len();
    if dropped > 0 {
        debug!("Dropped {} rows without a talent statement", dropped);
    }
    info!("Validated input frame with {} rows", validated.len());

    Ok(validated)
}

/// Same as [`validate_input_frame`] for raw JSON input.
pub fn validate_input_frame_value(input: &Value) -> Result<Table, FrameError> {
    let table = Table::from_json(input)?;
    validate_input_frame(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_column_name() {
        assert_eq!(canonical_column_name("Staff_ID"), "staffid");
        assert_eq!(canonical_column_name("STAFF ID"), "staffid");
        assert_eq!(canonical_column_name("talent-statement"), "talentstatement");
    }

    #[test]
    fn test_blank_statement_rows_dropped() {
        let result = validate_input_frame_value(&json!({
            "staff_id": ["E001", "E002"],
            "talent_statement": ["Data scientist", ""]
        }))
        .unwrap();

        assert_eq!(result.columns(), &["StaffId", "TalentStatement"]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0, STAFF_ID), Some(&json!("E001")));
        assert_eq!(result.get(0, TALENT_STATEMENT), Some(&json!("Data scientist")));
    }

    #[test]
    fn test_values_coerced_to_strings() {
        let result = validate_input_frame_value(&json!([
            {"Staff Id": 42, "Talent Statement": "  Lead  ", "Extra": true},
            {"Staff Id": null, "Talent Statement": 7}
        ]))
        .unwrap();

        assert_eq!(result.columns().len(), 2);
        assert_eq!(result.get(0, STAFF_ID), Some(&json!("42")));
        assert_eq!(result.get(0, TALENT_STATEMENT), Some(&json!("Lead")));
        assert_eq!(result.get(1, STAFF_ID), Some(&json!("null")));
        assert_eq!(result.get(1, TALENT_STATEMENT), Some(&json!("7")));
    }

    #[test]
    fn test_null_statements_dropped() {
        let result = validate_input_frame_value(&json!([
            {"StaffId": "E001", "TalentStatement": null},
            {"StaffId": "E002", "TalentStatement": "Mentor others"}
        ]))
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0, STAFF_ID), Some(&json!("E002")));
    }

    #[test]
    fn test_missing_columns() {
        let err = validate_input_frame_value(&json!({"staff_id": ["E001"]})).unwrap_err();
        assert_eq!(err, FrameError::MissingRequiredColumns);
    }

    #[test]
    fn test_no_rows() {
        let err = validate_input_frame_value(&json!({"staff_id": [], "talent_statement": []}))
            .unwrap_err();
        assert_eq!(err, FrameError::NoRows);
    }

    #[test]
    fn test_all_blank_statements() {
        let err = validate_input_frame_value(&json!({
            "staff_id": ["E001"],
            "talent_statement": ["   "]
        }))
        .unwrap_err();
        assert_eq!(err, FrameError::NoNonEmptyStatements);
    }

    #[test]
    fn test_not_tabular() {
        let err = validate_input_frame_value(&json!(42)).unwrap_err();
        assert_eq!(err, FrameError::NotTabular);
    }
}
