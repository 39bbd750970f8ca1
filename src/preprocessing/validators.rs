use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::{Table, REQUIRED_COLUMNS, STAFF_ID, TALENT_STATEMENT};

/// Largest table accepted by the row-count check.
pub const MAX_ROW_COUNT: usize = 1_000_000;

// ============================================================================
// Validation Types
// ============================================================================

/// Outcome of an accumulating validation. `is_valid` is derived from the
/// error list and never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }
}

// ============================================================================
// Base Check Trait
// ============================================================================

/// One independently invokable table check. Checks append to a shared error
/// list and never stop the checks that run after them.
pub trait TableCheck: Send + Sync {
    fn check(&self, table: &Table, errors: &mut Vec<String>);
    fn name(&self) -> &str;
}

// ============================================================================
// Row Count Check
// ============================================================================

pub struct RowCountCheck {
    max_rows: usize,
}

impl RowCountCheck {
    pub fn new() -> Self {
        Self {
            max_rows: MAX_ROW_COUNT,
        }
    }
}

impl Default for RowCountCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCheck for RowCountCheck {
    fn check(&self, table: &Table, errors: &mut Vec<String>) {
        let row_count = table.len();
        if row_count == 0 {
            errors.push("InputTable is empty.".to_string());
        }
        if row_count > self.max_rows {
            errors.push("InputTable exceeds maximum row count of 1,000,000.".to_string());
        }
    }

    fn name(&self) -> &str {
        "RowCountCheck"
    }
}

// ============================================================================
// Required Columns Check
// ============================================================================

pub struct RequiredColumnsCheck;

impl TableCheck for RequiredColumnsCheck {
    fn check(&self, table: &Table, errors: &mut Vec<String>) {
        for column in REQUIRED_COLUMNS {
            if !table.has_column(column) {
                errors.push(format!("Missing required column: {}", column));
            }
        }
    }

    fn name(&self) -> &str {
        "RequiredColumnsCheck"
    }
}

// ============================================================================
// Content Checks
// ============================================================================

fn has_required_columns(table: &Table) -> bool {
    REQUIRED_COLUMNS.iter().all(|c| table.has_column(c))
}

fn all_strings(table: &Table, column: &str) -> bool {
    table
        .column(column)
        .map(|mut cells| cells.all(Value::is_string))
        .unwrap_or(false)
}

/// Every `StaffId` must be a non-null string. Skipped unless both required
/// columns are present.
pub struct StaffIdContentCheck;

impl TableCheck for StaffIdContentCheck {
    fn check(&self, table: &Table, errors: &mut Vec<String>) {
        if !has_required_columns(table) {
            return;
        }
        if !all_strings(table, STAFF_ID) {
            errors.push(format!("Column {} must contain strings without nulls.", STAFF_ID));
        }
    }

    fn name(&self) -> &str {
        "StaffIdContentCheck"
    }
}

/// Every `TalentStatement` must be a non-null string, and once that holds,
/// none may be blank after trimming.
pub struct TalentStatementContentCheck;

impl TableCheck for TalentStatementContentCheck {
    fn check(&self, table: &Table, errors: &mut Vec<String>) {
        if !has_required_columns(table) {
            return;
        }
        if !all_strings(table, TALENT_STATEMENT) {
            errors.push(format!(
                "Column {} must contain strings without nulls.",
                TALENT_STATEMENT
            ));
            return;
        }

        let blank_rows: Vec<usize> = table
            .column(TALENT_STATEMENT)
            .into_iter()
            .flatten()
            .enumerate()
            .filter(|(_, cell)| cell.as_str().map_or(false, |s| s.trim().is_empty()))
            .map(|(i, _)| i)
            .collect();

        if !blank_rows.is_empty() {
            errors.push(format!(
                "TalentStatement contains empty or whitespace values at rows: {:?}",
                blank_rows
            ));
        }
    }

    fn name(&self) -> &str {
        "TalentStatementContentCheck"
    }
}

// ============================================================================
// Table Validator
// ============================================================================

/// Runs a set of table checks and folds their errors into one result.
pub struct TableValidator {
    checks: Vec<Box<dyn TableCheck>>,
}

impl TableValidator {
    /// Validator running every schema and content check.
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(RowCountCheck::new()),
                Box::new(RequiredColumnsCheck),
                Box::new(StaffIdContentCheck),
                Box::new(TalentStatementContentCheck),
            ],
        }
    }

    /// Validator running only the given checks, in order.
    pub fn with_checks(checks: Vec<Box<dyn TableCheck>>) -> Self {
        Self { checks }
    }

    pub fn add_check(&mut self, check: Box<dyn TableCheck>) {
        self.checks.push(check);
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn validate(&self, table: &Table) -> ValidationResult {
        let mut errors = Vec::new();
        for check in &self.checks {
            let before = errors.len();
            check.check(table, &mut errors);
            if errors.len() > before {
                debug!("{} reported {} error(s)", check.name(), errors.len() - before);
            }
        }
        ValidationResult::from_errors(errors)
    }

    /// Validates raw JSON input. Input that is not tabular fails with a
    /// single error and no further checks run.
    pub fn validate_value(&self, input: &Value) -> ValidationResult {
        match Table::from_json(input) {
            Ok(table) => self.validate(&table),
            Err(_) => ValidationResult::from_errors(vec![
                "InputTable must be a tabular dataset.".to_string(),
            ]),
        }
    }
}

impl Default for TableValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates that a table meets the schema and content requirements.
pub fn validate_input_table(table: &Table) -> ValidationResult {
    TableValidator::new().validate(table)
}

/// Validates raw JSON input as a table.
pub fn validate_input_value(input: &Value) -> ValidationResult {
    TableValidator::new().validate_value(input)
}
