use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::FrameError;

/// Column holding the staff identifier.
pub const STAFF_ID: &str = "StaffId";
/// Column holding the free-text talent statement.
pub const TALENT_STATEMENT: &str = "TalentStatement";
/// Required columns, in alphabetical order.
pub const REQUIRED_COLUMNS: [&str; 2] = [STAFF_ID, TALENT_STATEMENT];

/// A single table cell. Cells are untyped so that nulls, numbers and
/// strings coming from ingestion can be told apart by the validators.
pub type Cell = Value;

/// An in-memory tabular dataset: ordered columns, ordered rows, one cell per
/// column in every row.
///
/// Serializes as an array of records (`[{"StaffId": ..., ...}, ...]`) and
/// deserializes from either records or a column-oriented object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, FrameError> {
        let mut table = Self::new(columns);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Builds a table from record objects. Columns are the union of keys in
    /// first-seen order; keys absent from a record become `null`.
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Interprets a JSON value as a table.
    ///
    /// Accepts an array of objects (records) or an object mapping column
    /// names to equally long arrays. Anything else is not tabular.
    pub fn from_json(value: &Value) -> Result<Self, FrameError> {
        match value {
            Value::Array(items) => {
                let records = items
                    .iter()
                    .map(|item| item.as_object().cloned().ok_or(FrameError::NotTabular))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::from_records(&records))
            }
            Value::Object(columns) => {
                let mut height: Option<usize> = None;
                for values in columns.values() {
                    let len = values.as_array().ok_or(FrameError::NotTabular)?.len();
                    match height {
                        Some(h) if h != len => return Err(FrameError::NotTabular),
                        _ => height = Some(len),
                    }
                }

                let names: Vec<String> = columns.keys().cloned().collect();
                let rows = (0..height.unwrap_or(0))
                    .map(|i| {
                        columns
                            .values()
                            .map(|values| values.as_array().map(|a| a[i].clone()).unwrap_or(Value::Null))
                            .collect()
                    })
                    .collect();

                Ok(Self {
                    columns: names,
                    rows,
                })
            }
            _ => Err(FrameError::NotTabular),
        }
    }

    /// Reads a JSON file and interprets it as a table.
    pub fn load_json(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(Self::from_json(&value)?)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), FrameError> {
        if row.len() != self.columns.len() {
            return Err(FrameError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<impl Iterator<Item = &mut Cell> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter_mut().map(move |row| &mut row[index]))
    }

    /// Cell at `row` in column `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<Value> for Table {
    type Error = FrameError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Table::from_json(&value)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Array(table.to_records().into_iter().map(Value::Object).collect())
    }
}
