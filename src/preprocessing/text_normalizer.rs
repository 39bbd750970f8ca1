use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::error::FrameError;
use crate::types::{Table, REQUIRED_COLUMNS, TALENT_STATEMENT};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// Normalizers
// ============================================================================

pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
    fn name(&self) -> &str;
}

/// NFKC: composes combining sequences and folds compatibility variants
/// (full-width forms, ligatures, non-breaking spaces).
pub struct UnicodeNormalizer;

impl TextNormalizer for UnicodeNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.nfkc().collect()
    }

    fn name(&self) -> &str {
        "UnicodeNormalizer"
    }
}

/// Collapses every whitespace run into one ASCII space and trims the ends.
pub struct WhitespaceNormalizer;

impl TextNormalizer for WhitespaceNormalizer {
    fn normalize(&self, text: &str) -> String {
        WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
    }

    fn name(&self) -> &str {
        "WhitespaceNormalizer"
    }
}

/// Applies the full talent-statement cleanup to one value.
pub fn normalize_text(text: &str) -> String {
    WhitespaceNormalizer.normalize(&UnicodeNormalizer.normalize(text))
}

// ============================================================================
// Column Normalization
// ============================================================================

/// Returns a copy of `table` with every `TalentStatement` normalized.
///
/// Fails without producing a table when a required column is missing or a
/// statement is not a string. The input is never modified.
pub fn normalize_text_column(table: &Table) -> Result<Table, FrameError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(FrameError::MissingColumns(missing));
    }

    let all_strings = table
        .column(TALENT_STATEMENT)
        .map(|mut cells| cells.all(Value::is_string))
        .unwrap_or(false);
    if !all_strings {
        return Err(FrameError::ColumnType {
            column: TALENT_STATEMENT.to_string(),
        });
    }

    let mut normalized = table.clone();
    if let Some(cells) = normalized.column_mut(TALENT_STATEMENT) {
        for cell in cells {
            if let Value::String(text) = cell {
                *text = normalize_text(text);
            }
        }
    }

    info!("Normalized {} talent statements", normalized.len());
    Ok(normalized)
}
