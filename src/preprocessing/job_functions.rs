//! Validation and normalization of job-function label lists.
//!
//! Labels are trimmed, length-checked, deduplicated by their case-folded
//! form (first occurrence wins) and returned title-cased in first-seen order.
//! A count outside the accepted range is reported but every element is still
//! processed, so an invalid result can carry a non-empty normalized list.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

pub const MIN_JOB_FUNCTIONS: usize = 1;
pub const MAX_JOB_FUNCTIONS: usize = 200;
pub const MAX_JOB_FUNCTION_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFunctionValidation {
    pub is_valid: bool,
    pub normalized: Vec<String>,
    pub errors: Vec<String>,
}

/// Validates a JSON value that should be a list of job-function names.
pub fn validate_job_functions_value(input: &Value) -> JobFunctionValidation {
    match input.as_array() {
        Some(items) => validate_job_functions(items),
        None => JobFunctionValidation {
            is_valid: false,
            normalized: Vec::new(),
            errors: vec!["JobFunctionsList must be a list of strings.".to_string()],
        },
    }
}

/// Validates a list of arbitrary JSON items; non-string items are reported.
pub fn validate_job_functions(items: &[Value]) -> JobFunctionValidation {
    normalize_labels(items.len(), items.iter().map(Value::as_str))
}

/// Validates a list of names that are already strings.
pub fn validate_job_function_names<S: AsRef<str>>(names: &[S]) -> JobFunctionValidation {
    normalize_labels(names.len(), names.iter().map(|n| Some(n.as_ref())))
}

fn normalize_labels<'a, I>(count: usize, items: I) -> JobFunctionValidation
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut errors = Vec::new();
    if !(MIN_JOB_FUNCTIONS..=MAX_JOB_FUNCTIONS).contains(&count) {
        errors.push(format!(
            "JobFunctionsList must contain between {} and {} items.",
            MIN_JOB_FUNCTIONS, MAX_JOB_FUNCTIONS
        ));
    }

    let mut normalized = Vec::new();
    let mut seen = HashSet::new();

    for (index, item) in items.enumerate() {
        let trimmed = match item.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => {
                errors.push(format!(
                    "Job function at index {} must be a non-empty string.",
                    index
                ));
                continue;
            }
        };

        if trimmed.chars().count() > MAX_JOB_FUNCTION_CHARS {
            errors.push(format!(
                "Job function at index {} exceeds {} characters.",
                index, MAX_JOB_FUNCTION_CHARS
            ));
            continue;
        }

        if !seen.insert(caseless::default_case_fold_str(trimmed)) {
            debug!("Skipping duplicate job function at index {}", index);
            continue;
        }

        normalized.push(title_case(trimmed));
    }

    JobFunctionValidation {
        is_valid: errors.is_empty(),
        normalized,
        errors,
    }
}

/// Uppercases the first cased letter of every whitespace-delimited word and
/// lowercases the letters after it. Whitespace is preserved.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word_started = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            word_started = false;
            result.push(ch);
        } else if !word_started && is_cased(ch) {
            word_started = true;
            push_titlecase(ch, &mut result);
        } else if word_started {
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }

    result
}

fn is_cased(ch: char) -> bool {
    ch.is_lowercase() || ch.is_uppercase() || titlecase_letter(ch).is_some()
}

/// Titlecase form of a letter whose titlecase differs from its uppercase:
/// the Latin digraphs (ǅ, ǈ, ǋ, ǲ) and Greek letters with ypogegrammeni.
fn titlecase_letter(ch: char) -> Option<char> {
    let title = match ch as u32 {
        0x01C4..=0x01C6 => 0x01C5,
        0x01C7..=0x01C9 => 0x01C8,
        0x01CA..=0x01CC => 0x01CB,
        0x01F1..=0x01F3 => 0x01F2,
        c @ 0x1F80..=0x1FAF => c | 0x8,
        0x1FB3 | 0x1FBC => 0x1FBC,
        0x1FC3 | 0x1FCC => 0x1FCC,
        0x1FF3 | 0x1FFC => 0x1FFC,
        _ => return None,
    };
    char::from_u32(title)
}

/// Pushes the titlecase of `ch`. Letters that uppercase to several
/// characters keep only the first one capitalized ("ß" → "Ss", "ﬁ" → "Fi").
fn push_titlecase(ch: char, out: &mut String) {
    if let Some(title) = titlecase_letter(ch) {
        out.push(title);
        return;
    }

    let mut upper = ch.to_uppercase();
    if let Some(first) = upper.next() {
        out.push(first);
        for rest in upper {
            out.extend(rest.to_lowercase());
        }
    }
}
