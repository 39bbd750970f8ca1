//! # talentprep
//!
//! Validation and normalization of staff talent-statement datasets ahead of
//! embedding generation and language-model scoring.
//!
//! ## Architecture Overview
//!
//! - **Preprocessing**: table validation (accumulating), job-function label
//!   normalization, talent-statement text normalization and the
//!   column-coercing input frame validator (fail-fast)
//! - **Preflight**: readiness probes for the chat-completion service and the
//!   embedding model, over injected clients
//! - **Integration Layer**: OpenAI-compatible chat client, Ollama and OpenAI
//!   embedding clients
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use talentprep::preprocessing::{normalize_text_column, validate_input_value};
//! use talentprep::types::Table;
//!
//! let raw = json!([{"StaffId": "E001", "TalentStatement": "  I   aspire to  lead product.  "}]);
//! assert!(validate_input_value(&raw).is_valid);
//!
//! let table = Table::from_json(&raw).unwrap();
//! let normalized = normalize_text_column(&table).unwrap();
//! assert_eq!(
//!     normalized.get(0, "TalentStatement"),
//!     Some(&json!("I aspire to lead product."))
//! );
//! ```

pub mod config;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod logging;
pub mod preflight;
pub mod types;

/// Preprocessing module for data validation and cleaning
pub mod preprocessing;

// Re-export main types for convenience
pub use config::PrepConfig;
pub use error::{FrameError, Result, TalentPrepError};
pub use preflight::{ReadinessProbe, ReadinessState};
pub use types::Table;
