pub mod input_frame;
pub mod job_functions;
pub mod text_normalizer;
pub mod validators;

pub use input_frame::{canonical_column_name, validate_input_frame, validate_input_frame_value};
pub use job_functions::{
    title_case, validate_job_function_names, validate_job_functions,
    validate_job_functions_value, JobFunctionValidation,
};
pub use text_normalizer::{
    normalize_text, normalize_text_column, TextNormalizer, UnicodeNormalizer,
    WhitespaceNormalizer,
};
pub use validators::{
    validate_input_table, validate_input_value, TableCheck, TableValidator, ValidationResult,
};
