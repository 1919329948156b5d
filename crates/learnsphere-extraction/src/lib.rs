//! Response parsers for model output
//!
//! Models wrap their answers in prose, code fences and stray punctuation.
//! The parsers here locate the payload inside that noise:
//!
//! - [`extract_json_object`] finds the first balanced `{...}` that parses as a JSON object
//! - [`extract_delimited`] returns the text between a literal opener and closer
//!
//! Both fail with [`ParseError`] so callers can report the failure verbatim.

mod json;
mod region;

pub use json::{extract_json_object, extract_string_field};
pub use learnsphere_utils::error::{ParseError, ParseErrorKind};
pub use region::extract_delimited;
