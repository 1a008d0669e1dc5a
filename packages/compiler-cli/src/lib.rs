#![deny(clippy::all)]

//! Type-check block generation for Angular templates.
//!
//! Builds on `ng_template_compiler` for template ASTs, expression parsing and
//! directive binding.

pub use ng_template_compiler as compiler;

pub mod ngtsc;
