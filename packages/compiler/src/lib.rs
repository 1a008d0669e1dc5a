#![deny(clippy::all)]

/**
 * Angular Template Compiler Core
 *
 * Expression parsing, template AST, selector matching, template binding and
 * the view-compilation IR pipeline.
 */

// Core modules (root level - mirrors packages/compiler/src/*.ts)
pub mod chars;
pub mod directive_matching;
mod error;
pub mod parse_util;

// Parser modules
pub mod expression_parser;

// Compilation modules
pub mod render3;
pub mod schema;
pub mod template;

// Re-exports
pub use error::{CompilerError, Result};
pub use template::pipeline::{compile_template, CompiledTemplate};
