//! Schema Module
//!
//! DOM element schema used by the template type-checker.

pub mod dom_element_schema_registry;

pub use dom_element_schema_registry::*;
