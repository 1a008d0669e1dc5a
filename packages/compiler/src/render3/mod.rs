//! Render3 Module
//!
//! Template AST, deferred block details and the template binder.

#[cfg(any(test, feature = "testing"))]
pub mod builder;
pub mod defer;
pub mod r3_ast;
pub mod view;

pub use defer::*;
