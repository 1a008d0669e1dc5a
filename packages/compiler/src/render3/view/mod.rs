//! Render3 View Module
//!
//! Binding of parsed templates against directive metadata.

pub mod t2_api;
pub mod t2_binder;

// Re-exports
pub use t2_api::*;
pub use t2_binder::*;
