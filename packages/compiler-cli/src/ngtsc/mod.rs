//! Angular TypeScript Compiler (ngtsc)
//!
//! Template type-checking and the diagnostics it reports.

pub mod diagnostics;
pub mod typecheck;
