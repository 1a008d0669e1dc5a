//! Template Module
//!
//! View compilation of parsed templates.

pub mod pipeline;
