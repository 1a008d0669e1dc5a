//! Template Pipeline Module
//!
//! The intermediate representation of views and the phases lowering it.

#[path = "ir/src/mod.rs"]
pub mod ir;
#[path = "src/mod.rs"]
pub mod src;

pub use src::{compile_template, CompiledTemplate};
