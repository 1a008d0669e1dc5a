//! IR Ops Module

pub mod create;
pub mod shared;
pub mod update;

pub use create::*;
pub use shared::*;
pub use update::*;
