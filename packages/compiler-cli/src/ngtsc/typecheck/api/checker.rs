// TypeCheck Checker API
//
// The type checker that runs over generated type-check blocks.

use serde::{Deserialize, Serialize};

/// A diagnostic reported by the host checker against a TCB source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDiagnostic {
    /// Offset into the TCB source.
    pub start: usize,
    pub length: usize,
    pub message: String,
    pub code: i32,
}

impl HostDiagnostic {
    pub fn new(start: usize, length: usize, code: i32, message: impl Into<String>) -> Self {
        Self { start, length, message: message.into(), code }
    }
}

/// Type checks the source of a type-check block.
pub trait HostTypeChecker: Sync {
    /// `component` names the class the block was generated for.
    fn check(&self, component: &str, tcb_source: &str) -> Vec<HostDiagnostic>;
}
