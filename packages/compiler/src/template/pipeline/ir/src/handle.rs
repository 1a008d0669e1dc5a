//! IR Handles
//!
//! Identifiers linking IR operations and expressions to each other.

use serde::{Deserialize, Serialize};

/// Cross-reference id. Ingest allocates one for every view, element-like op,
/// variable and callback so that other operations can point at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct XrefId(pub usize);

impl XrefId {
    pub fn new(id: usize) -> Self {
        XrefId(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for XrefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out [`XrefId`]s for one compilation job. Every job owns its own
/// allocator, so ids never leak between compilations.
#[derive(Debug, Clone)]
pub struct XrefAllocator {
    next: usize,
}

impl XrefAllocator {
    /// Starts after `root`, which is allocated up front for the root view.
    pub fn new(root: XrefId) -> Self {
        XrefAllocator { next: root.0 + 1 }
    }

    pub fn allocate(&mut self) -> XrefId {
        let id = XrefId(self.next);
        self.next += 1;
        id
    }
}

/// Slot handle for operations that consume slots.
///
/// `slot` stays `None` until slot allocation has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    pub slot: Option<usize>,
}

impl SlotHandle {
    pub fn new() -> Self {
        SlotHandle { slot: None }
    }

    pub fn with_slot(slot: usize) -> Self {
        SlotHandle { slot: Some(slot) }
    }

    pub fn has_slot(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_counts_up_from_root() {
        let mut xrefs = XrefAllocator::new(XrefId::new(0));
        assert_eq!(xrefs.allocate(), XrefId(1));
        assert_eq!(xrefs.allocate(), XrefId(2));

        let mut other = XrefAllocator::new(XrefId::new(0));
        assert_eq!(other.allocate(), XrefId(1));
    }
}
