//! Deferred block details
//!
//! Static per-location configuration of a `@defer` block and the mutable state of
//! one rendered instance of it. Both are plain state machines; scheduling and
//! dependency loading are driven by whoever owns them.

use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};

/// Loading state of the dependencies of a `@defer` block, shared by every
/// instance of the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferDependenciesLoadingState {
    NotStarted,
    /// A prefetch or idle trigger has been scheduled but loading has not begun.
    Scheduled,
    InProgress,
    Complete,
    Failed,
}

impl DeferDependenciesLoadingState {
    fn can_transition_to(self, next: DeferDependenciesLoadingState) -> bool {
        use DeferDependenciesLoadingState::*;
        matches!(
            (self, next),
            (NotStarted, Scheduled)
                | (NotStarted, InProgress)
                | (Scheduled, InProgress)
                | (InProgress, Complete)
                | (InProgress, Failed)
        )
    }
}

/// What a single instance of a `@defer` block currently renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeferBlockState {
    Initial,
    Placeholder,
    Loading,
    Complete,
    Error,
}

impl DeferBlockState {
    fn is_terminal(self) -> bool {
        matches!(self, DeferBlockState::Complete | DeferBlockState::Error)
    }
}

/// `minimum` / `after` timings of a `@placeholder` or `@loading` sub-block, in ms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferBlockConfig {
    pub minimum_time: Option<u64>,
    pub after_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TDeferBlockDetails {
    pub primary_tmpl_index: usize,
    pub loading_tmpl_index: Option<usize>,
    pub placeholder_tmpl_index: Option<usize>,
    pub error_tmpl_index: Option<usize>,
    pub loading_block_config: Option<DeferBlockConfig>,
    pub placeholder_block_config: Option<DeferBlockConfig>,
    /// Name of the function resolving the block's lazy dependencies.
    pub dependency_resolver_fn: Option<String>,
    loading_state: DeferDependenciesLoadingState,
}

impl TDeferBlockDetails {
    pub fn new(primary_tmpl_index: usize) -> Self {
        TDeferBlockDetails {
            primary_tmpl_index,
            loading_tmpl_index: None,
            placeholder_tmpl_index: None,
            error_tmpl_index: None,
            loading_block_config: None,
            placeholder_block_config: None,
            dependency_resolver_fn: None,
            loading_state: DeferDependenciesLoadingState::NotStarted,
        }
    }

    pub fn loading_state(&self) -> DeferDependenciesLoadingState {
        self.loading_state
    }

    /// Moves the dependency loading state forward. Returns `Ok(false)` when the
    /// block is already in `next`, so repeated triggers are no-ops.
    pub fn advance_loading(&mut self, next: DeferDependenciesLoadingState) -> Result<bool> {
        if self.loading_state == next {
            return Ok(false);
        }
        if !self.loading_state.can_transition_to(next) {
            return Err(CompilerError::IllegalDeferTransition {
                from: format!("{:?}", self.loading_state),
                to: format!("{:?}", next),
            });
        }
        self.loading_state = next;
        Ok(true)
    }

    /// Template to render for an instance in `state`, if the block has one.
    pub fn template_for(&self, state: DeferBlockState) -> Option<usize> {
        match state {
            DeferBlockState::Initial => None,
            DeferBlockState::Placeholder => self.placeholder_tmpl_index,
            DeferBlockState::Loading => self.loading_tmpl_index,
            DeferBlockState::Complete => Some(self.primary_tmpl_index),
            DeferBlockState::Error => self.error_tmpl_index,
        }
    }
}

pub type CleanupFn = Box<dyn FnOnce() + Send>;

/// Per-instance state of a `@defer` block.
pub struct LDeferBlockDetails {
    state: DeferBlockState,
    cleanups: Vec<CleanupFn>,
    destroyed: bool,
}

impl Default for LDeferBlockDetails {
    fn default() -> Self {
        LDeferBlockDetails { state: DeferBlockState::Initial, cleanups: Vec::new(), destroyed: false }
    }
}

impl std::fmt::Debug for LDeferBlockDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LDeferBlockDetails")
            .field("state", &self.state)
            .field("cleanups", &self.cleanups.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl LDeferBlockDetails {
    pub fn new() -> Self {
        LDeferBlockDetails::default()
    }

    pub fn state(&self) -> DeferBlockState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Renders a later state. States only move forward and `Complete`/`Error`
    /// are final. Returns `Ok(false)` for a destroyed instance.
    pub fn render(&mut self, next: DeferBlockState) -> Result<bool> {
        if self.destroyed {
            return Ok(false);
        }
        if self.state.is_terminal() || next <= self.state {
            return Err(CompilerError::IllegalDeferTransition {
                from: format!("{:?}", self.state),
                to: format!("{:?}", next),
            });
        }
        self.state = next;
        Ok(true)
    }

    /// Registers work to undo when the instance is destroyed, such as a pending
    /// idle callback. Runs immediately if the instance is already destroyed.
    pub fn register_cleanup(&mut self, cleanup: CleanupFn) {
        if self.destroyed {
            cleanup();
        } else {
            self.cleanups.push(cleanup);
        }
    }

    /// Runs all registered cleanups once. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for cleanup in self.cleanups.drain(..) {
            cleanup();
        }
    }
}

impl Drop for LDeferBlockDetails {
    fn drop(&mut self) {
        self.destroy();
    }
}
