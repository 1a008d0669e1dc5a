//! Defer Details Phase
//!
//! Derives the static `TDeferBlockDetails` of every `@defer` block from the
//! slots of the templates declaring its sub-views.

use std::collections::HashMap;

use crate::error::{CompilerError, Result};
use crate::render3::defer::TDeferBlockDetails;
use crate::template::pipeline::ir;
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

/// One entry per defer op, in view and op order. Requires slots to be
/// allocated.
pub fn defer_block_details(
    job: &ComponentCompilationJob,
    slot_map: &HashMap<ir::XrefId, usize>,
) -> Result<Vec<(ir::XrefId, TDeferBlockDetails)>> {
    let slot_of = |view: ir::XrefId| {
        slot_map
            .get(&view)
            .copied()
            .ok_or_else(|| CompilerError::Pipeline(format!("defer sub-view {} has no slot", view)))
    };

    let mut details = Vec::new();
    for unit in job.views.values() {
        for op in unit.create.iter() {
            let ir::CreateOp::Defer(defer) = op else {
                continue;
            };
            let mut block = TDeferBlockDetails::new(slot_of(defer.main_view)?);
            block.placeholder_tmpl_index = defer.placeholder_view.map(slot_of).transpose()?;
            block.loading_tmpl_index = defer.loading_view.map(slot_of).transpose()?;
            block.error_tmpl_index = defer.error_view.map(slot_of).transpose()?;
            block.placeholder_block_config = defer.placeholder_config;
            block.loading_block_config = defer.loading_config;
            details.push((defer.xref, block));
        }
    }
    Ok(details)
}
