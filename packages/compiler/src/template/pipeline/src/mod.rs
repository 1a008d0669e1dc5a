//! Pipeline Source Module
//!
//! Ingest, transformation phases and the compile entry point of the
//! view-compilation pipeline.

pub mod compilation;
pub mod conversion;
pub mod ingest;
pub mod phases;

pub use compilation::*;
pub use conversion::*;
pub use ingest::*;

use std::collections::HashMap;

use crate::error::Result;
use crate::render3::defer::TDeferBlockDetails;
use crate::render3::r3_ast::R3Node;
use crate::template::pipeline::ir;

/// Transformed op lists of one component with their slot assignments.
#[derive(Debug)]
pub struct CompiledTemplate {
    pub job: ComponentCompilationJob,
    pub slots: HashMap<ir::XrefId, usize>,
    pub defer_blocks: Vec<(ir::XrefId, TDeferBlockDetails)>,
}

/// Ingests `template`, runs every phase and allocates slots.
pub fn compile_template(component_name: &str, template: &[R3Node]) -> Result<CompiledTemplate> {
    let mut job = ingest_component(component_name, template)?;
    phases::transform(&mut job)?;
    let slots = phases::allocate_slots(&mut job);
    let defer_blocks = phases::defer_block_details(&job, &slots)?;
    Ok(CompiledTemplate { job, slots, defer_blocks })
}
