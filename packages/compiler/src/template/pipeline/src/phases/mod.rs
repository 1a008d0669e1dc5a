//! Pipeline Phases Module
//!
//! Transformation phases run over a `ComponentCompilationJob` after ingest,
//! in the order of [`PHASES`].

pub mod defer_details;
pub mod generate_local_let_references;
pub mod generate_variables;
pub mod identify_callbacks;
pub mod optimize_callbacks;
pub mod remove_illegal_let_references;
pub mod resolve_names;
pub mod slot_allocation;
pub mod store_let_optimization;
pub mod variable_optimization;

use log::trace;

use crate::error::Result;
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

pub use defer_details::defer_block_details;
pub use generate_local_let_references::generate_local_let_references;
pub use generate_variables::generate_variables;
pub use identify_callbacks::identify_callbacks;
pub use optimize_callbacks::optimize_callbacks;
pub use remove_illegal_let_references::remove_illegal_let_references;
pub use resolve_names::resolve_names;
pub use slot_allocation::allocate_slots;
pub use store_let_optimization::optimize_store_let;
pub use variable_optimization::optimize_variables;

#[derive(Clone, Copy)]
enum PhaseFn {
    Infallible(fn(&mut ComponentCompilationJob)),
    Fallible(fn(&mut ComponentCompilationJob) -> Result<()>),
}

pub struct Phase {
    pub name: &'static str,
    run: PhaseFn,
}

pub const PHASES: &[Phase] = &[
    Phase { name: "identify_callbacks", run: PhaseFn::Infallible(identify_callbacks) },
    Phase { name: "generate_local_let_references", run: PhaseFn::Infallible(generate_local_let_references) },
    Phase { name: "generate_variables", run: PhaseFn::Infallible(generate_variables) },
    Phase { name: "remove_illegal_let_references", run: PhaseFn::Infallible(remove_illegal_let_references) },
    Phase { name: "resolve_names", run: PhaseFn::Fallible(resolve_names) },
    Phase { name: "optimize_callbacks", run: PhaseFn::Infallible(optimize_callbacks) },
    Phase { name: "optimize_store_let", run: PhaseFn::Infallible(optimize_store_let) },
    Phase { name: "optimize_variables", run: PhaseFn::Infallible(optimize_variables) },
];

/// Runs every phase over `job`, stopping at the first failure.
pub fn transform(job: &mut ComponentCompilationJob) -> Result<()> {
    for phase in PHASES {
        trace!("{}: running {}", job.component_name, phase.name);
        match phase.run {
            PhaseFn::Infallible(run) => run(job),
            PhaseFn::Fallible(run) => run(job)?,
        }
    }
    Ok(())
}
