//! Store Let Optimization Phase
//!
//! Removes any `StoreLet` expressions whose `@let` is never read from another
//! view or a listener, along with the `DeclareLet` slot they would write into.

use std::collections::HashSet;

use crate::template::pipeline::ir;
use crate::template::pipeline::ir::Expression;
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

pub fn optimize_store_let(job: &mut ComponentCompilationJob) {
    let mut let_used_externally: HashSet<ir::XrefId> = HashSet::new();
    job.visit_all_expressions(&mut |expr, _| {
        if let Expression::ContextLetReference(target) = expr {
            let_used_externally.insert(*target);
        }
    });

    // Declarations whose stored value goes through a pipe keep their slot,
    // the pipe instance needs it.
    let mut inlined: HashSet<ir::XrefId> = HashSet::new();
    let mut keeps_slot: HashSet<ir::XrefId> = HashSet::new();
    job.transform_all_expressions(&mut |expr, _| match expr {
        Expression::StoreLet { target, value } if !let_used_externally.contains(&target) => {
            if contains_pipe(&value) {
                keeps_slot.insert(target);
            }
            inlined.insert(target);
            *value
        }
        other => other,
    });

    for unit in job.views.values_mut() {
        unit.create.retain(|op| match op {
            ir::CreateOp::DeclareLet(decl) => !inlined.contains(&decl.xref) || keeps_slot.contains(&decl.xref),
            _ => true,
        });
    }
}

fn contains_pipe(expr: &Expression) -> bool {
    let mut found = false;
    ir::visit_expressions_in_expression(
        expr,
        &mut |e, _| {
            if matches!(e, Expression::PipeBinding { .. }) {
                found = true;
            }
        },
        ir::VisitorContextFlag::NONE,
    );
    found
}
