//! Generate Local Let References Phase
//!
//! Replaces the `StoreLet` ops with variables that can be used to reference the
//! value within the same view.

use crate::template::pipeline::ir;
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

pub fn generate_local_let_references(job: &mut ComponentCompilationJob) {
    let ComponentCompilationJob { views, xrefs, .. } = job;

    for unit in views.values_mut() {
        for op in unit.update.iter_mut() {
            let ir::UpdateOp::StoreLet(store) = op else {
                continue;
            };
            let variable = ir::SemanticVariable::Identifier {
                identifier: store.declared_name.clone(),
                local: true,
            };
            let initializer = ir::Expression::StoreLet {
                target: store.target,
                value: Box::new(std::mem::replace(&mut store.value, ir::Expression::Empty)),
            };
            *op = ir::UpdateOp::Variable(ir::VariableOp::new(
                xrefs.allocate(),
                variable,
                initializer,
                ir::VariableFlags::NONE,
            ));
        }
    }
}
