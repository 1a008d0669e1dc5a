//! Variable Optimization Phase
//!
//! Inlines `ALWAYS_INLINE` variables at their reads, then removes variables
//! nothing reads until no more can be removed. Unused variables whose
//! initializer has side effects are kept as expression statements.

use std::collections::HashMap;

use log::trace;

use crate::template::pipeline::ir;
use crate::template::pipeline::ir::{Expression, VariableFlags};
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

pub fn optimize_variables(job: &mut ComponentCompilationJob) {
    for ops in job.update_op_lists_mut() {
        inline_always_inline_variables(ops);
    }

    let mut rounds = 0;
    loop {
        let counts = count_variable_reads(job);
        let mut changed = 0;
        for ops in job.update_op_lists_mut() {
            changed += optimize_variables_in_op_list(ops, &counts);
        }
        for unit in job.views.values_mut() {
            let before = unit.create.len();
            unit.create.retain(|op| match op {
                ir::CreateOp::Variable(var) => {
                    counts.get(&var.xref).copied().unwrap_or(0) > 0 || var.initializer.has_side_effects()
                }
                _ => true,
            });
            changed += before - unit.create.len();
        }
        rounds += 1;
        if changed == 0 {
            break;
        }
    }
    trace!("variable optimization settled after {} rounds", rounds);
}

fn inline_always_inline_variables(ops: &mut ir::OpList<ir::UpdateOp>) {
    let inlined: HashMap<ir::XrefId, Expression> = ops
        .iter()
        .filter_map(ir::UpdateOp::as_variable)
        .filter(|var| var.flags.contains(VariableFlags::ALWAYS_INLINE))
        .map(|var| (var.xref, var.initializer.clone()))
        .collect();
    if inlined.is_empty() {
        return;
    }
    for op in ops.iter_mut() {
        op.transform_expressions(
            &mut |expr, _| match expr {
                Expression::ReadVariable(xref) => match inlined.get(&xref) {
                    Some(initializer) => initializer.clone(),
                    None => Expression::ReadVariable(xref),
                },
                other => other,
            },
            ir::VisitorContextFlag::NONE,
        );
    }
}

fn count_variable_reads(job: &ComponentCompilationJob) -> HashMap<ir::XrefId, usize> {
    let mut counts = HashMap::new();
    job.visit_all_expressions(&mut |expr, _| {
        if let Expression::ReadVariable(xref) = expr {
            *counts.entry(*xref).or_insert(0) += 1;
        }
    });
    counts
}

fn is_context_step(expr: &Expression) -> bool {
    matches!(expr, Expression::NextContext(_))
}

/// Removes unused variables of one op list and returns how many ops changed.
///
/// Context steps are relative to the previous step, so an unused `NextContext`
/// variable is only dropped when no later step in the list remains.
fn optimize_variables_in_op_list(ops: &mut ir::OpList<ir::UpdateOp>, counts: &HashMap<ir::XrefId, usize>) -> usize {
    let mut changed = 0;
    let mut later_step_kept = false;

    for index in (0..ops.len()).rev() {
        let var = match ops.get(index) {
            Some(ir::UpdateOp::Variable(var)) => var,
            Some(ir::UpdateOp::Statement(statement)) => {
                later_step_kept |= is_context_step(&statement.expression);
                continue;
            }
            _ => continue,
        };
        let used = counts.get(&var.xref).copied().unwrap_or(0) > 0;
        let is_step = is_context_step(&var.initializer);
        if used {
            later_step_kept |= is_step;
            continue;
        }

        if var.initializer.has_side_effects() || (is_step && later_step_kept) {
            let statement = ir::StatementOp::expression(var.initializer.clone());
            ops.replace_at(index, ir::UpdateOp::Statement(statement));
            later_step_kept |= is_step;
        } else {
            ops.remove_at(index);
        }
        changed += 1;
    }
    changed
}
