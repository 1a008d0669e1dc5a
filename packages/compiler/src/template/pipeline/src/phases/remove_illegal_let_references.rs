//! Remove Illegal Let References Phase
//!
//! It's not allowed to access a `@let` declaration before it has been defined.
//! Template type checking reports this; here the forward references (and a
//! declaration reading itself) are replaced with `undefined`.

use crate::template::pipeline::ir;
use crate::template::pipeline::ir::Expression;
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

pub fn remove_illegal_let_references(job: &mut ComponentCompilationJob) {
    for unit in job.views.values_mut() {
        let declarations: Vec<(usize, String)> = unit
            .update
            .iter()
            .enumerate()
            .filter_map(|(index, op)| match op {
                ir::UpdateOp::Variable(ir::VariableOp {
                    variable: ir::SemanticVariable::Identifier { identifier, local: true },
                    initializer: Expression::StoreLet { .. },
                    ..
                }) => Some((index, identifier.clone())),
                _ => None,
            })
            .collect();

        for (index, name) in declarations {
            for op in unit.update.iter_mut().take(index + 1) {
                op.transform_expressions(
                    &mut |expr, _| match expr {
                        Expression::LexicalRead(read) if read == name => Expression::undefined(),
                        other => other,
                    },
                    ir::VisitorContextFlag::IN_CHILD_OPERATION,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn let_variable(xref: usize, name: &str, value: Expression) -> ir::UpdateOp {
        ir::UpdateOp::Variable(ir::VariableOp::new(
            ir::XrefId::new(xref),
            ir::SemanticVariable::Identifier { identifier: name.to_string(), local: true },
            Expression::StoreLet { target: ir::XrefId::new(xref + 100), value: Box::new(value) },
            ir::VariableFlags::NONE,
        ))
    }

    #[test]
    fn forward_references_become_undefined() {
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let unit = job.view_mut(root).unwrap();
        unit.update.push(ir::UpdateOp::Statement(ir::StatementOp::expression(Expression::LexicalRead(
            "later".to_string(),
        ))));
        unit.update.push(let_variable(1, "later", Expression::LexicalRead("later".to_string())));
        unit.update.push(ir::UpdateOp::Statement(ir::StatementOp::expression(Expression::LexicalRead(
            "later".to_string(),
        ))));

        remove_illegal_let_references(&mut job);

        let ops = &job.root_view().update;
        assert!(matches!(ops.get(0), Some(ir::UpdateOp::Statement(s)) if s.expression == Expression::undefined()));
        assert!(matches!(
            ops.get(1),
            Some(ir::UpdateOp::Variable(v))
                if matches!(&v.initializer, Expression::StoreLet { value, .. } if **value == Expression::undefined())
        ));
        assert!(matches!(
            ops.get(2),
            Some(ir::UpdateOp::Statement(s)) if s.expression == Expression::LexicalRead("later".to_string())
        ));
    }
}
