//! Resolve Names Phase
//!
//! Resolves lexical references (`LexicalRead`) to either a variable declared in
//! the same op list or to property reads on the component context. Context
//! expressions with a matching context variable are resolved to that variable.

use std::collections::HashMap;

use crate::error::{CompilerError, Result};
use crate::template::pipeline::ir;
use crate::template::pipeline::ir::{Expression, SemanticVariable};
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

/// Extra names available to one lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind<'a> {
    View,
    Listener,
    Callback { params: &'a [String], enclosing: &'a [String] },
}

pub fn resolve_names(job: &mut ComponentCompilationJob) -> Result<()> {
    let root = job.root;
    let ComponentCompilationJob { views, callbacks, .. } = job;

    for unit in views.values_mut() {
        for op in unit.create.iter_mut() {
            match op {
                ir::CreateOp::Listener(listener) => {
                    process_lexical_scope(root, listener.handler_ops.as_mut_slice(), ScopeKind::Listener);
                }
                ir::CreateOp::RepeaterCreate(repeater) => resolve_track(root, repeater),
                _ => {}
            }
        }
        process_lexical_scope(root, unit.update.as_mut_slice(), ScopeKind::View);
    }

    for callback in callbacks.values_mut() {
        let kind = ScopeKind::Callback { params: &callback.params, enclosing: &callback.enclosing_params };
        process_lexical_scope(root, callback.ops.as_mut_slice(), kind);
    }

    let mut remaining = None;
    job.visit_all_expressions(&mut |expr, _| {
        if let Expression::LexicalRead(name) = expr {
            remaining.get_or_insert_with(|| name.clone());
        }
    });
    match remaining {
        Some(name) => Err(CompilerError::Pipeline(format!(
            "no lexical reads should remain, but found read of {}",
            name
        ))),
        None => Ok(()),
    }
}

fn process_lexical_scope(root: ir::XrefId, ops: &mut [ir::UpdateOp], kind: ScopeKind<'_>) {
    let mut scope: HashMap<String, ir::XrefId> = HashMap::new();
    let mut local_definitions: HashMap<String, ir::XrefId> = HashMap::new();
    let mut contexts: HashMap<ir::XrefId, ir::XrefId> = HashMap::new();

    for op in ops.iter() {
        let Some(variable) = op.as_variable() else {
            continue;
        };
        match &variable.variable {
            SemanticVariable::Identifier { identifier, local: true } => {
                local_definitions.entry(identifier.clone()).or_insert(variable.xref);
            }
            SemanticVariable::Identifier { identifier, local: false } | SemanticVariable::Alias { identifier } => {
                scope.entry(identifier.clone()).or_insert(variable.xref);
            }
            SemanticVariable::Context { view } => {
                contexts.entry(*view).or_insert(variable.xref);
            }
        }
    }

    for op in ops.iter_mut() {
        op.transform_expressions(
            &mut |expr, _| match expr {
                Expression::LexicalRead(name) => {
                    if let ScopeKind::Callback { params, enclosing } = kind {
                        if params.contains(&name) || enclosing.contains(&name) {
                            return Expression::ReadVar(name);
                        }
                    }
                    if let Some(xref) = local_definitions.get(&name).or_else(|| scope.get(&name)) {
                        Expression::ReadVariable(*xref)
                    } else if name == "$event" && kind != ScopeKind::View {
                        Expression::ReadVar(name)
                    } else {
                        Expression::read_prop(Expression::Context(root), name)
                    }
                }
                Expression::Context(view) => match contexts.get(&view) {
                    Some(xref) => Expression::ReadVariable(*xref),
                    None => Expression::Context(view),
                },
                other => other,
            },
            ir::VisitorContextFlag::NONE,
        );
    }
}

/// The track function only sees the item, its index and the component.
fn resolve_track(root: ir::XrefId, repeater: &mut ir::RepeaterCreateOp) {
    let item_name = repeater.item_name.clone();
    let index_names = repeater.index_names.clone();
    ir::transform_expression_in_place(
        &mut repeater.track,
        &mut |expr, _| match expr {
            Expression::LexicalRead(name) if name == item_name => Expression::ReadVar("$item".to_string()),
            Expression::LexicalRead(name) if index_names.contains(&name) => Expression::ReadVar("$index".to_string()),
            Expression::LexicalRead(name) => Expression::read_prop(Expression::Context(root), name),
            other => other,
        },
        ir::VisitorContextFlag::NONE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexical(name: &str) -> Expression {
        Expression::LexicalRead(name.to_string())
    }

    #[test]
    fn reads_resolve_to_variables_or_component_properties() {
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let var_xref = job.allocate_xref_id();
        let unit = job.view_mut(root).unwrap();
        unit.update.push(ir::UpdateOp::Variable(ir::VariableOp::new(
            var_xref,
            SemanticVariable::Identifier { identifier: "item".to_string(), local: false },
            Expression::read_prop(Expression::Context(root), "$implicit"),
            ir::VariableFlags::NONE,
        )));
        unit.update.push(ir::UpdateOp::Statement(ir::StatementOp::expression(Expression::Binary {
            operator: "+".to_string(),
            lhs: Box::new(lexical("item")),
            rhs: Box::new(lexical("title")),
        })));

        resolve_names(&mut job).unwrap();

        let Some(ir::UpdateOp::Statement(statement)) = job.root_view().update.get(1) else {
            panic!("expected a statement");
        };
        assert_eq!(
            statement.expression,
            Expression::Binary {
                operator: "+".to_string(),
                lhs: Box::new(Expression::ReadVariable(var_xref)),
                rhs: Box::new(Expression::read_prop(Expression::Context(root), "title")),
            }
        );
    }

    #[test]
    fn callback_parameters_shadow_component_properties() {
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let xref = job.allocate_xref_id();
        let mut ops = ir::OpList::new();
        ops.push(ir::UpdateOp::Statement(ir::StatementOp::returning(Expression::read_prop(lexical("x"), "id"))));
        job.callbacks.insert(
            xref,
            crate::template::pipeline::src::compilation::CallbackDefinition {
                xref,
                view: root,
                params: vec!["x".to_string()],
                enclosing_params: vec![],
                ops,
                uses_dollar_event: false,
                uses_context: false,
            },
        );

        resolve_names(&mut job).unwrap();

        let Some(ir::UpdateOp::Statement(statement)) = job.callbacks[&xref].ops.get(0) else {
            panic!("expected a statement");
        };
        assert_eq!(statement.expression, Expression::read_prop(Expression::ReadVar("x".to_string()), "id"));
    }

    #[test]
    fn track_reads_use_item_and_index() {
        use crate::parse_util::ParseSourceSpan;
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let body = job.allocate_view(root);
        job.view_mut(root).unwrap().create.push(ir::CreateOp::RepeaterCreate(ir::RepeaterCreateOp {
            xref: body,
            empty_view: None,
            item_name: "user".to_string(),
            index_names: vec!["$index".to_string(), "i".to_string()],
            track: Expression::Binary {
                operator: "+".to_string(),
                lhs: Box::new(Expression::read_prop(lexical("user"), "id")),
                rhs: Box::new(lexical("i")),
            },
            handle: ir::SlotHandle::new(),
            source_span: ParseSourceSpan::new(0, 1),
        }));

        resolve_names(&mut job).unwrap();

        let Some(ir::CreateOp::RepeaterCreate(repeater)) = job.root_view().create.get(0) else {
            panic!("expected a repeater");
        };
        assert_eq!(
            repeater.track,
            Expression::Binary {
                operator: "+".to_string(),
                lhs: Box::new(Expression::read_prop(Expression::ReadVar("$item".to_string()), "id")),
                rhs: Box::new(Expression::ReadVar("$index".to_string())),
            }
        );
    }
}
