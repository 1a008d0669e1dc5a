//! Generate Variables Phase
//!
//! Generates a preamble for each view update block, listener handler and
//! callback which declares every variable the block may reference: the
//! contexts of ancestor views, context variables, aliases, local references and
//! `@let` declarations, walking the scope chain outwards.

use indexmap::IndexMap;

use crate::template::pipeline::ir;
use crate::template::pipeline::ir::{Expression, SemanticVariable, VariableFlags, CTX_REF};
use crate::template::pipeline::src::compilation::{ComponentCompilationJob, ViewCompilationUnit};

pub fn generate_variables(job: &mut ComponentCompilationJob) {
    let root = job.root;
    recursively_process_view(job, root, None);
}

/// Lexical scope of a view, including a reference to its parent view's scope.
#[derive(Debug, Clone)]
struct Scope {
    view: ir::XrefId,
    /// Template name to context property, as declared by the view.
    context_variables: IndexMap<String, String>,
    aliases: Vec<ir::AliasVariable>,
    references: Vec<Reference>,
    let_declarations: Vec<LetDeclaration>,
    parent: Option<Box<Scope>>,
}

/// Local reference collected from an element-like op of the view.
#[derive(Debug, Clone)]
struct Reference {
    name: String,
    target: ir::XrefId,
    /// Position among the references declared on the same element.
    offset: usize,
}

#[derive(Debug, Clone)]
struct LetDeclaration {
    name: String,
    target: ir::XrefId,
}

fn recursively_process_view(job: &mut ComponentCompilationJob, view: ir::XrefId, parent: Option<Scope>) {
    let Some(unit) = job.views.get(&view) else {
        return;
    };
    let scope = get_scope_for_view(unit, parent);
    let children: Vec<ir::XrefId> = unit.create.iter().flat_map(ir::CreateOp::child_views).collect();

    for child in children {
        recursively_process_view(job, child, Some(scope.clone()));
    }

    let ComponentCompilationJob { views, callbacks, xrefs, .. } = job;
    let Some(unit) = views.get_mut(&view) else {
        return;
    };

    for op in unit.create.iter_mut() {
        if let ir::CreateOp::Listener(listener) = op {
            listener
                .handler_ops
                .prepend(generate_variables_in_scope_for_view(view, &scope, true, xrefs));
        }
    }
    for callback in callbacks.values_mut().filter(|c| c.view == view) {
        callback
            .ops
            .prepend(generate_variables_in_scope_for_view(view, &scope, true, xrefs));
    }
    unit.update
        .prepend(generate_variables_in_scope_for_view(view, &scope, false, xrefs));
}

fn get_scope_for_view(unit: &ViewCompilationUnit, parent: Option<Scope>) -> Scope {
    let mut scope = Scope {
        view: unit.xref,
        context_variables: unit.context_variables.clone(),
        aliases: unit.aliases.clone(),
        references: Vec::new(),
        let_declarations: Vec::new(),
        parent: parent.map(Box::new),
    };

    for op in unit.create.iter() {
        match op {
            ir::CreateOp::ElementStart(ir::ElementStartOp { xref, local_refs, .. })
            | ir::CreateOp::Template(ir::TemplateOp { xref, local_refs, .. }) => {
                for (offset, local_ref) in local_refs.iter().enumerate() {
                    scope.references.push(Reference {
                        name: local_ref.name.clone(),
                        target: *xref,
                        offset,
                    });
                }
            }
            ir::CreateOp::DeclareLet(decl) => scope.let_declarations.push(LetDeclaration {
                name: decl.declared_name.clone(),
                target: decl.xref,
            }),
            _ => {}
        }
    }

    scope
}

/// Declarations for every variable in scope for `view`. Inherited scopes are
/// reached with one `NextContext` step per level.
fn generate_variables_in_scope_for_view(
    view: ir::XrefId,
    scope: &Scope,
    is_listener: bool,
    xrefs: &mut ir::XrefAllocator,
) -> Vec<ir::UpdateOp> {
    let mut new_ops = Vec::new();
    let mut declare = |variable: SemanticVariable, initializer: Expression, flags: VariableFlags| {
        new_ops.push(ir::UpdateOp::Variable(ir::VariableOp::new(xrefs.allocate(), variable, initializer, flags)));
    };

    if scope.view != view {
        declare(
            SemanticVariable::Context { view: scope.view },
            Expression::NextContext(1),
            VariableFlags::NONE,
        );
    }

    for (name, value) in &scope.context_variables {
        let context = Expression::Context(scope.view);
        let initializer = if value == CTX_REF { context } else { Expression::read_prop(context, value) };
        declare(
            SemanticVariable::Identifier { identifier: name.clone(), local: false },
            initializer,
            VariableFlags::NONE,
        );
    }

    for alias in &scope.aliases {
        declare(
            SemanticVariable::Alias { identifier: alias.identifier.clone() },
            alias.expression.clone(),
            VariableFlags::ALWAYS_INLINE,
        );
    }

    for reference in &scope.references {
        declare(
            SemanticVariable::Identifier { identifier: reference.name.clone(), local: false },
            Expression::Reference { target: reference.target, offset: reference.offset },
            VariableFlags::NONE,
        );
    }

    // Same-view reads of a `@let` use the local variable from its `StoreLet`.
    if scope.view != view || is_listener {
        for decl in &scope.let_declarations {
            declare(
                SemanticVariable::Identifier { identifier: decl.name.clone(), local: false },
                Expression::ContextLetReference(decl.target),
                VariableFlags::NONE,
            );
        }
    }

    if let Some(parent) = &scope.parent {
        new_ops.extend(generate_variables_in_scope_for_view(view, parent, false, xrefs));
    }
    new_ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_util::ParseSourceSpan;

    fn span() -> ParseSourceSpan {
        ParseSourceSpan::new(0, 1)
    }

    fn variable_names(ops: &ir::OpList<ir::UpdateOp>) -> Vec<String> {
        ops.iter()
            .filter_map(ir::UpdateOp::as_variable)
            .map(|v| match &v.variable {
                SemanticVariable::Context { view } => format!("ctx{}", view),
                other => other.identifier().unwrap_or_default().to_string(),
            })
            .collect()
    }

    #[test]
    fn child_views_inherit_parent_scope() {
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let child = job.allocate_view(root);
        let element = job.allocate_xref_id();
        {
            let unit = job.view_mut(root).unwrap();
            unit.create.push(ir::CreateOp::ElementStart(ir::ElementStartOp {
                xref: element,
                tag: "input".to_string(),
                attributes: vec![],
                local_refs: vec![ir::LocalRef { name: "box".to_string(), target: String::new() }],
                handle: ir::SlotHandle::new(),
                source_span: span(),
            }));
            unit.create.push(ir::CreateOp::Template(ir::TemplateOp {
                xref: child,
                template_kind: ir::TemplateKind::NgTemplate,
                tag: Some("ng-template".to_string()),
                local_refs: vec![],
                handle: ir::SlotHandle::new(),
                source_span: span(),
            }));
        }
        job.view_mut(child)
            .unwrap()
            .context_variables
            .insert("item".to_string(), "$implicit".to_string());

        generate_variables(&mut job);

        assert_eq!(variable_names(&job.root_view().update), vec!["box"]);
        assert_eq!(
            variable_names(&job.view(child).unwrap().update),
            vec!["item".to_string(), format!("ctx{}", root), "box".to_string()]
        );
    }

    #[test]
    fn listeners_see_let_declarations_of_their_own_view() {
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let decl = job.allocate_xref_id();
        let unit = job.view_mut(root).unwrap();
        unit.create.push(ir::CreateOp::DeclareLet(ir::DeclareLetOp {
            xref: decl,
            declared_name: "total".to_string(),
            handle: ir::SlotHandle::new(),
            source_span: span(),
        }));
        unit.create.push(ir::CreateOp::Listener(ir::ListenerOp {
            target: decl,
            name: "click".to_string(),
            event_target: None,
            is_two_way: false,
            is_animation: false,
            handler_ops: ir::OpList::new(),
            source_span: span(),
        }));

        generate_variables(&mut job);

        assert!(variable_names(&job.root_view().update).is_empty());
        let Some(ir::CreateOp::Listener(listener)) = job.root_view().create.get(1) else {
            panic!("expected a listener");
        };
        assert_eq!(variable_names(&listener.handler_ops), vec!["total"]);
        assert!(matches!(
            listener.handler_ops.get(0),
            Some(ir::UpdateOp::Variable(v)) if v.initializer == Expression::ContextLetReference(decl)
        ));
    }
}
