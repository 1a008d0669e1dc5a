//! Identify Callbacks Phase
//!
//! Lifts arrow functions written in the template out of their expressions.
//! Each one becomes a `CallbackDefinition` of the job and the expression is
//! replaced by a `Callback` reference to it.

use indexmap::IndexMap;

use crate::template::pipeline::ir;
use crate::template::pipeline::ir::Expression;
use crate::template::pipeline::src::compilation::{CallbackDefinition, ComponentCompilationJob};

/// What the body of one lifted arrow function reads, before the parameters of
/// enclosing arrow functions are known.
#[derive(Debug, Default)]
struct BodyReads {
    /// Lexical reads not bound by the callback's own parameters, `$event` included.
    free: Vec<String>,
    /// Context, reference or `@let` context reads.
    context: bool,
    nested: Vec<ir::XrefId>,
}

pub fn identify_callbacks(job: &mut ComponentCompilationJob) {
    let ComponentCompilationJob { views, callbacks, xrefs, .. } = job;
    let mut reads: IndexMap<ir::XrefId, BodyReads> = IndexMap::new();

    for (&view, unit) in views.iter_mut() {
        // Post-order, so nested arrow functions are lifted before the ones
        // containing them.
        unit.transform_expressions(&mut |expr, _flags| match expr {
            Expression::ArrowFn { params, body } => {
                let xref = xrefs.allocate();
                reads.insert(xref, body_reads(&body, &params));
                let mut ops = ir::OpList::new();
                ops.push(ir::UpdateOp::Statement(ir::StatementOp::returning(*body)));
                callbacks.insert(
                    xref,
                    CallbackDefinition {
                        xref,
                        view,
                        params,
                        enclosing_params: Vec::new(),
                        ops,
                        uses_dollar_event: false,
                        uses_context: false,
                    },
                );
                Expression::Callback(xref)
            }
            other => other,
        });
    }

    // Outer callbacks were lifted after their nested ones, so a reverse walk
    // hands every callback the parameters in scope around it.
    for (xref, body) in reads.iter().rev() {
        let Some(callback) = callbacks.get(xref) else {
            continue;
        };
        let mut in_scope = callback.enclosing_params.clone();
        in_scope.extend(callback.params.iter().cloned());
        for nested in &body.nested {
            if let Some(nested) = callbacks.get_mut(nested) {
                nested.enclosing_params = in_scope.clone();
            }
        }
    }

    for (xref, body) in &reads {
        let Some(callback) = callbacks.get(xref) else {
            continue;
        };
        let unbound: Vec<&String> =
            body.free.iter().filter(|name| !callback.enclosing_params.contains(*name)).collect();
        let nested: Vec<&CallbackDefinition> =
            body.nested.iter().filter_map(|nested| callbacks.get(nested)).collect();

        let uses_dollar_event =
            unbound.iter().any(|name| *name == "$event") || nested.iter().any(|c| c.uses_dollar_event);
        let uses_context = body.context
            || unbound.iter().any(|name| *name != "$event")
            || nested.iter().any(|c| c.uses_context);

        if let Some(callback) = callbacks.get_mut(xref) {
            callback.uses_dollar_event = uses_dollar_event;
            callback.uses_context = uses_context;
        }
    }
}

fn body_reads(body: &Expression, params: &[String]) -> BodyReads {
    let mut reads = BodyReads::default();
    ir::visit_expressions_in_expression(
        body,
        &mut |expr, _| match expr {
            Expression::LexicalRead(name) => {
                if !params.contains(name) && !reads.free.contains(name) {
                    reads.free.push(name.clone());
                }
            }
            Expression::Context(_)
            | Expression::NextContext(_)
            | Expression::Reference { .. }
            | Expression::ContextLetReference(_) => reads.context = true,
            Expression::Callback(nested) => reads.nested.push(*nested),
            _ => {}
        },
        ir::VisitorContextFlag::NONE,
    );
    reads
}
