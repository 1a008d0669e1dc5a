//! Optimize Callbacks Phase
//!
//! Deduplicates identical callbacks and gives every callback that closes over
//! the template context a `StoredCallback` slot in the view that declares it,
//! so the closure is only created once per view instance.

use std::collections::HashMap;

use log::trace;

use crate::template::pipeline::ir;
use crate::template::pipeline::ir::Expression;
use crate::template::pipeline::src::compilation::{CallbackDefinition, ComponentCompilationJob};

pub fn optimize_callbacks(job: &mut ComponentCompilationJob) {
    deduplicate_callbacks(job);
    store_context_callbacks(job);
}

/// Callbacks reading `$event` depend on the listener they sit in and are never
/// merged. Context-dependent callbacks are only merged within the same view.
fn deduplicate_callbacks(job: &mut ComponentCompilationJob) {
    let mut duplicates: HashMap<ir::XrefId, ir::XrefId> = HashMap::new();
    let mut seen: Vec<(ir::XrefId, ir::XrefId, NormalizedCallback)> = Vec::new();

    // Nested callbacks come first, so their replacements are known by the time
    // the callbacks containing them are compared.
    for callback in job.callbacks.values() {
        if callback.uses_dollar_event {
            continue;
        }
        let normalized = normalize(callback, &duplicates);
        let original = seen.iter().find(|(_, view, other)| {
            *other == normalized && (!callback.uses_context || *view == callback.view)
        });
        match original {
            Some((first, _, _)) => {
                duplicates.insert(callback.xref, *first);
            }
            None => seen.push((callback.xref, callback.view, normalized)),
        }
    }

    if duplicates.is_empty() {
        return;
    }
    trace!("merging {} duplicate callbacks", duplicates.len());
    job.callbacks.retain(|xref, _| !duplicates.contains_key(xref));
    job.transform_all_expressions(&mut |expr, _| match expr {
        Expression::Callback(xref) => Expression::Callback(duplicates.get(&xref).copied().unwrap_or(xref)),
        other => other,
    });
}

// TODO: hoist context-free callbacks into the constant pool.
fn store_context_callbacks(job: &mut ComponentCompilationJob) {
    let mut stored: HashMap<ir::XrefId, ir::XrefId> = HashMap::new();
    let ComponentCompilationJob { views, callbacks, xrefs, .. } = job;

    for callback in callbacks.values().filter(|c| c.uses_context) {
        let Some(unit) = views.get_mut(&callback.view) else {
            continue;
        };
        let xref = xrefs.allocate();
        unit.create.push(ir::CreateOp::StoredCallback(ir::StoredCallbackOp {
            xref,
            callback: callback.xref,
            handle: ir::SlotHandle::new(),
        }));
        stored.insert(callback.xref, xref);
    }

    if stored.is_empty() {
        return;
    }
    job.transform_all_expressions(&mut |expr, _| match expr {
        Expression::Callback(xref) => match stored.get(&xref) {
            Some(op) => Expression::StoredCallback(*op),
            None => Expression::Callback(xref),
        },
        other => other,
    });
}

type NormalizedCallback = (Vec<String>, Vec<String>, ir::OpList<ir::UpdateOp>);

/// Callback ops with the callback's own variable xrefs renumbered from zero
/// and merged callbacks replaced by their originals.
fn normalize(callback: &CallbackDefinition, duplicates: &HashMap<ir::XrefId, ir::XrefId>) -> NormalizedCallback {
    let renumbered: HashMap<ir::XrefId, ir::XrefId> = callback
        .ops
        .iter()
        .filter_map(ir::UpdateOp::as_variable)
        .enumerate()
        .map(|(index, var)| (var.xref, ir::XrefId::new(index)))
        .collect();

    let mut ops = callback.ops.clone();
    for op in ops.iter_mut() {
        if let ir::UpdateOp::Variable(var) = op {
            if let Some(xref) = renumbered.get(&var.xref) {
                var.xref = *xref;
            }
        }
        op.transform_expressions(
            &mut |expr, _| match expr {
                Expression::ReadVariable(xref) => Expression::ReadVariable(renumbered.get(&xref).copied().unwrap_or(xref)),
                Expression::Callback(xref) => Expression::Callback(duplicates.get(&xref).copied().unwrap_or(xref)),
                other => other,
            },
            ir::VisitorContextFlag::IN_CHILD_OPERATION,
        );
    }
    (callback.enclosing_params.clone(), callback.params.clone(), ops)
}
