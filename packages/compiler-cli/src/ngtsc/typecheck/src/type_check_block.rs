// TypeCheck Block Generation
//
// Generates the type-check block (TCB) of a component: one function whose
// body mirrors the template, so that checking the function checks the
// template.

use log::debug;

use super::super::api::{ComponentClass, TcbGenericContextBehavior, TypeCheckBlockMetadata};
use super::comments::HOST_BINDINGS_MARKER;
use super::diagnostics::DiagnosticSource;
use super::dom::DomSchemaChecker;
use super::environment::Environment;
use super::error::TcbResult;
use super::oob::OutOfBandDiagnosticRecorder;
use super::scope::{block, ScopedNode, TcbContext};

/// Emits
///
/// ```text
/// function NAME<T>(this: Cmp<T>) {
///   if (true) { ...template... }
///   if (/*host*/ true) { ...host bindings... }
/// }
/// ```
///
/// Problems with the template are recorded on `oob` and `dom`; an `Err` means
/// the block could not be generated at all.
pub fn generate_type_check_block(
    env: &mut Environment,
    component: &ComponentClass,
    name: &str,
    meta: &TypeCheckBlockMetadata<'_>,
    dom: &mut dyn DomSchemaChecker,
    oob: &mut OutOfBandDiagnosticRecorder,
) -> TcbResult<String> {
    debug!("generating type-check block {} for {}", name, component.name);
    let behavior = if env.config.use_context_generic_type {
        meta.generic_context_behavior
    } else {
        TcbGenericContextBehavior::FallbackToAny
    };
    let (type_params, this_type) = signature(component, behavior);

    let mut tcb = TcbContext::new(env, meta, dom, oob);
    let mut sections = Vec::with_capacity(2);

    tcb.oob.set_source(DiagnosticSource::Template);
    let template_scope = tcb.scope_for_nodes(None, None, &meta.bound_target.template, None)?;
    let statements = tcb.render(template_scope)?;
    sections.push(format!("if (true) {}", block(&with_prelude(tcb.env, statements))));

    if let Some(host) = meta.host {
        tcb.oob.set_source(DiagnosticSource::Host);
        let host_scope = tcb.scope_for_nodes(None, Some(ScopedNode::Host(host)), &[], None)?;
        let statements = tcb.render(host_scope)?;
        sections.push(format!("if (/*{}*/ true) {}", HOST_BINDINGS_MARKER, block(&with_prelude(tcb.env, statements))));
        tcb.oob.set_source(DiagnosticSource::Template);
    }

    Ok(format!("function {}{}(this: {}) {}", name, type_params, this_type, block(&sections)))
}

/// Pipe instances come first so every section can refer to them.
fn with_prelude(env: &Environment, statements: Vec<String>) -> Vec<String> {
    let mut out = env.pipe_statements().to_vec();
    out.extend(statements);
    out
}

/// The type parameter list of the TCB function and the type of `this`.
fn signature(component: &ComponentClass, behavior: TcbGenericContextBehavior) -> (String, String) {
    if component.type_parameters.is_empty() {
        return (String::new(), component.name.clone());
    }
    let names: Vec<&str> = component.type_parameters.iter().map(|param| param.name.as_str()).collect();
    let this_type = format!("{}<{}>", component.name, names.join(", "));
    match behavior {
        TcbGenericContextBehavior::UseEmitter => {
            let decls: Vec<String> = component.type_parameters.iter().map(|param| param.declaration()).collect();
            (format!("<{}>", decls.join(", ")), this_type)
        }
        TcbGenericContextBehavior::CopyClassNodes => match &component.type_parameter_source {
            Some(source) => (format!("<{}>", source), this_type),
            None => signature(component, TcbGenericContextBehavior::UseEmitter),
        },
        TcbGenericContextBehavior::FallbackToAny => {
            let any: Vec<&str> = names.iter().map(|_| "any").collect();
            (String::new(), format!("{}<{}>", component.name, any.join(", ")))
        }
    }
}
