// TypeCheck Context Implementation
//
// Registers the components of a program, generates their type-check blocks
// and maps the diagnostics of the checked code back onto templates.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use indexmap::IndexMap;
use log::debug;
use ng_template_compiler::directive_matching::{CssSelector, SelectorMatcher};
use ng_template_compiler::render3::r3_ast::{HostElement, R3Node};
use ng_template_compiler::render3::view::{R3BoundTarget, R3TargetBinder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::super::api::{
    ComponentClass, HostDiagnostic, HostTypeChecker, PipeMeta, SchemaMetadata, TcbGenericContextBehavior,
    TypeCheckBlockMetadata, TypeCheckableDirectiveMeta, TypeCheckingConfig,
};
use super::diagnostics::{make_template_diagnostic, DiagnosticCategory, DiagnosticCode, TemplateDiagnostic};
use super::dom::{DomSchemaChecker, RegistryDomSchemaChecker};
use super::environment::Environment;
use super::error::TcbResult;
use super::host_bindings::{create_host_element, HostBindingsMeta};
use super::oob::OutOfBandDiagnosticRecorder;
use super::tcb_util::{find_source_location, source_of_offset};
use super::type_check_block::generate_type_check_block;

/// Everything needed to generate the type-check block of one component.
pub struct ComponentRegistration {
    pub component: ComponentClass,
    pub bound_target: R3BoundTarget<TypeCheckableDirectiveMeta>,
    pub host: Option<HostElement>,
    pub pipes: IndexMap<String, PipeMeta>,
    pub schemas: Vec<SchemaMetadata>,
    pub is_standalone: bool,
    pub preserve_whitespaces: bool,
    pub generic_context_behavior: TcbGenericContextBehavior,
}

impl ComponentRegistration {
    pub fn new(component: ComponentClass, bound_target: R3BoundTarget<TypeCheckableDirectiveMeta>) -> Self {
        Self {
            component,
            bound_target,
            host: None,
            pipes: IndexMap::new(),
            schemas: Vec::new(),
            is_standalone: true,
            preserve_whitespaces: false,
            generic_context_behavior: TcbGenericContextBehavior::default(),
        }
    }
}

/// Matches `directives` against `template`. Directives without a selector
/// only apply as host directives of others.
pub fn bind_template(
    directives: Vec<TypeCheckableDirectiveMeta>,
    template: Vec<R3Node>,
) -> TcbResult<R3BoundTarget<TypeCheckableDirectiveMeta>> {
    let mut matcher = SelectorMatcher::new();
    for directive in directives {
        let Some(selector) = directive.selector.clone() else {
            continue;
        };
        matcher.add_selectables(CssSelector::parse(&selector)?, Arc::new(directive));
    }
    Ok(R3TargetBinder::new(matcher).bind(template))
}

/// A component as described in JSON: its class, template AST, the
/// directives and pipes in scope, and its host bindings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentDescription {
    pub component: ComponentClass,
    pub template: Vec<R3Node>,
    pub directives: Vec<TypeCheckableDirectiveMeta>,
    pub pipes: Vec<PipeMeta>,
    pub schemas: Vec<SchemaMetadata>,
    pub host: Option<HostBindingsMeta>,
    pub is_standalone: Option<bool>,
    pub preserve_whitespaces: bool,
    pub generic_context_behavior: TcbGenericContextBehavior,
    /// Declared members of the component class, for [`super::checker::MemberChecker`].
    pub members: Option<Vec<String>>,
}

impl ComponentDescription {
    pub fn into_registration(self) -> TcbResult<ComponentRegistration> {
        let host = match &self.host {
            Some(host) => create_host_element(host)?,
            None => None,
        };
        let mut registration = ComponentRegistration::new(self.component, bind_template(self.directives, self.template)?);
        registration.host = host;
        registration.pipes = self.pipes.into_iter().map(|pipe| (pipe.name.clone(), pipe)).collect();
        registration.schemas = self.schemas;
        registration.is_standalone = self.is_standalone.unwrap_or(true);
        registration.preserve_whitespaces = self.preserve_whitespaces;
        registration.generic_context_behavior = self.generic_context_behavior;
        Ok(registration)
    }
}

/// The type-check block of one component, ready for the host checker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTcb {
    pub id: String,
    pub component: String,
    /// Imports, type constructors and the TCB function.
    pub source: String,
    /// Out-of-band and DOM schema diagnostics found while generating.
    pub diagnostics: Vec<TemplateDiagnostic>,
}

pub struct TypeCheckingContext {
    config: TypeCheckingConfig,
    components: Vec<(String, ComponentRegistration)>,
}

impl TypeCheckingContext {
    pub fn new(config: TypeCheckingConfig) -> Self {
        Self { config, components: Vec::new() }
    }

    pub fn config(&self) -> &TypeCheckingConfig {
        &self.config
    }

    /// Returns the template id assigned to the component.
    pub fn add_component(&mut self, registration: ComponentRegistration) -> String {
        let id = format!("tcb{}", self.components.len() + 1);
        debug!("registered {} as {}", registration.component.name, id);
        self.components.push((id.clone(), registration));
        id
    }

    /// Generates every registered component in parallel. Results keep
    /// registration order.
    pub fn generate(&self) -> Result<Vec<GeneratedTcb>> {
        self.components
            .par_iter()
            .map(|(id, registration)| {
                generate_component(self.config, id, registration).with_context(|| {
                    format!("failed to generate the type-check block of {}", registration.component.name)
                })
            })
            .collect()
    }

    /// Generates, runs `checker` over every block and returns all diagnostics,
    /// component by component.
    pub fn check(&self, checker: &dyn HostTypeChecker) -> Result<Vec<TemplateDiagnostic>> {
        let mut out = Vec::new();
        for tcb in self.generate()? {
            let host_diagnostics = checker.check(&tcb.component, &tcb.source);
            out.extend(translate_diagnostics(&tcb, &host_diagnostics));
        }
        Ok(out)
    }
}

fn generate_component(
    config: TypeCheckingConfig,
    id: &str,
    registration: &ComponentRegistration,
) -> Result<GeneratedTcb> {
    let mut env = Environment::new(config);
    let mut dom = RegistryDomSchemaChecker::new(id, registration.is_standalone);
    let mut oob = OutOfBandDiagnosticRecorder::new(id);
    let meta = TypeCheckBlockMetadata {
        id: id.to_string(),
        bound_target: &registration.bound_target,
        host: registration.host.as_ref(),
        pipes: &registration.pipes,
        schemas: &registration.schemas,
        is_standalone: registration.is_standalone,
        preserve_whitespaces: registration.preserve_whitespaces,
        generic_context_behavior: registration.generic_context_behavior,
    };
    let function =
        generate_type_check_block(&mut env, &registration.component, &format!("_{}", id), &meta, &mut dom, &mut oob)?;

    let mut sections = env.import_statements();
    sections.extend(env.type_ctor_statements().iter().cloned());
    sections.push(function);

    let mut diagnostics = oob.into_diagnostics();
    diagnostics.extend(dom.diagnostics().iter().cloned());
    Ok(GeneratedTcb {
        id: id.to_string(),
        component: registration.component.name.clone(),
        source: sections.join("\n"),
        diagnostics,
    })
}

/// Maps diagnostics of the checked code onto the template and host binding
/// sources and merges them with the diagnostics found while generating.
/// Template diagnostics come before host binding diagnostics.
pub fn translate_diagnostics(tcb: &GeneratedTcb, host_diagnostics: &[HostDiagnostic]) -> Vec<TemplateDiagnostic> {
    let mut out = tcb.diagnostics.clone();
    for diagnostic in host_diagnostics {
        let Some(span) = find_source_location(&tcb.source, diagnostic.start) else {
            debug!("{}: dropping TS{} at {} with no template location", tcb.id, diagnostic.code, diagnostic.start);
            continue;
        };
        out.push(make_template_diagnostic(
            &tcb.id,
            source_of_offset(&tcb.source, diagnostic.start),
            span,
            DiagnosticCategory::Error,
            DiagnosticCode::TypeScript(diagnostic.code),
            diagnostic.message.clone(),
        ));
    }
    out.sort_by_key(|diagnostic| diagnostic.source);
    out
}
