// TypeCheck Out-of-Band Diagnostics
//
// Problems found while generating a type-check block rather than by type
// checking it.

use ng_template_compiler::expression_parser::AbsoluteSourceSpan;
use ng_template_compiler::parse_util::ParseSourceSpan;
use ng_template_compiler::render3::r3_ast::{DeferredTrigger, LetDeclaration, Reference, Variable};

use crate::ngtsc::diagnostics::ErrorCode;

use super::diagnostics::{
    make_template_diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticSource, TemplateDiagnostic,
};

#[derive(Debug, Clone)]
pub struct OutOfBandDiagnosticRecorder {
    template_id: String,
    source: DiagnosticSource,
    diagnostics: Vec<TemplateDiagnostic>,
}

impl OutOfBandDiagnosticRecorder {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self { template_id: template_id.into(), source: DiagnosticSource::Template, diagnostics: Vec::new() }
    }

    /// Spans recorded from now on point into `source`.
    pub fn set_source(&mut self, source: DiagnosticSource) {
        self.source = source;
    }

    pub fn diagnostics(&self) -> &[TemplateDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<TemplateDiagnostic> {
        self.diagnostics
    }

    fn record(&mut self, code: ErrorCode, span: AbsoluteSourceSpan, message: String) {
        log::debug!("{}: out-of-band {} at {}..{}", self.template_id, code, span.start, span.end);
        self.diagnostics.push(make_template_diagnostic(
            &self.template_id,
            self.source,
            span,
            DiagnosticCategory::Error,
            DiagnosticCode::Angular(code),
            message,
        ));
    }

    pub fn missing_reference_target(&mut self, reference: &Reference) {
        let span = reference.value_span.as_ref().unwrap_or(&reference.source_span).to_absolute();
        self.record(
            ErrorCode::MissingReferenceTarget,
            span,
            format!("No directive found with exportAs '{}'.", reference.value),
        );
    }

    pub fn missing_pipe(&mut self, name: &str, span: AbsoluteSourceSpan) {
        self.record(ErrorCode::MissingPipe, span, format!("No pipe found with name '{}'.", name));
    }

    pub fn deferred_pipe_used_eagerly(&mut self, name: &str, span: AbsoluteSourceSpan) {
        self.record(
            ErrorCode::DeferredPipeUsedEagerly,
            span,
            format!(
                "Pipe '{}' was imported via `@Component.deferredImports`, but was used outside of a `@defer` block in a template. To fix this, either use the '{}' pipe inside of a `@defer` block or import this dependency using the `@Component.imports` field.",
                name, name
            ),
        );
    }

    pub fn deferred_component_used_eagerly(&mut self, element: &str, span: &ParseSourceSpan) {
        self.record(
            ErrorCode::DeferredDirectiveUsedEagerly,
            span.to_absolute(),
            format!(
                "Element '{}' contains a component or a directive that was imported via `@Component.deferredImports`, but the element itself is located outside of a `@defer` block in a template. To fix this, either use the '{}' element inside of a `@defer` block or import referenced component/directive dependency using the `@Component.imports` field.",
                element, element
            ),
        );
    }

    pub fn illegal_assignment_to_template_var(&mut self, name: &str, span: AbsoluteSourceSpan) {
        self.record(
            ErrorCode::WriteToReadOnlyVariable,
            span,
            format!(
                "Cannot use variable '{}' as the left-hand side of an assignment expression. Template variables are read-only.",
                name
            ),
        );
    }

    pub fn duplicate_template_var(&mut self, variable: &Variable) {
        self.record(
            ErrorCode::DuplicateVariableDeclaration,
            variable.source_span.to_absolute(),
            format!(
                "Cannot redeclare variable '{}' as it was previously declared elsewhere for the same template.",
                variable.name
            ),
        );
    }

    pub fn split_two_way_binding(&mut self, name: &str, span: &ParseSourceSpan) {
        self.record(
            ErrorCode::SplitTwoWayBinding,
            span.to_absolute(),
            format!(
                "The property and event halves of the two-way binding '{}' are not bound to the same target.",
                name
            ),
        );
    }

    pub fn missing_required_inputs(
        &mut self,
        span: &ParseSourceSpan,
        directive: &str,
        is_component: bool,
        input_names: &[String],
    ) {
        let plural = if input_names.len() == 1 { "" } else { "s" };
        let names: Vec<String> = input_names.iter().map(|name| format!("'{}'", name)).collect();
        let kind = if is_component { "component" } else { "directive" };
        self.record(
            ErrorCode::MissingRequiredInputs,
            span.to_absolute(),
            format!("Required input{} {} from {} {} must be specified.", plural, names.join(", "), kind, directive),
        );
    }

    pub fn illegal_for_loop_track_access(&mut self, name: &str, span: AbsoluteSourceSpan, item: &str, index: &str) {
        self.record(
            ErrorCode::IllegalForLoopTrackAccess,
            span,
            format!(
                "Cannot access '{}' inside of a track expression. Only '{}', '{}' and properties on the containing component are available to this expression.",
                name, item, index
            ),
        );
    }

    pub fn inaccessible_deferred_trigger_element(&mut self, trigger: &DeferredTrigger) {
        let message = match trigger.reference() {
            None => "Trigger cannot find reference. Make sure that the @defer block has a @placeholder with at least one root element node.".to_string(),
            Some(reference) => format!(
                "Trigger cannot find reference \"{}\".\nCheck that an element with #{} exists in the same template and it's accessible from the @defer block.\nDeferred blocks can only access triggers in same view, a parent embedded view or the root view of the @placeholder block.",
                reference, reference
            ),
        };
        self.record(ErrorCode::InaccessibleDeferredTriggerElement, trigger.source_span().to_absolute(), message);
    }

    pub fn let_used_before_definition(&mut self, name: &str, span: AbsoluteSourceSpan) {
        self.record(
            ErrorCode::LetUsedBeforeDefinition,
            span,
            format!("Cannot read @let declaration '{}' before it has been defined.", name),
        );
    }

    pub fn conflicting_declaration(&mut self, decl: &LetDeclaration) {
        self.record(
            ErrorCode::ConflictingLetDeclaration,
            decl.source_span.to_absolute(),
            format!(
                "Cannot declare @let called '{}' as there is another symbol in the template with the same name.",
                decl.name
            ),
        );
    }

    pub fn illegal_write_to_let_declaration(&mut self, name: &str, span: AbsoluteSourceSpan) {
        self.record(
            ErrorCode::IllegalLetWrite,
            span,
            format!("Cannot assign to @let declaration '{}'.", name),
        );
    }
}
