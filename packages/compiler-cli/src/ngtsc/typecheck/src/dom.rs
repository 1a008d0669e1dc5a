// TypeCheck DOM Schema Checks
//
// Element names and property bindings not claimed by any directive are
// checked against the DOM schema.

use ng_template_compiler::parse_util::ParseSourceSpan;
use ng_template_compiler::schema::{SchemaMetadata, DOM_SCHEMA};

use crate::ngtsc::diagnostics::ErrorCode;

use super::diagnostics::{
    make_template_diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticSource, TemplateDiagnostic,
};

/// Receives the elements and DOM property bindings of a template as its
/// type-check block is generated.
pub trait DomSchemaChecker {
    fn check_element(&mut self, tag_name: &str, span: &ParseSourceSpan, schemas: &[SchemaMetadata]);

    fn check_template_element_property(
        &mut self,
        tag_name: &str,
        property: &str,
        span: &ParseSourceSpan,
        schemas: &[SchemaMetadata],
    );

    /// A host binding is valid when any of the candidate host tags has the property.
    fn check_host_element_property(
        &mut self,
        tag_names: &[String],
        property: &str,
        span: &ParseSourceSpan,
        schemas: &[SchemaMetadata],
    );

    fn diagnostics(&self) -> &[TemplateDiagnostic];
}

/// Checks against the built-in DOM schema registry.
pub struct RegistryDomSchemaChecker {
    template_id: String,
    host_is_standalone: bool,
    diagnostics: Vec<TemplateDiagnostic>,
}

impl RegistryDomSchemaChecker {
    pub fn new(template_id: impl Into<String>, host_is_standalone: bool) -> Self {
        Self { template_id: template_id.into(), host_is_standalone, diagnostics: Vec::new() }
    }

    fn schemas_field(&self) -> &'static str {
        if self.host_is_standalone { "'@Component.schemas'" } else { "'@NgModule.schemas'" }
    }

    fn import_hint(&self) -> &'static str {
        if self.host_is_standalone {
            "included in the '@Component.imports' of this component"
        } else {
            "part of this module"
        }
    }

    fn record(&mut self, code: ErrorCode, source: DiagnosticSource, span: &ParseSourceSpan, message: String) {
        self.diagnostics.push(make_template_diagnostic(
            &self.template_id,
            source,
            span.to_absolute(),
            DiagnosticCategory::Error,
            DiagnosticCode::Angular(code),
            message,
        ));
    }
}

impl DomSchemaChecker for RegistryDomSchemaChecker {
    fn check_element(&mut self, tag_name: &str, span: &ParseSourceSpan, schemas: &[SchemaMetadata]) {
        if DOM_SCHEMA.has_element(tag_name, schemas) {
            return;
        }
        let schemas_field = self.schemas_field();
        let mut message = format!(
            "'{}' is not a known element:\n1. If '{}' is an Angular component, then verify that it is {}.\n",
            tag_name,
            tag_name,
            self.import_hint()
        );
        if tag_name.contains('-') {
            message.push_str(&format!(
                "2. If '{}' is a Web Component then add 'CUSTOM_ELEMENTS_SCHEMA' to the {} of this component to suppress this message.",
                tag_name, schemas_field
            ));
        } else {
            message.push_str(&format!(
                "2. To allow any element add 'NO_ERRORS_SCHEMA' to the {} of this component.",
                schemas_field
            ));
        }
        self.record(ErrorCode::SchemaInvalidElement, DiagnosticSource::Template, span, message);
    }

    fn check_template_element_property(
        &mut self,
        tag_name: &str,
        property: &str,
        span: &ParseSourceSpan,
        schemas: &[SchemaMetadata],
    ) {
        if DOM_SCHEMA.has_property(tag_name, property, schemas) {
            return;
        }
        let schemas_field = self.schemas_field();
        let mut message = format!("Can't bind to '{}' since it isn't a known property of '{}'.", property, tag_name);
        if tag_name.starts_with("ng-") {
            message.push_str(&format!(
                "\n1. If '{}' is an Angular directive, then add 'CommonModule' to the '@NgModule.imports' of this component.\n2. To allow any property add 'NO_ERRORS_SCHEMA' to the {} of this component.",
                property, schemas_field
            ));
        } else if tag_name.contains('-') {
            message.push_str(&format!(
                "\n1. If '{}' is an Angular component and it has '{}' input, then verify that it is {}.\n2. If '{}' is a Web Component then add 'CUSTOM_ELEMENTS_SCHEMA' to the {} of this component to suppress this message.\n3. To allow any property add 'NO_ERRORS_SCHEMA' to the {} of this component.",
                tag_name,
                property,
                self.import_hint(),
                tag_name,
                schemas_field,
                schemas_field
            ));
        }
        self.record(ErrorCode::SchemaInvalidAttribute, DiagnosticSource::Template, span, message);
    }

    fn check_host_element_property(
        &mut self,
        tag_names: &[String],
        property: &str,
        span: &ParseSourceSpan,
        schemas: &[SchemaMetadata],
    ) {
        if tag_names.iter().any(|tag| DOM_SCHEMA.has_property(tag, property, schemas)) {
            return;
        }
        let Some(tag_name) = tag_names.first() else {
            return;
        };
        let message = format!("Can't bind to '{}' since it isn't a known property of '{}'.", property, tag_name);
        self.record(ErrorCode::SchemaInvalidAttribute, DiagnosticSource::Host, span, message);
    }

    fn diagnostics(&self) -> &[TemplateDiagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_report_unknown_elements() {
        let mut checker = RegistryDomSchemaChecker::new("tcb1", true);
        let span = ParseSourceSpan::new(0, 8);
        checker.check_element("div", &span, &[]);
        checker.check_element("my-cmp", &span, &[]);

        assert_eq!(checker.diagnostics().len(), 1);
        assert_eq!(
            checker.diagnostics()[0].message,
            "'my-cmp' is not a known element:\n1. If 'my-cmp' is an Angular component, then verify that it is included in the '@Component.imports' of this component.\n2. If 'my-cmp' is a Web Component then add 'CUSTOM_ELEMENTS_SCHEMA' to the '@Component.schemas' of this component to suppress this message."
        );
    }

    #[test]
    fn should_report_unknown_properties() {
        let mut checker = RegistryDomSchemaChecker::new("tcb1", false);
        let span = ParseSourceSpan::new(5, 12);
        checker.check_template_element_property("div", "title", &span, &[]);
        checker.check_template_element_property("div", "foo", &span, &[]);

        let diagnostics = checker.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Can't bind to 'foo' since it isn't a known property of 'div'.");
        assert_eq!(diagnostics[0].code, DiagnosticCode::Angular(ErrorCode::SchemaInvalidAttribute));
    }

    #[test]
    fn should_accept_host_properties_known_to_any_tag() {
        let mut checker = RegistryDomSchemaChecker::new("tcb1", true);
        let span = ParseSourceSpan::new(0, 3);
        let tags = vec!["div".to_string(), "input".to_string()];
        checker.check_host_element_property(&tags, "value", &span, &[]);
        checker.check_host_element_property(&tags, "nope", &span, &[]);

        assert_eq!(checker.diagnostics().len(), 1);
        assert_eq!(checker.diagnostics()[0].source, DiagnosticSource::Host);
    }
}
