//! Out-of-band diagnostics and the mapping of checker diagnostics back onto
//! templates.

mod util;

use ng_template_compiler::expression_parser::AbsoluteSourceSpan;
use ng_template_compiler::render3::builder::TemplateBuilder;
use ng_template_compiler_cli::ngtsc::diagnostics::ErrorCode;
use ng_template_compiler_cli::ngtsc::typecheck::api::{HostTypeChecker, SchemaMetadata, TypeCheckingConfig};
use ng_template_compiler_cli::ngtsc::typecheck::src::{
    create_host_element, translate_diagnostics, DiagnosticCode, DiagnosticSource, HostBindingsMeta, MemberChecker,
    TemplateDiagnostic, TypeCheckingContext,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use util::{generate, registration, COMPONENT};

fn codes(diagnostics: &[TemplateDiagnostic]) -> Vec<DiagnosticCode> {
    diagnostics.iter().map(|diagnostic| diagnostic.code).collect()
}

#[test]
fn should_report_a_single_illegal_track_access() {
    let source = "@for (item of items; track $first || $last) {}";
    let t = TemplateBuilder::new(source);
    let generated = generate(registration(Vec::new(), vec![t.for_block("item", "items", "$first || $last").build()]));

    assert_eq!(codes(&generated.diagnostics), vec![DiagnosticCode::Angular(ErrorCode::IllegalForLoopTrackAccess)]);
    let start = source.find("$first").unwrap();
    assert_eq!(generated.diagnostics[0].span, AbsoluteSourceSpan::new(start, start + "$first".len()));
}

#[test]
fn should_report_missing_pipes() {
    let t = TemplateBuilder::new("{{ when | date }}");
    let generated = generate(registration(Vec::new(), vec![t.bound_text("{{ when | date }}")]));
    assert_eq!(codes(&generated.diagnostics), vec![DiagnosticCode::Angular(ErrorCode::MissingPipe)]);
    assert!(generated.source.contains("(0 as any).transform"), "{}", generated.source);
}

#[test]
fn should_report_references_to_unknown_exports() {
    let t = TemplateBuilder::new(r#"<div #ref="missingDir"></div>"#);
    let generated = generate(registration(Vec::new(), vec![t.element("div").reference("ref", "missingDir").build()]));
    assert_eq!(codes(&generated.diagnostics), vec![DiagnosticCode::Angular(ErrorCode::MissingReferenceTarget)]);
}

#[test]
fn should_report_let_declarations_read_before_definition() {
    let t = TemplateBuilder::new("{{ total }} @let total = 1;");
    let nodes = vec![t.bound_text("{{ total }}"), t.let_declaration("total", "1")];
    let generated = generate(registration(Vec::new(), nodes));
    assert_eq!(codes(&generated.diagnostics), vec![DiagnosticCode::Angular(ErrorCode::LetUsedBeforeDefinition)]);
}

#[test]
fn should_report_unknown_elements_unless_custom_elements_are_allowed() {
    let source = "<my-widget></my-widget>";
    let t = TemplateBuilder::new(source);
    let generated = generate(registration(Vec::new(), vec![t.element("my-widget").build()]));
    assert_eq!(codes(&generated.diagnostics), vec![DiagnosticCode::Angular(ErrorCode::SchemaInvalidElement)]);
    assert_eq!(generated.diagnostics[0].span, AbsoluteSourceSpan::new(0, "<my-widget>".len()));
    assert!(generated.diagnostics[0].message.contains("CUSTOM_ELEMENTS_SCHEMA"));

    let t = TemplateBuilder::new(source);
    let mut registration = registration(Vec::new(), vec![t.element("my-widget").build()]);
    registration.schemas = vec![SchemaMetadata::CustomElementsSchema];
    assert!(generate(registration).diagnostics.is_empty());
}

#[test]
fn should_map_checker_diagnostics_onto_else_if_conditions() {
    let source = "@if (a) {<span></span>} @else if (b) {<em></em>}";
    let t = TemplateBuilder::new(source);
    let node = t
        .if_block()
        .branch("a", vec![t.element("span").build()])
        .else_if("b", vec![t.element("em").build()])
        .build();
    let generated = generate(registration(Vec::new(), vec![node]));

    let checker = MemberChecker::new().with_component(COMPONENT, ["a"]);
    let diagnostics = translate_diagnostics(&generated, &checker.check(COMPONENT, &generated.source));

    assert_eq!(diagnostics.len(), 1, "{:#?}", diagnostics);
    let start = source.find("(b)").unwrap() + 1;
    assert_eq!(diagnostics[0].code, DiagnosticCode::TypeScript(2339));
    assert_eq!(diagnostics[0].span, AbsoluteSourceSpan::new(start, start + 1));
    assert_eq!(diagnostics[0].source, DiagnosticSource::Template);
    assert_eq!(diagnostics[0].message, "Property 'b' does not exist on type 'TestCmp'.");
}

#[test]
fn should_not_repeat_diagnostics_through_event_handler_guards() {
    let source = r#"@if (user) {<button (click)="save()"></button>}"#;
    let t = TemplateBuilder::new(source);
    let node = t
        .if_block()
        .branch("user", vec![t.element("button").output("click", "save()").build()])
        .build();
    let generated = generate(registration(Vec::new(), vec![node]));

    let checker = MemberChecker::new().with_component(COMPONENT, ["save"]);
    let diagnostics = translate_diagnostics(&generated, &checker.check(COMPONENT, &generated.source));
    assert_eq!(diagnostics.len(), 1, "{:#?}", diagnostics);
    let start = source.find("user").unwrap();
    assert_eq!(diagnostics[0].span, AbsoluteSourceSpan::new(start, start + "user".len()));
}

#[test]
fn should_put_host_diagnostics_after_template_diagnostics() {
    let t = TemplateBuilder::new("{{ missing }}");
    let mut registration = registration(Vec::new(), vec![t.bound_text("{{ missing }}")]);
    let host: HostBindingsMeta = serde_json::from_value(json!({
        "tagNames": ["div"],
        "literal": [{ "key": "[title]", "value": "hostMissing", "keyStart": 120, "valueStart": 131 }],
    }))
    .unwrap();
    registration.host = create_host_element(&host).unwrap();
    assert!(registration.host.is_some());

    let mut context = TypeCheckingContext::new(TypeCheckingConfig::full());
    context.add_component(registration);
    let checker = MemberChecker::new().with_component(COMPONENT, Vec::<String>::new());
    let diagnostics = context.check(&checker).unwrap();

    let sources: Vec<DiagnosticSource> = diagnostics.iter().map(|diagnostic| diagnostic.source).collect();
    assert_eq!(sources, vec![DiagnosticSource::Template, DiagnosticSource::Host]);
    assert_eq!(diagnostics[1].span, AbsoluteSourceSpan::new(131, 131 + "hostMissing".len()));
    assert_eq!(diagnostics[0].message, "Property 'missing' does not exist on type 'TestCmp'.");
}

#[test]
fn should_map_host_diagnostics_inside_binary_expressions() {
    let t = TemplateBuilder::new("{{ missing }}");
    let mut registration = registration(Vec::new(), vec![t.bound_text("{{ missing }}")]);
    let host: HostBindingsMeta = serde_json::from_value(json!({
        "tagNames": ["div"],
        "literal": [{ "key": "[attr.id]", "value": "exists + doesNotExist", "keyStart": 200, "valueStart": 211 }],
    }))
    .unwrap();
    registration.host = create_host_element(&host).unwrap();

    let mut context = TypeCheckingContext::new(TypeCheckingConfig::full());
    context.add_component(registration);
    let checker = MemberChecker::new().with_component(COMPONENT, ["exists"]);
    let diagnostics = context.check(&checker).unwrap();

    assert_eq!(diagnostics.len(), 2, "{:#?}", diagnostics);
    assert_eq!(diagnostics[0].source, DiagnosticSource::Template);
    assert_eq!(diagnostics[1].source, DiagnosticSource::Host);
    let start = 211 + "exists + ".len();
    assert_eq!(diagnostics[1].span, AbsoluteSourceSpan::new(start, start + "doesNotExist".len()));
    assert_eq!(diagnostics[1].message, "Property 'doesNotExist' does not exist on type 'TestCmp'.");
}

#[test]
fn should_serialize_diagnostic_codes_in_printed_form() {
    let t = TemplateBuilder::new("{{ when | date }}");
    let generated = generate(registration(Vec::new(), vec![t.bound_text("{{ when | date }}")]));
    let value = serde_json::to_value(&generated.diagnostics[0]).unwrap();
    assert_eq!(value["code"], json!(DiagnosticCode::Angular(ErrorCode::MissingPipe).to_string()));
    assert_eq!(value["source"], json!("template"));
}
