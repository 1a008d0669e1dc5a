//! Host bindings and listeners in the host section of a type-check block.

mod util;

use ng_template_compiler_cli::ngtsc::typecheck::api::TypeCheckingConfig;
use ng_template_compiler_cli::ngtsc::typecheck::src::{
    create_host_element, ComponentDescription, DiagnosticSource, HostBindingsMeta, MemberChecker, TcbError,
    TypeCheckingContext,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use util::{count, generate, registration};

fn host_meta(value: serde_json::Value) -> HostBindingsMeta {
    serde_json::from_value(value).expect("host metadata should deserialize")
}

#[test]
fn should_check_host_bindings_in_their_own_section() {
    let meta = host_meta(json!({
        "tagNames": ["my-cmp"],
        "literal": [
            { "key": "[attr.aria-label]", "value": "label", "keyStart": 10, "valueStart": 30 },
            { "key": "(click)", "value": "onClick($event)", "keyStart": 40, "valueStart": 51 },
        ],
    }));
    let mut registration = registration(Vec::new(), Vec::new());
    registration.host = create_host_element(&meta).unwrap();

    let source = generate(registration).source;
    assert_eq!(count(&source, "if (/*host*/ true) {"), 1, "{}", source);
    let host = &source[source.find("/*host*/").unwrap()..];
    assert!(host.contains("((this).label /*30,35*/)"), "{}", source);
    assert!(host.contains("document.createElement(\"my-cmp\")"), "{}", source);
    assert!(host.contains("\"click\", ($event /*T:EP*/): any => {"), "{}", source);
}

#[test]
fn should_listen_on_global_targets() {
    let meta = host_meta(json!({
        "literal": [{ "key": "(window:resize)", "value": "onResize()", "keyStart": 0, "valueStart": 20 }],
    }));
    let mut registration = registration(Vec::new(), Vec::new());
    registration.host = create_host_element(&meta).unwrap();

    let source = generate(registration).source;
    assert!(source.contains("window.addEventListener"), "{}", source);
    assert!(!source.contains("document.createElement"), "{}", source);
}

#[test]
fn should_bind_decorated_members() {
    let meta = host_meta(json!({
        "tagNames": ["div"],
        "hostBindings": [{ "memberName": "active", "memberStart": 20, "argument": "class.active" }],
        "hostListeners": [{ "memberName": "onFocus", "memberStart": 60, "event": "focus", "args": [] }],
    }));
    let mut registration = registration(Vec::new(), Vec::new());
    registration.host = create_host_element(&meta).unwrap();

    let source = generate(registration).source;
    assert!(source.contains("((this).active /*20,26*/)"), "{}", source);
    assert!(source.contains("(this).onFocus"), "{}", source);
}

#[test]
fn should_type_host_events_as_any_in_basic_mode() {
    let meta = host_meta(json!({
        "tagNames": ["div"],
        "literal": [{ "key": "(click)", "value": "go()", "keyStart": 0, "valueStart": 10 }],
    }));
    let mut registration = registration(Vec::new(), Vec::new());
    registration.host = create_host_element(&meta).unwrap();

    let source = util::generate_with(TypeCheckingConfig::basic(), registration).source;
    assert!(source.contains("($event /*T:EP*/: any): any => {"), "{}", source);
    assert!(!source.contains("addEventListener"), "{}", source);
}

#[test]
fn should_map_host_diagnostics_from_a_component_description() {
    let description: ComponentDescription = serde_json::from_value(json!({
        "component": { "name": "HostCmp" },
        "host": {
            "tagNames": ["div"],
            "literal": [{ "key": "[title]", "value": "heading", "keyStart": 80, "valueStart": 90 }],
        },
        "members": ["title"],
    }))
    .unwrap();
    let checker = MemberChecker::new().with_component("HostCmp", description.members.clone().unwrap_or_default());

    let mut context = TypeCheckingContext::new(TypeCheckingConfig::full());
    let id = context.add_component(description.into_registration().unwrap());
    assert_eq!(id, "tcb1");

    let diagnostics = context.check(&checker).unwrap();
    assert_eq!(diagnostics.len(), 1, "{:#?}", diagnostics);
    assert_eq!(diagnostics[0].source, DiagnosticSource::Host);
    assert_eq!(diagnostics[0].template_id, "tcb1");
    assert_eq!(diagnostics[0].span.start, 90);
    assert_eq!(diagnostics[0].message, "Property 'heading' does not exist on type 'HostCmp'.");
}

#[test]
fn should_reject_malformed_event_names() {
    let description: ComponentDescription = serde_json::from_value(json!({
        "component": { "name": "HostCmp" },
        "host": { "literal": [{ "key": "(:click)", "value": "go()", "keyStart": 0, "valueStart": 10 }] },
    }))
    .unwrap();
    match description.into_registration() {
        Err(err) => assert_eq!(err, TcbError::HostBinding("Failed to parse event binding".to_string())),
        Ok(_) => panic!("expected a host binding error"),
    }
}
