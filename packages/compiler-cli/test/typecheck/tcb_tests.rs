//! Shapes of generated type-check blocks.

mod util;

use ng_template_compiler::render3::builder::TemplateBuilder;
use ng_template_compiler_cli::ngtsc::typecheck::api::{
    InputMapping, PipeMeta, TcbGenericContextBehavior, TemplateGuardKind, TemplateGuardMeta, TypeCheckableDirectiveMeta,
    TypeCheckingConfig, TypeParameter,
};
use pretty_assertions::assert_eq;

use util::{count, generate, generate_with, registration, tcb};

#[test]
fn should_wrap_the_template_in_a_function_over_the_component() {
    let t = TemplateBuilder::new("{{ name }}");
    let source = tcb(vec![t.bound_text("{{ name }}")]);
    assert!(source.starts_with("function _tcb1(this: TestCmp) {"), "{}", source);
    assert!(source.contains("if (true) {"));
    assert!(!source.contains("/*host*/"));
}

#[test]
fn should_check_interpolations_as_string_concatenation() {
    let t = TemplateBuilder::new("<div>{{ name }}</div>");
    let source = tcb(vec![t.element("div").child(t.bound_text("{{ name }}")).build()]);
    assert!(source.contains("\"\" + (((this).name"), "{}", source);
}

#[test]
fn should_chain_else_if_branches() {
    let t = TemplateBuilder::new("@if (a) {<span></span>} @else if (b) {<em></em>} @else {<p></p>}");
    let node = t
        .if_block()
        .branch("a", vec![t.element("span").build()])
        .else_if("b", vec![t.element("em").build()])
        .else_branch(vec![t.element("p").build()])
        .build();
    let source = tcb(vec![node]);
    assert!(source.contains("if (((this).a"), "{}", source);
    assert!(source.contains("} else if (((this).b"), "{}", source);
    assert!(source.contains("} else {"), "{}", source);
}

#[test]
fn should_iterate_for_blocks_with_the_track_expression_last() {
    let t = TemplateBuilder::new("@for (item of items; track item.id) {{{ item.name }}}");
    let node = t.for_block("item", "items", "item.id").body(vec![t.bound_text("{{ item.name }}")]).build();
    let source = tcb(vec![node]);
    assert!(source.contains("for (const _t"), "{}", source);
    assert!(source.contains(" of (((this).items"), "{}", source);
    assert!(source.contains(")!) {"), "{}", source);
    assert!(!source.contains("/*D:ignore*/"), "{}", source);
}

#[test]
fn should_ignore_a_track_expression_reading_loop_context() {
    let t = TemplateBuilder::new("@for (item of items; track $first || $last) {}");
    let source = tcb(vec![t.for_block("item", "items", "$first || $last").build()]);
    assert_eq!(count(&source, "/*D:ignore*/"), 1, "{}", source);
}

#[test]
fn should_emit_an_exhaustiveness_check_for_switch_blocks() {
    let t = TemplateBuilder::new("@switch (kind) { @case ('a') {<p></p>} @default never; }");
    let node = t.switch_block("kind").case("'a'", vec![t.element("p").build()]).exhaustive().build();
    let source = tcb(vec![node]);
    assert!(source.contains("switch (((this).kind"), "{}", source);
    assert!(source.contains("case \"a\""), "{}", source);
    assert!(source.contains("default: const tcbExhaustiveCheck: never = ((this).kind"), "{}", source);
}

#[test]
fn should_not_add_an_exhaustiveness_check_next_to_a_default_case() {
    let t = TemplateBuilder::new("@switch (kind) { @case ('a') {<p></p>} @default {<b></b>} @default never; }");
    let node = t
        .switch_block("kind")
        .case("'a'", vec![t.element("p").build()])
        .default_case(vec![t.element("b").build()])
        .exhaustive()
        .build();
    let source = tcb(vec![node]);
    assert_eq!(count(&source, "default:"), 1, "{}", source);
    assert!(!source.contains("tcbExhaustiveCheck"), "{}", source);
}

#[test]
fn should_negate_earlier_branches_in_later_branch_guards() {
    let t = TemplateBuilder::new(
        r#"@if (a) {<p></p>} @else if (b) {<button (click)="go()"></button>} @else {<button (focus)="go()"></button>}"#,
    );
    let node = t
        .if_block()
        .branch("a", vec![t.element("p").build()])
        .else_if("b", vec![t.element("button").output("click", "go()").build()])
        .else_branch(vec![t.element("button").output("focus", "go()").build()])
        .build();
    let source = tcb(vec![node]);

    let click = source.find("\"click\"").unwrap();
    let focus = source.find("\"focus\"").unwrap();
    let else_if_handler = &source[click..focus];
    assert!(else_if_handler.contains("!(((this).a"), "{}", source);
    assert!(else_if_handler.contains("&& ((this).b"), "{}", source);
    assert!(else_if_handler.contains("/*D:ignore*/"), "{}", source);

    let else_handler = &source[focus..];
    assert!(else_handler.contains("!(((this).a"), "{}", source);
    assert!(else_handler.contains("&& !(((this).b"), "{}", source);
    assert!(else_handler.contains("/*D:ignore*/"), "{}", source);
}

#[test]
fn should_declare_if_aliases_and_narrow_with_them() {
    let t = TemplateBuilder::new(r#"@if (user; as u) {<button (click)="save(u)"></button>}"#);
    let node = t
        .if_block()
        .branch("user", vec![t.element("button").output("click", "save(u)").build()])
        .alias("u")
        .build();
    let source = tcb(vec![node]);

    let declaration = source.find("const _t").expect("alias declaration");
    let alias: String = source[declaration + "const ".len()..].chars().take_while(|c| !c.is_whitespace()).collect();
    let statement = &source[declaration..declaration + source[declaration..].find(';').unwrap()];
    assert!(statement.contains(" = (((this).user"), "{}", source);

    let condition = format!("&& {}", alias);
    let branch = source.find("if ((((this).user").expect("aliased condition");
    assert!(branch > declaration, "{}", source);
    assert!(count(&source, &condition) >= 2, "{}", source);
    let handler = &source[source.find("\"click\"").unwrap()..];
    assert!(handler.contains(&condition), "{}", source);
    assert!(handler.contains("(this).save"), "{}", source);
}

#[test]
fn should_narrow_template_bodies_with_binding_guards() {
    let t = TemplateBuilder::new(r#"<div *ngIf="show">{{ label }}</div>"#);
    let node = t
        .structural("div")
        .template_attr("ngIf", "show")
        .child(t.element("div").child(t.bound_text("{{ label }}")).build())
        .build();

    let mut ng_if = TypeCheckableDirectiveMeta::new("NgIf", "[ngIf]");
    ng_if.inputs = vec![InputMapping::new("ngIf")];
    ng_if.ng_template_guards = vec![TemplateGuardMeta { input_name: "ngIf".to_string(), kind: TemplateGuardKind::Binding }];

    let source = generate(registration(vec![ng_if], vec![node])).source;
    assert!(source.contains("if (((this).show"), "{}", source);
    assert!(source.contains("(this).label"), "{}", source);
}

#[test]
fn should_guard_event_handlers_inside_if_blocks() {
    let t = TemplateBuilder::new(r#"@if (user) {<button (click)="save(user)"></button>}"#);
    let node = t
        .if_block()
        .branch("user", vec![t.element("button").output("click", "save(user)").build()])
        .build();
    let source = tcb(vec![node]);
    assert!(source.contains("\"click\", ($event /*T:EP*/): any => {"), "{}", source);
    assert!(source.contains("if ((((this).user"), "{}", source);
}

#[test]
fn should_declare_each_pipe_instance_once() {
    let t = TemplateBuilder::new("{{ a | date }} {{ b | date }}");
    let nodes = vec![t.bound_text("{{ a | date }}"), t.bound_text("{{ b | date }}")];
    let mut registration = registration(Vec::new(), nodes);
    registration.pipes.insert("date".to_string(), PipeMeta::new("date", "DatePipe"));

    let tcb = generate(registration);
    assert_eq!(count(&tcb.source, "var _pipe1: DatePipe = null!;"), 1, "{}", tcb.source);
    assert_eq!(count(&tcb.source, "_pipe1.transform"), 2, "{}", tcb.source);
    assert!(tcb.diagnostics.is_empty());
}

#[test]
fn should_give_generic_components_type_parameters() {
    let t = TemplateBuilder::new("{{ value }}");
    let mut registration = registration(Vec::new(), vec![t.bound_text("{{ value }}")]);
    let mut param = TypeParameter::new("T");
    param.bound = Some("string".to_string());
    registration.component.type_parameters = vec![param];

    let source = generate(registration).source;
    assert!(source.starts_with("function _tcb1<T extends string>(this: TestCmp<T>) {"), "{}", source);
}

#[test]
fn should_fall_back_to_any_without_context_generics() {
    let t = TemplateBuilder::new("{{ value }}");
    let mut registration = registration(Vec::new(), vec![t.bound_text("{{ value }}")]);
    registration.component.type_parameters = vec![TypeParameter::new("T")];
    registration.generic_context_behavior = TcbGenericContextBehavior::UseEmitter;

    let source = generate_with(TypeCheckingConfig::basic(), registration).source;
    assert!(source.starts_with("function _tcb1(this: TestCmp<any>) {"), "{}", source);
}

#[test]
fn should_skip_template_bodies_in_basic_mode() {
    let t = TemplateBuilder::new(r#"<ng-template>{{ hidden }}</ng-template>"#);
    let node = t.ng_template().child(t.bound_text("{{ hidden }}")).build();
    let source = generate_with(TypeCheckingConfig::basic(), registration(Vec::new(), vec![node])).source;
    assert!(!source.contains("hidden"), "{}", source);
}
