//! Binding Tests
//!
//! Directive matching, reference resolution, pipe usage and `@defer` trigger
//! targets computed by the template binder.

use std::sync::Arc;

use ng_template_compiler::directive_matching::{CssSelector, SelectorMatcher};
use ng_template_compiler::render3::builder::TemplateBuilder;
use ng_template_compiler::render3::r3_ast::{self as t, R3Node};
use ng_template_compiler::render3::view::{DirectiveMeta, NodeKey, R3BoundTarget, R3TargetBinder, ReferenceTarget};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct TestDirectiveMeta {
    name: String,
    selector: String,
    export_as: Vec<String>,
    is_component: bool,
    host_directives: Vec<Arc<TestDirectiveMeta>>,
}

impl TestDirectiveMeta {
    fn new(name: &str, selector: &str) -> Self {
        TestDirectiveMeta {
            name: name.to_string(),
            selector: selector.to_string(),
            export_as: Vec::new(),
            is_component: false,
            host_directives: Vec::new(),
        }
    }

    fn export_as(mut self, name: &str) -> Self {
        self.export_as.push(name.to_string());
        self
    }

    fn component(mut self) -> Self {
        self.is_component = true;
        self
    }

    fn host_directive(mut self, directive: TestDirectiveMeta) -> Self {
        self.host_directives.push(Arc::new(directive));
        self
    }
}

impl DirectiveMeta for TestDirectiveMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Option<&str> {
        Some(&self.selector)
    }

    fn is_component(&self) -> bool {
        self.is_component
    }

    fn export_as(&self) -> &[String] {
        &self.export_as
    }

    fn input_binding_names(&self) -> Vec<&str> {
        Vec::new()
    }

    fn output_binding_names(&self) -> Vec<&str> {
        Vec::new()
    }

    fn host_directives(&self) -> Vec<Arc<Self>> {
        self.host_directives.clone()
    }
}

fn make_matcher(directives: Vec<TestDirectiveMeta>) -> SelectorMatcher<Arc<TestDirectiveMeta>> {
    let mut matcher = SelectorMatcher::new();
    for directive in directives {
        let selectors = CssSelector::parse(&directive.selector).expect("valid selector");
        matcher.add_selectables(selectors, Arc::new(directive));
    }
    matcher
}

fn bind(directives: Vec<TestDirectiveMeta>, nodes: Vec<R3Node>) -> R3BoundTarget<TestDirectiveMeta> {
    R3TargetBinder::new(make_matcher(directives)).bind(nodes)
}

fn as_element(node: &R3Node) -> &t::Element {
    match node {
        R3Node::Element(element) => element,
        other => panic!("expected an element, got {:?}", other),
    }
}

fn as_defer(node: &R3Node) -> &t::DeferredBlock {
    match node {
        R3Node::DeferredBlock(block) => block,
        other => panic!("expected a @defer block, got {:?}", other),
    }
}

fn directive_names(bound: &R3BoundTarget<TestDirectiveMeta>, key: &NodeKey) -> Vec<String> {
    bound
        .directives_of_node(key)
        .map(|dirs| dirs.iter().map(|d| d.name.clone()).collect())
        .unwrap_or_default()
}

mod directive_matching {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_match_directives_by_static_attribute() {
        let t = TemplateBuilder::new(r#"<div dir="1"></div>"#);
        let node = t.element("div").attr("dir", "1").build();
        let bound = bind(vec![TestDirectiveMeta::new("Dir", "[dir]")], vec![node]);

        let key = NodeKey::of_element(as_element(&bound.template[0]));
        assert_eq!(directive_names(&bound, &key), vec!["Dir"]);
    }

    #[test]
    fn should_match_directives_by_property_binding_name() {
        let t = TemplateBuilder::new(r#"<input [ngModel]="name">"#);
        let node = t.element("input").input("ngModel", "name").build();
        let bound = bind(vec![TestDirectiveMeta::new("NgModel", "[ngModel]")], vec![node]);

        let key = NodeKey::of_element(as_element(&bound.template[0]));
        assert_eq!(directive_names(&bound, &key), vec!["NgModel"]);
    }

    #[test]
    fn should_not_match_attribute_bindings() {
        let t = TemplateBuilder::new(r#"<div [attr.dir]="x"></div>"#);
        let node = t.element("div").input("attr.dir", "x").build();
        let bound = bind(vec![TestDirectiveMeta::new("Dir", "[dir]")], vec![node]);

        let key = NodeKey::of_element(as_element(&bound.template[0]));
        assert!(bound.directives_of_node(&key).is_none());
    }

    #[test]
    fn should_match_structural_directives_on_the_template() {
        let src = r#"<li *ngFor="let item of items">{{item}}</li>"#;
        let t = TemplateBuilder::new(src);
        let node = t
            .structural("li")
            .template_attr("ngForOf", "items")
            .variable("item", "")
            .child(t.element("li").child(t.bound_text("{{item}}")).build())
            .build();
        let bound = bind(vec![TestDirectiveMeta::new("NgForOf", "[ngForOf]")], vec![node]);

        let R3Node::Template(template) = &bound.template[0] else {
            panic!("expected a template");
        };
        assert_eq!(directive_names(&bound, &NodeKey::of_template(template)), vec!["NgForOf"]);
        let inner = NodeKey::of_element(as_element(&template.children[0]));
        assert!(bound.directives_of_node(&inner).is_none());
    }

    #[test]
    fn should_list_host_directives_before_their_host() {
        let t = TemplateBuilder::new("<my-cmp></my-cmp>");
        let node = t.element("my-cmp").build();
        let cmp = TestDirectiveMeta::new("MyCmp", "my-cmp")
            .component()
            .host_directive(TestDirectiveMeta::new("Tooltip", ""));
        let bound = bind(vec![cmp], vec![node]);

        let key = NodeKey::of_element(as_element(&bound.template[0]));
        assert_eq!(directive_names(&bound, &key), vec!["Tooltip", "MyCmp"]);
    }
}

mod references {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_resolve_references_to_exported_directives() {
        let t = TemplateBuilder::new(r#"<form ngForm #f="ngForm" #el #bad="nope"></form>"#);
        let node = t
            .element("form")
            .attr("ngForm", "")
            .reference("f", "ngForm")
            .reference("el", "")
            .reference("bad", "nope")
            .build();
        let bound = bind(vec![TestDirectiveMeta::new("NgForm", "[ngForm]").export_as("ngForm")], vec![node]);
        let form = as_element(&bound.template[0]);

        match bound.reference_target(&form.references[0]) {
            Some(ReferenceTarget::Directive { directive, node }) => {
                assert_eq!(directive.name, "NgForm");
                assert_eq!(*node, NodeKey::of_element(form));
            }
            other => panic!("expected a directive target, got {:?}", other),
        }
        assert!(matches!(
            bound.reference_target(&form.references[1]),
            Some(ReferenceTarget::Element(_))
        ));
        assert!(bound.reference_target(&form.references[2]).is_none());
    }

    #[test]
    fn should_resolve_unnamed_references_on_components_to_the_component() {
        let t = TemplateBuilder::new("<my-cmp #cmp></my-cmp>");
        let node = t.element("my-cmp").reference("cmp", "").build();
        let bound = bind(vec![TestDirectiveMeta::new("MyCmp", "my-cmp").component()], vec![node]);
        let cmp = as_element(&bound.template[0]);

        match bound.reference_target(&cmp.references[0]) {
            Some(ReferenceTarget::Directive { directive, .. }) => assert_eq!(directive.name, "MyCmp"),
            other => panic!("expected the component, got {:?}", other),
        }
    }

    #[test]
    fn should_resolve_references_on_ng_template_to_the_template() {
        let t = TemplateBuilder::new("<ng-template #tpl></ng-template>");
        let node = t.ng_template().reference("tpl", "").build();
        let bound = bind(Vec::new(), vec![node]);
        let R3Node::Template(template) = &bound.template[0] else {
            panic!("expected a template");
        };

        assert!(matches!(
            bound.reference_target(&template.references[0]),
            Some(ReferenceTarget::Template(key)) if *key == NodeKey::of_template(template)
        ));
    }
}

mod pipes {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_record_pipes_used_anywhere() {
        let src = "{{ a | upper }}@if (b | async) {x}";
        let t = TemplateBuilder::new(src);
        let nodes = vec![
            t.bound_text("{{ a | upper }}"),
            t.if_block().branch("b | async", vec![t.text("x")]).build(),
        ];
        let bound = bind(Vec::new(), nodes);

        assert_eq!(bound.used_pipes(), &["upper".to_string(), "async".to_string()]);
        assert_eq!(bound.eagerly_used_pipes(), &["upper".to_string(), "async".to_string()]);
    }

    #[test]
    fn should_not_treat_pipes_inside_defer_main_content_as_eager() {
        let src = "@defer {{{ a | lazy }}} @placeholder {{{ b | shown }}}";
        let t = TemplateBuilder::new(src);
        let node = t
            .defer_block()
            .body(vec![t.bound_text("{{ a | lazy }}")])
            .placeholder(None, vec![t.bound_text("{{ b | shown }}")])
            .build();
        let bound = bind(Vec::new(), vec![node]);

        assert_eq!(bound.used_pipes(), &["lazy".to_string(), "shown".to_string()]);
        assert_eq!(bound.eagerly_used_pipes(), &["shown".to_string()]);
    }

    #[test]
    fn should_treat_a_pipe_used_both_ways_as_eager() {
        let src = "@defer {{{ a | date }}} {{ b | date }}";
        let t = TemplateBuilder::new(src);
        let nodes = vec![
            t.defer_block().body(vec![t.bound_text("{{ a | date }}")]).build(),
            t.bound_text("{{ b | date }}"),
        ];
        let bound = bind(Vec::new(), nodes);

        assert_eq!(bound.used_pipes(), &["date".to_string()]);
        assert_eq!(bound.eagerly_used_pipes(), &["date".to_string()]);
    }
}

mod deferred_triggers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_resolve_a_named_trigger_in_the_parent_view() {
        let src = "<button #trigger>Load</button> @defer (on hover(trigger)) {<heavy-cmp/>}";
        let t = TemplateBuilder::new(src);
        let nodes = vec![
            t.element("button").reference("trigger", "").child(t.text("Load")).build(),
            t.defer_block().on("hover(trigger)").body(vec![t.element("heavy-cmp").build()]).build(),
        ];
        let bound = bind(Vec::new(), nodes);
        let button = as_element(&bound.template[0]);
        let block = as_defer(&bound.template[1]);

        assert_eq!(
            bound.deferred_trigger_target(block, &block.triggers[0]),
            Some(NodeKey::of_element(button))
        );
    }

    #[test]
    fn should_resolve_a_named_trigger_in_the_placeholder() {
        let src = "@defer (on interaction(btn)) {<heavy-cmp/>} @placeholder {<button #btn>Go</button>}";
        let t = TemplateBuilder::new(src);
        let node = t
            .defer_block()
            .on("interaction(btn)")
            .body(vec![t.element("heavy-cmp").build()])
            .placeholder(None, vec![t.element("button").reference("btn", "").child(t.text("Go")).build()])
            .build();
        let bound = bind(Vec::new(), vec![node]);
        let block = as_defer(&bound.template[0]);
        let placeholder = block.placeholder.as_ref().expect("placeholder");
        let button = as_element(&placeholder.children[0]);

        assert_eq!(
            bound.deferred_trigger_target(block, &block.triggers[0]),
            Some(NodeKey::of_element(button))
        );
    }

    #[test]
    fn should_not_resolve_a_trigger_inside_the_deferred_content() {
        let src = "@defer (on viewport(inner)) {<div #inner></div>}";
        let t = TemplateBuilder::new(src);
        let node = t
            .defer_block()
            .on("viewport(inner)")
            .body(vec![t.element("div").reference("inner", "").build()])
            .build();
        let bound = bind(Vec::new(), vec![node]);
        let block = as_defer(&bound.template[0]);

        assert_eq!(bound.deferred_trigger_target(block, &block.triggers[0]), None);
    }

    #[test]
    fn should_use_the_single_placeholder_root_for_unnamed_triggers() {
        let src = "@defer (on viewport) {<heavy-cmp/>} @placeholder {<p>Soon</p>}";
        let t = TemplateBuilder::new(src);
        let node = t
            .defer_block()
            .on("viewport")
            .body(vec![t.element("heavy-cmp").build()])
            .placeholder(None, vec![t.element("p").child(t.text("Soon")).build()])
            .build();
        let bound = bind(Vec::new(), vec![node]);
        let block = as_defer(&bound.template[0]);
        let paragraph = as_element(&block.placeholder.as_ref().expect("placeholder").children[0]);

        assert_eq!(
            bound.deferred_trigger_target(block, &block.triggers[0]),
            Some(NodeKey::of_element(paragraph))
        );
    }

    #[test]
    fn should_not_resolve_unnamed_triggers_with_several_placeholder_roots() {
        let src = "@defer (on hover) {<heavy-cmp/>} @placeholder {<p>a</p><p>b</p>}";
        let t = TemplateBuilder::new(src);
        let node = t
            .defer_block()
            .on("hover")
            .body(vec![t.element("heavy-cmp").build()])
            .placeholder(
                None,
                vec![
                    t.element("p").child(t.text("a")).build(),
                    t.element("p").child(t.text("b")).build(),
                ],
            )
            .build();
        let bound = bind(Vec::new(), vec![node]);
        let block = as_defer(&bound.template[0]);

        assert_eq!(bound.deferred_trigger_target(block, &block.triggers[0]), None);
    }
}
