//! Template binder
//!
//! Matches directives against the elements and templates of a template,
//! resolves `#ref` targets and records which pipes are used and whether they
//! are used outside of `@defer` blocks.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::directive_matching::{ElementSelectorInput, SelectorMatcher};
use crate::expression_parser::ast::AST;
use crate::render3::r3_ast::{
    BindingType, BoundAttribute, BoundEvent, DeferredBlock, DeferredTrigger, R3Node, Reference,
    TemplateAttr, TextAttribute,
};
use crate::render3::view::t2_api::{DirectiveMeta, NodeKey, ReferenceTarget};

/// `(start offset of the view's owner, index of the branch/sub-block)`
type ViewId = (usize, usize);

pub struct R3TargetBinder<D> {
    matcher: SelectorMatcher<Arc<D>>,
}

impl<D: DirectiveMeta> R3TargetBinder<D> {
    pub fn new(matcher: SelectorMatcher<Arc<D>>) -> Self {
        R3TargetBinder { matcher }
    }

    pub fn bind(&self, template: Vec<R3Node>) -> R3BoundTarget<D> {
        let mut state = BinderState {
            matcher: &self.matcher,
            directives: HashMap::new(),
            references: HashMap::new(),
            used_pipes: Vec::new(),
            eager_pipes: Vec::new(),
            element_refs: Vec::new(),
            defer_paths: HashMap::new(),
        };
        state.walk(&template, &mut Vec::new(), false);
        trace!(
            "bound template: {} directive hosts, {} references, pipes {:?}",
            state.directives.len(),
            state.references.len(),
            state.used_pipes
        );
        R3BoundTarget {
            directives: state.directives,
            references: state.references,
            used_pipes: state.used_pipes,
            eager_pipes: state.eager_pipes,
            element_refs: state.element_refs,
            defer_paths: state.defer_paths,
            template,
        }
    }
}

/// Result of binding one template.
pub struct R3BoundTarget<D> {
    pub template: Vec<R3Node>,
    directives: HashMap<NodeKey, Vec<Arc<D>>>,
    references: HashMap<(usize, usize), ReferenceTarget<D>>,
    used_pipes: Vec<String>,
    eager_pipes: Vec<String>,
    /// `(reference name, element, view path of the element)`
    element_refs: Vec<(String, NodeKey, Vec<ViewId>)>,
    defer_paths: HashMap<(usize, usize), Vec<ViewId>>,
}

impl<D> R3BoundTarget<D> {
    /// Directives matched on an element or template, host directives first.
    pub fn directives_of_node(&self, key: &NodeKey) -> Option<&[Arc<D>]> {
        self.directives.get(key).map(Vec::as_slice)
    }

    /// `None` when a named reference matches no exported directive.
    pub fn reference_target(&self, reference: &Reference) -> Option<&ReferenceTarget<D>> {
        self.references.get(&(reference.source_span.start, reference.source_span.end))
    }

    pub fn used_pipes(&self) -> &[String] {
        &self.used_pipes
    }

    /// Pipes used at least once outside the main content of a `@defer` block.
    pub fn eagerly_used_pipes(&self) -> &[String] {
        &self.eager_pipes
    }

    /// Element targeted by a hover/interaction/viewport trigger. Named triggers must
    /// point at an element in the same or an ancestor view, or in the placeholder.
    /// Unnamed triggers use the single root element of the placeholder.
    pub fn deferred_trigger_target(&self, block: &DeferredBlock, trigger: &DeferredTrigger) -> Option<NodeKey> {
        let block_key = (block.source_span.start, block.source_span.end);
        let block_path = self.defer_paths.get(&block_key)?;
        match trigger.reference() {
            Some(name) => {
                let mut placeholder_path = block_path.clone();
                placeholder_path.push((block.source_span.start, 1));
                self.element_refs
                    .iter()
                    .filter(|(ref_name, _, _)| ref_name == name)
                    .find(|(_, _, path)| block_path.starts_with(path) || *path == placeholder_path)
                    .map(|(_, key, _)| *key)
            }
            None => {
                let placeholder = block.placeholder.as_ref()?;
                let mut roots = placeholder.children.iter().filter(|n| !matches!(n, R3Node::Text(t) if t.value.trim().is_empty()));
                match (roots.next(), roots.next()) {
                    (Some(R3Node::Element(element)), None) => Some(NodeKey::of_element(element)),
                    _ => None,
                }
            }
        }
    }
}

struct BinderState<'m, D> {
    matcher: &'m SelectorMatcher<Arc<D>>,
    directives: HashMap<NodeKey, Vec<Arc<D>>>,
    references: HashMap<(usize, usize), ReferenceTarget<D>>,
    used_pipes: Vec<String>,
    eager_pipes: Vec<String>,
    element_refs: Vec<(String, NodeKey, Vec<ViewId>)>,
    defer_paths: HashMap<(usize, usize), Vec<ViewId>>,
}

impl<'m, D: DirectiveMeta> BinderState<'m, D> {
    fn walk(&mut self, nodes: &[R3Node], path: &mut Vec<ViewId>, deferred: bool) {
        for node in nodes {
            self.visit(node, path, deferred);
        }
    }

    fn walk_view(&mut self, nodes: &[R3Node], path: &mut Vec<ViewId>, view: ViewId, deferred: bool) {
        path.push(view);
        self.walk(nodes, path, deferred);
        path.pop();
    }

    fn visit(&mut self, node: &R3Node, path: &mut Vec<ViewId>, deferred: bool) {
        match node {
            R3Node::Text(_) | R3Node::UnknownBlock(_) => {}
            R3Node::BoundText(text) => self.collect_pipes(&text.value, deferred),
            R3Node::Element(element) => {
                let key = NodeKey::of_element(element);
                let input = selector_input(&element.name, &element.attributes, &element.inputs, &element.outputs, &[]);
                let matched = self.match_directives(&input);
                self.bind_bindings(&element.inputs, &element.outputs, deferred);
                for reference in &element.references {
                    let target = resolve_reference(reference, &matched, ReferenceTarget::Element(key), key);
                    if let Some(ReferenceTarget::Element(_)) = &target {
                        self.element_refs.push((reference.name.clone(), key, path.clone()));
                    }
                    if let Some(target) = target {
                        self.references.insert((reference.source_span.start, reference.source_span.end), target);
                    }
                }
                if !matched.is_empty() {
                    self.directives.insert(key, matched);
                }
                self.walk(&element.children, path, deferred);
            }
            R3Node::Template(template) => {
                let key = NodeKey::of_template(template);
                let input = selector_input(
                    "ng-template",
                    &template.attributes,
                    &template.inputs,
                    &template.outputs,
                    &template.template_attrs,
                );
                let matched = self.match_directives(&input);
                self.bind_bindings(&template.inputs, &template.outputs, deferred);
                for attr in &template.template_attrs {
                    if let TemplateAttr::Bound(bound) = attr {
                        self.collect_pipes(&bound.value, deferred);
                    }
                }
                for reference in &template.references {
                    if let Some(target) = resolve_reference(reference, &matched, ReferenceTarget::Template(key), key) {
                        self.references.insert((reference.source_span.start, reference.source_span.end), target);
                    }
                }
                if !matched.is_empty() {
                    self.directives.insert(key, matched);
                }
                self.walk_view(&template.children, path, (template.source_span.start, 0), deferred);
            }
            R3Node::Content(content) => self.walk(&content.children, path, deferred),
            R3Node::IfBlock(block) => {
                for (index, branch) in block.branches.iter().enumerate() {
                    if let Some(expression) = &branch.expression {
                        self.collect_pipes(expression, deferred);
                    }
                    self.walk_view(&branch.children, path, (block.source_span.start, index), deferred);
                }
            }
            R3Node::SwitchBlock(block) => {
                self.collect_pipes(&block.expression, deferred);
                for (index, case) in block.cases.iter().enumerate() {
                    if let Some(expression) = &case.expression {
                        self.collect_pipes(expression, deferred);
                    }
                    self.walk_view(&case.children, path, (block.source_span.start, index), deferred);
                }
            }
            R3Node::ForLoopBlock(block) => {
                self.collect_pipes(&block.expression.ast, deferred);
                self.collect_pipes(&block.track_by.ast, deferred);
                self.walk_view(&block.children, path, (block.source_span.start, 0), deferred);
                if let Some(empty) = &block.empty {
                    self.walk_view(&empty.children, path, (block.source_span.start, 1), deferred);
                }
            }
            R3Node::DeferredBlock(block) => {
                self.defer_paths.insert((block.source_span.start, block.source_span.end), path.clone());
                for trigger in block.triggers.iter().chain(block.prefetch_triggers.iter()) {
                    if let DeferredTrigger::When { value, .. } = trigger {
                        self.collect_pipes(value, deferred);
                    }
                }
                let start = block.source_span.start;
                self.walk_view(&block.children, path, (start, 0), true);
                if let Some(placeholder) = &block.placeholder {
                    self.walk_view(&placeholder.children, path, (start, 1), deferred);
                }
                if let Some(loading) = &block.loading {
                    self.walk_view(&loading.children, path, (start, 2), deferred);
                }
                if let Some(error) = &block.error {
                    self.walk_view(&error.children, path, (start, 3), deferred);
                }
            }
            R3Node::LetDeclaration(decl) => self.collect_pipes(&decl.value, deferred),
        }
    }

    fn match_directives(&self, input: &ElementSelectorInput) -> Vec<Arc<D>> {
        let mut matched = Vec::new();
        for directive in self.matcher.match_element(input) {
            for host in directive.host_directives() {
                push_unique(&mut matched, host);
            }
            push_unique(&mut matched, Arc::clone(directive));
        }
        matched
    }

    fn bind_bindings(&mut self, inputs: &[BoundAttribute], outputs: &[BoundEvent], deferred: bool) {
        for input in inputs {
            self.collect_pipes(&input.value, deferred);
        }
        for output in outputs {
            self.collect_pipes(&output.handler, deferred);
        }
    }

    fn collect_pipes(&mut self, ast: &AST, deferred: bool) {
        ast.visit_all(&mut |node| {
            if let AST::BindingPipe(pipe) = node {
                if !self.used_pipes.contains(&pipe.name) {
                    self.used_pipes.push(pipe.name.clone());
                }
                if !deferred && !self.eager_pipes.contains(&pipe.name) {
                    self.eager_pipes.push(pipe.name.clone());
                }
            }
        });
    }
}

fn push_unique<D>(list: &mut Vec<Arc<D>>, directive: Arc<D>) {
    if !list.iter().any(|d| Arc::ptr_eq(d, &directive)) {
        list.push(directive);
    }
}

fn resolve_reference<D: DirectiveMeta>(
    reference: &Reference,
    matched: &[Arc<D>],
    node_target: ReferenceTarget<D>,
    key: NodeKey,
) -> Option<ReferenceTarget<D>> {
    if reference.value.trim().is_empty() {
        if let Some(component) = matched.iter().find(|d| d.is_component()) {
            return Some(ReferenceTarget::Directive { directive: Arc::clone(component), node: key });
        }
        return Some(node_target);
    }
    matched
        .iter()
        .find(|d| d.export_as().iter().any(|name| *name == reference.value))
        .map(|d| ReferenceTarget::Directive { directive: Arc::clone(d), node: key })
}

/// Attributes visible to selector matching: static attributes with their values,
/// property bindings and listeners by name.
fn selector_input(
    tag_name: &str,
    attributes: &[TextAttribute],
    inputs: &[BoundAttribute],
    outputs: &[BoundEvent],
    template_attrs: &[TemplateAttr],
) -> ElementSelectorInput {
    let mut input = ElementSelectorInput::new(tag_name);
    for attr in attributes {
        input.attrs.push((attr.name.clone(), attr.value.clone()));
    }
    for bound in inputs {
        if matches!(bound.type_, BindingType::Property | BindingType::TwoWay) {
            input.attrs.push((bound.name.clone(), String::new()));
        }
    }
    for output in outputs {
        input.attrs.push((output.name.clone(), String::new()));
    }
    for attr in template_attrs {
        match attr {
            TemplateAttr::Bound(bound) => input.attrs.push((bound.name.clone(), String::new())),
            TemplateAttr::Text(text) => input.attrs.push((text.name.clone(), text.value.clone())),
        }
    }
    input
}
