// TypeCheck Scope
//
// Lexical scopes of a type-check block. Every scope owns an arena of ops and
// the statements they produce; template-local names map to the op declaring
// them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use ng_template_compiler::render3::r3_ast::{
    visit_all, DeferredBlock, DeferredTrigger, ForLoopBlock, HostElement, IfBlockBranch, LetDeclaration, R3Node,
    Template, Variable,
};
use ng_template_compiler::render3::view::{NodeKey, R3BoundTarget};

use super::super::api::{PipeMeta, SchemaMetadata, TypeCheckBlockMetadata, TypeCheckableDirectiveMeta};
use super::dom::DomSchemaChecker;
use super::environment::Environment;
use super::error::{TcbError, TcbResult};
use super::oob::OutOfBandDiagnosticRecorder;
use super::ops::{ElementTarget, NodeRef, TcbOp};
use super::tcb_expr::TcbExpr;

pub type ScopeId = usize;

/// Result of an op requested while it is still executing.
const INFER_TYPE_FOR_CIRCULAR_OP_EXPR: &str = "null!";

pub(super) enum OpState<'a> {
    Pending(TcbOp<'a>),
    Executing(Fallback<'a>),
    Done(Option<TcbExpr>),
}

/// What a request for an executing op yields.
pub(super) enum Fallback<'a> {
    Expr(TcbExpr),
    /// Declares a placeholder the first time the cycle is hit.
    Op(TcbOp<'a>),
}

impl Fallback<'_> {
    pub(super) fn infer() -> Self {
        Fallback::Expr(TcbExpr::new(INFER_TYPE_FOR_CIRCULAR_OP_EXPR))
    }
}

/// A template-local name.
#[derive(Debug, Clone)]
pub(super) enum LocalSymbol<'a> {
    /// Template variable, `@if` alias or `@for` context variable.
    Variable { op: usize, variable: &'a Variable },
    /// The `@for` item, declared by the loop statement itself.
    LoopItem { id: String },
    Reference { op: usize },
    Let { op: usize, decl: &'a LetDeclaration },
}

#[derive(Clone, Copy)]
pub(super) enum ScopedNode<'a> {
    Template(&'a Template),
    IfBranch(&'a IfBlockBranch),
    ForLoop(&'a ForLoopBlock),
    Host(&'a HostElement),
}

struct ScopeData<'a> {
    parent: Option<ScopeId>,
    /// Narrowing applied to the statements of this scope.
    guard: Option<TcbExpr>,
    ops: Vec<OpState<'a>>,
    statements: Vec<String>,
    symbols: HashMap<String, LocalSymbol<'a>>,
    element_ops: HashMap<NodeKey, usize>,
    template_ctx_ops: HashMap<NodeKey, usize>,
    directive_ops: HashMap<NodeKey, Vec<(Arc<TypeCheckableDirectiveMeta>, usize)>>,
    host_element_op: Option<usize>,
}

impl ScopeData<'_> {
    fn new(parent: Option<ScopeId>, guard: Option<TcbExpr>) -> Self {
        Self {
            parent,
            guard,
            ops: Vec::new(),
            statements: Vec::new(),
            symbols: HashMap::new(),
            element_ops: HashMap::new(),
            template_ctx_ops: HashMap::new(),
            directive_ops: HashMap::new(),
            host_element_op: None,
        }
    }
}

/// Generation state of one type-check block.
pub(super) struct TcbContext<'t, 'a> {
    pub(super) id: String,
    pub(super) env: &'t mut Environment,
    pub(super) dom: &'t mut dyn DomSchemaChecker,
    pub(super) oob: &'t mut OutOfBandDiagnosticRecorder,
    pub(super) bound_target: &'a R3BoundTarget<TypeCheckableDirectiveMeta>,
    pub(super) pipes: &'a IndexMap<String, PipeMeta>,
    pub(super) schemas: &'a [SchemaMetadata],
    scopes: Vec<ScopeData<'a>>,
    next_id: usize,
    /// Elements inside the main content of some `@defer` block.
    deferred_elements: HashSet<NodeKey>,
}

impl<'t, 'a> TcbContext<'t, 'a> {
    pub(super) fn new(
        env: &'t mut Environment,
        meta: &TypeCheckBlockMetadata<'a>,
        dom: &'t mut dyn DomSchemaChecker,
        oob: &'t mut OutOfBandDiagnosticRecorder,
    ) -> Self {
        let mut deferred_elements = HashSet::new();
        visit_all(&meta.bound_target.template, &mut |node| {
            if let R3Node::DeferredBlock(block) = node {
                visit_all(&block.children, &mut |inner| {
                    if let R3Node::Element(element) = inner {
                        deferred_elements.insert(NodeKey::of_element(element));
                    }
                });
            }
        });
        Self {
            id: meta.id.clone(),
            env,
            dom,
            oob,
            bound_target: meta.bound_target,
            pipes: meta.pipes,
            schemas: meta.schemas,
            scopes: Vec::new(),
            next_id: 1,
            deferred_elements,
        }
    }

    pub(super) fn allocate_id(&mut self) -> String {
        let id = format!("_t{}", self.next_id);
        self.next_id += 1;
        id
    }

    pub(super) fn directives_of(&self, key: &NodeKey) -> Vec<Arc<TypeCheckableDirectiveMeta>> {
        self.bound_target.directives_of_node(key).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub(super) fn add_statement(&mut self, scope: ScopeId, statement: String) {
        self.scopes[scope].statements.push(statement);
    }

    fn push_op(&mut self, scope: ScopeId, op: TcbOp<'a>) -> usize {
        let ops = &mut self.scopes[scope].ops;
        ops.push(OpState::Pending(op));
        ops.len() - 1
    }

    fn declare(&mut self, scope: ScopeId, name: &str, symbol: LocalSymbol<'a>) {
        self.scopes[scope].symbols.entry(name.to_string()).or_insert(symbol);
    }

    /// Creates a scope for `children`, registering the variables `scoped`
    /// introduces and an op for every node.
    pub(super) fn scope_for_nodes(
        &mut self,
        parent: Option<ScopeId>,
        scoped: Option<ScopedNode<'a>>,
        children: &'a [R3Node],
        guard: Option<TcbExpr>,
    ) -> TcbResult<ScopeId> {
        let scope = self.scopes.len();
        self.scopes.push(ScopeData::new(parent, guard));

        if parent.is_none() && scoped.is_none() && self.env.config.enable_template_type_checker {
            self.push_op(scope, TcbOp::ComponentContextCompletion);
        }

        match scoped {
            Some(ScopedNode::Template(template)) => {
                let mut seen = HashSet::new();
                for variable in &template.variables {
                    if !seen.insert(variable.name.as_str()) {
                        self.oob.duplicate_template_var(variable);
                    }
                    let op = self.push_op(scope, TcbOp::TemplateVariable { template, variable });
                    self.declare(scope, &variable.name, LocalSymbol::Variable { op, variable });
                }
            }
            Some(ScopedNode::IfBranch(branch)) => {
                if let (Some(expression), Some(alias)) = (&branch.expression, &branch.expression_alias) {
                    let initializer = self.tcb_expression(expression, scope)?;
                    let op = self.push_op(scope, TcbOp::BlockVariable { initializer, variable: alias });
                    self.declare(scope, &alias.name, LocalSymbol::Variable { op, variable: alias });
                }
            }
            Some(ScopedNode::ForLoop(block)) => {
                let id = self.allocate_id();
                self.declare(scope, &block.item.name, LocalSymbol::LoopItem { id });
                for variable in &block.context_variables {
                    let ty = loop_context_variable_type(&variable.value)
                        .ok_or_else(|| TcbError::UnknownLoopVariable(variable.name.clone()))?;
                    let op = self.push_op(scope, TcbOp::BlockImplicitVariable { ty, variable });
                    self.declare(scope, &variable.name, LocalSymbol::Variable { op, variable });
                }
            }
            Some(ScopedNode::Host(host)) => self.append_host_element(scope, host),
            None => {}
        }

        self.append_children(scope, children);
        Ok(scope)
    }

    fn append_children(&mut self, scope: ScopeId, children: &'a [R3Node]) {
        for node in children {
            self.append_node(scope, node);
        }
    }

    fn append_node(&mut self, scope: ScopeId, node: &'a R3Node) {
        let config = self.env.config;
        match node {
            R3Node::Element(element) => {
                let op = self.push_op(scope, TcbOp::Element(element));
                self.scopes[scope].element_ops.insert(NodeKey::of_element(element), op);
                self.append_directives_and_inputs(scope, NodeRef::Element(element));
                self.append_outputs(scope, NodeRef::Element(element));
                self.append_children(scope, &element.children);
                self.append_references(scope, NodeRef::Element(element));
            }
            R3Node::Template(template) => {
                self.append_directives_and_inputs(scope, NodeRef::Template(template));
                self.append_outputs(scope, NodeRef::Template(template));
                let ctx = self.push_op(scope, TcbOp::TemplateContext);
                self.scopes[scope].template_ctx_ops.insert(NodeKey::of_template(template), ctx);
                if config.check_template_bodies {
                    self.push_op(scope, TcbOp::TemplateBody(template));
                } else if config.always_check_schema_in_template_bodies {
                    self.append_deep_schema_checks(scope, &template.children);
                }
                self.append_references(scope, NodeRef::Template(template));
            }
            R3Node::BoundText(text) => {
                self.push_op(scope, TcbOp::Expression(&text.value));
            }
            R3Node::IfBlock(block) => {
                self.push_op(scope, TcbOp::If(block));
            }
            R3Node::SwitchBlock(block) => {
                self.push_op(scope, TcbOp::Switch(block));
            }
            R3Node::ForLoopBlock(block) => {
                self.push_op(scope, TcbOp::ForOf(block));
                if let Some(empty) = &block.empty {
                    if config.check_control_flow_bodies {
                        self.append_children(scope, &empty.children);
                    }
                }
            }
            R3Node::DeferredBlock(block) => self.append_deferred_block(scope, block),
            R3Node::Content(content) => self.append_children(scope, &content.children),
            R3Node::LetDeclaration(decl) => {
                let op = self.push_op(scope, TcbOp::Let(decl));
                if self.scopes[scope].symbols.contains_key(&decl.name) {
                    self.oob.conflicting_declaration(decl);
                } else {
                    self.declare(scope, &decl.name, LocalSymbol::Let { op, decl });
                }
            }
            R3Node::Text(_) | R3Node::UnknownBlock(_) => {}
        }
    }

    fn append_directives_and_inputs(&mut self, scope: ScopeId, node: NodeRef<'a>) {
        let key = node.key();
        let directives = self.directives_of(&key);
        if directives.is_empty() {
            if let NodeRef::Element(element) = node {
                let target = ElementTarget::Element(element);
                self.push_op(scope, TcbOp::UnclaimedInputs { target, claimed: HashSet::new() });
                self.push_op(scope, TcbOp::DomSchemaCheck { target, check_element: true, claimed: HashSet::new() });
            }
            return;
        }

        if let NodeRef::Element(element) = node {
            if !self.deferred_elements.contains(&key) && directives.iter().any(|dir| dir.is_explicitly_deferred) {
                self.oob.deferred_component_used_eagerly(&element.name, &element.start_source_span);
            }
        }

        let mut directive_ops = Vec::with_capacity(directives.len());
        for dir in &directives {
            let op = if !dir.is_generic() {
                TcbOp::DirectiveType { node, dir: Arc::clone(dir), any_params: false }
            } else if self.env.config.use_inline_type_constructors {
                TcbOp::DirectiveCtor { node, dir: Arc::clone(dir) }
            } else {
                TcbOp::DirectiveType { node, dir: Arc::clone(dir), any_params: true }
            };
            let index = self.push_op(scope, op);
            directive_ops.push((Arc::clone(dir), index));
            self.push_op(scope, TcbOp::DirectiveInputs { node, dir: Arc::clone(dir) });
        }
        self.scopes[scope].directive_ops.insert(key, directive_ops);

        if let NodeRef::Element(element) = node {
            let claimed = claimed_inputs(&directives);
            let target = ElementTarget::Element(element);
            self.push_op(scope, TcbOp::UnclaimedInputs { target, claimed: claimed.clone() });
            self.push_op(scope, TcbOp::DomSchemaCheck { target, check_element: false, claimed });
        }
    }

    fn append_outputs(&mut self, scope: ScopeId, node: NodeRef<'a>) {
        let directives = self.directives_of(&node.key());
        if directives.is_empty() {
            if let NodeRef::Element(element) = node {
                let target = ElementTarget::Element(element);
                self.push_op(scope, TcbOp::UnclaimedOutputs { target, claimed: HashSet::new() });
            }
            return;
        }

        for dir in &directives {
            self.push_op(scope, TcbOp::DirectiveOutputs { node, dir: Arc::clone(dir) });
        }

        if let NodeRef::Element(element) = node {
            let claimed: HashSet<String> = directives
                .iter()
                .flat_map(|dir| dir.outputs.iter().map(|output| output.binding_property_name.clone()))
                .collect();
            self.push_op(scope, TcbOp::UnclaimedOutputs { target: ElementTarget::Element(element), claimed });
        }
    }

    fn append_references(&mut self, scope: ScopeId, node: NodeRef<'a>) {
        for reference in node.references() {
            let op = match self.bound_target.reference_target(reference) {
                Some(target) => TcbOp::Reference { reference, target: target.clone() },
                None => {
                    self.oob.missing_reference_target(reference);
                    TcbOp::InvalidReference
                }
            };
            let op = self.push_op(scope, op);
            self.declare(scope, &reference.name, LocalSymbol::Reference { op });
        }
    }

    fn append_deferred_block(&mut self, scope: ScopeId, block: &'a DeferredBlock) {
        self.append_deferred_triggers(scope, block, &block.triggers);
        self.append_deferred_triggers(scope, block, &block.prefetch_triggers);
        self.append_children(scope, &block.children);
        if let Some(placeholder) = &block.placeholder {
            self.append_children(scope, &placeholder.children);
        }
        if let Some(loading) = &block.loading {
            self.append_children(scope, &loading.children);
        }
        if let Some(error) = &block.error {
            self.append_children(scope, &error.children);
        }
    }

    fn append_deferred_triggers(&mut self, scope: ScopeId, block: &'a DeferredBlock, triggers: &'a [DeferredTrigger]) {
        for trigger in triggers {
            match trigger {
                DeferredTrigger::When { value, .. } => {
                    self.push_op(scope, TcbOp::Expression(value));
                }
                DeferredTrigger::Hover { .. } | DeferredTrigger::Interaction { .. } | DeferredTrigger::Viewport { .. } => {
                    if self.bound_target.deferred_trigger_target(block, trigger).is_none() {
                        self.oob.inaccessible_deferred_trigger_element(trigger);
                    }
                }
                DeferredTrigger::Idle { .. }
                | DeferredTrigger::Immediate { .. }
                | DeferredTrigger::Never { .. }
                | DeferredTrigger::Timer { .. } => {}
            }
        }
    }

    /// Schema checks for the elements of an unchecked template body.
    fn append_deep_schema_checks(&mut self, scope: ScopeId, nodes: &'a [R3Node]) {
        for node in nodes {
            match node {
                R3Node::Element(element) => {
                    let directives = self.directives_of(&NodeKey::of_element(element));
                    self.push_op(
                        scope,
                        TcbOp::DomSchemaCheck {
                            target: ElementTarget::Element(element),
                            check_element: directives.is_empty(),
                            claimed: claimed_inputs(&directives),
                        },
                    );
                    self.append_deep_schema_checks(scope, &element.children);
                }
                R3Node::Template(template) => self.append_deep_schema_checks(scope, &template.children),
                _ => {}
            }
        }
    }

    fn append_host_element(&mut self, scope: ScopeId, host: &'a HostElement) {
        let op = self.push_op(scope, TcbOp::HostElement(host));
        self.scopes[scope].host_element_op = Some(op);
        let target = ElementTarget::Host(host);
        self.push_op(scope, TcbOp::UnclaimedInputs { target, claimed: HashSet::new() });
        self.push_op(scope, TcbOp::DomSchemaCheck { target, check_element: false, claimed: HashSet::new() });
        self.push_op(scope, TcbOp::UnclaimedOutputs { target, claimed: HashSet::new() });
    }

    /// Runs every op of `scope` in order and hands out its statements. Optional
    /// ops only run here when the template type-checker needs them.
    pub(super) fn render(&mut self, scope: ScopeId) -> TcbResult<Vec<String>> {
        let skip_optional = !self.env.config.enable_template_type_checker;
        let mut index = 0;
        while index < self.scopes[scope].ops.len() {
            self.execute_op(scope, index, skip_optional)?;
            index += 1;
        }
        Ok(std::mem::take(&mut self.scopes[scope].statements))
    }

    fn execute_op(&mut self, scope: ScopeId, index: usize, skip_optional: bool) -> TcbResult<Option<TcbExpr>> {
        let state = std::mem::replace(&mut self.scopes[scope].ops[index], OpState::Done(None));
        let op = match state {
            OpState::Done(result) => {
                self.scopes[scope].ops[index] = OpState::Done(result.clone());
                return Ok(result);
            }
            OpState::Executing(fallback) => return self.execute_fallback(scope, index, fallback),
            OpState::Pending(op) if skip_optional && op.optional() => {
                self.scopes[scope].ops[index] = OpState::Pending(op);
                return Ok(None);
            }
            OpState::Pending(op) => op,
        };

        self.scopes[scope].ops[index] = OpState::Executing(op.circular_fallback());
        let result = self.run_op(scope, op)?;
        self.scopes[scope].ops[index] = OpState::Done(result.clone());
        Ok(result)
    }

    fn execute_fallback(&mut self, scope: ScopeId, index: usize, fallback: Fallback<'a>) -> TcbResult<Option<TcbExpr>> {
        debug!("{}: circular request for op {} of scope {}", self.id, index, scope);
        match fallback {
            Fallback::Expr(expr) => {
                self.scopes[scope].ops[index] = OpState::Executing(Fallback::Expr(expr.clone()));
                Ok(Some(expr))
            }
            Fallback::Op(op) => {
                self.scopes[scope].ops[index] = OpState::Executing(Fallback::infer());
                let result = self.run_op(scope, op)?;
                let settled = result.clone().map_or_else(Fallback::infer, Fallback::Expr);
                self.scopes[scope].ops[index] = OpState::Executing(settled);
                Ok(result)
            }
        }
    }

    fn resolve_op(&mut self, scope: ScopeId, index: usize, what: &str) -> TcbResult<TcbExpr> {
        match self.execute_op(scope, index, false)? {
            Some(expr) => Ok(TcbExpr::new(expr.into_source())),
            None => Err(TcbError::Unresolved(what.to_string())),
        }
    }

    /// Walks up from `scope` to the first scope `find` knows an op in.
    fn resolve_in_chain(
        &mut self,
        scope: ScopeId,
        what: &str,
        find: impl Fn(&ScopeData<'a>) -> Option<usize>,
    ) -> TcbResult<TcbExpr> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(index) = find(&self.scopes[id]) {
                return self.resolve_op(id, index, what);
            }
            current = self.scopes[id].parent;
        }
        Err(TcbError::Unresolved(what.to_string()))
    }

    /// The DOM element variable of an element, or the context variable of a template.
    pub(super) fn resolve_node(&mut self, scope: ScopeId, node: NodeRef<'a>) -> TcbResult<TcbExpr> {
        let key = node.key();
        match node {
            NodeRef::Element(element) => {
                self.resolve_in_chain(scope, &format!("element <{}>", element.name), |data| {
                    data.element_ops.get(&key).copied()
                })
            }
            NodeRef::Template(_) => self.resolve_template_ctx(scope, &key),
        }
    }

    pub(super) fn resolve_element_key(&mut self, scope: ScopeId, key: &NodeKey) -> TcbResult<TcbExpr> {
        self.resolve_in_chain(scope, "element", |data| data.element_ops.get(key).copied())
    }

    pub(super) fn resolve_template_ctx(&mut self, scope: ScopeId, key: &NodeKey) -> TcbResult<TcbExpr> {
        self.resolve_in_chain(scope, "template context", |data| data.template_ctx_ops.get(key).copied())
    }

    pub(super) fn resolve_directive(
        &mut self,
        scope: ScopeId,
        key: &NodeKey,
        dir: &Arc<TypeCheckableDirectiveMeta>,
    ) -> TcbResult<TcbExpr> {
        self.resolve_in_chain(scope, &format!("directive {}", dir.name), |data| {
            data.directive_ops
                .get(key)
                .and_then(|ops| ops.iter().find(|(candidate, _)| Arc::ptr_eq(candidate, dir)).map(|(_, op)| *op))
        })
    }

    pub(super) fn resolve_host_element(&mut self, scope: ScopeId) -> TcbResult<TcbExpr> {
        self.resolve_in_chain(scope, "host element", |data| data.host_element_op)
    }

    /// Innermost declaration of `name` visible from `scope`.
    pub(super) fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, LocalSymbol<'a>)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.scopes[id].symbols.get(name) {
                return Some((id, symbol.clone()));
            }
            current = self.scopes[id].parent;
        }
        None
    }

    pub(super) fn resolve_symbol(&mut self, owner: ScopeId, name: &str, symbol: &LocalSymbol<'a>) -> TcbResult<TcbExpr> {
        match symbol {
            LocalSymbol::Variable { op, .. } | LocalSymbol::Reference { op } | LocalSymbol::Let { op, .. } => {
                self.resolve_op(owner, *op, name)
            }
            LocalSymbol::LoopItem { id } => Ok(TcbExpr::new(id.clone())),
        }
    }

    /// Guards of `scope` and all its parents, outermost first.
    pub(super) fn guards(&self, scope: ScopeId) -> Option<TcbExpr> {
        let parent = self.scopes[scope].parent.and_then(|parent| self.guards(parent));
        match (parent, &self.scopes[scope].guard) {
            (None, guard) => guard.clone(),
            (Some(parent), None) => Some(parent),
            (Some(parent), Some(guard)) => Some(TcbExpr::new(format!("{} && {}", parent.print(), guard.print()))),
        }
    }
}

fn claimed_inputs(directives: &[Arc<TypeCheckableDirectiveMeta>]) -> HashSet<String> {
    directives
        .iter()
        .flat_map(|dir| dir.inputs.iter().map(|input| input.binding_property_name.clone()))
        .collect()
}

fn loop_context_variable_type(value: &str) -> Option<&'static str> {
    match value {
        "$index" | "$count" => Some("number"),
        "$first" | "$last" | "$even" | "$odd" => Some("boolean"),
        _ => None,
    }
}

/// `{ ... }` with one statement per line, indented.
pub(super) fn block(statements: &[String]) -> String {
    if statements.is_empty() {
        return "{ }".to_string();
    }
    let mut out = String::from("{\n");
    for statement in statements {
        for line in statement.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('}');
    out
}
