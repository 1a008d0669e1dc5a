// TypeCheck Ops
//
// A unit of work in a scope. Each op appends statements to its scope when
// executed and may yield an expression other ops refer to it by.

mod bindings;
mod control_flow;
mod directives;
mod element;
mod references;

use std::collections::HashSet;
use std::sync::Arc;

use ng_template_compiler::expression_parser::AST;
use ng_template_compiler::parse_util::ParseSourceSpan;
use ng_template_compiler::render3::r3_ast::{
    BoundAttribute, BoundEvent, Element, ForLoopBlock, HostElement, IfBlock, LetDeclaration, Reference, SwitchBlock,
    Template, TemplateAttr, TextAttribute, Variable,
};
use ng_template_compiler::render3::view::{NodeKey, ReferenceTarget};

use super::super::api::TypeCheckableDirectiveMeta;
use super::error::TcbResult;
use super::scope::{Fallback, ScopeId, TcbContext};
use super::tcb_expr::TcbExpr;

/// An element or template that directives can match on.
#[derive(Debug, Clone, Copy)]
pub(super) enum NodeRef<'a> {
    Element(&'a Element),
    Template(&'a Template),
}

impl<'a> NodeRef<'a> {
    pub(super) fn key(&self) -> NodeKey {
        match self {
            NodeRef::Element(element) => NodeKey::of_element(element),
            NodeRef::Template(template) => NodeKey::of_template(template),
        }
    }

    pub(super) fn references(&self) -> &'a [Reference] {
        match self {
            NodeRef::Element(element) => &element.references,
            NodeRef::Template(template) => &template.references,
        }
    }

    pub(super) fn inputs(&self) -> &'a [BoundAttribute] {
        match self {
            NodeRef::Element(element) => &element.inputs,
            NodeRef::Template(template) => &template.inputs,
        }
    }

    pub(super) fn outputs(&self) -> &'a [BoundEvent] {
        match self {
            NodeRef::Element(element) => &element.outputs,
            NodeRef::Template(template) => &template.outputs,
        }
    }

    pub(super) fn start_source_span(&self) -> &'a ParseSourceSpan {
        match self {
            NodeRef::Element(element) => &element.start_source_span,
            NodeRef::Template(template) => &template.start_source_span,
        }
    }

    /// Bound and static attributes in the order inputs are assigned: bound
    /// attributes, plain attributes, then the attributes of a `*` template.
    pub(super) fn attributes(&self) -> Vec<InputAttribute<'a>> {
        let mut out: Vec<InputAttribute<'a>> = Vec::new();
        let (inputs, attributes) = match self {
            NodeRef::Element(element) => (&element.inputs, &element.attributes),
            NodeRef::Template(template) => (&template.inputs, &template.attributes),
        };
        out.extend(inputs.iter().map(InputAttribute::Bound));
        out.extend(attributes.iter().map(InputAttribute::Text));
        if let NodeRef::Template(template) = self {
            out.extend(template.template_attrs.iter().map(|attr| match attr {
                TemplateAttr::Bound(bound) => InputAttribute::Bound(bound),
                TemplateAttr::Text(text) => InputAttribute::Text(text),
            }));
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) enum InputAttribute<'a> {
    Bound(&'a BoundAttribute),
    Text(&'a TextAttribute),
}

impl<'a> InputAttribute<'a> {
    pub(super) fn name(&self) -> &'a str {
        match self {
            InputAttribute::Bound(attr) => &attr.name,
            InputAttribute::Text(attr) => &attr.name,
        }
    }

    pub(super) fn source_span(&self) -> &'a ParseSourceSpan {
        match self {
            InputAttribute::Bound(attr) => &attr.source_span,
            InputAttribute::Text(attr) => &attr.source_span,
        }
    }

    pub(super) fn key_span(&self) -> Option<&'a ParseSourceSpan> {
        match self {
            InputAttribute::Bound(attr) => Some(&attr.key_span),
            InputAttribute::Text(attr) => attr.key_span.as_ref(),
        }
    }
}

/// The element DOM bindings and events of a scope apply to.
#[derive(Debug, Clone, Copy)]
pub(super) enum ElementTarget<'a> {
    Element(&'a Element),
    Host(&'a HostElement),
}

impl<'a> ElementTarget<'a> {
    pub(super) fn inputs(&self) -> &'a [BoundAttribute] {
        match self {
            ElementTarget::Element(element) => &element.inputs,
            ElementTarget::Host(host) => &host.bindings,
        }
    }

    pub(super) fn outputs(&self) -> &'a [BoundEvent] {
        match self {
            ElementTarget::Element(element) => &element.outputs,
            ElementTarget::Host(host) => &host.listeners,
        }
    }
}

pub(super) enum TcbOp<'a> {
    /// `this.` anchor for completions on the component.
    ComponentContextCompletion,
    Element(&'a Element),
    HostElement(&'a HostElement),
    TemplateContext,
    TemplateVariable { template: &'a Template, variable: &'a Variable },
    TemplateBody(&'a Template),
    DirectiveType { node: NodeRef<'a>, dir: Arc<TypeCheckableDirectiveMeta>, any_params: bool },
    DirectiveCtor { node: NodeRef<'a>, dir: Arc<TypeCheckableDirectiveMeta> },
    /// Stands in for a `DirectiveCtor` whose inputs refer back to the directive.
    DirectiveCtorCircularFallback { dir: Arc<TypeCheckableDirectiveMeta> },
    DirectiveInputs { node: NodeRef<'a>, dir: Arc<TypeCheckableDirectiveMeta> },
    UnclaimedInputs { target: ElementTarget<'a>, claimed: HashSet<String> },
    DomSchemaCheck { target: ElementTarget<'a>, check_element: bool, claimed: HashSet<String> },
    DirectiveOutputs { node: NodeRef<'a>, dir: Arc<TypeCheckableDirectiveMeta> },
    UnclaimedOutputs { target: ElementTarget<'a>, claimed: HashSet<String> },
    BlockVariable { initializer: TcbExpr, variable: &'a Variable },
    BlockImplicitVariable { ty: &'static str, variable: &'a Variable },
    Let(&'a LetDeclaration),
    Expression(&'a AST),
    Reference { reference: &'a Reference, target: ReferenceTarget<TypeCheckableDirectiveMeta> },
    InvalidReference,
    If(&'a IfBlock),
    Switch(&'a SwitchBlock),
    ForOf(&'a ForLoopBlock),
}

impl<'a> TcbOp<'a> {
    /// Optional ops only run when something resolves them.
    pub(super) fn optional(&self) -> bool {
        matches!(
            self,
            TcbOp::Element(_)
                | TcbOp::HostElement(_)
                | TcbOp::TemplateContext
                | TcbOp::DirectiveType { .. }
                | TcbOp::DirectiveCtor { .. }
                | TcbOp::BlockImplicitVariable { .. }
                | TcbOp::Reference { .. }
        )
    }

    pub(super) fn circular_fallback(&self) -> Fallback<'a> {
        match self {
            TcbOp::DirectiveCtor { dir, .. } => Fallback::Op(TcbOp::DirectiveCtorCircularFallback { dir: Arc::clone(dir) }),
            _ => Fallback::infer(),
        }
    }
}

impl<'t, 'a> TcbContext<'t, 'a> {
    pub(super) fn run_op(&mut self, scope: ScopeId, op: TcbOp<'a>) -> TcbResult<Option<TcbExpr>> {
        match op {
            TcbOp::ComponentContextCompletion => self.component_context_completion(scope),
            TcbOp::Element(element) => self.element_op(scope, element),
            TcbOp::HostElement(host) => self.host_element_op(scope, host),
            TcbOp::TemplateContext => self.template_context_op(scope),
            TcbOp::TemplateVariable { template, variable } => self.template_variable_op(scope, template, variable),
            TcbOp::TemplateBody(template) => self.template_body_op(scope, template),
            TcbOp::DirectiveType { node, dir, any_params } => self.directive_type_op(scope, node, &dir, any_params),
            TcbOp::DirectiveCtor { node, dir } => self.directive_ctor_op(scope, node, &dir),
            TcbOp::DirectiveCtorCircularFallback { dir } => self.directive_ctor_circular_fallback(scope, &dir),
            TcbOp::DirectiveInputs { node, dir } => self.directive_inputs_op(scope, node, &dir),
            TcbOp::UnclaimedInputs { target, claimed } => self.unclaimed_inputs_op(scope, target, &claimed),
            TcbOp::DomSchemaCheck { target, check_element, claimed } => {
                self.dom_schema_check_op(target, check_element, &claimed)
            }
            TcbOp::DirectiveOutputs { node, dir } => self.directive_outputs_op(scope, node, &dir),
            TcbOp::UnclaimedOutputs { target, claimed } => self.unclaimed_outputs_op(scope, target, &claimed),
            TcbOp::BlockVariable { initializer, variable } => self.block_variable_op(scope, initializer, variable),
            TcbOp::BlockImplicitVariable { ty, variable } => self.block_implicit_variable_op(scope, ty, variable),
            TcbOp::Let(decl) => self.let_op(scope, decl),
            TcbOp::Expression(ast) => self.expression_op(scope, ast),
            TcbOp::Reference { reference, target } => self.reference_op(scope, reference, &target),
            TcbOp::InvalidReference => self.invalid_reference_op(scope),
            TcbOp::If(block) => self.if_op(scope, block),
            TcbOp::Switch(block) => self.switch_op(scope, block),
            TcbOp::ForOf(block) => self.for_of_op(scope, block),
        }
    }
}
