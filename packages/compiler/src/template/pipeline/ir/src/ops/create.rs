//! Create Operations
//!
//! Operations run once when a view is created.

use crate::parse_util::ParseSourceSpan;
use crate::render3::defer::DeferBlockConfig;
use crate::template::pipeline::ir::enums::{OpKind, TemplateKind, VisitorContextFlag};
use crate::template::pipeline::ir::expression::{
    transform_expression_in_place, visit_expressions_in_expression, Expression,
};
use crate::template::pipeline::ir::handle::{SlotHandle, XrefId};
use crate::template::pipeline::ir::operations::OpList;
use crate::template::pipeline::ir::ops::shared::VariableOp;
use crate::template::pipeline::ir::ops::update::UpdateOp;

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOp {
    ElementStart(ElementStartOp),
    ElementEnd(ElementEndOp),
    Template(TemplateOp),
    Text(TextOp),
    Projection(ProjectionOp),
    Listener(ListenerOp),
    ConditionalBranch(ConditionalBranchOp),
    RepeaterCreate(RepeaterCreateOp),
    Defer(DeferOp),
    DeclareLet(DeclareLetOp),
    Pipe(PipeOp),
    StoredCallback(StoredCallbackOp),
    Variable(VariableOp),
}

/// `#name` or `#name="exportAs"` on an element-like op.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRef {
    pub name: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementStartOp {
    pub xref: XrefId,
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub local_refs: Vec<LocalRef>,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementEndOp {
    pub xref: XrefId,
}

/// Declares an embedded view. `xref` is the xref of the view itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOp {
    pub xref: XrefId,
    pub template_kind: TemplateKind,
    pub tag: Option<String>,
    pub local_refs: Vec<LocalRef>,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub xref: XrefId,
    pub initial_value: String,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

/// `<ng-content>`, with an optional view for its fallback content.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOp {
    pub xref: XrefId,
    pub selector: String,
    pub fallback_view: Option<XrefId>,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

/// Event listener on `target`. The handler is its own op list, run each time
/// the event fires.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerOp {
    pub target: XrefId,
    pub name: String,
    /// `window`, `document` or `body` for global listeners.
    pub event_target: Option<String>,
    pub is_two_way: bool,
    pub is_animation: bool,
    pub handler_ops: OpList<UpdateOp>,
    pub source_span: ParseSourceSpan,
}

/// One branch view of an `@if` or `@switch`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranchOp {
    pub xref: XrefId,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

/// Declares the body view (`xref`) and optional `@empty` view of a `@for`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterCreateOp {
    pub xref: XrefId,
    pub empty_view: Option<XrefId>,
    pub item_name: String,
    /// Names bound to `$index` in the loop, including `$index` itself.
    pub index_names: Vec<String>,
    pub track: Expression,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferOp {
    pub xref: XrefId,
    pub main_view: XrefId,
    pub placeholder_view: Option<XrefId>,
    pub loading_view: Option<XrefId>,
    pub error_view: Option<XrefId>,
    pub placeholder_config: Option<DeferBlockConfig>,
    pub loading_config: Option<DeferBlockConfig>,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

/// Slot for a `@let` value that other views read.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareLetOp {
    pub xref: XrefId,
    pub declared_name: String,
    pub handle: SlotHandle,
    pub source_span: ParseSourceSpan,
}

/// Instance of pipe `name`, referenced by `PipeBinding` expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeOp {
    pub xref: XrefId,
    pub name: String,
    pub handle: SlotHandle,
}

/// Keeps the closure of callback `callback` in a slot so it is created once.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCallbackOp {
    pub xref: XrefId,
    pub callback: XrefId,
    pub handle: SlotHandle,
}

impl CreateOp {
    pub fn kind(&self) -> OpKind {
        match self {
            CreateOp::ElementStart(_) => OpKind::ElementStart,
            CreateOp::ElementEnd(_) => OpKind::ElementEnd,
            CreateOp::Template(_) => OpKind::Template,
            CreateOp::Text(_) => OpKind::Text,
            CreateOp::Projection(_) => OpKind::Projection,
            CreateOp::Listener(_) => OpKind::Listener,
            CreateOp::ConditionalBranch(_) => OpKind::ConditionalBranch,
            CreateOp::RepeaterCreate(_) => OpKind::RepeaterCreate,
            CreateOp::Defer(_) => OpKind::Defer,
            CreateOp::DeclareLet(_) => OpKind::DeclareLet,
            CreateOp::Pipe(_) => OpKind::Pipe,
            CreateOp::StoredCallback(_) => OpKind::StoredCallback,
            CreateOp::Variable(_) => OpKind::Variable,
        }
    }

    /// Xref of the thing this op declares, if it declares one.
    pub fn xref(&self) -> Option<XrefId> {
        match self {
            CreateOp::ElementStart(op) => Some(op.xref),
            CreateOp::Template(op) => Some(op.xref),
            CreateOp::Text(op) => Some(op.xref),
            CreateOp::Projection(op) => Some(op.xref),
            CreateOp::ConditionalBranch(op) => Some(op.xref),
            CreateOp::RepeaterCreate(op) => Some(op.xref),
            CreateOp::Defer(op) => Some(op.xref),
            CreateOp::DeclareLet(op) => Some(op.xref),
            CreateOp::Pipe(op) => Some(op.xref),
            CreateOp::StoredCallback(op) => Some(op.xref),
            CreateOp::Variable(op) => Some(op.xref),
            CreateOp::ElementEnd(_) | CreateOp::Listener(_) => None,
        }
    }

    /// Slot handle and number of slots for ops that consume data slots.
    pub fn slot_handle_mut(&mut self) -> Option<(&mut SlotHandle, usize)> {
        match self {
            CreateOp::ElementStart(op) => Some((&mut op.handle, 1)),
            CreateOp::Template(op) => Some((&mut op.handle, 1)),
            CreateOp::Text(op) => Some((&mut op.handle, 1)),
            CreateOp::Projection(op) => Some((&mut op.handle, 1)),
            CreateOp::ConditionalBranch(op) => Some((&mut op.handle, 1)),
            // The `@empty` view takes a second slot.
            CreateOp::RepeaterCreate(op) => Some((&mut op.handle, if op.empty_view.is_some() { 2 } else { 1 })),
            CreateOp::Defer(op) => Some((&mut op.handle, 2)),
            CreateOp::DeclareLet(op) => Some((&mut op.handle, 1)),
            CreateOp::Pipe(op) => Some((&mut op.handle, 1)),
            CreateOp::StoredCallback(op) => Some((&mut op.handle, 1)),
            CreateOp::ElementEnd(_) | CreateOp::Listener(_) | CreateOp::Variable(_) => None,
        }
    }

    /// Views declared directly by this op, in slot order.
    pub fn child_views(&self) -> Vec<XrefId> {
        match self {
            CreateOp::Template(op) => vec![op.xref],
            CreateOp::ConditionalBranch(op) => vec![op.xref],
            CreateOp::RepeaterCreate(op) => std::iter::once(op.xref).chain(op.empty_view).collect(),
            CreateOp::Projection(op) => op.fallback_view.into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Visits expressions of this op. Listener handlers are visited with
    /// [`VisitorContextFlag::IN_CHILD_OPERATION`].
    pub fn visit_expressions(&self, visitor: &mut dyn FnMut(&Expression, VisitorContextFlag), flags: VisitorContextFlag) {
        match self {
            CreateOp::Listener(op) => {
                for handler_op in op.handler_ops.iter() {
                    handler_op.visit_expressions(visitor, flags | VisitorContextFlag::IN_CHILD_OPERATION);
                }
            }
            CreateOp::RepeaterCreate(op) => visit_expressions_in_expression(&op.track, visitor, flags),
            CreateOp::Variable(op) => op.visit_expressions(visitor, flags),
            _ => {}
        }
    }

    pub fn transform_expressions(
        &mut self,
        transform: &mut dyn FnMut(Expression, VisitorContextFlag) -> Expression,
        flags: VisitorContextFlag,
    ) {
        match self {
            CreateOp::Listener(op) => {
                for handler_op in op.handler_ops.iter_mut() {
                    handler_op.transform_expressions(transform, flags | VisitorContextFlag::IN_CHILD_OPERATION);
                }
            }
            CreateOp::RepeaterCreate(op) => transform_expression_in_place(&mut op.track, transform, flags),
            CreateOp::Variable(op) => op.transform_expressions(transform, flags),
            _ => {}
        }
    }
}
