//! Update Operations
//!
//! Operations run on every change detection pass of a view.

use crate::parse_util::ParseSourceSpan;
use crate::render3::r3_ast::BindingType;
use crate::template::pipeline::ir::enums::{OpKind, VisitorContextFlag};
use crate::template::pipeline::ir::expression::{
    transform_expression_in_place, visit_expressions_in_expression, Expression,
};
use crate::template::pipeline::ir::handle::XrefId;
use crate::template::pipeline::ir::ops::shared::{StatementOp, VariableOp};

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Property(PropertyOp),
    InterpolateText(InterpolateTextOp),
    StoreLet(StoreLetOp),
    Conditional(ConditionalOp),
    Repeater(RepeaterOp),
    DeferWhen(DeferWhenOp),
    Variable(VariableOp),
    Statement(StatementOp),
}

/// Binding of an expression to a property, attribute, class or style of an
/// element or template.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOp {
    pub target: XrefId,
    pub name: String,
    pub binding_kind: BindingType,
    pub expression: Expression,
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
}

/// Interpolated text content of a `Text` op.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolateTextOp {
    pub target: XrefId,
    pub strings: Vec<String>,
    pub expressions: Vec<Expression>,
    pub source_span: ParseSourceSpan,
}

/// Evaluates the value of a `@let` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreLetOp {
    /// The `DeclareLet` op of the declaration.
    pub target: XrefId,
    pub declared_name: String,
    pub value: Expression,
    pub source_span: ParseSourceSpan,
}

/// One branch of a `Conditional` op.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalCase {
    /// `None` for `@else` and `@default`.
    pub expr: Option<Expression>,
    /// View rendered when this case matches.
    pub target: XrefId,
}

/// Picks which branch view of an `@if` or `@switch` is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalOp {
    /// First branch view.
    pub target: XrefId,
    /// Switch value; `None` for `@if`, whose case expressions are tests.
    pub test: Option<Expression>,
    pub conditions: Vec<ConditionalCase>,
    pub source_span: ParseSourceSpan,
}

/// Feeds the collection of a `@for` block.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterOp {
    pub target: XrefId,
    pub collection: Expression,
    pub source_span: ParseSourceSpan,
}

/// `on when` / `prefetch on when` condition of a `@defer` block.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferWhenOp {
    pub target: XrefId,
    pub expression: Expression,
    pub prefetch: bool,
    pub source_span: ParseSourceSpan,
}

impl UpdateOp {
    pub fn kind(&self) -> OpKind {
        match self {
            UpdateOp::Property(_) => OpKind::Property,
            UpdateOp::InterpolateText(_) => OpKind::InterpolateText,
            UpdateOp::StoreLet(_) => OpKind::StoreLet,
            UpdateOp::Conditional(_) => OpKind::Conditional,
            UpdateOp::Repeater(_) => OpKind::Repeater,
            UpdateOp::DeferWhen(_) => OpKind::DeferWhen,
            UpdateOp::Variable(_) => OpKind::Variable,
            UpdateOp::Statement(_) => OpKind::Statement,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableOp> {
        match self {
            UpdateOp::Variable(op) => Some(op),
            _ => None,
        }
    }

    pub fn visit_expressions(&self, visitor: &mut dyn FnMut(&Expression, VisitorContextFlag), flags: VisitorContextFlag) {
        match self {
            UpdateOp::Property(op) => visit_expressions_in_expression(&op.expression, visitor, flags),
            UpdateOp::InterpolateText(op) => {
                for expr in &op.expressions {
                    visit_expressions_in_expression(expr, visitor, flags);
                }
            }
            UpdateOp::StoreLet(op) => visit_expressions_in_expression(&op.value, visitor, flags),
            UpdateOp::Conditional(op) => {
                if let Some(test) = &op.test {
                    visit_expressions_in_expression(test, visitor, flags);
                }
                for case in &op.conditions {
                    if let Some(expr) = &case.expr {
                        visit_expressions_in_expression(expr, visitor, flags);
                    }
                }
            }
            UpdateOp::Repeater(op) => visit_expressions_in_expression(&op.collection, visitor, flags),
            UpdateOp::DeferWhen(op) => visit_expressions_in_expression(&op.expression, visitor, flags),
            UpdateOp::Variable(op) => op.visit_expressions(visitor, flags),
            UpdateOp::Statement(op) => visit_expressions_in_expression(&op.expression, visitor, flags),
        }
    }

    pub fn transform_expressions(
        &mut self,
        transform: &mut dyn FnMut(Expression, VisitorContextFlag) -> Expression,
        flags: VisitorContextFlag,
    ) {
        match self {
            UpdateOp::Property(op) => transform_expression_in_place(&mut op.expression, transform, flags),
            UpdateOp::InterpolateText(op) => {
                for expr in op.expressions.iter_mut() {
                    transform_expression_in_place(expr, transform, flags);
                }
            }
            UpdateOp::StoreLet(op) => transform_expression_in_place(&mut op.value, transform, flags),
            UpdateOp::Conditional(op) => {
                if let Some(test) = op.test.as_mut() {
                    transform_expression_in_place(test, transform, flags);
                }
                for case in op.conditions.iter_mut() {
                    if let Some(expr) = case.expr.as_mut() {
                        transform_expression_in_place(expr, transform, flags);
                    }
                }
            }
            UpdateOp::Repeater(op) => transform_expression_in_place(&mut op.collection, transform, flags),
            UpdateOp::DeferWhen(op) => transform_expression_in_place(&mut op.expression, transform, flags),
            UpdateOp::Variable(op) => op.transform_expressions(transform, flags),
            UpdateOp::Statement(op) => transform_expression_in_place(&mut op.expression, transform, flags),
        }
    }
}
