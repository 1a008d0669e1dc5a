//! IR Expressions
//!
//! One closed expression type for the whole pipeline: plain output
//! expressions plus the logical IR expressions that phases resolve away.

use crate::expression_parser::ast::{is_assignment_operation, LiteralValue};
use crate::template::pipeline::ir::enums::VisitorContextFlag;
use crate::template::pipeline::ir::handle::XrefId;

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapEntry {
    /// `None` for `...spread` entries.
    pub key: Option<String>,
    pub quoted: bool,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Read of a free identifier of the generated code (`$event`, `$item`).
    ReadVar(String),
    ReadProp { receiver: Box<Expression>, name: String },
    ReadKey { receiver: Box<Expression>, index: Box<Expression> },
    Invoke { receiver: Box<Expression>, args: Vec<Expression> },
    Literal(LiteralValue),
    LiteralArray(Vec<Expression>),
    LiteralMap(Vec<LiteralMapEntry>),
    /// Interpolated attribute value, `strings.len() == expressions.len() + 1`.
    Interpolation { strings: Vec<String>, expressions: Vec<Expression> },
    TemplateLiteral { elements: Vec<String>, expressions: Vec<Expression> },
    TaggedTemplate { tag: Box<Expression>, elements: Vec<String>, expressions: Vec<Expression> },
    RegularExpression { body: String, flags: Option<String> },
    Binary { operator: String, lhs: Box<Expression>, rhs: Box<Expression> },
    Unary { operator: String, expr: Box<Expression> },
    Not(Box<Expression>),
    TypeOf(Box<Expression>),
    Void(Box<Expression>),
    Parens(Box<Expression>),
    Spread(Box<Expression>),
    Conditional { condition: Box<Expression>, true_case: Box<Expression>, false_case: Box<Expression> },
    ArrowFn { params: Vec<String>, body: Box<Expression> },

    /// Unresolved read of a template name.
    LexicalRead(String),
    /// The context object of a view.
    Context(XrefId),
    /// Context of the view `steps` levels above the current one.
    NextContext(usize),
    /// Local reference `offset` on the element-like op `target`.
    Reference { target: XrefId, offset: usize },
    ReadVariable(XrefId),
    /// Stores the value of the `@let` declared by `target` and evaluates to it.
    StoreLet { target: XrefId, value: Box<Expression> },
    /// Reads a `@let` value stored by another view.
    ContextLetReference(XrefId),
    PipeBinding { target: XrefId, name: String, args: Vec<Expression> },
    SafePropertyRead { receiver: Box<Expression>, name: String },
    SafeKeyedRead { receiver: Box<Expression>, index: Box<Expression> },
    SafeInvoke { receiver: Box<Expression>, args: Vec<Expression> },
    /// An arrow function lifted into a callback definition.
    Callback(XrefId),
    /// A callback kept in the slot of a `StoredCallback` op.
    StoredCallback(XrefId),
    Empty,
}

impl Expression {
    pub fn read_prop(receiver: Expression, name: impl Into<String>) -> Expression {
        Expression::ReadProp { receiver: Box::new(receiver), name: name.into() }
    }

    pub fn undefined() -> Expression {
        Expression::Literal(LiteralValue::Undefined)
    }

    /// True for the logical expressions that must be gone before emission.
    pub fn is_ir_expression(&self) -> bool {
        matches!(
            self,
            Expression::LexicalRead(_)
                | Expression::Context(_)
                | Expression::NextContext(_)
                | Expression::Reference { .. }
                | Expression::ReadVariable(_)
                | Expression::StoreLet { .. }
                | Expression::ContextLetReference(_)
                | Expression::PipeBinding { .. }
                | Expression::SafePropertyRead { .. }
                | Expression::SafeKeyedRead { .. }
                | Expression::SafeInvoke { .. }
                | Expression::Callback(_)
                | Expression::StoredCallback(_)
                | Expression::Empty
        )
    }

    /// Direct sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::ReadProp { receiver, .. } | Expression::SafePropertyRead { receiver, .. } => {
                vec![&**receiver]
            }
            Expression::ReadKey { receiver, index } | Expression::SafeKeyedRead { receiver, index } => {
                vec![&**receiver, &**index]
            }
            Expression::Invoke { receiver, args } | Expression::SafeInvoke { receiver, args } => {
                std::iter::once(&**receiver).chain(args.iter()).collect()
            }
            Expression::LiteralArray(entries) => entries.iter().collect(),
            Expression::LiteralMap(entries) => entries.iter().map(|e| &e.value).collect(),
            Expression::Interpolation { expressions, .. } | Expression::TemplateLiteral { expressions, .. } => {
                expressions.iter().collect()
            }
            Expression::TaggedTemplate { tag, expressions, .. } => {
                std::iter::once(&**tag).chain(expressions.iter()).collect()
            }
            Expression::Binary { lhs, rhs, .. } => vec![&**lhs, &**rhs],
            Expression::Unary { expr, .. }
            | Expression::Not(expr)
            | Expression::TypeOf(expr)
            | Expression::Void(expr)
            | Expression::Parens(expr)
            | Expression::Spread(expr) => vec![&**expr],
            Expression::Conditional { condition, true_case, false_case } => {
                vec![&**condition, &**true_case, &**false_case]
            }
            Expression::ArrowFn { body, .. } => vec![&**body],
            Expression::StoreLet { value, .. } => vec![&**value],
            Expression::PipeBinding { args, .. } => args.iter().collect(),
            Expression::ReadVar(_)
            | Expression::Literal(_)
            | Expression::RegularExpression { .. }
            | Expression::LexicalRead(_)
            | Expression::Context(_)
            | Expression::NextContext(_)
            | Expression::Reference { .. }
            | Expression::ReadVariable(_)
            | Expression::ContextLetReference(_)
            | Expression::Callback(_)
            | Expression::StoredCallback(_)
            | Expression::Empty => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Expression::ReadProp { receiver, .. } | Expression::SafePropertyRead { receiver, .. } => {
                vec![&mut **receiver]
            }
            Expression::ReadKey { receiver, index } | Expression::SafeKeyedRead { receiver, index } => {
                vec![&mut **receiver, &mut **index]
            }
            Expression::Invoke { receiver, args } | Expression::SafeInvoke { receiver, args } => {
                std::iter::once(&mut **receiver).chain(args.iter_mut()).collect()
            }
            Expression::LiteralArray(entries) => entries.iter_mut().collect(),
            Expression::LiteralMap(entries) => entries.iter_mut().map(|e| &mut e.value).collect(),
            Expression::Interpolation { expressions, .. } | Expression::TemplateLiteral { expressions, .. } => {
                expressions.iter_mut().collect()
            }
            Expression::TaggedTemplate { tag, expressions, .. } => {
                std::iter::once(&mut **tag).chain(expressions.iter_mut()).collect()
            }
            Expression::Binary { lhs, rhs, .. } => vec![&mut **lhs, &mut **rhs],
            Expression::Unary { expr, .. }
            | Expression::Not(expr)
            | Expression::TypeOf(expr)
            | Expression::Void(expr)
            | Expression::Parens(expr)
            | Expression::Spread(expr) => vec![&mut **expr],
            Expression::Conditional { condition, true_case, false_case } => {
                vec![&mut **condition, &mut **true_case, &mut **false_case]
            }
            Expression::ArrowFn { body, .. } => vec![&mut **body],
            Expression::StoreLet { value, .. } => vec![&mut **value],
            Expression::PipeBinding { args, .. } => args.iter_mut().collect(),
            Expression::ReadVar(_)
            | Expression::Literal(_)
            | Expression::RegularExpression { .. }
            | Expression::LexicalRead(_)
            | Expression::Context(_)
            | Expression::NextContext(_)
            | Expression::Reference { .. }
            | Expression::ReadVariable(_)
            | Expression::ContextLetReference(_)
            | Expression::Callback(_)
            | Expression::StoredCallback(_)
            | Expression::Empty => Vec::new(),
        }
    }

    /// Whether evaluating this expression may do more than produce a value.
    pub fn has_side_effects(&self) -> bool {
        match self {
            Expression::Invoke { .. }
            | Expression::SafeInvoke { .. }
            | Expression::TaggedTemplate { .. }
            | Expression::PipeBinding { .. }
            | Expression::StoreLet { .. } => true,
            Expression::Binary { operator, .. } if is_assignment_operation(operator) => true,
            // The body only runs when the function is called.
            Expression::ArrowFn { .. } => false,
            _ => self.children().into_iter().any(Expression::has_side_effects),
        }
    }
}

/// Visits `expr` and every nested expression, parents before children.
pub fn visit_expressions_in_expression(
    expr: &Expression,
    visitor: &mut dyn FnMut(&Expression, VisitorContextFlag),
    flags: VisitorContextFlag,
) {
    visitor(expr, flags);
    for child in expr.children() {
        visit_expressions_in_expression(child, visitor, flags);
    }
}

/// Rebuilds `expr` bottom-up: children are transformed before the expression
/// containing them is handed to `transform`.
pub fn transform_expressions_in_expression(
    mut expr: Expression,
    transform: &mut dyn FnMut(Expression, VisitorContextFlag) -> Expression,
    flags: VisitorContextFlag,
) -> Expression {
    for child in expr.children_mut() {
        let taken = std::mem::replace(child, Expression::Empty);
        *child = transform_expressions_in_expression(taken, transform, flags);
    }
    transform(expr, flags)
}

/// In-place variant of [`transform_expressions_in_expression`].
pub fn transform_expression_in_place(
    slot: &mut Expression,
    transform: &mut dyn FnMut(Expression, VisitorContextFlag) -> Expression,
    flags: VisitorContextFlag,
) {
    let taken = std::mem::replace(slot, Expression::Empty);
    *slot = transform_expressions_in_expression(taken, transform, flags);
}
