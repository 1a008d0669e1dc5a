//! Shared Operations
//!
//! Operations valid in both create and update lists.

use crate::template::pipeline::ir::enums::{VariableFlags, VisitorContextFlag};
use crate::template::pipeline::ir::expression::{
    transform_expression_in_place, visit_expressions_in_expression, Expression,
};
use crate::template::pipeline::ir::handle::XrefId;
use crate::template::pipeline::ir::variable::SemanticVariable;

/// Declares and initializes a semantic variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableOp {
    /// Identifies this variable to `ReadVariable` expressions.
    pub xref: XrefId,
    pub variable: SemanticVariable,
    pub initializer: Expression,
    pub flags: VariableFlags,
}

impl VariableOp {
    pub fn new(xref: XrefId, variable: SemanticVariable, initializer: Expression, flags: VariableFlags) -> Self {
        VariableOp { xref, variable, initializer, flags }
    }

    pub(crate) fn visit_expressions(&self, visitor: &mut dyn FnMut(&Expression, VisitorContextFlag), flags: VisitorContextFlag) {
        visit_expressions_in_expression(&self.initializer, visitor, flags);
    }

    pub(crate) fn transform_expressions(
        &mut self,
        transform: &mut dyn FnMut(Expression, VisitorContextFlag) -> Expression,
        flags: VisitorContextFlag,
    ) {
        transform_expression_in_place(&mut self.initializer, transform, flags);
    }
}

/// Evaluates an expression for its effect, or returns it when `is_return`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOp {
    pub expression: Expression,
    pub is_return: bool,
}

impl StatementOp {
    pub fn expression(expression: Expression) -> Self {
        StatementOp { expression, is_return: false }
    }

    pub fn returning(expression: Expression) -> Self {
        StatementOp { expression, is_return: true }
    }
}
