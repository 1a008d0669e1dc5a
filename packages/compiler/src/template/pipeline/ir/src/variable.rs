//! IR Variables

use crate::template::pipeline::ir::enums::SemanticVariableKind;
use crate::template::pipeline::ir::expression::Expression;
use crate::template::pipeline::ir::handle::XrefId;

/// Marker used in a view's context variables for names bound to the whole
/// context object rather than one of its properties (`@if (x; as alias)`).
pub const CTX_REF: &str = "CTX_REF_MARKER";

/// Meaning of a variable declared by a `Variable` op.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticVariable {
    /// The context of view `view`.
    Context { view: XrefId },
    /// A template identifier. `local` variables are declared in the same view as
    /// their reads; the rest are inherited from an ancestor view.
    Identifier { identifier: String, local: bool },
    /// An identifier replaced by `expression` wherever it is read.
    Alias { identifier: String },
}

impl SemanticVariable {
    pub fn kind(&self) -> SemanticVariableKind {
        match self {
            SemanticVariable::Context { .. } => SemanticVariableKind::Context,
            SemanticVariable::Identifier { .. } => SemanticVariableKind::Identifier,
            SemanticVariable::Alias { .. } => SemanticVariableKind::Alias,
        }
    }

    /// Template name this variable answers to, if any.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            SemanticVariable::Context { .. } => None,
            SemanticVariable::Identifier { identifier, .. } | SemanticVariable::Alias { identifier } => {
                Some(identifier)
            }
        }
    }
}

/// Alias declared on a view, e.g. `$first` inside a `@for` body.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasVariable {
    pub identifier: String,
    pub expression: Expression,
}

impl AliasVariable {
    pub fn new(identifier: impl Into<String>, expression: Expression) -> Self {
        AliasVariable { identifier: identifier.into(), expression }
    }
}
