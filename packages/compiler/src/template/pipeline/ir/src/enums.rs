//! IR Enums
//!
//! Kinds and flags shared by IR operations and expressions.

use bitflags::bitflags;

/// Distinguishes the operations of the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    ElementStart,
    ElementEnd,
    Template,
    Text,
    Projection,
    Listener,
    ConditionalBranch,
    RepeaterCreate,
    Defer,
    DeclareLet,
    Pipe,
    StoredCallback,
    Variable,
    Statement,
    Property,
    InterpolateText,
    StoreLet,
    Conditional,
    Repeater,
    DeferWhen,
}

/// How an embedded view created by a `Template` op came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// `<ng-template>` written in the template.
    NgTemplate,
    /// Structural directive shorthand (`*ngIf`) on an element.
    Structural,
    /// Sub-view of a `@defer` block.
    Block,
}

/// Distinguishes between the different kinds of semantic variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticVariableKind {
    /// Context of a particular view.
    Context,
    /// A named identifier visible to template expressions.
    Identifier,
    /// An identifier whose expression is inlined at every use.
    Alias,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VariableFlags: u8 {
        const NONE = 0b0000;
        /// Inline the initializer at every read instead of declaring the variable.
        const ALWAYS_INLINE = 0b0001;
    }
}

bitflags! {
    /// Flags describing where an expression was found by a visitor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VisitorContextFlag: u32 {
        const NONE = 0b0000;
        /// Inside the handler ops of a listener or the ops of a callback.
        const IN_CHILD_OPERATION = 0b0001;
    }
}
