use std::fmt;

/// Angular error codes reported while type-checking templates.
///
/// Rendered as `NG` followed by the four-digit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An element name failed validation against the DOM schema.
    SchemaInvalidElement = 8001,

    /// An element's attribute name failed validation against the DOM schema.
    SchemaInvalidAttribute = 8002,

    /// No matching directive was found for a `#ref="target"` expression.
    MissingReferenceTarget = 8003,

    /// No matching pipe was found for a pipe used in a binding.
    MissingPipe = 8004,

    /// The left-hand side of an assignment expression was a template variable:
    ///
    /// ```html
    /// <ng-template let-something>
    ///   <button (click)="something = ...">...</button>
    /// </ng-template>
    /// ```
    WriteToReadOnlyVariable = 8005,

    /// A template variable was declared twice on the same template.
    DuplicateVariableDeclaration = 8006,

    /// The input and output halves of a two-way binding go to different targets.
    SplitTwoWayBinding = 8007,

    /// A directive usage isn't binding to one or more required inputs.
    MissingRequiredInputs = 8008,

    /// The tracking expression of a `@for` block reads a template symbol other
    /// than the loop item or `$index`:
    ///
    /// ```angular-html
    /// <ng-template let-ref>
    ///   @for (item of items; track ref) {}
    /// </ng-template>
    /// ```
    IllegalForLoopTrackAccess = 8009,

    /// The trigger of a `@defer` block cannot reach its trigger element,
    /// either because it doesn't exist or it's in a different view.
    InaccessibleDeferredTriggerElement = 8010,

    /// A pipe imported through `@Component.deferredImports` is used outside
    /// of a `@defer` block.
    DeferredPipeUsedEagerly = 8012,

    /// A directive or component imported through `@Component.deferredImports`
    /// matches an element outside of a `@defer` block.
    DeferredDirectiveUsedEagerly = 8013,

    /// An expression is trying to write to an `@let` declaration.
    IllegalLetWrite = 8015,

    /// An expression is trying to read an `@let` before it has been defined.
    LetUsedBeforeDefinition = 8016,

    /// A `@let` declaration conflicts with another symbol in the same scope.
    ConflictingLetDeclaration = 8017,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NG{:04}", self.code())
    }
}
