// TypeCheck Errors

use ng_template_compiler::CompilerError;
use thiserror::Error;

/// Failures that abort generation of a type-check block. Problems in the
/// template itself are reported as diagnostics instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TcbError {
    /// The expression translator met a node it has no lowering for.
    #[error("Unexpected AST in type-check block: {0}")]
    UnexpectedAst(String),

    #[error("Unrecognized for loop context variable {0}")]
    UnknownLoopVariable(String),

    /// The loop item did not resolve to a plain identifier.
    #[error("Could not resolve for loop variable {0} to an identifier")]
    UnresolvedLoopItem(String),

    /// A scope lookup for an element, template or directive found no op.
    #[error("Could not resolve {0} in the type-check scope")]
    Unresolved(String),

    #[error("Host binding error: {0}")]
    HostBinding(String),

    #[error(transparent)]
    Compiler(#[from] CompilerError),
}

pub type TcbResult<T> = std::result::Result<T, TcbError>;
