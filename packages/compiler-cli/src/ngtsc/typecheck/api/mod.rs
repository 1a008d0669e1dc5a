// TypeCheck API Module

pub mod api;
pub mod checker;

// Re-exports
pub use api::{
    ComponentClass, InputMapping, OutputMapping, PipeMeta, SchemaMetadata, TcbGenericContextBehavior,
    TemplateGuardKind, TemplateGuardMeta, TypeCheckBlockMetadata, TypeCheckableDirectiveMeta, TypeCheckingConfig,
    TypeParameter,
};
pub use checker::{HostDiagnostic, HostTypeChecker};
