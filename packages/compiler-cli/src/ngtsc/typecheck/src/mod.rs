// TypeCheck Source Module

pub mod checker;
pub mod comments;
pub mod context;
pub mod diagnostics;
pub mod dom;
pub mod environment;
pub mod error;
pub mod expression;
pub mod host_bindings;
pub mod oob;
mod ops;
mod resolver;
mod scope;
pub mod tcb_expr;
pub mod tcb_util;
pub mod type_check_block;

// Re-exports
pub use checker::MemberChecker;
pub use context::{
    bind_template, translate_diagnostics, ComponentDescription, ComponentRegistration, GeneratedTcb, TypeCheckingContext,
};
pub use diagnostics::{DiagnosticCategory, DiagnosticCode, DiagnosticSource, TemplateDiagnostic};
pub use dom::{DomSchemaChecker, RegistryDomSchemaChecker};
pub use environment::Environment;
pub use error::{TcbError, TcbResult};
pub use host_bindings::{create_host_element, HostBindingsMeta};
pub use oob::OutOfBandDiagnosticRecorder;
pub use tcb_util::{find_source_location, source_of_offset};
pub use type_check_block::generate_type_check_block;
