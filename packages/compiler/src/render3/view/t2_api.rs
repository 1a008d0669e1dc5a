//! Binder API
//!
//! Types shared by the template binder and its consumers (type checking and the
//! IR pipeline).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::parse_util::ParseSourceSpan;
use crate::render3::r3_ast::{Element, Template};

/// Metadata needed to match a directive against template elements.
pub trait DirectiveMeta {
    /// Class name, used in diagnostics.
    fn name(&self) -> &str;
    /// The selector, or `None` for directives only used as host directives.
    fn selector(&self) -> Option<&str>;
    fn is_component(&self) -> bool;
    /// Names this directive can be referenced by through `#ref="name"`.
    fn export_as(&self) -> &[String];
    /// Public names of the inputs this directive claims.
    fn input_binding_names(&self) -> Vec<&str>;
    /// Public names of the outputs this directive claims.
    fn output_binding_names(&self) -> Vec<&str>;
    /// Host directives applied alongside this directive, already narrowed to
    /// their exposed inputs and outputs.
    fn host_directives(&self) -> Vec<Arc<Self>>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Element,
    Template,
}

/// Identity of an element or template inside one bound template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
}

impl NodeKey {
    fn from_span(kind: NodeKind, span: &ParseSourceSpan) -> Self {
        NodeKey { kind, start: span.start, end: span.end }
    }

    pub fn of_element(element: &Element) -> Self {
        NodeKey::from_span(NodeKind::Element, &element.source_span)
    }

    pub fn of_template(template: &Template) -> Self {
        NodeKey::from_span(NodeKind::Template, &template.source_span)
    }
}

/// What a `#ref` resolves to.
#[derive(Debug)]
pub enum ReferenceTarget<D> {
    Element(NodeKey),
    Template(NodeKey),
    Directive { directive: Arc<D>, node: NodeKey },
}

impl<D> Clone for ReferenceTarget<D> {
    fn clone(&self) -> Self {
        match self {
            ReferenceTarget::Element(key) => ReferenceTarget::Element(*key),
            ReferenceTarget::Template(key) => ReferenceTarget::Template(*key),
            ReferenceTarget::Directive { directive, node } => {
                ReferenceTarget::Directive { directive: Arc::clone(directive), node: *node }
            }
        }
    }
}
