// TcbExpr
//
// A fragment of generated TypeScript plus the annotations that map it back
// to the template.

use std::fmt;

use ng_template_compiler::expression_parser::AbsoluteSourceSpan;

use super::comments::{ignore_comment, span_comment, ExpressionIdentifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcbExpr {
    source: String,
    span: Option<AbsoluteSourceSpan>,
    identifier: Option<ExpressionIdentifier>,
    ignore_diagnostics: bool,
}

impl TcbExpr {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), span: None, identifier: None, ignore_diagnostics: false }
    }

    /// Attaches (or replaces) the template span of this expression.
    pub fn with_span(mut self, span: AbsoluteSourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_identifier(mut self, identifier: ExpressionIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Diagnostics whose innermost span lies within this expression are dropped.
    pub fn mark_ignore_diagnostics(mut self) -> Self {
        self.ignore_diagnostics = true;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn span(&self) -> Option<AbsoluteSourceSpan> {
        self.span
    }

    pub fn identifier(&self) -> Option<ExpressionIdentifier> {
        self.identifier
    }

    pub fn ignores_diagnostics(&self) -> bool {
        self.ignore_diagnostics
    }

    /// `source /*T:ID*/ /*D:ignore*/ /*start,end*/`
    pub fn print(&self) -> String {
        let mut out = self.source.clone();
        if let Some(identifier) = self.identifier {
            out.push(' ');
            out.push_str(&identifier.to_string());
        }
        if self.ignore_diagnostics {
            out.push(' ');
            out.push_str(&ignore_comment());
        }
        if let Some(span) = self.span {
            out.push(' ');
            out.push_str(&span_comment(span));
        }
        out
    }

    /// A new parenthesized expression. The annotations of `self` move into
    /// the source text and the result carries none of its own.
    pub fn wrap_for_diagnostics(&self) -> TcbExpr {
        TcbExpr::new(format!("({})", self.print()))
    }

    /// Same shape as [`TcbExpr::wrap_for_diagnostics`], used where the parentheses
    /// only guard operator precedence.
    pub fn wrap_for_type_checker(&self) -> TcbExpr {
        TcbExpr::new(format!("({})", self.print()))
    }

    pub fn into_source(self) -> String {
        self.source
    }
}

impl fmt::Display for TcbExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

impl From<String> for TcbExpr {
    fn from(source: String) -> Self {
        TcbExpr::new(source)
    }
}

impl From<&str> for TcbExpr {
    fn from(source: &str) -> Self {
        TcbExpr::new(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_print_annotations_in_order() {
        let expr = TcbExpr::new("_t1")
            .with_span(AbsoluteSourceSpan::new(0, 5))
            .with_identifier(ExpressionIdentifier::Directive)
            .mark_ignore_diagnostics();

        assert_eq!(expr.print(), "_t1 /*T:DIR*/ /*D:ignore*/ /*0,5*/");
        let wrapped = expr.wrap_for_diagnostics();
        assert_eq!(wrapped.source(), "(_t1 /*T:DIR*/ /*D:ignore*/ /*0,5*/)");
        assert_eq!(wrapped.span(), None);
        assert!(!wrapped.ignores_diagnostics());
        assert_eq!(wrapped.with_span(AbsoluteSourceSpan::new(0, 6)).print(), "(_t1 /*T:DIR*/ /*D:ignore*/ /*0,5*/) /*0,6*/");
    }

    #[test]
    fn should_replace_span() {
        let expr = TcbExpr::new("a").with_span(AbsoluteSourceSpan::new(0, 1)).with_span(AbsoluteSourceSpan::new(2, 3));
        assert_eq!(expr.print(), "a /*2,3*/");
    }
}
