// TypeCheck Diagnostics
//
// Diagnostics reported against template and host binding sources.

use std::fmt;

use ng_template_compiler::expression_parser::AbsoluteSourceSpan;
use ng_template_compiler::parse_util::ParseSourceFile;
use serde::Serialize;

use crate::ngtsc::diagnostics::{ng_error_code, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Warning => write!(f, "warning"),
        }
    }
}

/// Which source a diagnostic's span points into. Template diagnostics sort
/// before host binding diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSource {
    Template,
    Host,
}

/// Serialized in its printed form, `NG8004` or `TS2339`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum DiagnosticCode {
    /// Reported by the TCB generator itself.
    Angular(ErrorCode),
    /// Reported by the type checker of the generated code.
    TypeScript(i32),
}

impl DiagnosticCode {
    /// The code as it would appear on a `ts.Diagnostic`.
    pub fn numeric(&self) -> i32 {
        match self {
            DiagnosticCode::Angular(code) => ng_error_code(*code),
            DiagnosticCode::TypeScript(code) => *code,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::Angular(code) => write!(f, "{}", code),
            DiagnosticCode::TypeScript(code) => write!(f, "TS{}", code),
        }
    }
}

impl From<DiagnosticCode> for String {
    fn from(code: DiagnosticCode) -> String {
        code.to_string()
    }
}

/// A diagnostic located in a component's template or host bindings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDiagnostic {
    /// Id of the TCB the diagnostic belongs to.
    pub template_id: String,
    pub code: DiagnosticCode,
    pub category: DiagnosticCategory,
    pub message: String,
    pub span: AbsoluteSourceSpan,
    pub source: DiagnosticSource,
}

impl TemplateDiagnostic {
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// `url:line:col - error NG8004: message`, with the position taken from
    /// `file` when available.
    pub fn format(&self, file: Option<&ParseSourceFile>) -> String {
        let position = match file {
            Some(file) => format!("{}:{}", file.url, file.location(self.span.start)),
            None => format!("{}@{}", self.template_id, self.span.start),
        };
        format!("{} - {} {}: {}", position, self.category, self.code, self.message)
    }
}

pub fn make_template_diagnostic(
    template_id: &str,
    source: DiagnosticSource,
    span: AbsoluteSourceSpan,
    category: DiagnosticCategory,
    code: DiagnosticCode,
    message: impl Into<String>,
) -> TemplateDiagnostic {
    TemplateDiagnostic {
        template_id: template_id.to_string(),
        code,
        category,
        message: message.into(),
        span,
        source,
    }
}
