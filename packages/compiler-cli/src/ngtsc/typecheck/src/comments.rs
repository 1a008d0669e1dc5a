// TypeCheck Comments
//
// Trailing comments attached to generated code: source spans, expression
// identifiers and the ignore-for-diagnostics marker.

use std::fmt;

use ng_template_compiler::expression_parser::AbsoluteSourceSpan;
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

pub const IGNORE_FOR_DIAGNOSTICS_MARKER: &str = "D:ignore";

/// Leading comment of the `true` guarding the host binding section.
pub const HOST_BINDINGS_MARKER: &str = "host";

static SPAN_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+),(\d+)$").expect("span comment pattern is valid"));

/// Tags for generated expressions that tooling looks up by kind rather than by span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionIdentifier {
    Directive,
    ComponentCompletion,
    EventParameter,
    VariableAsExpression,
}

impl ExpressionIdentifier {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpressionIdentifier::Directive => "DIR",
            ExpressionIdentifier::ComponentCompletion => "COMPCOMP",
            ExpressionIdentifier::EventParameter => "EP",
            ExpressionIdentifier::VariableAsExpression => "VAE",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "DIR" => Some(ExpressionIdentifier::Directive),
            "COMPCOMP" => Some(ExpressionIdentifier::ComponentCompletion),
            "EP" => Some(ExpressionIdentifier::EventParameter),
            "VAE" => Some(ExpressionIdentifier::VariableAsExpression),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/*T:{}*/", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcbComment {
    Span(AbsoluteSourceSpan),
    Identifier(ExpressionIdentifier),
    IgnoreForDiagnostics,
    Other(String),
}

impl TcbComment {
    pub fn parse(text: &str) -> TcbComment {
        if text == IGNORE_FOR_DIAGNOSTICS_MARKER {
            return TcbComment::IgnoreForDiagnostics;
        }
        if let Some(identifier) = text.strip_prefix("T:").and_then(ExpressionIdentifier::parse) {
            return TcbComment::Identifier(identifier);
        }
        if let Some(caps) = SPAN_COMMENT.captures(text) {
            if let (Ok(start), Ok(end)) = (caps[1].parse(), caps[2].parse()) {
                return TcbComment::Span(AbsoluteSourceSpan::new(start, end));
            }
        }
        TcbComment::Other(text.to_string())
    }
}

pub fn span_comment(span: AbsoluteSourceSpan) -> String {
    format!("/*{},{}*/", span.start, span.end)
}

pub fn ignore_comment() -> String {
    format!("/*{}*/", IGNORE_FOR_DIAGNOSTICS_MARKER)
}

/// Comments trailing one expression: at most an identifier, the ignore
/// marker and a span.
pub type TrailingComments = SmallVec<[TcbComment; 3]>;

/// Reads the run of block comments starting at `pos`, skipping whitespace.
/// Returns the comments and the offset just past the last one.
pub fn read_trailing_comments(source: &str, pos: usize) -> (TrailingComments, usize) {
    let mut comments = TrailingComments::new();
    let mut cursor = pos;
    loop {
        let rest = &source[cursor.min(source.len())..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        let skipped = rest.len() - trimmed.len();
        let Some(body) = trimmed.strip_prefix("/*") else {
            break;
        };
        let Some(close) = body.find("*/") else {
            break;
        };
        comments.push(TcbComment::parse(&body[..close]));
        cursor += skipped + 2 + close + 2;
    }
    (comments, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_each_comment_kind() {
        assert_eq!(TcbComment::parse("3,8"), TcbComment::Span(AbsoluteSourceSpan::new(3, 8)));
        assert_eq!(TcbComment::parse("D:ignore"), TcbComment::IgnoreForDiagnostics);
        assert_eq!(TcbComment::parse("T:EP"), TcbComment::Identifier(ExpressionIdentifier::EventParameter));
        assert_eq!(TcbComment::parse("host"), TcbComment::Other("host".to_string()));
    }

    #[test]
    fn should_read_consecutive_comments() {
        let source = "(this).a /*T:DIR*/ /*D:ignore*/ /*1,2*/;";
        let (comments, end) = read_trailing_comments(source, 8);
        assert_eq!(
            comments.as_slice(),
            &[
                TcbComment::Identifier(ExpressionIdentifier::Directive),
                TcbComment::IgnoreForDiagnostics,
                TcbComment::Span(AbsoluteSourceSpan::new(1, 2)),
            ]
        );
        assert_eq!(&source[end..], ";");
    }

    #[test]
    fn should_stop_at_code() {
        let (comments, end) = read_trailing_comments("a + b", 1);
        assert!(comments.is_empty());
        assert_eq!(end, 1);
    }
}
