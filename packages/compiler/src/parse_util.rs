//! Parse Utilities
//!
//! Source files, line/column locations and offset spans used by template nodes
//! and diagnostics.

use serde::{Deserialize, Serialize};

use crate::chars;
use crate::expression_parser::ast::AbsoluteSourceSpan;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        ParseSourceFile { content: content.into(), url: url.into() }
    }

    /// Resolves an offset into a zero-based line/column location.
    pub fn location(&self, offset: usize) -> ParseLocation {
        let offset = offset.min(self.content.len());
        let mut line = 0;
        let mut col = 0;
        for ch in self.content[..offset].chars() {
            if ch == chars::NEWLINE {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        ParseLocation { offset, line, col }
    }

    pub fn text(&self, span: &ParseSourceSpan) -> &str {
        let end = span.end.min(self.content.len());
        &self.content[span.start.min(end)..end]
    }

    /// Source around `offset`, bounded by `max_chars` and `max_lines` on each side.
    pub fn context(&self, offset: usize, max_chars: usize, max_lines: usize) -> (String, String) {
        let content = &self.content;
        let offset = offset.min(content.len());

        let mut start = offset;
        let mut lines = 0;
        for (count, (index, ch)) in content[..offset].char_indices().rev().enumerate() {
            if count >= max_chars {
                break;
            }
            start = index;
            if ch == chars::NEWLINE {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
        }

        let mut end = offset;
        lines = 0;
        for (count, (index, ch)) in content[offset..].char_indices().enumerate() {
            if count >= max_chars {
                break;
            }
            end = offset + index + ch.len_utf8();
            if ch == chars::NEWLINE {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
        }
        (content[start..offset].to_string(), content[offset..end].to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseLocation {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// A `[start, end)` offset range in a template file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParseSourceSpan {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSourceSpan { start, end, details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn to_absolute(&self) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<AbsoluteSourceSpan> for ParseSourceSpan {
    fn from(span: AbsoluteSourceSpan) -> Self {
        ParseSourceSpan::new(span.start, span.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError { span, msg: msg.into(), level: ParseErrorLevel::Error }
    }

    pub fn contextual_message(&self, file: &ParseSourceFile) -> String {
        let (before, after) = file.context(self.span.start, 100, 3);
        let level = match self.level {
            ParseErrorLevel::Warning => "WARNING",
            ParseErrorLevel::Error => "ERROR",
        };
        format!("{} (\"{}[{} ->]{}\")", self.msg, before, level, after)
    }

    pub fn render(&self, file: &ParseSourceFile) -> String {
        let details = self.span.details.as_ref().map(|d| format!(", {}", d)).unwrap_or_default();
        format!(
            "{}: {}@{}{}",
            self.contextual_message(file),
            file.url,
            file.location(self.span.start),
            details
        )
    }
}

/// Replaces every character that cannot appear in an identifier with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect()
}
