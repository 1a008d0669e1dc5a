// TypeCheck Block Utilities
//
// Maps offsets in generated type-check code back to template spans through
// the trailing comments the generator attaches to expressions.

use std::collections::HashMap;

use ng_template_compiler::expression_parser::AbsoluteSourceSpan;

use super::comments::{read_trailing_comments, TcbComment, HOST_BINDINGS_MARKER};
use super::diagnostics::DiagnosticSource;

/// An expression followed by a run of annotation comments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnnotatedRegion {
    start: usize,
    end: usize,
    span: Option<AbsoluteSourceSpan>,
    ignore: bool,
}

/// Bracket, string and comment structure of a generated source.
struct Layout<'s> {
    source: &'s str,
    open_of: HashMap<usize, usize>,
    string_start: HashMap<usize, usize>,
    /// Offset of the closing `/` of a comment to the offset of its `/*`.
    comment_start: HashMap<usize, usize>,
    comments: Vec<usize>,
}

impl<'s> Layout<'s> {
    fn new(source: &'s str) -> Self {
        let bytes = source.as_bytes();
        let mut layout = Layout {
            source,
            open_of: HashMap::new(),
            string_start: HashMap::new(),
            comment_start: HashMap::new(),
            comments: Vec::new(),
        };
        let mut stack = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                quote @ (b'"' | b'\'' | b'`') => {
                    let start = i;
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                    if i < bytes.len() {
                        layout.string_start.insert(i, start);
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let Some(close) = source[i + 2..].find("*/") else {
                        break;
                    };
                    let end = i + 2 + close + 1;
                    layout.comment_start.insert(end, i);
                    layout.comments.push(i);
                    i = end;
                }
                b'(' | b'[' | b'{' => stack.push(i),
                b')' | b']' | b'}' => {
                    if let Some(open) = stack.pop() {
                        layout.open_of.insert(i, open);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        layout
    }

    fn regions(&self) -> Vec<AnnotatedRegion> {
        let mut regions = Vec::new();
        let mut next = 0;
        for &start in &self.comments {
            if start < next {
                continue;
            }
            let (comments, end) = read_trailing_comments(self.source, start);
            next = end.max(start + 1);

            let span = comments.iter().find_map(|comment| match comment {
                TcbComment::Span(span) => Some(*span),
                _ => None,
            });
            let ignore = comments.contains(&TcbComment::IgnoreForDiagnostics);
            if span.is_none() && !ignore {
                continue;
            }
            let end = self.source[..start].trim_end_matches([' ', '\t']).len();
            regions.push(AnnotatedRegion { start: self.expression_start(end), end, span, ignore });
        }
        regions
    }

    /// Start of the expression ending at `end`: identifiers, literals and
    /// bracket groups chained by `.` or `!`.
    fn expression_start(&self, end: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut pos = end;
        while pos > 0 {
            let b = bytes[pos - 1];
            if is_identifier_byte(b) {
                pos -= 1;
                continue;
            }
            let jump = match b {
                b')' | b']' | b'}' => self.open_of.get(&(pos - 1)).copied(),
                b'"' | b'\'' | b'`' => self.string_start.get(&(pos - 1)).copied(),
                b'.' | b'!' => Some(self.skip_trivia_back(pos - 1)),
                _ => None,
            };
            match jump {
                Some(to) => pos = to,
                None => break,
            }
        }
        pos
    }

    fn skip_trivia_back(&self, mut pos: usize) -> usize {
        let bytes = self.source.as_bytes();
        loop {
            while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
                pos -= 1;
            }
            if pos >= 2 && bytes[pos - 1] == b'/' && bytes[pos - 2] == b'*' {
                if let Some(&start) = self.comment_start.get(&(pos - 1)) {
                    pos = start;
                    continue;
                }
            }
            return pos;
        }
    }
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// The template span of the innermost annotated expression around `pos`, or
/// `None` when no expression is annotated or an enclosing one is marked to
/// ignore diagnostics.
pub fn find_source_location(tcb_source: &str, pos: usize) -> Option<AbsoluteSourceSpan> {
    let mut innermost: Option<(usize, AbsoluteSourceSpan)> = None;
    for region in Layout::new(tcb_source).regions() {
        if pos < region.start || pos >= region.end {
            continue;
        }
        if region.ignore {
            return None;
        }
        if let Some(span) = region.span {
            let len = region.end - region.start;
            if innermost.map_or(true, |(best, _)| len < best) {
                innermost = Some((len, span));
            }
        }
    }
    innermost.map(|(_, span)| span)
}

/// Whether `pos` falls in the host binding section of a type-check block.
pub fn source_of_offset(tcb_source: &str, pos: usize) -> DiagnosticSource {
    let marker = format!("/*{}*/ true", HOST_BINDINGS_MARKER);
    match tcb_source.find(&marker) {
        Some(at) if pos >= at => DiagnosticSource::Host,
        _ => DiagnosticSource::Template,
    }
}
