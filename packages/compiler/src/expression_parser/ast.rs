//! Template expression AST
//!
//! A single sum type over every expression form the template syntax allows.
//! Each node records its span relative to the expression source and its
//! absolute span in the template file.

use serde::{Deserialize, Serialize};

/// Span relative to the start of the expression source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Span in template-file coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    ThisReceiver(ThisReceiver),
    Chain(Chain),
    Conditional(Conditional),
    PropertyRead(PropertyRead),
    SafePropertyRead(SafePropertyRead),
    KeyedRead(KeyedRead),
    SafeKeyedRead(SafeKeyedRead),
    BindingPipe(BindingPipe),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Interpolation(Interpolation),
    Binary(Binary),
    PrefixNot(PrefixNot),
    Unary(Unary),
    TypeofExpression(TypeofExpression),
    VoidExpression(VoidExpression),
    NonNullAssert(NonNullAssert),
    Call(Call),
    SafeCall(SafeCall),
    TemplateLiteral(TemplateLiteral),
    TaggedTemplateLiteral(TaggedTemplateLiteral),
    ParenthesizedExpression(ParenthesizedExpression),
    RegularExpressionLiteral(RegularExpressionLiteral),
    ArrowFunction(ArrowFunction),
    SpreadElement(SpreadElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyExpr {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// Explicit `this`. Reads through it never resolve to template locals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThisReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// Semicolon separated statements of an event handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeKeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

/// `value | name:arg1:arg2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPipe {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub exp: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
    /// `{...rest}` entries carry no key.
    #[serde(default)]
    pub is_spread: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub keys: Vec<LiteralMapKey>,
    pub values: Vec<AST>,
}

/// Text with embedded `{{ }}` expressions. `strings.len() == expressions.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub strings: Vec<String>,
    pub expressions: Vec<AST>,
}

/// Binary operation, including assignments (`=`, `+=`, `??=` ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

impl Binary {
    pub fn is_assignment(&self) -> bool {
        is_assignment_operation(&self.operation)
    }
}

pub fn is_assignment_operation(op: &str) -> bool {
    matches!(
        op,
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "**=" | "&&=" | "||=" | "??="
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

/// `+x` or `-x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operator: String,
    pub expr: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeofExpression {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidExpression {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonNullAssert {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
    pub argument_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeCall {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
    pub argument_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLiteralElement {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLiteral {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub elements: Vec<TemplateLiteralElement>,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedTemplateLiteral {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub tag: Box<AST>,
    pub template: TemplateLiteral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenthesizedExpression {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularExpressionLiteral {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub body: String,
    pub flags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFunctionParameter {
    pub name: String,
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// `(a, b) => body`. Only expression bodies exist in templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFunction {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub parameters: Vec<ArrowFunctionParameter>,
    pub body: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadElement {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

macro_rules! for_each_node {
    ($self:expr, $node:ident => $body:expr) => {
        match $self {
            AST::EmptyExpr($node) => $body,
            AST::ImplicitReceiver($node) => $body,
            AST::ThisReceiver($node) => $body,
            AST::Chain($node) => $body,
            AST::Conditional($node) => $body,
            AST::PropertyRead($node) => $body,
            AST::SafePropertyRead($node) => $body,
            AST::KeyedRead($node) => $body,
            AST::SafeKeyedRead($node) => $body,
            AST::BindingPipe($node) => $body,
            AST::LiteralPrimitive($node) => $body,
            AST::LiteralArray($node) => $body,
            AST::LiteralMap($node) => $body,
            AST::Interpolation($node) => $body,
            AST::Binary($node) => $body,
            AST::PrefixNot($node) => $body,
            AST::Unary($node) => $body,
            AST::TypeofExpression($node) => $body,
            AST::VoidExpression($node) => $body,
            AST::NonNullAssert($node) => $body,
            AST::Call($node) => $body,
            AST::SafeCall($node) => $body,
            AST::TemplateLiteral($node) => $body,
            AST::TaggedTemplateLiteral($node) => $body,
            AST::ParenthesizedExpression($node) => $body,
            AST::RegularExpressionLiteral($node) => $body,
            AST::ArrowFunction($node) => $body,
            AST::SpreadElement($node) => $body,
        }
    };
}

impl AST {
    pub fn span(&self) -> ParseSpan {
        for_each_node!(self, node => node.span)
    }

    pub fn source_span(&self) -> AbsoluteSourceSpan {
        for_each_node!(self, node => node.source_span)
    }

    pub fn is_implicit_receiver(&self) -> bool {
        matches!(self, AST::ImplicitReceiver(_))
    }

    pub fn is_this_receiver(&self) -> bool {
        matches!(self, AST::ThisReceiver(_))
    }

    /// Implicit or explicit `this` receiver.
    pub fn is_any_implicit_receiver(&self) -> bool {
        matches!(self, AST::ImplicitReceiver(_) | AST::ThisReceiver(_))
    }

    /// A property read on the implicit receiver, e.g. `foo` but not `this.foo`.
    pub fn as_implicit_read(&self) -> Option<&PropertyRead> {
        match self {
            AST::PropertyRead(read) if read.receiver.is_implicit_receiver() => Some(read),
            _ => None,
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&AST> {
        match self {
            AST::EmptyExpr(_)
            | AST::ImplicitReceiver(_)
            | AST::ThisReceiver(_)
            | AST::LiteralPrimitive(_)
            | AST::RegularExpressionLiteral(_) => Vec::new(),
            AST::Chain(chain) => chain.expressions.iter().collect(),
            AST::Conditional(cond) => vec![&*cond.condition, &*cond.true_exp, &*cond.false_exp],
            AST::PropertyRead(read) => vec![&*read.receiver],
            AST::SafePropertyRead(read) => vec![&*read.receiver],
            AST::KeyedRead(read) => vec![&*read.receiver, &*read.key],
            AST::SafeKeyedRead(read) => vec![&*read.receiver, &*read.key],
            AST::BindingPipe(pipe) => {
                let mut out = vec![&*pipe.exp];
                out.extend(pipe.args.iter());
                out
            }
            AST::LiteralArray(arr) => arr.expressions.iter().collect(),
            AST::LiteralMap(map) => map.values.iter().collect(),
            AST::Interpolation(interp) => interp.expressions.iter().collect(),
            AST::Binary(bin) => vec![&*bin.left, &*bin.right],
            AST::PrefixNot(not) => vec![&*not.expression],
            AST::Unary(un) => vec![&*un.expr],
            AST::TypeofExpression(e) => vec![&*e.expression],
            AST::VoidExpression(e) => vec![&*e.expression],
            AST::NonNullAssert(e) => vec![&*e.expression],
            AST::Call(call) => {
                let mut out = vec![&*call.receiver];
                out.extend(call.args.iter());
                out
            }
            AST::SafeCall(call) => {
                let mut out = vec![&*call.receiver];
                out.extend(call.args.iter());
                out
            }
            AST::TemplateLiteral(tpl) => tpl.expressions.iter().collect(),
            AST::TaggedTemplateLiteral(tagged) => {
                let mut out = vec![&*tagged.tag];
                out.extend(tagged.template.expressions.iter());
                out
            }
            AST::ParenthesizedExpression(e) => vec![&*e.expression],
            AST::ArrowFunction(arrow) => vec![&*arrow.body],
            AST::SpreadElement(e) => vec![&*e.expression],
        }
    }

    /// Pre-order walk over this node and all descendants.
    pub fn visit_all<'a>(&'a self, visitor: &mut dyn FnMut(&'a AST)) {
        visitor(self);
        for child in self.children() {
            child.visit_all(visitor);
        }
    }
}

/// Parsed expression together with the text it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ASTWithSource {
    pub ast: AST,
    pub source: Option<String>,
    pub location: String,
    pub absolute_offset: usize,
}

impl ASTWithSource {
    pub fn new(ast: AST, source: Option<String>, location: String, absolute_offset: usize) -> Self {
        ASTWithSource { ast, source, location, absolute_offset }
    }
}
