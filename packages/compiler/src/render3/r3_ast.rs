//! Render3 template AST
//!
//! Parsed, read-only template nodes. Every node carries absolute spans into the
//! template file so both the type-check block and the IR can point back at the
//! template.

use serde::{Deserialize, Serialize};

use crate::expression_parser::ast::{ASTWithSource, AST};
use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum R3Node {
    Text(Text),
    BoundText(BoundText),
    Element(Element),
    Template(Template),
    Content(Content),
    IfBlock(IfBlock),
    SwitchBlock(SwitchBlock),
    ForLoopBlock(ForLoopBlock),
    DeferredBlock(DeferredBlock),
    LetDeclaration(LetDeclaration),
    UnknownBlock(UnknownBlock),
}

impl R3Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            R3Node::Text(n) => &n.source_span,
            R3Node::BoundText(n) => &n.source_span,
            R3Node::Element(n) => &n.source_span,
            R3Node::Template(n) => &n.source_span,
            R3Node::Content(n) => &n.source_span,
            R3Node::IfBlock(n) => &n.source_span,
            R3Node::SwitchBlock(n) => &n.source_span,
            R3Node::ForLoopBlock(n) => &n.source_span,
            R3Node::DeferredBlock(n) => &n.source_span,
            R3Node::LetDeclaration(n) => &n.source_span,
            R3Node::UnknownBlock(n) => &n.source_span,
        }
    }

    /// Child node lists owned by this node, in template order. Blocks return one
    /// list per branch, case or sub-block.
    pub fn child_lists(&self) -> Vec<&[R3Node]> {
        match self {
            R3Node::Element(n) => vec![&n.children],
            R3Node::Template(n) => vec![&n.children],
            R3Node::Content(n) => vec![&n.children],
            R3Node::IfBlock(n) => n.branches.iter().map(|b| b.children.as_slice()).collect(),
            R3Node::SwitchBlock(n) => n.cases.iter().map(|c| c.children.as_slice()).collect(),
            R3Node::ForLoopBlock(n) => {
                let mut lists = vec![n.children.as_slice()];
                if let Some(empty) = &n.empty {
                    lists.push(&empty.children);
                }
                lists
            }
            R3Node::DeferredBlock(n) => {
                let mut lists = vec![n.children.as_slice()];
                if let Some(placeholder) = &n.placeholder {
                    lists.push(&placeholder.children);
                }
                if let Some(loading) = &n.loading {
                    lists.push(&loading.children);
                }
                if let Some(error) = &n.error {
                    lists.push(&error.children);
                }
                lists
            }
            R3Node::Text(_) | R3Node::BoundText(_) | R3Node::LetDeclaration(_) | R3Node::UnknownBlock(_) => {
                Vec::new()
            }
        }
    }
}

/// Pre-order walk over `nodes` and every descendant.
pub fn visit_all<'a>(nodes: &'a [R3Node], visitor: &mut dyn FnMut(&'a R3Node)) {
    for node in nodes {
        visitor(node);
        for children in node.child_lists() {
            visit_all(children, visitor);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Text containing interpolations; `value` is an `AST::Interpolation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundText {
    pub value: AST,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAttribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    #[serde(default)]
    pub key_span: Option<ParseSourceSpan>,
    #[serde(default)]
    pub value_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingType {
    /// `[prop]="value"`
    Property,
    /// `[attr.name]="value"`
    Attribute,
    /// `[class.name]="value"`
    Class,
    /// `[style.name]="value"`
    Style,
    /// `[@trigger]="value"`
    LegacyAnimation,
    /// `[(prop)]="value"`
    TwoWay,
    /// `[animate.enter]="value"`
    Animation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: BindingType,
    pub value: AST,
    #[serde(default)]
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    #[serde(default)]
    pub value_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedEventType {
    Regular,
    LegacyAnimation,
    TwoWay,
    Animation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ParsedEventType,
    pub handler: AST,
    /// `window`, `document` or `body` for `(window:resize)` style listeners.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    pub source_span: ParseSourceSpan,
    pub handler_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    #[serde(default)]
    pub value_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    #[serde(default)]
    pub value_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<TextAttribute>,
    #[serde(default)]
    pub inputs: Vec<BoundAttribute>,
    #[serde(default)]
    pub outputs: Vec<BoundEvent>,
    #[serde(default)]
    pub children: Vec<R3Node>,
    #[serde(default)]
    pub references: Vec<Reference>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    #[serde(default)]
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Element {
    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name.to_ascii_lowercase().as_str())
}

/// Attribute of an `<ng-template>` created from a structural directive (`*ngIf="..."`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TemplateAttr {
    Bound(BoundAttribute),
    Text(TextAttribute),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// `ng-template` for explicit templates, the host tag for `*` templates.
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub attributes: Vec<TextAttribute>,
    #[serde(default)]
    pub inputs: Vec<BoundAttribute>,
    #[serde(default)]
    pub outputs: Vec<BoundEvent>,
    #[serde(default)]
    pub template_attrs: Vec<TemplateAttr>,
    #[serde(default)]
    pub children: Vec<R3Node>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub selector: String,
    #[serde(default)]
    pub attributes: Vec<TextAttribute>,
    #[serde(default)]
    pub children: Vec<R3Node>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlock {
    pub branches: Vec<IfBlockBranch>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlockBranch {
    /// `None` for the trailing `@else`.
    pub expression: Option<AST>,
    #[serde(default)]
    pub children: Vec<R3Node>,
    /// `@if (expr; as alias)`
    #[serde(default)]
    pub expression_alias: Option<Variable>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchExhaustiveCheck {
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchBlock {
    pub expression: AST,
    pub cases: Vec<SwitchBlockCase>,
    #[serde(default)]
    pub exhaustive_check: Option<SwitchExhaustiveCheck>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchBlockCase {
    /// `None` for `@default`.
    pub expression: Option<AST>,
    #[serde(default)]
    pub children: Vec<R3Node>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoopBlock {
    pub item: Variable,
    pub expression: ASTWithSource,
    pub track_by: ASTWithSource,
    pub track_keyword_span: ParseSourceSpan,
    /// `$index`, `$count`, `$first`, `$last`, `$even`, `$odd` and their aliases.
    #[serde(default)]
    pub context_variables: Vec<Variable>,
    #[serde(default)]
    pub children: Vec<R3Node>,
    #[serde(default)]
    pub empty: Option<ForLoopBlockEmpty>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoopBlockEmpty {
    #[serde(default)]
    pub children: Vec<R3Node>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger")]
pub enum DeferredTrigger {
    When { value: AST, source_span: ParseSourceSpan },
    Idle { source_span: ParseSourceSpan },
    Immediate { source_span: ParseSourceSpan },
    Never { source_span: ParseSourceSpan },
    Timer { delay: u64, source_span: ParseSourceSpan },
    Hover { reference: Option<String>, source_span: ParseSourceSpan },
    Interaction { reference: Option<String>, source_span: ParseSourceSpan },
    Viewport { reference: Option<String>, source_span: ParseSourceSpan },
}

impl DeferredTrigger {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            DeferredTrigger::When { source_span, .. }
            | DeferredTrigger::Idle { source_span }
            | DeferredTrigger::Immediate { source_span }
            | DeferredTrigger::Never { source_span }
            | DeferredTrigger::Timer { source_span, .. }
            | DeferredTrigger::Hover { source_span, .. }
            | DeferredTrigger::Interaction { source_span, .. }
            | DeferredTrigger::Viewport { source_span, .. } => source_span,
        }
    }

    /// Element reference name for triggers that target an element.
    pub fn reference(&self) -> Option<&str> {
        match self {
            DeferredTrigger::Hover { reference, .. }
            | DeferredTrigger::Interaction { reference, .. }
            | DeferredTrigger::Viewport { reference, .. } => reference.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockPlaceholder {
    #[serde(default)]
    pub children: Vec<R3Node>,
    #[serde(default)]
    pub minimum_time: Option<u64>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockLoading {
    #[serde(default)]
    pub children: Vec<R3Node>,
    #[serde(default)]
    pub after_time: Option<u64>,
    #[serde(default)]
    pub minimum_time: Option<u64>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlockError {
    #[serde(default)]
    pub children: Vec<R3Node>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredBlock {
    #[serde(default)]
    pub children: Vec<R3Node>,
    #[serde(default)]
    pub triggers: Vec<DeferredTrigger>,
    #[serde(default)]
    pub prefetch_triggers: Vec<DeferredTrigger>,
    #[serde(default)]
    pub placeholder: Option<DeferredBlockPlaceholder>,
    #[serde(default)]
    pub loading: Option<DeferredBlockLoading>,
    #[serde(default)]
    pub error: Option<DeferredBlockError>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetDeclaration {
    pub name: String,
    pub value: AST,
    pub source_span: ParseSourceSpan,
    pub name_span: ParseSourceSpan,
    pub value_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownBlock {
    pub name: String,
    pub source_span: ParseSourceSpan,
}

/// Synthetic element standing in for a directive's host during host binding checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostElement {
    pub tag_names: Vec<String>,
    #[serde(default)]
    pub bindings: Vec<BoundAttribute>,
    #[serde(default)]
    pub listeners: Vec<BoundEvent>,
    pub source_span: ParseSourceSpan,
}
