//! Template AST builder
//!
//! Builds `R3Node` trees against a template source string so tests can work
//! with real spans without a markup parser. Nodes must be built in source
//! order: every lookup starts from a cursor that moves forward as nodes are
//! located. Expressions go through the real expression [`Parser`] at their
//! absolute offset in the source.
//!
//! # Panics
//!
//! Every method panics when the text it looks for is not found or an
//! expression fails to parse. This module is test support only.

use std::cell::Cell;

use crate::expression_parser::ast::{ASTWithSource, AST};
use crate::expression_parser::Parser;
use crate::parse_util::ParseSourceSpan;
use crate::render3::r3_ast::*;

const LOCATION: &str = "template";

const FOR_LOOP_IMPLICITS: &[&str] = &["$index", "$first", "$last", "$even", "$odd", "$count"];

pub struct TemplateBuilder {
    source: String,
    cursor: Cell<usize>,
    parser: Parser,
}

impl TemplateBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        TemplateBuilder {
            source: source.into(),
            cursor: Cell::new(0),
            parser: Parser::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn find_from(&self, from: usize, needle: &str) -> usize {
        match self.source.get(from..).and_then(|rest| rest.find(needle)) {
            Some(offset) => from + offset,
            None => panic!("`{}` not found after offset {} in `{}`", needle, from, self.source),
        }
    }

    /// Finds `needle` at or after the cursor and moves the cursor past it.
    fn take(&self, needle: &str) -> usize {
        let start = self.find_from(self.cursor.get(), needle);
        self.cursor.set(start + needle.len());
        start
    }

    fn advance_to(&self, offset: usize) {
        if offset > self.cursor.get() {
            self.cursor.set(offset);
        }
    }

    /// End offset of the `}` closing a block section whose body starts at `from`.
    fn close_brace(&self, from: usize) -> usize {
        let end = self.find_from(from.max(self.cursor.get()), "}") + 1;
        self.cursor.set(end);
        end
    }

    fn parse_binding_at(&self, source: &str, offset: usize) -> ASTWithSource {
        self.parser
            .parse_binding(source, LOCATION, offset)
            .unwrap_or_else(|err| panic!("invalid binding `{}`: {}", source, err))
    }

    fn parse_action_at(&self, source: &str, offset: usize) -> ASTWithSource {
        self.parser
            .parse_action(source, LOCATION, offset)
            .unwrap_or_else(|err| panic!("invalid action `{}`: {}", source, err))
    }

    /// Parses `source` as a binding, located at or after `from`.
    fn binding_after(&self, from: usize, source: &str) -> (ASTWithSource, ParseSourceSpan) {
        let start = self.find_from(from, source);
        let span = ParseSourceSpan::new(start, start + source.len());
        (self.parse_binding_at(source, start), span)
    }

    /// A standalone binding expression found after the cursor.
    pub fn binding(&self, source: &str) -> AST {
        let start = self.take(source);
        self.parse_binding_at(source, start).ast
    }

    pub fn text(&self, value: &str) -> R3Node {
        let start = self.take(value);
        R3Node::Text(Text {
            value: value.to_string(),
            source_span: ParseSourceSpan::new(start, start + value.len()),
        })
    }

    /// Text with `{{ }}` interpolations.
    pub fn bound_text(&self, value: &str) -> R3Node {
        let start = self.take(value);
        let parsed = self
            .parser
            .parse_interpolation(value, LOCATION, start)
            .unwrap_or_else(|err| panic!("invalid interpolation `{}`: {}", value, err))
            .unwrap_or_else(|| panic!("`{}` has no interpolation", value));
        R3Node::BoundText(BoundText {
            value: parsed.ast,
            source_span: ParseSourceSpan::new(start, start + value.len()),
        })
    }

    pub fn element(&self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder::open(self, tag, NodeKind::Element)
    }

    /// An explicit `<ng-template>`.
    pub fn ng_template(&self) -> ElementBuilder<'_> {
        ElementBuilder::open(self, "ng-template", NodeKind::Template)
    }

    /// The template created by a `*directive` attribute on `tag`. The element
    /// itself must be added as the only child.
    pub fn structural(&self, tag: &str) -> ElementBuilder<'_> {
        let builder = ElementBuilder::open(self, tag, NodeKind::Structural);
        self.cursor.set(builder.start);
        builder
    }

    pub fn content(&self, selector: &str) -> ElementBuilder<'_> {
        let mut builder = ElementBuilder::open(self, "ng-content", NodeKind::Content);
        builder.selector = selector.to_string();
        builder
    }

    /// Host bindings of a directive. The whole source is treated as the host
    /// element's attribute list.
    pub fn host(&self, tag_names: &[&str]) -> ElementBuilder<'_> {
        ElementBuilder {
            t: self,
            kind: NodeKind::Host,
            tag: tag_names.join(","),
            start: 0,
            start_end: self.source.len(),
            self_closing: true,
            tag_names: tag_names.iter().map(|s| s.to_string()).collect(),
            selector: String::new(),
            attributes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            references: Vec::new(),
            variables: Vec::new(),
            template_attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn if_block(&self) -> IfBlockBuilder<'_> {
        let start = self.take("@if");
        IfBlockBuilder { t: self, start, header: start, branches: Vec::new() }
    }

    pub fn switch_block(&self, expression: &str) -> SwitchBlockBuilder<'_> {
        let start = self.take("@switch");
        let (expression, _) = self.binding_after(start, expression);
        SwitchBlockBuilder {
            t: self,
            start,
            header: start,
            expression: expression.ast,
            cases: Vec::new(),
            exhaustive_check: None,
        }
    }

    /// `@for (item of expression; track track)`.
    pub fn for_block(&self, item: &str, expression: &str, track: &str) -> ForLoopBuilder<'_> {
        let start = self.take("@for");
        let item_start = self.find_from(start, item);
        let item_span = ParseSourceSpan::new(item_start, item_start + item.len());
        let (expression, _) = self.binding_after(item_start + item.len(), expression);
        let track_keyword = self.find_from(start, "track");
        let (track_by, _) = self.binding_after(track_keyword + "track".len(), track);
        let body_start = self.find_from(track_keyword, "{") + 1;
        self.advance_to(body_start);

        let header_span = ParseSourceSpan::new(start, body_start);
        let context_variables = FOR_LOOP_IMPLICITS
            .iter()
            .map(|name| Variable {
                name: name.to_string(),
                value: name.to_string(),
                source_span: header_span.clone(),
                key_span: header_span.clone(),
                value_span: None,
            })
            .collect();

        ForLoopBuilder {
            t: self,
            start,
            body_start,
            item: Variable {
                name: item.to_string(),
                value: "$implicit".to_string(),
                source_span: item_span.clone(),
                key_span: item_span,
                value_span: None,
            },
            expression,
            track_by,
            track_keyword_span: ParseSourceSpan::new(track_keyword, track_keyword + "track".len()),
            context_variables,
            children: Vec::new(),
            body_end: None,
            empty: None,
        }
    }

    pub fn defer_block(&self) -> DeferBlockBuilder<'_> {
        let start = self.take("@defer");
        let body_start = self.find_from(start, "{") + 1;
        self.advance_to(body_start);
        DeferBlockBuilder {
            t: self,
            start,
            header_end: body_start,
            last_end: body_start,
            children: Vec::new(),
            triggers: Vec::new(),
            prefetch_triggers: Vec::new(),
            placeholder: None,
            loading: None,
            error: None,
        }
    }

    /// `@let name = value;`
    pub fn let_declaration(&self, name: &str, value: &str) -> R3Node {
        let start = self.take("@let");
        let name_start = self.find_from(start, name);
        let (value, value_span) = self.binding_after(name_start + name.len(), value);
        let end = self.find_from(value_span.end, ";") + 1;
        self.advance_to(end);
        R3Node::LetDeclaration(LetDeclaration {
            name: name.to_string(),
            value: value.ast,
            source_span: ParseSourceSpan::new(start, end),
            name_span: ParseSourceSpan::new(name_start, name_start + name.len()),
            value_span,
        })
    }

    pub fn unknown_block(&self, name: &str) -> R3Node {
        let start = self.take(&format!("@{}", name));
        R3Node::UnknownBlock(UnknownBlock {
            name: name.to_string(),
            source_span: ParseSourceSpan::new(start, start + name.len() + 1),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Element,
    Template,
    Structural,
    Content,
    Host,
}

/// Builder for elements, templates, `<ng-content>` and host elements.
pub struct ElementBuilder<'a> {
    t: &'a TemplateBuilder,
    kind: NodeKind,
    tag: String,
    start: usize,
    /// End of the start tag.
    start_end: usize,
    self_closing: bool,
    tag_names: Vec<String>,
    selector: String,
    attributes: Vec<TextAttribute>,
    inputs: Vec<BoundAttribute>,
    outputs: Vec<BoundEvent>,
    references: Vec<Reference>,
    variables: Vec<Variable>,
    template_attrs: Vec<TemplateAttr>,
    children: Vec<R3Node>,
}

impl<'a> ElementBuilder<'a> {
    fn open(t: &'a TemplateBuilder, tag: &str, kind: NodeKind) -> Self {
        let start = t.take(&format!("<{}", tag));
        let start_end = start_tag_end(&t.source, start + tag.len() + 1)
            .unwrap_or_else(|| panic!("unterminated start tag <{}", tag));
        let self_closing = t.source[..start_end].ends_with("/>");
        t.advance_to(start_end);
        ElementBuilder {
            t,
            kind,
            tag: tag.to_string(),
            start,
            start_end,
            self_closing,
            tag_names: Vec::new(),
            selector: String::new(),
            attributes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            references: Vec::new(),
            variables: Vec::new(),
            template_attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Offset of `needle` inside the start tag.
    fn in_start_tag(&self, needle: &str) -> usize {
        let at = self.t.find_from(self.start, needle);
        assert!(at < self.start_end, "`{}` is not part of the start tag of <{}>", needle, self.tag);
        at
    }

    fn bound_attribute(&self, key: &str, name: &str, type_: BindingType, unit: Option<String>, expr: &str) -> BoundAttribute {
        let key_start = self.in_start_tag(key);
        let key_span = ParseSourceSpan::new(key_start, key_start + key.len());
        let (value, value_span) = self.t.binding_after(key_span.end, expr);
        BoundAttribute {
            name: name.to_string(),
            type_,
            value: value.ast,
            unit,
            source_span: ParseSourceSpan::new(key_start, value_span.end + 1),
            key_span,
            value_span: Some(value_span),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let key_start = self.in_start_tag(name);
        let key_span = ParseSourceSpan::new(key_start, key_start + name.len());
        let value_span = if value.is_empty() {
            None
        } else {
            let at = self.t.find_from(key_span.end, value);
            Some(ParseSourceSpan::new(at, at + value.len()))
        };
        let end = value_span.as_ref().map_or(key_span.end, |span| span.end + 1);
        self.attributes.push(TextAttribute {
            name: name.to_string(),
            value: value.to_string(),
            source_span: ParseSourceSpan::new(key_start, end),
            key_span: Some(key_span),
            value_span,
        });
        self
    }

    /// `[name]="expr"`. `attr.`, `class.`, `style.`, `@` and `animate.` prefixes
    /// select the binding type; `style.width.px` carries a unit.
    pub fn input(mut self, name: &str, expr: &str) -> Self {
        let key = format!("[{}]", name);
        let (type_, bare, unit) = classify_input(name);
        let binding = self.bound_attribute(&key, &bare, type_, unit, expr);
        self.inputs.push(binding);
        self
    }

    /// `[(name)]="expr"`: a two-way input plus its `nameChange` output.
    pub fn two_way(mut self, name: &str, expr: &str) -> Self {
        let key = format!("[({})]", name);
        let binding = self.bound_attribute(&key, name, BindingType::TwoWay, None, expr);
        let handler_span = binding.value_span.clone().unwrap_or_else(|| binding.key_span.clone());
        let handler = self.t.parse_action_at(expr, handler_span.start);
        self.outputs.push(BoundEvent {
            name: format!("{}Change", name),
            type_: ParsedEventType::TwoWay,
            handler: handler.ast,
            target: None,
            phase: None,
            source_span: binding.source_span.clone(),
            handler_span,
            key_span: binding.key_span.clone(),
        });
        self.inputs.push(binding);
        self
    }

    /// `(name)="handler"`. `window:resize` targets the window; `@trigger.done`
    /// is an animation callback.
    pub fn output(mut self, name: &str, handler: &str) -> Self {
        let key = format!("({})", name);
        let key_start = self.in_start_tag(&key);
        let key_span = ParseSourceSpan::new(key_start, key_start + key.len());
        let handler_start = self.t.find_from(key_span.end, handler);
        let handler_span = ParseSourceSpan::new(handler_start, handler_start + handler.len());
        let parsed = self.t.parse_action_at(handler, handler_start);

        let (target, event) = match name.split_once(':') {
            Some((target, event)) => (Some(target.to_string()), event),
            None => (None, name),
        };
        let (type_, event, phase) = if let Some(trigger) = event.strip_prefix('@') {
            match trigger.split_once('.') {
                Some((trigger, phase)) => (ParsedEventType::LegacyAnimation, trigger, Some(phase.to_string())),
                None => (ParsedEventType::LegacyAnimation, trigger, None),
            }
        } else if event.starts_with("animate.") {
            (ParsedEventType::Animation, event, None)
        } else {
            (ParsedEventType::Regular, event, None)
        };

        self.outputs.push(BoundEvent {
            name: event.to_string(),
            type_,
            handler: parsed.ast,
            target,
            phase,
            source_span: ParseSourceSpan::new(key_start, handler_span.end + 1),
            handler_span,
            key_span,
        });
        self
    }

    /// `#name` or `#name="value"`.
    pub fn reference(mut self, name: &str, value: &str) -> Self {
        let key = format!("#{}", name);
        let key_start = self.in_start_tag(&key);
        let key_span = ParseSourceSpan::new(key_start + 1, key_start + key.len());
        let value_span = if value.is_empty() {
            None
        } else {
            let at = self.t.find_from(key_span.end, value);
            Some(ParseSourceSpan::new(at, at + value.len()))
        };
        let end = value_span.as_ref().map_or(key_span.end, |span| span.end + 1);
        self.references.push(Reference {
            name: name.to_string(),
            value: value.to_string(),
            source_span: ParseSourceSpan::new(key_start, end),
            key_span,
            value_span,
        });
        self
    }

    /// Template variable `name` bound to the context property `value` (empty
    /// for `$implicit`).
    pub fn variable(mut self, name: &str, value: &str) -> Self {
        assert!(
            matches!(self.kind, NodeKind::Template | NodeKind::Structural),
            "variables only exist on templates"
        );
        let key_start = self.in_start_tag(name);
        let key_span = ParseSourceSpan::new(key_start, key_start + name.len());
        self.variables.push(Variable {
            name: name.to_string(),
            value: value.to_string(),
            source_span: key_span.clone(),
            key_span,
            value_span: None,
        });
        self
    }

    /// Bound attribute produced by a structural directive's microsyntax, found
    /// after the `*` attribute.
    pub fn template_attr(mut self, name: &str, expr: &str) -> Self {
        let star = self.in_start_tag("*");
        let (value, value_span) = self.t.binding_after(star, expr);
        let key_span = ParseSourceSpan::new(star + 1, star + 1 + name.len().min(value_span.start - star - 1));
        self.template_attrs.push(TemplateAttr::Bound(BoundAttribute {
            name: name.to_string(),
            type_: BindingType::Property,
            value: value.ast,
            unit: None,
            source_span: ParseSourceSpan::new(star, value_span.end),
            key_span,
            value_span: Some(value_span),
        }));
        self
    }

    pub fn child(mut self, node: R3Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: Vec<R3Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    fn end(&self) -> (ParseSourceSpan, Option<ParseSourceSpan>) {
        if self.kind == NodeKind::Structural {
            let end = self.t.cursor.get().max(self.start_end);
            return (ParseSourceSpan::new(self.start, end), None);
        }
        if self.self_closing || (self.kind == NodeKind::Element && is_void_element(&self.tag)) {
            return (ParseSourceSpan::new(self.start, self.start_end), None);
        }
        let close = format!("</{}>", self.tag);
        let close_start = self.t.find_from(self.t.cursor.get().max(self.start_end), &close);
        let close_end = close_start + close.len();
        self.t.advance_to(close_end);
        (
            ParseSourceSpan::new(self.start, close_end),
            Some(ParseSourceSpan::new(close_start, close_end)),
        )
    }

    pub fn build(self) -> R3Node {
        let start_source_span = ParseSourceSpan::new(self.start, self.start_end);
        match self.kind {
            NodeKind::Element => {
                let (source_span, end_source_span) = self.end();
                R3Node::Element(Element {
                    name: self.tag,
                    attributes: self.attributes,
                    inputs: self.inputs,
                    outputs: self.outputs,
                    children: self.children,
                    references: self.references,
                    source_span,
                    start_source_span,
                    end_source_span,
                })
            }
            NodeKind::Template | NodeKind::Structural => {
                let (source_span, _) = self.end();
                R3Node::Template(Template {
                    tag_name: Some(self.tag),
                    attributes: self.attributes,
                    inputs: self.inputs,
                    outputs: self.outputs,
                    template_attrs: self.template_attrs,
                    children: self.children,
                    references: self.references,
                    variables: self.variables,
                    source_span,
                    start_source_span,
                })
            }
            NodeKind::Content => {
                let (source_span, _) = self.end();
                R3Node::Content(Content {
                    selector: self.selector,
                    attributes: self.attributes,
                    children: self.children,
                    source_span,
                })
            }
            NodeKind::Host => panic!("host elements are built with `build_host`"),
        }
    }

    pub fn build_host(self) -> HostElement {
        assert_eq!(self.kind, NodeKind::Host, "`build_host` needs a builder from `host`");
        HostElement {
            tag_names: self.tag_names,
            bindings: self.inputs,
            listeners: self.outputs,
            source_span: ParseSourceSpan::new(self.start, self.start_end),
        }
    }
}

/// Offset just past the `>` closing a start tag, skipping quoted attribute values.
fn start_tag_end(source: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    for (i, c) in source.get(from..)?.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(from + i + 1),
            _ => {}
        }
    }
    None
}

fn classify_input(name: &str) -> (BindingType, String, Option<String>) {
    if let Some(attr) = name.strip_prefix("attr.") {
        (BindingType::Attribute, attr.to_string(), None)
    } else if let Some(class) = name.strip_prefix("class.") {
        (BindingType::Class, class.to_string(), None)
    } else if let Some(style) = name.strip_prefix("style.") {
        match style.split_once('.') {
            Some((property, unit)) => (BindingType::Style, property.to_string(), Some(unit.to_string())),
            None => (BindingType::Style, style.to_string(), None),
        }
    } else if let Some(trigger) = name.strip_prefix('@') {
        (BindingType::LegacyAnimation, trigger.to_string(), None)
    } else if name.starts_with("animate.") {
        (BindingType::Animation, name.to_string(), None)
    } else {
        (BindingType::Property, name.to_string(), None)
    }
}

pub struct IfBlockBuilder<'a> {
    t: &'a TemplateBuilder,
    start: usize,
    /// Start of the latest branch header.
    header: usize,
    branches: Vec<IfBlockBranch>,
}

impl<'a> IfBlockBuilder<'a> {
    fn push(&mut self, keyword: &str, expression: Option<&str>, children: Vec<R3Node>) {
        let header = if self.branches.is_empty() {
            self.start
        } else {
            self.t.find_from(self.header + 1, keyword)
        };
        self.header = header;
        let expression = expression.map(|expr| self.t.binding_after(header + keyword.len(), expr).0.ast);
        let body_start = self.t.find_from(header, "{") + 1;
        let end = self.t.close_brace(body_start);
        self.branches.push(IfBlockBranch {
            expression,
            children,
            expression_alias: None,
            source_span: ParseSourceSpan::new(header, end),
        });
    }

    /// `@if (expression) { children }`
    pub fn branch(mut self, expression: &str, children: Vec<R3Node>) -> Self {
        self.push("@if", Some(expression), children);
        self
    }

    pub fn else_if(mut self, expression: &str, children: Vec<R3Node>) -> Self {
        self.push("@else if", Some(expression), children);
        self
    }

    pub fn else_branch(mut self, children: Vec<R3Node>) -> Self {
        self.push("@else", None, children);
        self
    }

    /// `; as name` on the latest branch.
    pub fn alias(mut self, name: &str) -> Self {
        let as_keyword = self.t.find_from(self.header, "as ");
        let at = self.t.find_from(as_keyword + 3, name);
        let span = ParseSourceSpan::new(at, at + name.len());
        let branch = self.branches.last_mut().expect("`alias` needs a branch");
        branch.expression_alias = Some(Variable {
            name: name.to_string(),
            value: name.to_string(),
            source_span: span.clone(),
            key_span: span,
            value_span: None,
        });
        self
    }

    pub fn build(self) -> R3Node {
        let end = self.branches.last().map_or(self.start, |b| b.source_span.end);
        R3Node::IfBlock(IfBlock {
            branches: self.branches,
            source_span: ParseSourceSpan::new(self.start, end),
        })
    }
}

pub struct SwitchBlockBuilder<'a> {
    t: &'a TemplateBuilder,
    start: usize,
    header: usize,
    expression: AST,
    cases: Vec<SwitchBlockCase>,
    exhaustive_check: Option<SwitchExhaustiveCheck>,
}

impl<'a> SwitchBlockBuilder<'a> {
    fn push(&mut self, keyword: &str, expression: Option<&str>, children: Vec<R3Node>) {
        let header = self.t.find_from(self.header + 1, keyword);
        self.header = header;
        let expression = expression.map(|expr| self.t.binding_after(header + keyword.len(), expr).0.ast);
        let body_start = self.t.find_from(header, "{") + 1;
        let end = self.t.close_brace(body_start);
        self.cases.push(SwitchBlockCase {
            expression,
            children,
            source_span: ParseSourceSpan::new(header, end),
        });
    }

    pub fn case(mut self, expression: &str, children: Vec<R3Node>) -> Self {
        self.push("@case", Some(expression), children);
        self
    }

    pub fn default_case(mut self, children: Vec<R3Node>) -> Self {
        self.push("@default", None, children);
        self
    }

    /// `@default never;`
    pub fn exhaustive(mut self) -> Self {
        let at = self.t.find_from(self.header + 1, "@default never");
        let end = at + "@default never".len();
        self.t.advance_to(end);
        self.exhaustive_check = Some(SwitchExhaustiveCheck { source_span: ParseSourceSpan::new(at, end) });
        self
    }

    pub fn build(self) -> R3Node {
        let end = self.t.close_brace(self.header);
        R3Node::SwitchBlock(SwitchBlock {
            expression: self.expression,
            cases: self.cases,
            exhaustive_check: self.exhaustive_check,
            source_span: ParseSourceSpan::new(self.start, end),
        })
    }
}

pub struct ForLoopBuilder<'a> {
    t: &'a TemplateBuilder,
    start: usize,
    body_start: usize,
    item: Variable,
    expression: ASTWithSource,
    track_by: ASTWithSource,
    track_keyword_span: ParseSourceSpan,
    context_variables: Vec<Variable>,
    children: Vec<R3Node>,
    body_end: Option<usize>,
    empty: Option<ForLoopBlockEmpty>,
}

impl<'a> ForLoopBuilder<'a> {
    /// `let name = value` in the loop header.
    pub fn context_variable(mut self, name: &str, value: &str) -> Self {
        let at = self.t.find_from(self.track_keyword_span.end, name);
        let key_span = ParseSourceSpan::new(at, at + name.len());
        let value_at = self.t.find_from(key_span.end, value);
        self.context_variables.push(Variable {
            name: name.to_string(),
            value: value.to_string(),
            source_span: ParseSourceSpan::new(at, value_at + value.len()),
            key_span,
            value_span: Some(ParseSourceSpan::new(value_at, value_at + value.len())),
        });
        self
    }

    pub fn body(mut self, children: Vec<R3Node>) -> Self {
        self.children = children;
        self.body_end = Some(self.t.close_brace(self.body_start));
        self
    }

    pub fn empty(mut self, children: Vec<R3Node>) -> Self {
        let from = self.body_end.unwrap_or(self.body_start);
        let at = self.t.find_from(from, "@empty");
        let body_start = self.t.find_from(at, "{") + 1;
        let end = self.t.close_brace(body_start);
        self.body_end = Some(end);
        self.empty = Some(ForLoopBlockEmpty { children, source_span: ParseSourceSpan::new(at, end) });
        self
    }

    pub fn build(self) -> R3Node {
        let end = match self.body_end {
            Some(end) => end,
            None => self.t.close_brace(self.body_start),
        };
        R3Node::ForLoopBlock(ForLoopBlock {
            item: self.item,
            expression: self.expression,
            track_by: self.track_by,
            track_keyword_span: self.track_keyword_span,
            context_variables: self.context_variables,
            children: self.children,
            empty: self.empty,
            source_span: ParseSourceSpan::new(self.start, end),
        })
    }
}

pub struct DeferBlockBuilder<'a> {
    t: &'a TemplateBuilder,
    start: usize,
    header_end: usize,
    last_end: usize,
    children: Vec<R3Node>,
    triggers: Vec<DeferredTrigger>,
    prefetch_triggers: Vec<DeferredTrigger>,
    placeholder: Option<DeferredBlockPlaceholder>,
    loading: Option<DeferredBlockLoading>,
    error: Option<DeferredBlockError>,
}

impl<'a> DeferBlockBuilder<'a> {
    fn trigger(&self, text: &str) -> DeferredTrigger {
        let at = self.t.find_from(self.start, text);
        assert!(at < self.header_end, "`{}` is not part of the @defer header", text);
        let source_span = ParseSourceSpan::new(at, at + text.len());
        let (name, argument) = match text.split_once('(') {
            Some((name, rest)) => (name.trim(), Some(rest.trim_end_matches(')').trim())),
            None => (text.trim(), None),
        };
        let reference = argument.filter(|a| !a.is_empty()).map(|a| a.to_string());
        match name {
            "idle" => DeferredTrigger::Idle { source_span },
            "immediate" => DeferredTrigger::Immediate { source_span },
            "never" => DeferredTrigger::Never { source_span },
            "hover" => DeferredTrigger::Hover { reference, source_span },
            "interaction" => DeferredTrigger::Interaction { reference, source_span },
            "viewport" => DeferredTrigger::Viewport { reference, source_span },
            "timer" => {
                let delay = argument.map(parse_time).unwrap_or_else(|| panic!("`{}` needs a delay", text));
                DeferredTrigger::Timer { delay, source_span }
            }
            other => panic!("unknown defer trigger `{}`", other),
        }
    }

    fn when_trigger(&self, keyword: &str, expr: &str) -> DeferredTrigger {
        let at = self.t.find_from(self.start, keyword);
        let (value, value_span) = self.t.binding_after(at + keyword.len(), expr);
        DeferredTrigger::When {
            value: value.ast,
            source_span: ParseSourceSpan::new(at, value_span.end),
        }
    }

    /// `on idle`, `on hover(button)`, `on timer(500ms)` and so on, without the `on`.
    pub fn on(mut self, trigger: &str) -> Self {
        let trigger = self.trigger(trigger);
        self.triggers.push(trigger);
        self
    }

    pub fn when(mut self, expr: &str) -> Self {
        let trigger = self.when_trigger("when", expr);
        self.triggers.push(trigger);
        self
    }

    pub fn prefetch_on(mut self, trigger: &str) -> Self {
        let trigger = self.trigger(trigger);
        self.prefetch_triggers.push(trigger);
        self
    }

    pub fn prefetch_when(mut self, expr: &str) -> Self {
        let trigger = self.when_trigger("prefetch when", expr);
        self.prefetch_triggers.push(trigger);
        self
    }

    pub fn body(mut self, children: Vec<R3Node>) -> Self {
        self.children = children;
        self.last_end = self.t.close_brace(self.header_end);
        self
    }

    /// Locates a `@name (...) {` section after the previous one and returns its
    /// start and end.
    fn section(&mut self, keyword: &str) -> (usize, usize) {
        let at = self.t.find_from(self.last_end, keyword);
        let body_start = self.t.find_from(at, "{") + 1;
        let end = self.t.close_brace(body_start);
        self.last_end = end;
        (at, end)
    }

    pub fn placeholder(mut self, minimum_time: Option<u64>, children: Vec<R3Node>) -> Self {
        let (start, end) = self.section("@placeholder");
        self.placeholder = Some(DeferredBlockPlaceholder {
            children,
            minimum_time,
            source_span: ParseSourceSpan::new(start, end),
        });
        self
    }

    pub fn loading(mut self, after_time: Option<u64>, minimum_time: Option<u64>, children: Vec<R3Node>) -> Self {
        let (start, end) = self.section("@loading");
        self.loading = Some(DeferredBlockLoading {
            children,
            after_time,
            minimum_time,
            source_span: ParseSourceSpan::new(start, end),
        });
        self
    }

    pub fn error(mut self, children: Vec<R3Node>) -> Self {
        let (start, end) = self.section("@error");
        self.error = Some(DeferredBlockError { children, source_span: ParseSourceSpan::new(start, end) });
        self
    }

    pub fn build(self) -> R3Node {
        R3Node::DeferredBlock(DeferredBlock {
            children: self.children,
            triggers: self.triggers,
            prefetch_triggers: self.prefetch_triggers,
            placeholder: self.placeholder,
            loading: self.loading,
            error: self.error,
            source_span: ParseSourceSpan::new(self.start, self.last_end),
        })
    }
}

/// `500ms` or `1s` in milliseconds.
fn parse_time(value: &str) -> u64 {
    let value = value.trim();
    let (number, factor) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1000)
    } else {
        (value, 1)
    };
    number.trim().parse::<u64>().map(|n| n * factor).unwrap_or_else(|_| panic!("invalid time `{}`", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_spans_cover_start_and_end_tags() {
        let t = TemplateBuilder::new(r#"<div [title]="name" (click)="go()">hi</div>"#);
        let node = t.element("div").input("title", "name").output("click", "go()").child(t.text("hi")).build();
        let R3Node::Element(element) = node else { panic!("expected an element") };

        assert_eq!(element.start_source_span, ParseSourceSpan::new(0, 35));
        assert_eq!(element.source_span, ParseSourceSpan::new(0, 43));
        assert_eq!(element.inputs[0].key_span, ParseSourceSpan::new(5, 12));
        assert_eq!(element.inputs[0].value_span, Some(ParseSourceSpan::new(14, 18)));
        assert_eq!(element.outputs[0].handler_span, ParseSourceSpan::new(29, 33));
        assert_eq!(element.children[0].source_span(), &ParseSourceSpan::new(35, 37));
    }

    #[test]
    fn start_tag_end_skips_quoted_greater_than() {
        let source = r#"<p [x]="a > b">"#;
        assert_eq!(start_tag_end(source, 2), Some(source.len()));
    }

    #[test]
    fn if_branches_are_located_in_order() {
        let t = TemplateBuilder::new("@if (a) {x} @else if (b) {y} @else {z}");
        let node = t
            .if_block()
            .branch("a", vec![t.text("x")])
            .else_if("b", vec![t.text("y")])
            .else_branch(vec![t.text("z")])
            .build();
        let R3Node::IfBlock(block) = node else { panic!("expected an if block") };

        assert_eq!(block.branches.len(), 3);
        assert_eq!(block.branches[1].source_span, ParseSourceSpan::new(12, 28));
        assert!(block.branches[2].expression.is_none());
        assert_eq!(block.source_span, ParseSourceSpan::new(0, 38));
    }

    #[test]
    fn timer_triggers_accept_seconds() {
        assert_eq!(parse_time("500ms"), 500);
        assert_eq!(parse_time("2s"), 2000);
    }
}
