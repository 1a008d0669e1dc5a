// Host Bindings
//
// Builds the synthetic host element of a directive from its `host: {}`
// literal and its `@HostBinding`/`@HostListener` members.

use log::debug;
use ng_template_compiler::expression_parser::{ASTWithSource, Parser};
use ng_template_compiler::parse_util::ParseSourceSpan;
use ng_template_compiler::render3::r3_ast::{BindingType, BoundAttribute, BoundEvent, HostElement, ParsedEventType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{TcbError, TcbResult};

const LOCATION: &str = "host";

/// Host bindings of a directive as they appear in its source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostBindingsMeta {
    /// Tag names the directive can be placed on.
    pub tag_names: Vec<String>,
    pub source_span: Option<ParseSourceSpan>,
    /// Entries of the `host: {}` literal.
    pub literal: Vec<HostLiteralEntry>,
    pub host_bindings: Vec<HostBindingDecorator>,
    pub host_listeners: Vec<HostListenerDecorator>,
}

/// `'[prop]': 'expr'`. Values that are not string literals stay as their
/// JSON value and are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostLiteralEntry {
    pub key: String,
    pub value: Value,
    /// Offset of the key text, inside its quotes.
    pub key_start: usize,
    /// Offset of the value text, inside its quotes.
    pub value_start: usize,
}

/// `@HostBinding('attr.x') member`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostBindingDecorator {
    pub member_name: String,
    pub member_start: usize,
    /// The decorator argument; the member name is bound when absent.
    #[serde(default)]
    pub argument: Option<Value>,
    #[serde(default)]
    pub decorator_span: Option<ParseSourceSpan>,
}

/// `@HostListener('event', ['$event'])` on a method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostListenerDecorator {
    pub member_name: String,
    pub member_start: usize,
    #[serde(default)]
    pub event: Option<Value>,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub decorator_span: Option<ParseSourceSpan>,
}

/// Returns `None` when the directive has no host bindings or listeners to check.
pub fn create_host_element(meta: &HostBindingsMeta) -> TcbResult<Option<HostElement>> {
    let parser = Parser::new();
    let mut bindings = Vec::new();
    let mut listeners = Vec::new();

    for entry in &meta.literal {
        let Value::String(value) = &entry.value else {
            debug!("skipping host entry {} with a non-string value", entry.key);
            continue;
        };
        if let Some(name) = entry.key.strip_prefix('[').and_then(|key| key.strip_suffix(']')) {
            let key_span = ParseSourceSpan::new(entry.key_start, entry.key_start + entry.key.len());
            let value_span = ParseSourceSpan::new(entry.value_start, entry.value_start + value.len());
            if let Some(binding) = host_binding(&parser, name, value, key_span, value_span) {
                bindings.push(binding);
            }
        } else if let Some(name) = entry.key.strip_prefix('(').and_then(|key| key.strip_suffix(')')) {
            let key_span = ParseSourceSpan::new(entry.key_start, entry.key_start + entry.key.len());
            let handler_span = ParseSourceSpan::new(entry.value_start, entry.value_start + value.len());
            let Some(handler) = parse(&parser, value, entry.value_start, true) else {
                continue;
            };
            listeners.push(host_listener(name, handler, key_span, handler_span)?);
        }
    }

    for decorator in &meta.host_bindings {
        let name = match &decorator.argument {
            None => decorator.member_name.as_str(),
            Some(Value::String(name)) => name.as_str(),
            Some(_) => {
                debug!("skipping @HostBinding on {} with a non-string argument", decorator.member_name);
                continue;
            }
        };
        let member_span =
            ParseSourceSpan::new(decorator.member_start, decorator.member_start + decorator.member_name.len());
        let key_span = decorator.decorator_span.clone().unwrap_or_else(|| member_span.clone());
        if let Some(binding) = host_binding(&parser, name, &decorator.member_name, key_span, member_span) {
            bindings.push(binding);
        }
    }

    for decorator in &meta.host_listeners {
        let Some(Value::String(event)) = &decorator.event else {
            debug!("skipping @HostListener on {} without a string event name", decorator.member_name);
            continue;
        };
        let Some(args) = decorator
            .args
            .iter()
            .map(|arg| match arg {
                Value::String(arg) => Some(arg.as_str()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
        else {
            debug!("skipping @HostListener on {} with non-string arguments", decorator.member_name);
            continue;
        };
        let source = format!("{}({})", decorator.member_name, args.join(", "));
        let handler_span = ParseSourceSpan::new(decorator.member_start, decorator.member_start + source.len());
        let Some(handler) = parse(&parser, &source, decorator.member_start, true) else {
            continue;
        };
        let key_span = decorator.decorator_span.clone().unwrap_or_else(|| handler_span.clone());
        listeners.push(host_listener(event, handler, key_span, handler_span)?);
    }

    if bindings.is_empty() && listeners.is_empty() {
        return Ok(None);
    }
    let source_span = meta.source_span.clone().unwrap_or_else(|| ParseSourceSpan::new(0, 0));
    Ok(Some(HostElement { tag_names: meta.tag_names.clone(), bindings, listeners, source_span }))
}

fn parse(parser: &Parser, source: &str, offset: usize, action: bool) -> Option<ASTWithSource> {
    let parsed = if action {
        parser.parse_action(source, LOCATION, offset)
    } else {
        parser.parse_binding(source, LOCATION, offset)
    };
    match parsed {
        Ok(ast) => Some(ast),
        Err(err) => {
            debug!("skipping malformed host binding `{}`: {}", source, err);
            None
        }
    }
}

fn host_binding(
    parser: &Parser,
    name: &str,
    expression: &str,
    key_span: ParseSourceSpan,
    value_span: ParseSourceSpan,
) -> Option<BoundAttribute> {
    if name.is_empty() {
        debug!("skipping host binding with an empty property name");
        return None;
    }
    let value = parse(parser, expression, value_span.start, false)?;
    let (type_, name, unit) = classify_property(name);
    let source_span = ParseSourceSpan::new(key_span.start.min(value_span.start), key_span.end.max(value_span.end));
    Some(BoundAttribute { name, type_, value: value.ast, unit, source_span, key_span, value_span: Some(value_span) })
}

/// `[attr.x]`, `[class.x]`, `[style.x.unit]`, `[@trigger]`, `[animate.x]` or a plain property.
fn classify_property(name: &str) -> (BindingType, String, Option<String>) {
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

/// `window:resize`, `@trigger.done`, `animate.enter` or a plain DOM event.
fn host_listener(
    name: &str,
    handler: ASTWithSource,
    key_span: ParseSourceSpan,
    handler_span: ParseSourceSpan,
) -> TcbResult<BoundEvent> {
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

    let malformed_target = target.as_deref().is_some_and(|target| target.is_empty());
    if event.is_empty() || malformed_target || event.contains(|c: char| c.is_whitespace() || c == ',') {
        return Err(TcbError::HostBinding("Failed to parse event binding".to_string()));
    }

    let source_span = ParseSourceSpan::new(key_span.start.min(handler_span.start), key_span.end.max(handler_span.end));
    Ok(BoundEvent {
        name: event.to_string(),
        type_,
        handler: handler.ast,
        target,
        phase,
        source_span,
        handler_span,
        key_span,
    })
}
