// Input widening, event handlers and output ops.

use std::collections::HashSet;
use std::sync::Arc;

use ng_template_compiler::render3::r3_ast::{BoundEvent, ParsedEventType};

use super::super::super::api::{TypeCheckableDirectiveMeta, TypeCheckingConfig};
use super::super::comments::ExpressionIdentifier;
use super::super::environment::ANGULAR_ANIMATIONS;
use super::super::error::TcbResult;
use super::super::expression::{cast_to_any, quote};
use super::super::scope::{block, ScopeId, TcbContext};
use super::super::tcb_expr::TcbExpr;
use super::{ElementTarget, NodeRef};

const EVENT_PARAMETER: &str = "$event";

/// Loosens an input binding as far as the config asks.
pub(super) fn widen_binding(expr: TcbExpr, config: &TypeCheckingConfig) -> TcbExpr {
    if !config.check_type_of_input_bindings {
        TcbExpr::new(cast_to_any(&expr.print()))
    } else if !config.strict_null_input_bindings {
        // Literals are never null.
        if expr.source().starts_with('[') || expr.source().starts_with('{') {
            expr
        } else {
            TcbExpr::new(format!("{}!", expr.wrap_for_diagnostics().print()))
        }
    } else {
        expr
    }
}

/// Declared type of the `$event` parameter.
enum EventParamType {
    /// Left to inference from the subscription or listener.
    Infer,
    Any,
    Type(String),
}

impl<'t, 'a> TcbContext<'t, 'a> {
    pub(super) fn unwrap_writable_signal(&mut self, expr: &TcbExpr) -> TcbExpr {
        let unwrap = self.env.reference_core("ɵunwrapWritableSignal");
        TcbExpr::new(format!("{}({})", unwrap, expr.print()))
    }

    /// `($event): any => { handler; }`, narrowed by the guards of `scope`.
    fn event_handler(
        &mut self,
        scope: ScopeId,
        event: &'a BoundEvent,
        param: EventParamType,
        assertion: Option<String>,
    ) -> TcbResult<TcbExpr> {
        let handler = self.event_handler_expression(&event.handler, scope)?;
        let mut statements = Vec::new();
        if let Some(assertion) = assertion {
            statements.push(assertion);
        }
        if event.type_ == ParsedEventType::TwoWay && self.env.config.check_two_way_bound_events {
            let target = self.allocate_id();
            let value = if self.env.config.allow_signals_in_two_way_bindings {
                self.unwrap_writable_signal(&handler)
            } else {
                handler
            };
            statements.push(format!("var {} = {};", target, value.print()));
            statements.push(format!("{} = {};", target, EVENT_PARAMETER));
        } else {
            statements.push(format!("{};", handler.print()));
        }

        let body = match self.guards(scope) {
            Some(guards) => {
                let guard = guards.wrap_for_diagnostics().mark_ignore_diagnostics();
                block(&[format!("if ({}) {}", guard.print(), block(&statements))])
            }
            None => block(&statements),
        };

        let param_name = TcbExpr::new(EVENT_PARAMETER).with_identifier(ExpressionIdentifier::EventParameter).print();
        let param = match param {
            EventParamType::Infer => param_name,
            EventParamType::Any => format!("{}: any", param_name),
            EventParamType::Type(ty) => format!("{}: {}", param_name, ty),
        };
        Ok(TcbExpr::new(format!("({}): any => {}", param, body)))
    }

    /// Reports a two-way binding whose property half is consumed by a
    /// directive while its event half goes to the element or another
    /// directive. Returns whether the binding was split.
    fn check_split_two_way_binding(&mut self, node: NodeRef<'a>, input_name: &str, output: &'a BoundEvent) -> bool {
        let Some(input) =
            node.inputs().iter().find(|input| input.name == input_name && input.source_span == output.source_span)
        else {
            return false;
        };
        let directives = self.directives_of(&node.key());
        let Some(input_consumer) =
            directives.iter().find(|dir| !dir.inputs_by_binding_name(&input.name).is_empty())
        else {
            return false;
        };
        let output_consumer = directives.iter().find(|dir| dir.output_by_binding_name(&output.name).is_some());
        let split = match (output_consumer, node) {
            (Some(consumer), _) => !Arc::ptr_eq(consumer, input_consumer),
            (None, NodeRef::Element(_)) => true,
            (None, NodeRef::Template(_)) => false,
        };
        if split {
            self.oob.split_two_way_binding(&input.name, &input.source_span);
        }
        split
    }

    pub(super) fn directive_outputs_op(
        &mut self,
        scope: ScopeId,
        node: NodeRef<'a>,
        dir: &Arc<TypeCheckableDirectiveMeta>,
    ) -> TcbResult<Option<TcbExpr>> {
        let mut dir_id: Option<TcbExpr> = None;
        for output in node.outputs() {
            if output.type_ == ParsedEventType::LegacyAnimation {
                continue;
            }
            let Some(mapping) = dir.output_by_binding_name(&output.name) else {
                continue;
            };
            if self.env.config.check_type_of_output_events {
                if let Some(input_name) = output.name.strip_suffix("Change") {
                    self.check_split_two_way_binding(node, input_name, output);
                }
            }

            let instance = match &dir_id {
                Some(id) => id.clone(),
                None => {
                    let id = self.resolve_directive(scope, &node.key(), dir)?;
                    dir_id = Some(id.clone());
                    id
                }
            };
            let field = TcbExpr::new(format!("{}[{}]", instance.source(), quote(&mapping.class_property_name)))
                .with_span(output.key_span.to_absolute());

            if self.env.config.check_type_of_output_events {
                let handler = self.event_handler(scope, output, EventParamType::Infer, None)?;
                let call = TcbExpr::new(format!("{}.subscribe({})", field.print(), handler.print()))
                    .with_span(output.source_span.to_absolute());
                self.add_statement(scope, format!("{};", call.print()));
            } else {
                self.add_statement(scope, format!("{};", field.print()));
                let handler = self.event_handler(scope, output, EventParamType::Any, None)?;
                self.add_statement(scope, format!("{};", handler.print()));
            }
        }
        Ok(None)
    }

    /// Events no directive claimed go to the DOM element: `addEventListener`
    /// infers `$event` for native events.
    pub(super) fn unclaimed_outputs_op(
        &mut self,
        scope: ScopeId,
        target: ElementTarget<'a>,
        claimed: &HashSet<String>,
    ) -> TcbResult<Option<TcbExpr>> {
        let mut element_id: Option<TcbExpr> = None;
        for output in target.outputs() {
            if claimed.contains(&output.name) {
                continue;
            }
            if let (true, ElementTarget::Element(element), Some(input_name)) = (
                self.env.config.check_type_of_output_events,
                target,
                output.name.strip_suffix("Change"),
            ) {
                if self.check_split_two_way_binding(NodeRef::Element(element), input_name, output) {
                    continue;
                }
            }

            let handler = match output.type_ {
                ParsedEventType::LegacyAnimation => {
                    let param = if self.env.config.check_type_of_animation_events {
                        EventParamType::Type(self.env.reference_external(ANGULAR_ANIMATIONS, "AnimationEvent"))
                    } else {
                        EventParamType::Any
                    };
                    self.event_handler(scope, output, param, None)?
                }
                ParsedEventType::Animation => {
                    let param = EventParamType::Type(self.env.reference_core("AnimationCallbackEvent"));
                    self.event_handler(scope, output, param, None)?
                }
                ParsedEventType::Regular | ParsedEventType::TwoWay if self.env.config.check_type_of_dom_events => {
                    let (listener_target, is_element) = match output.target.as_deref() {
                        Some(global @ ("window" | "document")) => (global.to_string(), false),
                        _ => {
                            let id = match &element_id {
                                Some(id) => id.clone(),
                                None => {
                                    let id = match target {
                                        ElementTarget::Element(element) => {
                                            self.resolve_node(scope, NodeRef::Element(element))?
                                        }
                                        ElementTarget::Host(_) => self.resolve_host_element(scope)?,
                                    };
                                    element_id = Some(id.clone());
                                    id
                                }
                            };
                            (id.into_source(), true)
                        }
                    };
                    let assertion = match target {
                        ElementTarget::Element(element) if is_element && element.is_void() => {
                            let assert_type = self.env.reference_core("ɵassertType");
                            Some(format!("{}<typeof {}>({}.target);", assert_type, listener_target, EVENT_PARAMETER))
                        }
                        _ => None,
                    };
                    let handler = self.event_handler(scope, output, EventParamType::Infer, assertion)?;
                    let listener = TcbExpr::new(format!("{}.addEventListener", listener_target))
                        .with_span(output.key_span.to_absolute());
                    let call = TcbExpr::new(format!("{}({}, {})", listener.print(), quote(&output.name), handler.print()))
                        .with_span(output.source_span.to_absolute());
                    self.add_statement(scope, format!("{};", call.print()));
                    continue;
                }
                ParsedEventType::Regular | ParsedEventType::TwoWay => {
                    self.event_handler(scope, output, EventParamType::Any, None)?
                }
            };
            self.add_statement(scope, format!("{};", handler.print()));
        }
        Ok(None)
    }
}
