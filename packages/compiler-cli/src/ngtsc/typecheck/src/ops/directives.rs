// Directive instances, their inputs and `<ng-template>` bodies.

use std::sync::Arc;

use indexmap::IndexMap;
use ng_template_compiler::render3::r3_ast::{BindingType, Template, TemplateAttr};
use ng_template_compiler::render3::view::NodeKey;

use super::super::super::api::{InputMapping, TemplateGuardKind, TypeCheckableDirectiveMeta};
use super::super::comments::ExpressionIdentifier;
use super::super::error::TcbResult;
use super::super::expression::{quote, ANY_EXPRESSION};
use super::super::scope::{block, ScopeId, ScopedNode, TcbContext};
use super::super::tcb_expr::TcbExpr;
use super::bindings::widen_binding;
use super::{InputAttribute, NodeRef};

/// An attribute of a node together with the directive inputs it sets.
struct BoundInput<'a, 'd> {
    attribute: InputAttribute<'a>,
    inputs: Vec<&'d InputMapping>,
    two_way: bool,
}

fn bound_inputs<'a, 'd>(dir: &'d TypeCheckableDirectiveMeta, node: NodeRef<'a>) -> Vec<BoundInput<'a, 'd>> {
    node.attributes()
        .into_iter()
        .filter_map(|attribute| {
            let two_way = match attribute {
                InputAttribute::Bound(attr) => match attr.type_ {
                    BindingType::Property => false,
                    BindingType::TwoWay => true,
                    _ => return None,
                },
                InputAttribute::Text(_) => false,
            };
            let inputs = dir.inputs_by_binding_name(attribute.name());
            (!inputs.is_empty()).then_some(BoundInput { attribute, inputs, two_way })
        })
        .collect()
}

impl<'t, 'a> TcbContext<'t, 'a> {
    fn translate_input(&mut self, attribute: InputAttribute<'a>, scope: ScopeId) -> TcbResult<TcbExpr> {
        match attribute {
            InputAttribute::Bound(attr) => self.tcb_expression(&attr.value, scope),
            InputAttribute::Text(attr) => Ok(TcbExpr::new(quote(&attr.value))),
        }
    }

    fn directive_id(&mut self, node: NodeRef<'a>) -> TcbExpr {
        TcbExpr::new(self.allocate_id())
            .with_identifier(ExpressionIdentifier::Directive)
            .with_span(node.start_source_span().to_absolute())
    }

    /// `var _t1: Dir = null!;`, with `any` for every type parameter of a
    /// generic directive that is not inferred.
    pub(super) fn directive_type_op(
        &mut self,
        scope: ScopeId,
        node: NodeRef<'a>,
        dir: &Arc<TypeCheckableDirectiveMeta>,
        any_params: bool,
    ) -> TcbResult<Option<TcbExpr>> {
        let id = self.directive_id(node);
        let args = if any_params { dir.type_arguments(|_| "any".to_string()) } else { String::new() };
        self.add_statement(scope, format!("var {}: {}{} = null!;", id.print(), dir.name, args));
        Ok(Some(TcbExpr::new(id.into_source())))
    }

    /// Infers the type arguments of a generic directive by calling its type
    /// constructor with the bound input values.
    pub(super) fn directive_ctor_op(
        &mut self,
        scope: ScopeId,
        node: NodeRef<'a>,
        dir: &Arc<TypeCheckableDirectiveMeta>,
    ) -> TcbResult<Option<TcbExpr>> {
        let id = self.directive_id(node);
        let mut members: IndexMap<String, String> = IndexMap::new();
        for bound in bound_inputs(dir, node) {
            if !self.env.config.check_type_of_attributes && matches!(bound.attribute, InputAttribute::Text(_)) {
                continue;
            }
            for input in &bound.inputs {
                if members.contains_key(&input.class_property_name) {
                    continue;
                }
                let mut expr = widen_binding(self.translate_input(bound.attribute, scope)?, &self.env.config);
                if bound.two_way && self.env.config.allow_signals_in_two_way_bindings {
                    expr = self.unwrap_writable_signal(&expr);
                }
                let value = expr.wrap_for_diagnostics().with_span(bound.attribute.source_span().to_absolute());
                members.insert(
                    input.class_property_name.clone(),
                    format!("{}: {}", quote(&input.class_property_name), value.print()),
                );
            }
        }
        for input in &dir.inputs {
            if !members.contains_key(&input.class_property_name) {
                members.insert(
                    input.class_property_name.clone(),
                    format!("{}: {}", quote(&input.class_property_name), ANY_EXPRESSION),
                );
            }
        }

        let ctor = self.env.type_ctor_for(dir);
        let init = if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", members.into_values().collect::<Vec<_>>().join(", "))
        };
        let call = TcbExpr::new(format!("{}({})", ctor, init)).mark_ignore_diagnostics();
        self.add_statement(scope, format!("var {} = {};", id.print(), call.print()));
        Ok(Some(TcbExpr::new(id.into_source())))
    }

    pub(super) fn directive_ctor_circular_fallback(
        &mut self,
        scope: ScopeId,
        dir: &Arc<TypeCheckableDirectiveMeta>,
    ) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let ctor = self.env.type_ctor_for(dir);
        self.add_statement(scope, format!("var {} = {}(null!);", id, ctor));
        Ok(Some(TcbExpr::new(id)))
    }

    /// Assigns every bound value to the directive field it sets, then reports
    /// required inputs that were never bound.
    pub(super) fn directive_inputs_op(
        &mut self,
        scope: ScopeId,
        node: NodeRef<'a>,
        dir: &Arc<TypeCheckableDirectiveMeta>,
    ) -> TcbResult<Option<TcbExpr>> {
        let mut dir_id: Option<TcbExpr> = None;
        let mut seen_required: Vec<&str> = Vec::new();

        for bound in bound_inputs(dir, node) {
            let expr = widen_binding(self.translate_input(bound.attribute, scope)?, &self.env.config);
            let mut assignment = expr.wrap_for_diagnostics();

            for input in &bound.inputs {
                let field = input.class_property_name.as_str();
                if input.required {
                    seen_required.push(field);
                }

                let target = if dir.coerced_input_fields.contains(field) {
                    let ty = match &input.transform_type {
                        Some(transform) => transform.clone(),
                        None => format!("typeof {}.ngAcceptInputType_{}", dir.name, field),
                    };
                    let id = self.allocate_id();
                    self.add_statement(scope, format!("var {}: {} = null!;", id, ty));
                    id
                } else if dir.undeclared_input_fields.contains(field) {
                    continue;
                } else {
                    let instance = match &dir_id {
                        Some(id) => id.clone(),
                        None => {
                            let id = self.resolve_directive(scope, &node.key(), dir)?;
                            dir_id = Some(id.clone());
                            id
                        }
                    };
                    if !self.env.config.honor_access_modifiers_for_input_bindings
                        && dir.restricted_input_fields.contains(field)
                    {
                        let id = self.allocate_id();
                        self.add_statement(
                            scope,
                            format!("var {}: (typeof {})[{}] = null!;", id, instance.source(), quote(field)),
                        );
                        id
                    } else if dir.string_literal_input_fields.contains(field) {
                        format!("{}[{}]", instance.source(), quote(field))
                    } else {
                        format!("{}.{}", instance.source(), field)
                    }
                };

                let target = if input.is_signal {
                    let brand = self.env.reference_core("ɵINPUT_SIGNAL_BRAND_WRITE_TYPE");
                    format!("{}[{}]", target, brand)
                } else {
                    target
                };
                let target = match bound.attribute.key_span() {
                    Some(key_span) => TcbExpr::new(target).with_span(key_span.to_absolute()),
                    None => TcbExpr::new(target),
                };

                if bound.two_way && self.env.config.allow_signals_in_two_way_bindings {
                    assignment = self.unwrap_writable_signal(&assignment);
                }
                assignment = TcbExpr::new(format!("{} = {}", target.print(), assignment.print()));
            }

            let mut statement = assignment.with_span(bound.attribute.source_span().to_absolute());
            if !self.env.config.check_type_of_attributes && matches!(bound.attribute, InputAttribute::Text(_)) {
                statement = statement.mark_ignore_diagnostics();
            }
            self.add_statement(scope, format!("{};", statement.print()));
        }

        let missing: Vec<String> = dir
            .inputs
            .iter()
            .filter(|input| input.required && !seen_required.contains(&input.class_property_name.as_str()))
            .map(|input| input.binding_property_name.clone())
            .collect();
        if !missing.is_empty() {
            self.oob.missing_required_inputs(node.start_source_span(), &dir.name, dir.is_component, &missing);
        }
        Ok(None)
    }

    /// Checks the body of an `<ng-template>` in its own scope, narrowed by the
    /// template guards of the directives on it.
    pub(super) fn template_body_op(&mut self, scope: ScopeId, template: &'a Template) -> TcbResult<Option<TcbExpr>> {
        let node = NodeRef::Template(template);
        let key = NodeKey::of_template(template);
        let mut guards: Vec<String> = Vec::new();

        for dir in self.directives_of(&key) {
            let instance = self.resolve_directive(scope, &key, &dir)?;
            for guard in &dir.ng_template_guards {
                let bound = template.inputs.iter().find(|input| input.name == guard.input_name).or_else(|| {
                    template.template_attrs.iter().find_map(|attr| match attr {
                        TemplateAttr::Bound(bound) if bound.name == guard.input_name => Some(bound),
                        _ => None,
                    })
                });
                let Some(bound) = bound else {
                    continue;
                };
                let expr = self.tcb_expression(&bound.value, scope)?.mark_ignore_diagnostics();
                match guard.kind {
                    TemplateGuardKind::Binding => guards.push(expr.print()),
                    TemplateGuardKind::Invocation => {
                        let invoke = TcbExpr::new(format!(
                            "{}.ngTemplateGuard_{}({}, {})",
                            dir.name,
                            guard.input_name,
                            instance.source(),
                            expr.print()
                        ))
                        .with_span(bound.value.source_span());
                        guards.push(invoke.print());
                    }
                }
            }

            if dir.has_ng_template_context_guard && self.env.config.apply_template_context_guards {
                let ctx = self.resolve_node(scope, node)?;
                let invoke = TcbExpr::new(format!(
                    "{}.ngTemplateContextGuard({}, {})",
                    dir.name,
                    instance.source(),
                    ctx.source()
                ))
                .with_span(template.source_span.to_absolute());
                guards.push(invoke.print());
            }
        }

        let guard = (!guards.is_empty()).then(|| TcbExpr::new(guards.join(" && ")));
        let body_scope =
            self.scope_for_nodes(Some(scope), Some(ScopedNode::Template(template)), &template.children, guard.clone())?;
        let statements = self.render(body_scope)?;
        if statements.is_empty() {
            return Ok(None);
        }
        let body = block(&statements);
        let statement = match guard {
            Some(guard) => format!("if ({}) {}", guard.print(), body),
            None => body,
        };
        self.add_statement(scope, statement);
        Ok(None)
    }
}
