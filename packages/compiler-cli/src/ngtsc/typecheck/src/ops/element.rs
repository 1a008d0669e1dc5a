// Element, variable and plain expression ops.

use std::collections::HashSet;

use ng_template_compiler::expression_parser::AST;
use ng_template_compiler::render3::r3_ast::{BindingType, Element, HostElement, LetDeclaration, Template, Variable};
use ng_template_compiler::render3::view::NodeKey;
use ng_template_compiler::schema::DOM_SCHEMA;

use super::super::comments::{span_comment, ExpressionIdentifier};
use super::super::error::TcbResult;
use super::super::expression::quote;
use super::super::scope::{ScopeId, TcbContext};
use super::super::tcb_expr::TcbExpr;
use super::bindings::widen_binding;
use super::{ElementTarget, NodeRef};

fn is_property_binding(type_: BindingType) -> bool {
    matches!(type_, BindingType::Property | BindingType::TwoWay)
}

fn is_dom_property(name: &str) -> bool {
    name != "style" && name != "class"
}

impl<'t, 'a> TcbContext<'t, 'a> {
    pub(super) fn component_context_completion(&mut self, scope: ScopeId) -> TcbResult<Option<TcbExpr>> {
        let anchor = TcbExpr::new("this.")
            .with_identifier(ExpressionIdentifier::ComponentCompletion)
            .mark_ignore_diagnostics();
        self.add_statement(scope, format!("{};", anchor.print()));
        Ok(None)
    }

    /// `var _t1 = document.createElement("div");`
    pub(super) fn element_op(&mut self, scope: ScopeId, element: &'a Element) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let init = TcbExpr::new(format!("document.createElement({})", quote(&element.name)))
            .with_span(element.start_source_span.to_absolute());
        self.add_statement(scope, format!("var {} = {};", id, init.print()));
        Ok(Some(TcbExpr::new(id)))
    }

    /// Host bindings may apply to any of the component's selector tags.
    pub(super) fn host_element_op(&mut self, scope: ScopeId, host: &'a HostElement) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let arg = match host.tag_names.as_slice() {
            [tag] => quote(tag),
            [] => "null! as string".to_string(),
            tags => {
                let union: Vec<String> = tags.iter().map(|tag| quote(tag)).collect();
                format!("null! as {}", union.join(" | "))
            }
        };
        let init = TcbExpr::new(format!("document.createElement({})", arg)).with_span(host.source_span.to_absolute());
        self.add_statement(scope, format!("var {} = {};", id, init.print()));
        Ok(Some(TcbExpr::new(id)))
    }

    pub(super) fn template_context_op(&mut self, scope: ScopeId) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        self.add_statement(scope, format!("var {}: any = null!;", id));
        Ok(Some(TcbExpr::new(id)))
    }

    /// `let-x="value"` reads `value` from the template context, `$implicit` when unnamed.
    pub(super) fn template_variable_op(
        &mut self,
        scope: ScopeId,
        template: &'a Template,
        variable: &'a Variable,
    ) -> TcbResult<Option<TcbExpr>> {
        let ctx = self.resolve_template_ctx(scope, &NodeKey::of_template(template))?;
        let id = self.allocate_id();
        let field = if variable.value.is_empty() { "$implicit" } else { variable.value.as_str() };
        let access = TcbExpr::new(format!("{}.{}", ctx.source(), field));
        let init = match &variable.value_span {
            Some(value_span) => access.with_span(value_span.to_absolute()).wrap_for_type_checker(),
            None => access,
        };
        let name = TcbExpr::new(id.clone()).with_span(variable.key_span.to_absolute());
        self.add_statement(
            scope,
            format!("const {} = {} {};", name.print(), init.print(), span_comment(variable.source_span.to_absolute())),
        );
        Ok(Some(TcbExpr::new(id)))
    }

    pub(super) fn block_variable_op(
        &mut self,
        scope: ScopeId,
        initializer: TcbExpr,
        variable: &'a Variable,
    ) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let name = TcbExpr::new(id.clone()).with_span(variable.key_span.to_absolute());
        self.add_statement(
            scope,
            format!(
                "const {} = {} {};",
                name.print(),
                initializer.wrap_for_type_checker().print(),
                span_comment(variable.source_span.to_absolute())
            ),
        );
        Ok(Some(TcbExpr::new(id)))
    }

    /// `$index`, `$first` and the other context variables of a `@for` loop.
    pub(super) fn block_implicit_variable_op(
        &mut self,
        scope: ScopeId,
        ty: &str,
        variable: &'a Variable,
    ) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let name = TcbExpr::new(id.clone()).with_span(variable.key_span.to_absolute());
        self.add_statement(
            scope,
            format!("var {}: {} = null! {};", name.print(), ty, span_comment(variable.source_span.to_absolute())),
        );
        Ok(Some(TcbExpr::new(id)))
    }

    pub(super) fn let_op(&mut self, scope: ScopeId, decl: &'a LetDeclaration) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let value = self.tcb_expression(&decl.value, scope)?;
        let name = TcbExpr::new(id.clone()).with_span(decl.name_span.to_absolute());
        self.add_statement(
            scope,
            format!(
                "const {} = {} {};",
                name.print(),
                value.wrap_for_type_checker().print(),
                span_comment(decl.source_span.to_absolute())
            ),
        );
        Ok(Some(TcbExpr::new(id)))
    }

    pub(super) fn expression_op(&mut self, scope: ScopeId, ast: &'a AST) -> TcbResult<Option<TcbExpr>> {
        let expr = self.tcb_expression(ast, scope)?;
        self.add_statement(scope, format!("{};", expr.print()));
        Ok(None)
    }

    fn resolve_element_target(&mut self, scope: ScopeId, target: ElementTarget<'a>) -> TcbResult<TcbExpr> {
        match target {
            ElementTarget::Element(element) => self.resolve_node(scope, NodeRef::Element(element)),
            ElementTarget::Host(_) => self.resolve_host_element(scope),
        }
    }

    /// Property bindings no directive claimed are checked against the DOM
    /// element when DOM bindings are checked. Everything else is still
    /// evaluated so the expressions themselves are checked.
    pub(super) fn unclaimed_inputs_op(
        &mut self,
        scope: ScopeId,
        target: ElementTarget<'a>,
        claimed: &HashSet<String>,
    ) -> TcbResult<Option<TcbExpr>> {
        let mut element_id: Option<TcbExpr> = None;
        for binding in target.inputs() {
            let is_property = is_property_binding(binding.type_);
            if is_property && claimed.contains(&binding.name) {
                continue;
            }
            let expr = widen_binding(self.tcb_expression(&binding.value, scope)?, &self.env.config);
            if self.env.config.check_type_of_dom_bindings && is_property && is_dom_property(&binding.name) {
                let element = match &element_id {
                    Some(id) => id.clone(),
                    None => {
                        let id = self.resolve_element_target(scope, target)?;
                        element_id = Some(id.clone());
                        id
                    }
                };
                let property = quote(DOM_SCHEMA.mapped_prop_name(&binding.name));
                let assignment = TcbExpr::new(format!(
                    "{}[{}] = {}",
                    element.source(),
                    property,
                    expr.wrap_for_diagnostics().print()
                ))
                .with_span(binding.source_span.to_absolute());
                self.add_statement(scope, format!("{};", assignment.print()));
            } else {
                self.add_statement(scope, format!("{};", expr.print()));
            }
        }
        Ok(None)
    }

    pub(super) fn dom_schema_check_op(
        &mut self,
        target: ElementTarget<'a>,
        check_element: bool,
        claimed: &HashSet<String>,
    ) -> TcbResult<Option<TcbExpr>> {
        if let (true, ElementTarget::Element(element)) = (check_element, target) {
            self.dom.check_element(&element.name, &element.start_source_span, self.schemas);
        }
        for binding in target.inputs() {
            let is_property = is_property_binding(binding.type_);
            if !is_property || claimed.contains(&binding.name) || !is_dom_property(&binding.name) {
                continue;
            }
            let property = DOM_SCHEMA.mapped_prop_name(&binding.name);
            match target {
                ElementTarget::Element(element) => {
                    self.dom.check_template_element_property(&element.name, property, &binding.source_span, self.schemas)
                }
                ElementTarget::Host(host) => {
                    self.dom.check_host_element_property(&host.tag_names, property, &binding.key_span, self.schemas)
                }
            }
        }
        Ok(None)
    }
}
