// `#ref` declarations.

use ng_template_compiler::render3::r3_ast::Reference;
use ng_template_compiler::render3::view::ReferenceTarget;

use super::super::super::api::TypeCheckableDirectiveMeta;
use super::super::error::TcbResult;
use super::super::expression::cast_to_any;
use super::super::scope::{ScopeId, TcbContext};
use super::super::tcb_expr::TcbExpr;

impl<'t, 'a> TcbContext<'t, 'a> {
    pub(super) fn reference_op(
        &mut self,
        scope: ScopeId,
        reference: &'a Reference,
        target: &ReferenceTarget<TypeCheckableDirectiveMeta>,
    ) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        let resolved = match target {
            ReferenceTarget::Element(key) => self.resolve_element_key(scope, key)?,
            ReferenceTarget::Template(key) => self.resolve_template_ctx(scope, key)?,
            ReferenceTarget::Directive { directive, node } => self.resolve_directive(scope, node, directive)?,
        };
        let config = self.env.config;
        let is_element = matches!(target, ReferenceTarget::Element(_));
        let init = if (is_element && !config.check_type_of_dom_references) || !config.check_type_of_non_dom_references {
            cast_to_any(resolved.source())
        } else if let ReferenceTarget::Template(_) = target {
            let template_ref = self.env.reference_core("TemplateRef");
            format!("({} as {}<any>)", cast_to_any(resolved.source()), template_ref)
        } else {
            resolved.into_source()
        };

        let init = TcbExpr::new(init).with_span(reference.source_span.to_absolute());
        let name = TcbExpr::new(id.clone()).with_span(reference.key_span.to_absolute());
        self.add_statement(scope, format!("var {} = {};", name.print(), init.print()));
        Ok(Some(TcbExpr::new(id)))
    }

    /// A reference whose target could not be found; reads of it are `any`.
    pub(super) fn invalid_reference_op(&mut self, scope: ScopeId) -> TcbResult<Option<TcbExpr>> {
        let id = self.allocate_id();
        self.add_statement(scope, format!("var {}: any = null!;", id));
        Ok(Some(TcbExpr::new(id)))
    }
}
