// TypeCheck Scope Resolver
//
// Resolves the template-local names of an expression against the scope it
// is translated in.

use ng_template_compiler::expression_parser::{Binary, BindingPipe, Call, PropertyRead, AST};
use ng_template_compiler::render3::r3_ast::ForLoopBlock;

use super::expression::{cast_to_any, translate_expression, TcbExprResolver, TranslateContext, ANY_EXPRESSION};
use super::error::TcbResult;
use super::scope::{LocalSymbol, ScopeId, TcbContext};
use super::tcb_expr::TcbExpr;

const EVENT_PARAMETER: &str = "$event";

#[derive(Clone, Copy)]
pub(super) enum ResolveMode<'a> {
    Expression,
    /// `$event` is in scope and `@let` declarations may be read before their
    /// declaration, since handlers run later.
    EventHandler,
    /// Only the loop item, `$index` and component members are readable.
    Track { block: &'a ForLoopBlock, loop_scope: ScopeId },
}

pub(super) struct ScopeResolver<'r, 't, 'a> {
    tcb: &'r mut TcbContext<'t, 'a>,
    scope: ScopeId,
    mode: ResolveMode<'a>,
    illegal_track_access: bool,
}

impl<'r, 't, 'a> ScopeResolver<'r, 't, 'a> {
    pub(super) fn new(tcb: &'r mut TcbContext<'t, 'a>, scope: ScopeId, mode: ResolveMode<'a>) -> Self {
        Self { tcb, scope, mode, illegal_track_access: false }
    }

    /// Whether a track expression read something other than the loop item or index.
    pub(super) fn found_illegal_track_access(&self) -> bool {
        self.illegal_track_access
    }

    fn resolve_implicit_read(&mut self, read: &PropertyRead) -> TcbResult<Option<TcbExpr>> {
        if matches!(self.mode, ResolveMode::EventHandler) && read.name == EVENT_PARAMETER {
            return Ok(Some(TcbExpr::new(EVENT_PARAMETER).with_span(read.name_span)));
        }
        let Some((owner, symbol)) = self.tcb.lookup(self.scope, &read.name) else {
            return Ok(None);
        };

        if let ResolveMode::Track { block, loop_scope } = self.mode {
            self.check_track_access(block, loop_scope, owner, &symbol, read);
        }

        let resolved = self.tcb.resolve_symbol(owner, &read.name, &symbol)?;
        if let LocalSymbol::Let { decl, .. } = &symbol {
            let after_declaration = read.source_span.start > decl.source_span.end;
            let local = owner == self.scope;
            if !matches!(self.mode, ResolveMode::EventHandler) && local && !after_declaration {
                self.tcb.oob.let_used_before_definition(&read.name, read.source_span);
                return Ok(Some(TcbExpr::new(cast_to_any(resolved.source())).with_span(read.source_span)));
            }
        }
        Ok(Some(resolved.with_span(read.source_span)))
    }

    fn check_track_access(
        &mut self,
        block: &ForLoopBlock,
        loop_scope: ScopeId,
        owner: ScopeId,
        symbol: &LocalSymbol<'_>,
        read: &PropertyRead,
    ) {
        let allowed = owner == loop_scope
            && match symbol {
                LocalSymbol::LoopItem { .. } => true,
                LocalSymbol::Variable { variable, .. } => variable.value == "$index",
                LocalSymbol::Reference { .. } | LocalSymbol::Let { .. } => false,
            };
        if allowed || self.illegal_track_access {
            return;
        }
        self.illegal_track_access = true;
        let index = block
            .context_variables
            .iter()
            .find(|variable| variable.value == "$index")
            .map_or("$index", |variable| variable.name.as_str());
        self.tcb.oob.illegal_for_loop_track_access(&read.name, read.source_span, &block.item.name, index);
    }

    /// Writes to template variables and `@let` declarations are reported and
    /// kept out of further diagnostics.
    fn resolve_assignment(&mut self, binary: &Binary, cx: &mut TranslateContext<'_>) -> TcbResult<Option<TcbExpr>> {
        let Some(read) = binary.left.as_implicit_read() else {
            return Ok(None);
        };
        let Some((owner, symbol)) = self.tcb.lookup(self.scope, &read.name) else {
            return Ok(None);
        };
        let target = self.tcb.resolve_symbol(owner, &read.name, &symbol)?.with_span(read.source_span);
        let value = translate_expression(&binary.right, self, cx)?.wrap_for_diagnostics();
        let result =
            TcbExpr::new(format!("({} {} {})", target.print(), binary.operation, value.print())).with_span(read.source_span);
        match symbol {
            LocalSymbol::Let { .. } => {
                self.tcb.oob.illegal_write_to_let_declaration(&read.name, read.source_span);
                Ok(Some(result.mark_ignore_diagnostics()))
            }
            LocalSymbol::Variable { .. } | LocalSymbol::LoopItem { .. } => {
                self.tcb.oob.illegal_assignment_to_template_var(&read.name, read.source_span);
                Ok(Some(result.mark_ignore_diagnostics()))
            }
            LocalSymbol::Reference { .. } => Ok(Some(result)),
        }
    }

    fn resolve_pipe(&mut self, pipe: &BindingPipe, cx: &mut TranslateContext<'_>) -> TcbResult<Option<TcbExpr>> {
        let pipes = self.tcb.pipes;
        let instance = match pipes.get(&pipe.name) {
            None => {
                self.tcb.oob.missing_pipe(&pipe.name, pipe.name_span);
                format!("({})", ANY_EXPRESSION)
            }
            Some(meta)
                if meta.is_explicitly_deferred
                    && self.tcb.bound_target.eagerly_used_pipes().iter().any(|name| *name == pipe.name) =>
            {
                self.tcb.oob.deferred_pipe_used_eagerly(&pipe.name, pipe.name_span);
                format!("({})", ANY_EXPRESSION)
            }
            Some(meta) => self.tcb.env.pipe_inst(meta),
        };

        let mut args = vec![translate_expression(&pipe.exp, self, cx)?.print()];
        for arg in &pipe.args {
            args.push(translate_expression(arg, self, cx)?.print());
        }

        let method = TcbExpr::new(format!("{}.transform", instance)).with_span(pipe.name_span).print();
        let method = if cx.config.check_type_of_pipes { method } else { cast_to_any(&method) };
        Ok(Some(TcbExpr::new(format!("{}({})", method, args.join(", "))).with_span(pipe.source_span)))
    }

    /// `$any(expr)` casts its argument, unless `$any` is a template-local name.
    fn resolve_any_cast(&mut self, call: &Call, cx: &mut TranslateContext<'_>) -> TcbResult<Option<TcbExpr>> {
        let is_any_cast = call.args.len() == 1
            && call
                .receiver
                .as_implicit_read()
                .is_some_and(|read| read.name == "$any" && self.tcb.lookup(self.scope, "$any").is_none());
        if !is_any_cast {
            return Ok(None);
        }
        let arg = translate_expression(&call.args[0], self, cx)?.wrap_for_diagnostics();
        Ok(Some(TcbExpr::new(cast_to_any(&arg.print())).with_span(call.source_span)))
    }
}

impl TcbExprResolver for ScopeResolver<'_, '_, '_> {
    fn resolve(&mut self, ast: &AST, cx: &mut TranslateContext<'_>) -> TcbResult<Option<TcbExpr>> {
        match ast {
            AST::PropertyRead(read) if read.receiver.is_implicit_receiver() => self.resolve_implicit_read(read),
            AST::Binary(binary) if binary.is_assignment() => self.resolve_assignment(binary, cx),
            AST::BindingPipe(pipe) => self.resolve_pipe(pipe, cx),
            AST::Call(call) => self.resolve_any_cast(call, cx),
            _ if ast.is_any_implicit_receiver() => Ok(Some(TcbExpr::new("this"))),
            _ => Ok(None),
        }
    }
}

impl<'a> TcbContext<'_, 'a> {
    /// Translates `ast` as a binding expression of `scope`.
    pub(super) fn tcb_expression(&mut self, ast: &AST, scope: ScopeId) -> TcbResult<TcbExpr> {
        self.translate_in(ast, scope, ResolveMode::Expression)
    }

    pub(super) fn event_handler_expression(&mut self, ast: &AST, scope: ScopeId) -> TcbResult<TcbExpr> {
        self.translate_in(ast, scope, ResolveMode::EventHandler)
    }

    /// The track expression of `block`, ignored for diagnostics once it has
    /// read a name it may not.
    pub(super) fn track_expression(&mut self, block: &'a ForLoopBlock, loop_scope: ScopeId) -> TcbResult<TcbExpr> {
        let config = self.env.config;
        let mut cx = TranslateContext::new(&config);
        let mut resolver = ScopeResolver::new(self, loop_scope, ResolveMode::Track { block, loop_scope });
        let expr = translate_expression(&block.track_by.ast, &mut resolver, &mut cx)?;
        Ok(if resolver.found_illegal_track_access() { expr.mark_ignore_diagnostics() } else { expr })
    }

    fn translate_in(&mut self, ast: &AST, scope: ScopeId, mode: ResolveMode<'a>) -> TcbResult<TcbExpr> {
        let config = self.env.config;
        let mut cx = TranslateContext::new(&config);
        let mut resolver = ScopeResolver::new(self, scope, mode);
        translate_expression(ast, &mut resolver, &mut cx)
    }
}
