// `@if`, `@switch` and `@for` blocks.

use std::collections::HashMap;

use ng_template_compiler::render3::r3_ast::{ForLoopBlock, IfBlock, SwitchBlock, SwitchBlockCase, Variable};

use super::super::error::{TcbError, TcbResult};
use super::super::scope::{block, LocalSymbol, ScopeId, ScopedNode, TcbContext};
use super::super::tcb_expr::TcbExpr;

impl<'t, 'a> TcbContext<'t, 'a> {
    fn resolve_variable(&mut self, scope: ScopeId, variable: &Variable) -> TcbResult<TcbExpr> {
        match self.lookup(scope, &variable.name) {
            Some((owner, symbol)) => self.resolve_symbol(owner, &variable.name, &symbol),
            None => Err(TcbError::Unresolved(format!("variable {}", variable.name))),
        }
    }

    pub(super) fn if_op(&mut self, scope: ScopeId, if_block: &'a IfBlock) -> TcbResult<Option<TcbExpr>> {
        let mut expression_scopes = HashMap::new();
        if let Some(statement) = self.if_branch(scope, if_block, 0, &mut expression_scopes)? {
            self.add_statement(scope, statement);
        }
        Ok(None)
    }

    /// `if (cond) { ... } else ...` for the branches from `index` on.
    ///
    /// The condition is translated in the parent scope. The body lives in a
    /// scope nested in the branch's own scope, which declares the alias.
    fn if_branch(
        &mut self,
        scope: ScopeId,
        if_block: &'a IfBlock,
        index: usize,
        expression_scopes: &mut HashMap<usize, ScopeId>,
    ) -> TcbResult<Option<String>> {
        let Some(branch) = if_block.branches.get(index) else {
            return Ok(None);
        };
        let Some(condition) = &branch.expression else {
            let body = self.if_branch_body(scope, if_block, index, expression_scopes)?;
            return Ok(Some(block(&body)));
        };

        let outer = self.scope_for_nodes(Some(scope), Some(ScopedNode::IfBranch(branch)), &[], None)?;
        for statement in self.render(outer)? {
            self.add_statement(scope, statement);
        }
        expression_scopes.insert(index, outer);

        let mut expression = self.tcb_expression(condition, scope)?;
        if let Some(alias) = &branch.expression_alias {
            let alias = self.resolve_variable(outer, alias)?;
            expression = TcbExpr::new(format!("{} && {}", expression.wrap_for_type_checker().print(), alias.print()));
        }

        let body = self.if_branch_body(outer, if_block, index, expression_scopes)?;
        let mut statement = format!("if ({}) {}", expression.print(), block(&body));
        if let Some(otherwise) = self.if_branch(scope, if_block, index + 1, expression_scopes)? {
            statement.push_str(" else ");
            statement.push_str(&otherwise);
        }
        Ok(Some(statement))
    }

    fn if_branch_body(
        &mut self,
        parent: ScopeId,
        if_block: &'a IfBlock,
        index: usize,
        expression_scopes: &HashMap<usize, ScopeId>,
    ) -> TcbResult<Vec<String>> {
        let branch = &if_block.branches[index];
        let body_scope = if self.env.config.check_control_flow_bodies {
            let guard = self.if_branch_guard(if_block, index, expression_scopes)?;
            self.scope_for_nodes(Some(parent), None, &branch.children, guard)?
        } else {
            self.scope_for_nodes(Some(parent), None, &[], None)?
        };
        self.render(body_scope)
    }

    /// A branch is taken when its own condition holds and every earlier one failed.
    fn if_branch_guard(
        &mut self,
        if_block: &'a IfBlock,
        index: usize,
        expression_scopes: &HashMap<usize, ScopeId>,
    ) -> TcbResult<Option<TcbExpr>> {
        let mut parts = Vec::new();
        for (i, branch) in if_block.branches.iter().enumerate().take(index + 1) {
            let Some(condition) = &branch.expression else {
                continue;
            };
            let expression_scope = *expression_scopes
                .get(&i)
                .ok_or_else(|| TcbError::Unresolved(format!("scope of @if branch {}", i)))?;
            let mut expression = self.tcb_expression(condition, expression_scope)?;
            if let Some(alias) = &branch.expression_alias {
                let alias = self.resolve_variable(expression_scope, alias)?;
                expression =
                    TcbExpr::new(format!("{} && {}", expression.wrap_for_type_checker().print(), alias.print()));
            }
            let expression = expression.mark_ignore_diagnostics();
            if i == index {
                parts.push(expression.print());
            } else {
                parts.push(format!("!{}", expression.wrap_for_type_checker().print()));
            }
        }
        Ok((!parts.is_empty()).then(|| TcbExpr::new(parts.join(" && "))))
    }

    /// Each case body is narrowed by comparing the switch value with its case,
    /// the default body by ruling out every case.
    pub(super) fn switch_op(&mut self, scope: ScopeId, switch: &'a SwitchBlock) -> TcbResult<Option<TcbExpr>> {
        let value = self.tcb_expression(&switch.expression, scope)?;
        let check_bodies = self.env.config.check_control_flow_bodies;
        let mut clauses = Vec::with_capacity(switch.cases.len() + 1);

        for case in &switch.cases {
            let case_scope = if check_bodies {
                let guard = self.switch_case_guard(scope, switch, case, &value)?;
                self.scope_for_nodes(Some(scope), None, &case.children, guard)?
            } else {
                self.scope_for_nodes(Some(scope), None, &[], None)?
            };
            let mut statements = self.render(case_scope)?;
            statements.push("break;".to_string());
            let clause = match &case.expression {
                Some(expression) => {
                    let label = self.tcb_expression(expression, case_scope)?;
                    format!("case {}: {}", label.print(), block(&statements))
                }
                None => format!("default: {}", block(&statements)),
            };
            clauses.push(clause);
        }

        // A `@default` case already covers every value.
        let has_default = switch.cases.iter().any(|case| case.expression.is_none());
        if switch.exhaustive_check.is_some() && !has_default {
            let value = self.tcb_expression(&switch.expression, scope)?;
            clauses.push(format!("default: const tcbExhaustiveCheck: never = {};", value.print()));
        }

        self.add_statement(scope, format!("switch ({}) {}", value.print(), block(&clauses)));
        Ok(None)
    }

    fn switch_case_guard(
        &mut self,
        scope: ScopeId,
        switch: &'a SwitchBlock,
        case: &'a SwitchBlockCase,
        value: &TcbExpr,
    ) -> TcbResult<Option<TcbExpr>> {
        if let Some(expression) = &case.expression {
            let expression = self.tcb_expression(expression, scope)?.mark_ignore_diagnostics();
            return Ok(Some(TcbExpr::new(format!("{} === {}", value.print(), expression.print()))));
        }
        let mut parts = Vec::new();
        for other in &switch.cases {
            if let Some(expression) = &other.expression {
                let expression = self.tcb_expression(expression, scope)?.mark_ignore_diagnostics();
                parts.push(format!("{} !== {}", value.print(), expression.print()));
            }
        }
        Ok((!parts.is_empty()).then(|| TcbExpr::new(parts.join(" && "))))
    }

    /// `for (const item of (items)!) { ...; track; }`. The non-null assertion
    /// admits nullable iterables such as the result of the `async` pipe.
    pub(super) fn for_of_op(&mut self, scope: ScopeId, for_block: &'a ForLoopBlock) -> TcbResult<Option<TcbExpr>> {
        let children: &'a [_] = if self.env.config.check_control_flow_bodies { &for_block.children } else { &[] };
        let loop_scope = self.scope_for_nodes(Some(scope), Some(ScopedNode::ForLoop(for_block)), children, None)?;

        let item = match self.lookup(loop_scope, &for_block.item.name) {
            Some((owner, LocalSymbol::LoopItem { id })) if owner == loop_scope => id,
            _ => return Err(TcbError::UnresolvedLoopItem(for_block.item.name.clone())),
        };
        let item = TcbExpr::new(item).with_span(for_block.item.key_span.to_absolute());

        let iterable = self.tcb_expression(&for_block.expression.ast, scope)?;
        let track = self.track_expression(for_block, loop_scope)?;
        let mut statements = self.render(loop_scope)?;
        statements.push(format!("{};", track.print()));

        self.add_statement(
            scope,
            format!("for (const {} of {}!) {}", item.print(), iterable.wrap_for_type_checker().print(), block(&statements)),
        );
        Ok(None)
    }
}
