//! Ingest Module
//!
//! Builds the per-view create and update op lists of a component from its
//! parsed template.

use log::trace;

use crate::error::{CompilerError, Result};
use crate::expression_parser::ast::{LiteralValue, AST};
use crate::render3::defer::DeferBlockConfig;
use crate::render3::r3_ast as t;
use crate::render3::r3_ast::{ParsedEventType, R3Node};
use crate::template::pipeline::ir;
use crate::template::pipeline::ir::Expression;
use crate::template::pipeline::src::compilation::{ComponentCompilationJob, ViewCompilationUnit};
use crate::template::pipeline::src::conversion::convert_ast;

/// Process a template AST and convert it into a `ComponentCompilationJob` in
/// the intermediate representation.
pub fn ingest_component(component_name: &str, template: &[R3Node]) -> Result<ComponentCompilationJob> {
    let mut job = ComponentCompilationJob::new(component_name);
    let root = job.root;
    ingest_nodes(&mut job, root, template)?;
    trace!("ingested {} with {} views", component_name, job.views.len());
    Ok(job)
}

fn unit_mut(job: &mut ComponentCompilationJob, view: ir::XrefId) -> Result<&mut ViewCompilationUnit> {
    job.view_mut(view)
        .ok_or_else(|| CompilerError::Pipeline(format!("unknown view {}", view)))
}

fn ingest_nodes(job: &mut ComponentCompilationJob, view: ir::XrefId, nodes: &[R3Node]) -> Result<()> {
    for node in nodes {
        match node {
            R3Node::Element(element) => ingest_element(job, view, element)?,
            R3Node::Template(template) => ingest_template(job, view, template)?,
            R3Node::Content(content) => ingest_content(job, view, content)?,
            R3Node::Text(text) => ingest_text(job, view, text)?,
            R3Node::BoundText(text) => ingest_bound_text(job, view, text)?,
            R3Node::IfBlock(block) => ingest_if_block(job, view, block)?,
            R3Node::SwitchBlock(block) => ingest_switch_block(job, view, block)?,
            R3Node::ForLoopBlock(block) => ingest_for_block(job, view, block)?,
            R3Node::DeferredBlock(block) => ingest_defer_block(job, view, block)?,
            R3Node::LetDeclaration(decl) => ingest_let_declaration(job, view, decl)?,
            R3Node::UnknownBlock(_) => {}
        }
    }
    Ok(())
}

fn ingest_element(job: &mut ComponentCompilationJob, view: ir::XrefId, element: &t::Element) -> Result<()> {
    let xref = job.allocate_xref_id();
    unit_mut(job, view)?.create.push(ir::CreateOp::ElementStart(ir::ElementStartOp {
        xref,
        tag: element.name.clone(),
        attributes: element.attributes.iter().map(|a| (a.name.clone(), a.value.clone())).collect(),
        local_refs: ingest_references(&element.references),
        handle: ir::SlotHandle::new(),
        source_span: element.start_source_span.clone(),
    }));

    ingest_bindings(job, view, xref, &element.inputs)?;
    ingest_events(job, view, xref, &element.outputs)?;
    ingest_nodes(job, view, &element.children)?;

    unit_mut(job, view)?.create.push(ir::CreateOp::ElementEnd(ir::ElementEndOp { xref }));
    Ok(())
}

fn ingest_template(job: &mut ComponentCompilationJob, view: ir::XrefId, template: &t::Template) -> Result<()> {
    let child = job.allocate_view(view);
    let template_kind = if template.tag_name.as_deref() == Some("ng-template") {
        ir::TemplateKind::NgTemplate
    } else {
        ir::TemplateKind::Structural
    };
    unit_mut(job, view)?.create.push(ir::CreateOp::Template(ir::TemplateOp {
        xref: child,
        template_kind,
        tag: template.tag_name.clone(),
        local_refs: ingest_references(&template.references),
        handle: ir::SlotHandle::new(),
        source_span: template.start_source_span.clone(),
    }));

    {
        let unit = unit_mut(job, child)?;
        for variable in &template.variables {
            let value = if variable.value.is_empty() { "$implicit" } else { variable.value.as_str() };
            unit.context_variables.insert(variable.name.clone(), value.to_string());
        }
    }

    ingest_bindings(job, view, child, &template.inputs)?;
    for attr in &template.template_attrs {
        if let t::TemplateAttr::Bound(binding) = attr {
            ingest_bindings(job, view, child, std::slice::from_ref(binding))?;
        }
    }
    ingest_events(job, view, child, &template.outputs)?;
    ingest_nodes(job, child, &template.children)
}

fn ingest_content(job: &mut ComponentCompilationJob, view: ir::XrefId, content: &t::Content) -> Result<()> {
    let xref = job.allocate_xref_id();
    let has_fallback = content
        .children
        .iter()
        .any(|child| !matches!(child, R3Node::Text(text) if text.value.trim().is_empty()));
    let fallback_view = if has_fallback {
        let fallback = job.allocate_view(view);
        ingest_nodes(job, fallback, &content.children)?;
        Some(fallback)
    } else {
        None
    };
    unit_mut(job, view)?.create.push(ir::CreateOp::Projection(ir::ProjectionOp {
        xref,
        selector: content.selector.clone(),
        fallback_view,
        handle: ir::SlotHandle::new(),
        source_span: content.source_span.clone(),
    }));
    Ok(())
}

fn ingest_text(job: &mut ComponentCompilationJob, view: ir::XrefId, text: &t::Text) -> Result<()> {
    let xref = job.allocate_xref_id();
    unit_mut(job, view)?.create.push(ir::CreateOp::Text(ir::TextOp {
        xref,
        initial_value: text.value.clone(),
        handle: ir::SlotHandle::new(),
        source_span: text.source_span.clone(),
    }));
    Ok(())
}

fn ingest_bound_text(job: &mut ComponentCompilationJob, view: ir::XrefId, text: &t::BoundText) -> Result<()> {
    let xref = job.allocate_xref_id();
    unit_mut(job, view)?.create.push(ir::CreateOp::Text(ir::TextOp {
        xref,
        initial_value: String::new(),
        handle: ir::SlotHandle::new(),
        source_span: text.source_span.clone(),
    }));

    let (strings, expressions) = match &text.value {
        AST::Interpolation(interpolation) => {
            let mut expressions = Vec::with_capacity(interpolation.expressions.len());
            for expr in &interpolation.expressions {
                expressions.push(convert_ast(expr, job, view)?);
            }
            (interpolation.strings.clone(), expressions)
        }
        other => (vec![String::new(), String::new()], vec![convert_ast(other, job, view)?]),
    };
    unit_mut(job, view)?.update.push(ir::UpdateOp::InterpolateText(ir::InterpolateTextOp {
        target: xref,
        strings,
        expressions,
        source_span: text.source_span.clone(),
    }));
    Ok(())
}

fn ingest_if_block(job: &mut ComponentCompilationJob, view: ir::XrefId, block: &t::IfBlock) -> Result<()> {
    let mut conditions = Vec::with_capacity(block.branches.len());
    for branch in &block.branches {
        let branch_view = job.allocate_view(view);
        unit_mut(job, view)?.create.push(ir::CreateOp::ConditionalBranch(ir::ConditionalBranchOp {
            xref: branch_view,
            handle: ir::SlotHandle::new(),
            source_span: branch.source_span.clone(),
        }));
        if let Some(alias) = &branch.expression_alias {
            unit_mut(job, branch_view)?
                .context_variables
                .insert(alias.name.clone(), ir::CTX_REF.to_string());
        }
        let expr = match &branch.expression {
            Some(expression) => Some(convert_ast(expression, job, view)?),
            None => None,
        };
        conditions.push(ir::ConditionalCase { expr, target: branch_view });
        ingest_nodes(job, branch_view, &branch.children)?;
    }
    push_conditional(job, view, None, conditions, &block.source_span)
}

fn ingest_switch_block(job: &mut ComponentCompilationJob, view: ir::XrefId, block: &t::SwitchBlock) -> Result<()> {
    let test = convert_ast(&block.expression, job, view)?;
    let mut conditions = Vec::with_capacity(block.cases.len());
    for case in &block.cases {
        let case_view = job.allocate_view(view);
        unit_mut(job, view)?.create.push(ir::CreateOp::ConditionalBranch(ir::ConditionalBranchOp {
            xref: case_view,
            handle: ir::SlotHandle::new(),
            source_span: case.source_span.clone(),
        }));
        let expr = match &case.expression {
            Some(expression) => Some(convert_ast(expression, job, view)?),
            None => None,
        };
        conditions.push(ir::ConditionalCase { expr, target: case_view });
        ingest_nodes(job, case_view, &case.children)?;
    }
    push_conditional(job, view, Some(test), conditions, &block.source_span)
}

fn push_conditional(
    job: &mut ComponentCompilationJob,
    view: ir::XrefId,
    test: Option<Expression>,
    conditions: Vec<ir::ConditionalCase>,
    source_span: &crate::parse_util::ParseSourceSpan,
) -> Result<()> {
    let Some(first) = conditions.first() else {
        return Ok(());
    };
    let target = first.target;
    unit_mut(job, view)?.update.push(ir::UpdateOp::Conditional(ir::ConditionalOp {
        target,
        test,
        conditions,
        source_span: source_span.clone(),
    }));
    Ok(())
}

/// Expression of a computed `@for` context variable in terms of `$index` and
/// `$count`.
fn computed_for_loop_variable(value: &str) -> Option<Expression> {
    let index = || Box::new(Expression::LexicalRead("$index".to_string()));
    let count = || Box::new(Expression::LexicalRead("$count".to_string()));
    let number = |n: f64| Box::new(Expression::Literal(LiteralValue::Number(n)));
    let binary = |operator: &str, lhs: Box<Expression>, rhs: Box<Expression>| Expression::Binary {
        operator: operator.to_string(),
        lhs,
        rhs,
    };
    match value {
        "$first" => Some(binary("===", index(), number(0.0))),
        "$last" => Some(binary("===", index(), Box::new(binary("-", count(), number(1.0))))),
        "$even" => Some(binary("===", Box::new(binary("%", index(), number(2.0))), number(0.0))),
        "$odd" => Some(binary("!==", Box::new(binary("%", index(), number(2.0))), number(0.0))),
        _ => None,
    }
}

fn ingest_for_block(job: &mut ComponentCompilationJob, view: ir::XrefId, block: &t::ForLoopBlock) -> Result<()> {
    let body_view = job.allocate_view(view);
    let mut index_names = vec!["$index".to_string()];
    {
        let unit = unit_mut(job, body_view)?;
        unit.context_variables.insert(block.item.name.clone(), "$implicit".to_string());
        unit.context_variables.insert("$index".to_string(), "$index".to_string());
        unit.context_variables.insert("$count".to_string(), "$count".to_string());
        for implicit in ["$first", "$last", "$even", "$odd"] {
            if let Some(expression) = computed_for_loop_variable(implicit) {
                unit.aliases.push(ir::AliasVariable::new(implicit, expression));
            }
        }
        for variable in &block.context_variables {
            if variable.name == variable.value {
                continue;
            }
            match variable.value.as_str() {
                "$index" | "$count" => {
                    if variable.value == "$index" {
                        index_names.push(variable.name.clone());
                    }
                    unit.context_variables.insert(variable.name.clone(), variable.value.clone());
                }
                other => match computed_for_loop_variable(other) {
                    Some(expression) => unit.aliases.push(ir::AliasVariable::new(&variable.name, expression)),
                    None => {
                        return Err(CompilerError::Pipeline(format!(
                            "unknown @for loop variable {}",
                            other
                        )))
                    }
                },
            }
        }
    }
    ingest_nodes(job, body_view, &block.children)?;

    let empty_view = match &block.empty {
        Some(empty) => {
            let empty_view = job.allocate_view(view);
            ingest_nodes(job, empty_view, &empty.children)?;
            Some(empty_view)
        }
        None => None,
    };

    let track = convert_ast(&block.track_by.ast, job, view)?;
    let collection = convert_ast(&block.expression.ast, job, view)?;
    let unit = unit_mut(job, view)?;
    unit.create.push(ir::CreateOp::RepeaterCreate(ir::RepeaterCreateOp {
        xref: body_view,
        empty_view,
        item_name: block.item.name.clone(),
        index_names,
        track,
        handle: ir::SlotHandle::new(),
        source_span: block.source_span.clone(),
    }));
    unit.update.push(ir::UpdateOp::Repeater(ir::RepeaterOp {
        target: body_view,
        collection,
        source_span: block.source_span.clone(),
    }));
    Ok(())
}

fn ingest_defer_view(
    job: &mut ComponentCompilationJob,
    view: ir::XrefId,
    children: &[R3Node],
    source_span: &crate::parse_util::ParseSourceSpan,
) -> Result<ir::XrefId> {
    let sub_view = job.allocate_view(view);
    unit_mut(job, view)?.create.push(ir::CreateOp::Template(ir::TemplateOp {
        xref: sub_view,
        template_kind: ir::TemplateKind::Block,
        tag: None,
        local_refs: Vec::new(),
        handle: ir::SlotHandle::new(),
        source_span: source_span.clone(),
    }));
    ingest_nodes(job, sub_view, children)?;
    Ok(sub_view)
}

fn ingest_defer_block(job: &mut ComponentCompilationJob, view: ir::XrefId, block: &t::DeferredBlock) -> Result<()> {
    let main_view = ingest_defer_view(job, view, &block.children, &block.source_span)?;
    let loading_view = match &block.loading {
        Some(loading) => Some(ingest_defer_view(job, view, &loading.children, &loading.source_span)?),
        None => None,
    };
    let placeholder_view = match &block.placeholder {
        Some(placeholder) => Some(ingest_defer_view(job, view, &placeholder.children, &placeholder.source_span)?),
        None => None,
    };
    let error_view = match &block.error {
        Some(error) => Some(ingest_defer_view(job, view, &error.children, &error.source_span)?),
        None => None,
    };

    let xref = job.allocate_xref_id();
    let mut when_ops = Vec::new();
    for (triggers, prefetch) in [(&block.triggers, false), (&block.prefetch_triggers, true)] {
        for trigger in triggers.iter() {
            if let t::DeferredTrigger::When { value, source_span } = trigger {
                when_ops.push(ir::UpdateOp::DeferWhen(ir::DeferWhenOp {
                    target: xref,
                    expression: convert_ast(value, job, view)?,
                    prefetch,
                    source_span: source_span.clone(),
                }));
            }
        }
    }

    let unit = unit_mut(job, view)?;
    unit.create.push(ir::CreateOp::Defer(ir::DeferOp {
        xref,
        main_view,
        placeholder_view,
        loading_view,
        error_view,
        placeholder_config: block.placeholder.as_ref().map(|p| DeferBlockConfig {
            minimum_time: p.minimum_time,
            after_time: None,
        }),
        loading_config: block.loading.as_ref().map(|l| DeferBlockConfig {
            minimum_time: l.minimum_time,
            after_time: l.after_time,
        }),
        handle: ir::SlotHandle::new(),
        source_span: block.source_span.clone(),
    }));
    for op in when_ops {
        unit.update.push(op);
    }
    Ok(())
}

fn ingest_let_declaration(job: &mut ComponentCompilationJob, view: ir::XrefId, decl: &t::LetDeclaration) -> Result<()> {
    let target = job.allocate_xref_id();
    let value = convert_ast(&decl.value, job, view)?;
    let unit = unit_mut(job, view)?;
    unit.create.push(ir::CreateOp::DeclareLet(ir::DeclareLetOp {
        xref: target,
        declared_name: decl.name.clone(),
        handle: ir::SlotHandle::new(),
        source_span: decl.source_span.clone(),
    }));
    unit.update.push(ir::UpdateOp::StoreLet(ir::StoreLetOp {
        target,
        declared_name: decl.name.clone(),
        value,
        source_span: decl.source_span.clone(),
    }));
    Ok(())
}

fn ingest_bindings(
    job: &mut ComponentCompilationJob,
    view: ir::XrefId,
    target: ir::XrefId,
    inputs: &[t::BoundAttribute],
) -> Result<()> {
    for input in inputs {
        let expression = convert_ast(&input.value, job, view)?;
        unit_mut(job, view)?.update.push(ir::UpdateOp::Property(ir::PropertyOp {
            target,
            name: input.name.clone(),
            binding_kind: input.type_,
            expression,
            unit: input.unit.clone(),
            source_span: input.source_span.clone(),
        }));
    }
    Ok(())
}

fn ingest_events(
    job: &mut ComponentCompilationJob,
    view: ir::XrefId,
    target: ir::XrefId,
    outputs: &[t::BoundEvent],
) -> Result<()> {
    for output in outputs {
        let is_two_way = output.type_ == ParsedEventType::TwoWay;
        let handler_ops = if is_two_way {
            make_two_way_handler_ops(job, view, &output.handler)?
        } else {
            make_listener_handler_ops(job, view, &output.handler)?
        };
        unit_mut(job, view)?.create.push(ir::CreateOp::Listener(ir::ListenerOp {
            target,
            name: output.name.clone(),
            event_target: output.target.clone(),
            is_two_way,
            is_animation: matches!(output.type_, ParsedEventType::LegacyAnimation | ParsedEventType::Animation),
            handler_ops,
            source_span: output.source_span.clone(),
        }));
    }
    Ok(())
}

/// One statement per chained handler expression, the last one returned.
fn make_listener_handler_ops(
    job: &mut ComponentCompilationJob,
    view: ir::XrefId,
    handler: &AST,
) -> Result<ir::OpList<ir::UpdateOp>> {
    let handler_exprs: Vec<&AST> = match handler {
        AST::Chain(chain) => chain.expressions.iter().collect(),
        other => vec![other],
    };
    let mut expressions = Vec::with_capacity(handler_exprs.len());
    for expr in handler_exprs {
        expressions.push(convert_ast(expr, job, view)?);
    }
    let return_expr = expressions
        .pop()
        .ok_or_else(|| CompilerError::Pipeline("expected listener to have a non-empty expression list".to_string()))?;

    let mut handler_ops = ir::OpList::new();
    for expr in expressions {
        handler_ops.push(ir::UpdateOp::Statement(ir::StatementOp::expression(expr)));
    }
    handler_ops.push(ir::UpdateOp::Statement(ir::StatementOp::returning(return_expr)));
    Ok(handler_ops)
}

/// `target = $event; return $event;`
fn make_two_way_handler_ops(
    job: &mut ComponentCompilationJob,
    view: ir::XrefId,
    handler: &AST,
) -> Result<ir::OpList<ir::UpdateOp>> {
    let target = convert_ast(handler, job, view)?;
    let event = || Expression::LexicalRead("$event".to_string());
    let mut handler_ops = ir::OpList::new();
    handler_ops.push(ir::UpdateOp::Statement(ir::StatementOp::expression(Expression::Binary {
        operator: "=".to_string(),
        lhs: Box::new(target),
        rhs: Box::new(event()),
    })));
    handler_ops.push(ir::UpdateOp::Statement(ir::StatementOp::returning(event())));
    Ok(handler_ops)
}

fn ingest_references(references: &[t::Reference]) -> Vec<ir::LocalRef> {
    references
        .iter()
        .map(|r| ir::LocalRef { name: r.name.clone(), target: r.value.clone() })
        .collect()
}

