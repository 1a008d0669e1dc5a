//! Conversion Module
//!
//! Lowers template expression ASTs into IR expressions.

use crate::error::{CompilerError, Result};
use crate::expression_parser::ast::AST;
use crate::template::pipeline::ir;
use crate::template::pipeline::ir::{Expression, LiteralMapEntry};
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

/// Converts `ast`, read in view `view`, into an IR expression. Pipes get a
/// `Pipe` create op in that view.
pub fn convert_ast(ast: &AST, job: &mut ComponentCompilationJob, view: ir::XrefId) -> Result<Expression> {
    let convert = |ast: &AST, job: &mut ComponentCompilationJob| convert_ast(ast, job, view);

    Ok(match ast {
        AST::PropertyRead(read) => {
            if read.receiver.is_implicit_receiver() {
                Expression::LexicalRead(read.name.clone())
            } else if read.receiver.is_this_receiver() {
                Expression::read_prop(Expression::Context(job.root), &read.name)
            } else {
                Expression::read_prop(convert(&read.receiver, job)?, &read.name)
            }
        }
        AST::SafePropertyRead(read) => Expression::SafePropertyRead {
            receiver: Box::new(convert(&read.receiver, job)?),
            name: read.name.clone(),
        },
        AST::KeyedRead(read) => Expression::ReadKey {
            receiver: Box::new(convert(&read.receiver, job)?),
            index: Box::new(convert(&read.key, job)?),
        },
        AST::SafeKeyedRead(read) => Expression::SafeKeyedRead {
            receiver: Box::new(convert(&read.receiver, job)?),
            index: Box::new(convert(&read.key, job)?),
        },
        AST::Call(call) => Expression::Invoke {
            receiver: Box::new(convert(&call.receiver, job)?),
            args: convert_all(&call.args, job, view)?,
        },
        AST::SafeCall(call) => Expression::SafeInvoke {
            receiver: Box::new(convert(&call.receiver, job)?),
            args: convert_all(&call.args, job, view)?,
        },
        AST::LiteralPrimitive(lit) => Expression::Literal(lit.value.clone()),
        AST::LiteralArray(arr) => Expression::LiteralArray(convert_all(&arr.expressions, job, view)?),
        AST::LiteralMap(map) => {
            let mut entries = Vec::with_capacity(map.keys.len());
            for (key, value) in map.keys.iter().zip(map.values.iter()) {
                entries.push(LiteralMapEntry {
                    key: if key.is_spread { None } else { Some(key.key.clone()) },
                    quoted: key.quoted,
                    value: convert(value, job)?,
                });
            }
            Expression::LiteralMap(entries)
        }
        AST::Interpolation(interp) => Expression::Interpolation {
            strings: interp.strings.clone(),
            expressions: convert_all(&interp.expressions, job, view)?,
        },
        AST::TemplateLiteral(tpl) => Expression::TemplateLiteral {
            elements: tpl.elements.iter().map(|e| e.text.clone()).collect(),
            expressions: convert_all(&tpl.expressions, job, view)?,
        },
        AST::TaggedTemplateLiteral(tagged) => Expression::TaggedTemplate {
            tag: Box::new(convert(&tagged.tag, job)?),
            elements: tagged.template.elements.iter().map(|e| e.text.clone()).collect(),
            expressions: convert_all(&tagged.template.expressions, job, view)?,
        },
        AST::RegularExpressionLiteral(regex) => Expression::RegularExpression {
            body: regex.body.clone(),
            flags: regex.flags.clone(),
        },
        AST::Binary(binary) => Expression::Binary {
            operator: binary.operation.clone(),
            lhs: Box::new(convert(&binary.left, job)?),
            rhs: Box::new(convert(&binary.right, job)?),
        },
        AST::Unary(unary) => Expression::Unary {
            operator: unary.operator.clone(),
            expr: Box::new(convert(&unary.expr, job)?),
        },
        AST::PrefixNot(not) => Expression::Not(Box::new(convert(&not.expression, job)?)),
        AST::TypeofExpression(expr) => Expression::TypeOf(Box::new(convert(&expr.expression, job)?)),
        AST::VoidExpression(expr) => Expression::Void(Box::new(convert(&expr.expression, job)?)),
        // Non-null assertions only matter to the type checker.
        AST::NonNullAssert(expr) => convert(&expr.expression, job)?,
        AST::ParenthesizedExpression(expr) => Expression::Parens(Box::new(convert(&expr.expression, job)?)),
        AST::SpreadElement(spread) => Expression::Spread(Box::new(convert(&spread.expression, job)?)),
        AST::Conditional(cond) => Expression::Conditional {
            condition: Box::new(convert(&cond.condition, job)?),
            true_case: Box::new(convert(&cond.true_exp, job)?),
            false_case: Box::new(convert(&cond.false_exp, job)?),
        },
        AST::ArrowFunction(arrow) => Expression::ArrowFn {
            params: arrow.parameters.iter().map(|p| p.name.clone()).collect(),
            body: Box::new(convert(&arrow.body, job)?),
        },
        AST::BindingPipe(pipe) => {
            let target = job.allocate_xref_id();
            let mut args = vec![convert(&pipe.exp, job)?];
            args.extend(convert_all(&pipe.args, job, view)?);
            let unit = job
                .view_mut(view)
                .ok_or_else(|| CompilerError::Pipeline(format!("unknown view {}", view)))?;
            unit.create.push(ir::CreateOp::Pipe(ir::PipeOp {
                xref: target,
                name: pipe.name.clone(),
                handle: ir::SlotHandle::new(),
            }));
            Expression::PipeBinding { target, name: pipe.name.clone(), args }
        }
        AST::ImplicitReceiver(_) | AST::ThisReceiver(_) => Expression::Context(job.root),
        AST::EmptyExpr(_) => Expression::Empty,
        AST::Chain(_) => {
            return Err(CompilerError::Pipeline(
                "chained expressions are only valid in event handlers".to_string(),
            ))
        }
    })
}

fn convert_all(asts: &[AST], job: &mut ComponentCompilationJob, view: ir::XrefId) -> Result<Vec<Expression>> {
    asts.iter().map(|ast| convert_ast(ast, job, view)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression_parser::Parser;

    fn convert(source: &str) -> (Expression, ComponentCompilationJob) {
        let mut job = ComponentCompilationJob::new("Cmp");
        let ast = Parser::new().parse_binding(source, "test", 0).unwrap();
        let root = job.root;
        let expr = convert_ast(&ast.ast, &mut job, root).unwrap();
        (expr, job)
    }

    #[test]
    fn implicit_reads_become_lexical_reads() {
        let (expr, job) = convert("user.name");
        assert_eq!(expr, Expression::read_prop(Expression::LexicalRead("user".into()), "name"));

        let (expr, _) = convert("this.name");
        assert_eq!(expr, Expression::read_prop(Expression::Context(job.root), "name"));
    }

    #[test]
    fn pipes_declare_a_pipe_op() {
        let (expr, job) = convert("value | date:'short'");
        match expr {
            Expression::PipeBinding { name, args, .. } => {
                assert_eq!(name, "date");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected a pipe binding, got {:?}", other),
        }
        assert!(matches!(job.root_view().create.get(0), Some(ir::CreateOp::Pipe(op)) if op.name == "date"));
    }
}
