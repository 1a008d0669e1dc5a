// TypeCheck Expression Translation
//
// Lowers template expressions into TypeScript source for the type-check block.

use ng_template_compiler::expression_parser::{
    AbsoluteSourceSpan, Binary, Call, LiteralValue, SafeCall, SafeKeyedRead, SafePropertyRead, AST,
};

use super::super::api::TypeCheckingConfig;
use super::error::{TcbError, TcbResult};
use super::tcb_expr::TcbExpr;

/// `0 as any`, an expression whose truthiness the checker cannot narrow.
pub const ANY_EXPRESSION: &str = "0 as any";

/// Gives a TCB a chance to replace a node before default lowering, e.g. to
/// point template variables at their declarations.
pub trait TcbExprResolver {
    fn resolve(&mut self, ast: &AST, cx: &mut TranslateContext<'_>) -> TcbResult<Option<TcbExpr>>;
}

/// Resolves only the implicit and explicit receivers, to `this`. Every
/// implicit read lowers to a component member.
pub struct ComponentMemberResolver;

impl TcbExprResolver for ComponentMemberResolver {
    fn resolve(&mut self, ast: &AST, _cx: &mut TranslateContext<'_>) -> TcbResult<Option<TcbExpr>> {
        Ok(ast.is_any_implicit_receiver().then(|| TcbExpr::new("this")))
    }
}

pub struct TranslateContext<'a> {
    pub config: &'a TypeCheckingConfig,
    /// Arrow function parameters in scope, innermost last.
    shadowed: Vec<String>,
}

impl<'a> TranslateContext<'a> {
    pub fn new(config: &'a TypeCheckingConfig) -> Self {
        Self { config, shadowed: Vec::new() }
    }

    pub fn is_shadowed(&self, name: &str) -> bool {
        self.shadowed.iter().any(|shadowed| shadowed == name)
    }
}

pub fn translate_expression(
    ast: &AST,
    resolver: &mut dyn TcbExprResolver,
    cx: &mut TranslateContext<'_>,
) -> TcbResult<TcbExpr> {
    if let Some(resolved) = maybe_resolve(ast, resolver, cx)? {
        return Ok(resolved);
    }
    lower(ast, resolver, cx)
}

fn maybe_resolve(
    ast: &AST,
    resolver: &mut dyn TcbExprResolver,
    cx: &mut TranslateContext<'_>,
) -> TcbResult<Option<TcbExpr>> {
    if let Some(read) = ast.as_implicit_read() {
        if cx.is_shadowed(&read.name) {
            return Ok(Some(TcbExpr::new(read.name.clone()).with_span(read.source_span)));
        }
    }
    resolver.resolve(ast, cx)
}

fn wrapped(ast: &AST, resolver: &mut dyn TcbExprResolver, cx: &mut TranslateContext<'_>) -> TcbResult<String> {
    Ok(translate_expression(ast, resolver, cx)?.wrap_for_diagnostics().into_source())
}

fn printed_list(
    asts: &[AST],
    resolver: &mut dyn TcbExprResolver,
    cx: &mut TranslateContext<'_>,
) -> TcbResult<Vec<String>> {
    asts.iter().map(|ast| Ok(translate_expression(ast, resolver, cx)?.print())).collect()
}

fn spanned(source: String, span: AbsoluteSourceSpan) -> TcbExpr {
    TcbExpr::new(source).with_span(span)
}

/// `(expr as any)`
pub fn cast_to_any(expr: &str) -> String {
    format!("({} as any)", expr)
}

/// A double-quoted TypeScript string literal.
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn number_literal(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity".to_string() } else { "(-Infinity)".to_string() }
    } else if value.is_sign_negative() {
        format!("(-{})", -value)
    } else {
        format!("{}", value)
    }
}

fn lower(ast: &AST, resolver: &mut dyn TcbExprResolver, cx: &mut TranslateContext<'_>) -> TcbResult<TcbExpr> {
    match ast {
        AST::EmptyExpr(empty) => Ok(spanned("undefined".to_string(), empty.source_span)),
        AST::ImplicitReceiver(_) | AST::ThisReceiver(_) => {
            Err(TcbError::UnexpectedAst("unresolved implicit receiver".to_string()))
        }
        AST::Chain(chain) => {
            let parts = printed_list(&chain.expressions, resolver, cx)?;
            Ok(spanned(format!("({})", parts.join(", ")), chain.source_span))
        }
        AST::Conditional(cond) => {
            let condition = wrapped(&cond.condition, resolver, cx)?;
            let when_true = wrapped(&cond.true_exp, resolver, cx)?;
            let when_false = wrapped(&cond.false_exp, resolver, cx)?;
            Ok(spanned(format!("({} ? {} : {})", condition, when_true, when_false), cond.source_span))
        }
        AST::PropertyRead(read) => {
            let receiver = wrapped(&read.receiver, resolver, cx)?;
            let access = spanned(format!("{}.{}", receiver, read.name), read.name_span);
            Ok(access.wrap_for_diagnostics().with_span(read.source_span))
        }
        AST::SafePropertyRead(read) => lower_safe_property_read(read, resolver, cx),
        AST::KeyedRead(read) => {
            let receiver = wrapped(&read.receiver, resolver, cx)?;
            let key = translate_expression(&read.key, resolver, cx)?.print();
            Ok(spanned(format!("({}[{}])", receiver, key), read.source_span))
        }
        AST::SafeKeyedRead(read) => lower_safe_keyed_read(read, resolver, cx),
        AST::BindingPipe(pipe) => Err(TcbError::UnexpectedAst(format!("unresolved pipe '{}'", pipe.name))),
        AST::LiteralPrimitive(literal) => {
            let source = match &literal.value {
                LiteralValue::String(value) => quote(value),
                LiteralValue::Number(value) => number_literal(*value),
                LiteralValue::Boolean(value) => value.to_string(),
                LiteralValue::Null => "null".to_string(),
                LiteralValue::Undefined => "undefined".to_string(),
            };
            Ok(spanned(source, literal.source_span))
        }
        AST::LiteralArray(array) => {
            let elements = printed_list(&array.expressions, resolver, cx)?;
            let literal = format!("[{}]", elements.join(", "));
            Ok(spanned(literal_typing(literal, cx), array.source_span))
        }
        AST::LiteralMap(map) => {
            let mut properties = Vec::with_capacity(map.keys.len());
            for (key, value) in map.keys.iter().zip(&map.values) {
                let value = translate_expression(value, resolver, cx)?;
                if key.is_spread {
                    properties.push(format!("...{}", value.wrap_for_diagnostics().print()));
                } else {
                    properties.push(format!("{}: {}", quote(&key.key), value.print()));
                }
            }
            let literal =
                if properties.is_empty() { "{}".to_string() } else { format!("{{ {} }}", properties.join(", ")) };
            Ok(spanned(literal_typing(literal, cx), map.source_span))
        }
        AST::Interpolation(interpolation) => {
            let mut out = quote("");
            for expression in &interpolation.expressions {
                out.push_str(" + ");
                out.push_str(&wrapped(expression, resolver, cx)?);
            }
            Ok(TcbExpr::new(out))
        }
        AST::Binary(binary) => lower_binary(binary, resolver, cx),
        AST::PrefixNot(not) => {
            let operand = wrapped(&not.expression, resolver, cx)?;
            Ok(spanned(format!("(!{})", operand), not.source_span))
        }
        AST::Unary(unary) => {
            let operand = wrapped(&unary.expr, resolver, cx)?;
            Ok(spanned(format!("({}{})", unary.operator, operand), unary.source_span))
        }
        AST::TypeofExpression(expr) => {
            let operand = wrapped(&expr.expression, resolver, cx)?;
            Ok(spanned(format!("(typeof {})", operand), expr.source_span))
        }
        AST::VoidExpression(expr) => {
            let operand = wrapped(&expr.expression, resolver, cx)?;
            Ok(spanned(format!("(void {})", operand), expr.source_span))
        }
        AST::NonNullAssert(expr) => {
            let operand = wrapped(&expr.expression, resolver, cx)?;
            Ok(spanned(format!("({}!)", operand), expr.source_span))
        }
        AST::Call(call) => lower_call(call, resolver, cx),
        AST::SafeCall(call) => lower_safe_call(call, resolver, cx),
        AST::TemplateLiteral(template) => {
            let mut out = String::from("`");
            for (index, element) in template.elements.iter().enumerate() {
                out.push_str(&element.text);
                if let Some(expression) = template.expressions.get(index) {
                    out.push_str("${");
                    out.push_str(&translate_expression(expression, resolver, cx)?.print());
                    out.push('}');
                }
            }
            out.push('`');
            Ok(spanned(out, template.source_span))
        }
        AST::TaggedTemplateLiteral(tagged) => {
            let tag = translate_expression(&tagged.tag, resolver, cx)?.print();
            let template = lower(&AST::TemplateLiteral(tagged.template.clone()), resolver, cx)?;
            Ok(spanned(format!("{}{}", tag, template.source()), tagged.source_span))
        }
        AST::ParenthesizedExpression(expr) => {
            Ok(spanned(wrapped(&expr.expression, resolver, cx)?, expr.source_span))
        }
        AST::RegularExpressionLiteral(regex) => {
            let source = format!("/{}/{}", regex.body, regex.flags.as_deref().unwrap_or(""));
            Ok(spanned(source, regex.source_span))
        }
        AST::ArrowFunction(arrow) => {
            let names: Vec<String> = arrow.parameters.iter().map(|param| param.name.clone()).collect();
            let depth = cx.shadowed.len();
            cx.shadowed.extend(names.iter().cloned());
            let body = wrapped(&arrow.body, resolver, cx);
            cx.shadowed.truncate(depth);
            Ok(spanned(format!("(({}) => {})", names.join(", "), body?), arrow.source_span))
        }
        AST::SpreadElement(spread) => {
            let operand = wrapped(&spread.expression, resolver, cx)?;
            Ok(spanned(format!("...{}", operand), spread.source_span))
        }
    }
}

fn literal_typing(literal: String, cx: &TranslateContext<'_>) -> String {
    if cx.config.strict_literal_types {
        literal
    } else {
        cast_to_any(&literal)
    }
}

fn lower_binary(binary: &Binary, resolver: &mut dyn TcbExprResolver, cx: &mut TranslateContext<'_>) -> TcbResult<TcbExpr> {
    let left = translate_expression(&binary.left, resolver, cx)?;
    let left = if binary.is_assignment() { left.print() } else { left.wrap_for_diagnostics().into_source() };
    let right = wrapped(&binary.right, resolver, cx)?;
    Ok(spanned(format!("({} {} {})", left, binary.operation, right), binary.source_span))
}

fn lower_call(call: &Call, resolver: &mut dyn TcbExprResolver, cx: &mut TranslateContext<'_>) -> TcbResult<TcbExpr> {
    let args = printed_list(&call.args, resolver, cx)?;
    let callee = match &*call.receiver {
        AST::PropertyRead(read) => match maybe_resolve(&call.receiver, resolver, cx)? {
            Some(resolved) => resolved.print(),
            None => {
                let receiver = wrapped(&read.receiver, resolver, cx)?;
                spanned(format!("{}.{}", receiver, read.name), read.name_span).print()
            }
        },
        receiver => translate_expression(receiver, resolver, cx)?.print(),
    };
    let source = match &*call.receiver {
        AST::SafePropertyRead(_) | AST::SafeKeyedRead(_) => {
            safe_call(&call.receiver, &format!("({})", callee), &args, cx)
        }
        _ => format!("{}({})", callee, args.join(", ")),
    };
    Ok(spanned(source, call.source_span))
}

fn lower_safe_call(call: &SafeCall, resolver: &mut dyn TcbExprResolver, cx: &mut TranslateContext<'_>) -> TcbResult<TcbExpr> {
    let args = printed_list(&call.args, resolver, cx)?;
    let callee = wrapped(&call.receiver, resolver, cx)?;
    Ok(spanned(safe_call(&call.receiver, &callee, &args, cx), call.source_span))
}

fn safe_call(receiver: &AST, callee: &str, args: &[String], cx: &TranslateContext<'_>) -> String {
    let args = args.join(", ");
    if cx.config.strict_safe_navigation_types {
        format!("({} ? {}!({}) : undefined)", ANY_EXPRESSION, callee, args)
    } else if ve_infers_any(receiver) {
        format!("{}({})", cast_to_any(callee), args)
    } else {
        cast_to_any(&format!("{}!({})", callee, args))
    }
}

fn lower_safe_property_read(
    read: &SafePropertyRead,
    resolver: &mut dyn TcbExprResolver,
    cx: &mut TranslateContext<'_>,
) -> TcbResult<TcbExpr> {
    let receiver = wrapped(&read.receiver, resolver, cx)?;
    let source = if cx.config.strict_safe_navigation_types {
        let access = spanned(format!("{}!.{}", receiver, read.name), read.name_span);
        format!("({} ? {} : undefined)", ANY_EXPRESSION, access.print())
    } else if ve_infers_any(&read.receiver) {
        format!("{}.{}", cast_to_any(&receiver), read.name)
    } else {
        let access = spanned(format!("{}!.{}", receiver, read.name), read.name_span);
        cast_to_any(&access.print())
    };
    Ok(spanned(source, read.source_span))
}

fn lower_safe_keyed_read(
    read: &SafeKeyedRead,
    resolver: &mut dyn TcbExprResolver,
    cx: &mut TranslateContext<'_>,
) -> TcbResult<TcbExpr> {
    let receiver = wrapped(&read.receiver, resolver, cx)?;
    let key = translate_expression(&read.key, resolver, cx)?.print();
    let source = if cx.config.strict_safe_navigation_types {
        let access = spanned(format!("{}![{}]", receiver, key), read.source_span);
        format!("({} ? {} : undefined)", ANY_EXPRESSION, access.print())
    } else if ve_infers_any(&read.receiver) {
        format!("{}[{}]", cast_to_any(&receiver), key)
    } else {
        let access = spanned(format!("{}![{}]", receiver, key), read.source_span);
        cast_to_any(&access.print())
    };
    Ok(spanned(source, read.source_span))
}

/// Whether the legacy View Engine checker inferred `any` for a safe access on
/// `receiver`. Calls, pipes and literals in the receiver lost their type there.
pub fn ve_infers_any(receiver: &AST) -> bool {
    match receiver {
        AST::Call(_) | AST::BindingPipe(_) | AST::LiteralArray(_) | AST::LiteralMap(_) => true,
        AST::Binary(binary) => ve_infers_any(&binary.left) || ve_infers_any(&binary.right),
        AST::Conditional(cond) => {
            ve_infers_any(&cond.condition) || ve_infers_any(&cond.true_exp) || ve_infers_any(&cond.false_exp)
        }
        AST::Interpolation(interpolation) => interpolation.expressions.iter().any(ve_infers_any),
        AST::PrefixNot(not) => ve_infers_any(&not.expression),
        AST::Unary(unary) => ve_infers_any(&unary.expr),
        AST::TypeofExpression(expr) => ve_infers_any(&expr.expression),
        AST::VoidExpression(expr) => ve_infers_any(&expr.expression),
        AST::NonNullAssert(expr) => ve_infers_any(&expr.expression),
        AST::ParenthesizedExpression(expr) => ve_infers_any(&expr.expression),
        AST::SpreadElement(spread) => ve_infers_any(&spread.expression),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_template_compiler::expression_parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> AST {
        Parser::new().parse_binding(source, "test", 0).expect("valid expression").ast
    }

    fn translate_with(source: &str, config: &TypeCheckingConfig) -> String {
        let mut cx = TranslateContext::new(config);
        translate_expression(&parse(source), &mut ComponentMemberResolver, &mut cx).expect("translatable").print()
    }

    fn translate(source: &str) -> String {
        translate_with(source, &TypeCheckingConfig::full())
    }

    #[test]
    fn should_read_component_members_through_this() {
        assert_eq!(translate("a"), "((this).a /*0,1*/) /*0,1*/");
        assert_eq!(translate("a.b"), "((((this).a /*0,1*/) /*0,1*/).b /*2,3*/) /*0,3*/");
    }

    #[test]
    fn should_lower_safe_reads_by_strictness() {
        assert_eq!(
            translate("a?.b"),
            "(0 as any ? (((this).a /*0,1*/) /*0,1*/)!.b /*3,4*/ : undefined) /*0,4*/"
        );

        let mut loose = TypeCheckingConfig::full();
        loose.strict_safe_navigation_types = false;
        assert_eq!(translate_with("a?.b", &loose), "((((this).a /*0,1*/) /*0,1*/)!.b /*3,4*/ as any) /*0,4*/");
        assert!(translate_with("a()?.b", &loose).starts_with("(((this).a /*0,1*/() /*0,3*/) as any).b"));
    }

    #[test]
    fn should_print_literals() {
        assert_eq!(translate("'x\"y'"), r#""x\"y" /*0,5*/"#);
        assert_eq!(translate("-1"), "(-(1 /*1,2*/)) /*0,2*/");
        assert_eq!(translate("null"), "null /*0,4*/");
    }

    #[test]
    fn should_widen_literals_without_strict_literal_types() {
        let config = TypeCheckingConfig::basic();
        assert_eq!(translate_with("[]", &config), "([] as any) /*0,2*/");
        assert_eq!(translate_with("{}", &config), "({} as any) /*0,2*/");
    }

    #[test]
    fn should_shadow_members_with_arrow_parameters() {
        let out = translate("(x) => x + y");
        assert!(out.starts_with("((x) => (((x /*7,8*/) + (((this).y"), "{}", out);
    }

    #[test]
    fn should_reject_unresolved_pipes() {
        let config = TypeCheckingConfig::full();
        let mut cx = TranslateContext::new(&config);
        let err = translate_expression(&parse("a | date"), &mut ComponentMemberResolver, &mut cx).unwrap_err();
        assert_eq!(err, TcbError::UnexpectedAst("unresolved pipe 'date'".to_string()));
    }

    #[test]
    fn should_detect_legacy_any_inference() {
        assert!(ve_infers_any(&parse("a()")));
        assert!(ve_infers_any(&parse("!(a | b)")));
        assert!(!ve_infers_any(&parse("a.b")));
    }
}
