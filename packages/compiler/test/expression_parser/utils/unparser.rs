/**
 * Unparser
 *
 * Prints an AST back as expression source so parser tests can compare
 * against the input text.
 */
use ng_template_compiler::expression_parser::ast::*;

pub fn unparse(ast: &AST) -> String {
    let mut out = String::new();
    write_ast(&mut out, ast);
    out
}

fn write_list(out: &mut String, items: &[AST]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_ast(out, item);
    }
}

fn write_receiver(out: &mut String, receiver: &AST, separator: &str) {
    match receiver {
        AST::ImplicitReceiver(_) => {}
        other => {
            write_ast(out, other);
            out.push_str(separator);
        }
    }
}

fn write_template(out: &mut String, template: &TemplateLiteral) {
    out.push('`');
    for (i, element) in template.elements.iter().enumerate() {
        out.push_str(&element.text);
        if let Some(expression) = template.expressions.get(i) {
            out.push_str("${");
            write_ast(out, expression);
            out.push('}');
        }
    }
    out.push('`');
}

fn write_ast(out: &mut String, ast: &AST) {
    match ast {
        AST::EmptyExpr(_) | AST::ImplicitReceiver(_) => {}
        AST::ThisReceiver(_) => out.push_str("this"),
        AST::Chain(chain) => {
            for (i, expression) in chain.expressions.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                write_ast(out, expression);
            }
        }
        AST::Conditional(cond) => {
            write_ast(out, &cond.condition);
            out.push_str(" ? ");
            write_ast(out, &cond.true_exp);
            out.push_str(" : ");
            write_ast(out, &cond.false_exp);
        }
        AST::PropertyRead(read) => {
            write_receiver(out, &read.receiver, ".");
            out.push_str(&read.name);
        }
        AST::SafePropertyRead(read) => {
            write_ast(out, &read.receiver);
            out.push_str("?.");
            out.push_str(&read.name);
        }
        AST::KeyedRead(read) => {
            write_ast(out, &read.receiver);
            out.push('[');
            write_ast(out, &read.key);
            out.push(']');
        }
        AST::SafeKeyedRead(read) => {
            write_ast(out, &read.receiver);
            out.push_str("?.[");
            write_ast(out, &read.key);
            out.push(']');
        }
        AST::BindingPipe(pipe) => {
            out.push('(');
            write_ast(out, &pipe.exp);
            out.push_str(" | ");
            out.push_str(&pipe.name);
            for arg in &pipe.args {
                out.push(':');
                write_ast(out, arg);
            }
            out.push(')');
        }
        AST::LiteralPrimitive(literal) => match &literal.value {
            LiteralValue::String(value) => {
                out.push('"');
                out.push_str(&value.replace('"', "\\\""));
                out.push('"');
            }
            LiteralValue::Number(value) => out.push_str(&value.to_string()),
            LiteralValue::Boolean(value) => out.push_str(&value.to_string()),
            LiteralValue::Null => out.push_str("null"),
            LiteralValue::Undefined => out.push_str("undefined"),
        },
        AST::LiteralArray(array) => {
            out.push('[');
            write_list(out, &array.expressions);
            out.push(']');
        }
        AST::LiteralMap(map) => {
            out.push('{');
            for (i, (key, value)) in map.keys.iter().zip(&map.values).enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if key.is_spread {
                    write_ast(out, value);
                    continue;
                }
                if key.quoted {
                    out.push_str(&format!("\"{}\"", key.key));
                } else {
                    out.push_str(&key.key);
                }
                out.push_str(": ");
                write_ast(out, value);
            }
            out.push('}');
        }
        AST::Interpolation(interpolation) => {
            for (i, text) in interpolation.strings.iter().enumerate() {
                out.push_str(text);
                if let Some(expression) = interpolation.expressions.get(i) {
                    out.push_str("{{ ");
                    write_ast(out, expression);
                    out.push_str(" }}");
                }
            }
        }
        AST::Binary(binary) => {
            write_ast(out, &binary.left);
            out.push_str(&format!(" {} ", binary.operation));
            write_ast(out, &binary.right);
        }
        AST::PrefixNot(not) => {
            out.push('!');
            write_ast(out, &not.expression);
        }
        AST::Unary(unary) => {
            out.push_str(&unary.operator);
            write_ast(out, &unary.expr);
        }
        AST::TypeofExpression(e) => {
            out.push_str("typeof ");
            write_ast(out, &e.expression);
        }
        AST::VoidExpression(e) => {
            out.push_str("void ");
            write_ast(out, &e.expression);
        }
        AST::NonNullAssert(e) => {
            write_ast(out, &e.expression);
            out.push('!');
        }
        AST::Call(call) => {
            write_ast(out, &call.receiver);
            out.push('(');
            write_list(out, &call.args);
            out.push(')');
        }
        AST::SafeCall(call) => {
            write_ast(out, &call.receiver);
            out.push_str("?.(");
            write_list(out, &call.args);
            out.push(')');
        }
        AST::TemplateLiteral(template) => write_template(out, template),
        AST::TaggedTemplateLiteral(tagged) => {
            write_ast(out, &tagged.tag);
            write_template(out, &tagged.template);
        }
        AST::ParenthesizedExpression(e) => {
            out.push('(');
            write_ast(out, &e.expression);
            out.push(')');
        }
        AST::RegularExpressionLiteral(regex) => {
            out.push('/');
            out.push_str(&regex.body);
            out.push('/');
            if let Some(flags) = &regex.flags {
                out.push_str(flags);
            }
        }
        AST::ArrowFunction(arrow) => {
            let names: Vec<&str> = arrow.parameters.iter().map(|p| p.name.as_str()).collect();
            if names.len() == 1 {
                out.push_str(names[0]);
            } else {
                out.push_str(&format!("({})", names.join(", ")));
            }
            out.push_str(" => ");
            write_ast(out, &arrow.body);
        }
        AST::SpreadElement(spread) => {
            out.push_str("...");
            write_ast(out, &spread.expression);
        }
    }
}
