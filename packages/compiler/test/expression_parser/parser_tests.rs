/**
 * Parser Tests
 *
 * Bindings, actions and interpolations parsed from template expression text.
 */

#[path = "utils/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::unparser::unparse;
    use ng_template_compiler::expression_parser::ast::*;
    use ng_template_compiler::expression_parser::Parser;
    use ng_template_compiler::CompilerError;
    use pretty_assertions::assert_eq;

    fn parse_action(text: &str) -> Result<AST, CompilerError> {
        Parser::new().parse_action(text, "test", 0).map(|result| result.ast)
    }

    fn parse_binding(text: &str) -> Result<AST, CompilerError> {
        Parser::new().parse_binding(text, "test", 0).map(|result| result.ast)
    }

    fn check_action(exp: &str, expected: Option<&str>) {
        let ast = parse_action(exp).expect("Should parse successfully");
        assert_eq!(unparse(&ast), expected.unwrap_or(exp));
    }

    fn check_binding(exp: &str, expected: Option<&str>) {
        let ast = parse_binding(exp).expect("Should parse successfully");
        assert_eq!(unparse(&ast), expected.unwrap_or(exp));
    }

    fn expect_action_error(text: &str, message: &str) {
        let err = parse_action(text).expect_err("Should fail");
        assert!(err.to_string().contains(message), "'{}' does not contain '{}'", err, message);
    }

    fn expect_binding_error(text: &str, message: &str) {
        let err = parse_binding(text).expect_err("Should fail");
        assert!(err.to_string().contains(message), "'{}' does not contain '{}'", err, message);
    }

    mod parse_action {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_parse_numbers() {
            check_action("1", None);
        }

        #[test]
        fn should_parse_strings() {
            check_action("'1'", Some("\"1\""));
            check_action("\"1\"", None);
        }

        #[test]
        fn should_parse_null_and_undefined() {
            check_action("null", None);
            check_action("undefined", None);
        }

        #[test]
        fn should_parse_unary_operators() {
            check_action("-1", None);
            check_action("+1", None);
            check_action("-a", None);
        }

        #[test]
        fn should_parse_prefix_not() {
            check_action("!true", None);
            check_action("!!true", None);
        }

        #[test]
        fn should_parse_typeof_and_void() {
            check_action("typeof {}", None);
            check_action("void 0", None);
        }

        #[test]
        fn should_parse_multiplicative_expressions() {
            check_action("3 * 4 / 2 % 5", None);
        }

        #[test]
        fn should_parse_exponentiation() {
            check_action("2 ** 3", None);
            check_action("(-2) ** 3", None);
        }

        #[test]
        fn should_parse_relational_and_equality_expressions() {
            check_action("2 < 3 && 1 >= 0", None);
            check_action("a === b || c !== d", None);
        }

        #[test]
        fn should_parse_nullish_coalescing() {
            check_action("a ?? b", None);
        }

        #[test]
        fn should_parse_in_expressions() {
            check_action("'key' in obj", Some("\"key\" in obj"));
        }

        #[test]
        fn should_parse_grouped_expressions() {
            check_action("(1 + 2) * 3", None);
        }

        #[test]
        fn should_parse_ternary_expressions() {
            check_action("7 == 3 + 4 ? 10 : 20", None);
            check_action("false ? 10 : 20", None);
        }

        #[test]
        fn should_parse_literal_arrays_and_maps() {
            check_action("[1, 2]", None);
            check_action("{a: 1, \"b\": 2}", None);
            check_action("{}", None);
        }

        #[test]
        fn should_parse_property_access() {
            check_action("a.a", None);
            check_action("a?.a", None);
            check_action("this.a", None);
        }

        #[test]
        fn should_parse_keyed_access() {
            check_action("a[1]", None);
            check_action("a?.[1]", None);
        }

        #[test]
        fn should_parse_calls() {
            check_action("fn()", None);
            check_action("add(1, 2)", None);
            check_action("a.add(1, 2)", None);
            check_action("fn()(1, 2)", None);
            check_action("a?.()", None);
        }

        #[test]
        fn should_parse_non_null_assertions() {
            check_action("a!.b", None);
            check_action("a!!", None);
        }

        #[test]
        fn should_parse_assignments() {
            check_action("a = 12", None);
            check_action("a.a.a = 123", None);
            check_action("a[0] = 1", None);
            check_action("a ??= b", None);
            check_action("a += 1", None);
        }

        #[test]
        fn should_parse_chains() {
            check_action("1; 2", None);
            check_action("a(); b = $event", None);
        }

        #[test]
        fn should_ignore_trailing_semicolons() {
            check_action("a();;", Some("a()"));
        }

        #[test]
        fn should_parse_empty_expressions() {
            check_action("", None);
            assert!(matches!(parse_action("").unwrap(), AST::EmptyExpr(_)));
        }

        #[test]
        fn should_parse_template_literals() {
            check_action("`hello ${name}!`", None);
            check_action("tag`a${b}c`", None);
        }

        #[test]
        fn should_parse_regular_expressions() {
            check_action("/ab+c/gi.test(value)", None);
        }

        #[test]
        fn should_parse_arrow_functions() {
            check_action("items.map(x => x + 1)", None);
            check_action("(a, b) => a + b", None);
            check_action("() => 1", None);
        }

        #[test]
        fn should_parse_spreads() {
            check_action("fn(...args)", None);
            check_action("[...a, 1]", None);
            check_action("{...a, b: 1}", None);
        }

        #[test]
        fn should_parse_shorthand_map_keys() {
            check_action("{a, b}", Some("{a: a, b: b}"));
        }

        #[test]
        fn should_reject_pipes() {
            expect_action_error("x|blah", "Cannot have a pipe in an action expression");
        }

        #[test]
        fn should_reject_assignment_to_non_references() {
            expect_action_error("1 = 2", "Assignment target must be a property or keyed read");
            expect_action_error("a() = 2", "Assignment target must be a property or keyed read");
        }

        #[test]
        fn should_reject_incomplete_conditionals() {
            expect_action_error("a ? b", "Conditional expression a ? b requires all 3 expressions");
        }

        #[test]
        fn should_reject_unary_before_exponentiation() {
            expect_action_error("-2 ** 3", "Unary operator used immediately before exponentiation expression");
        }

        #[test]
        fn should_reject_private_identifiers() {
            expect_action_error("this.#a", "Private identifiers are not supported");
        }

        #[test]
        fn should_reject_multi_line_arrow_functions() {
            expect_action_error("(a) => {", "Multi-line arrow functions are not supported");
        }

        #[test]
        fn should_report_unexpected_tokens() {
            expect_action_error("a b", "Unexpected token 'b'");
        }

        #[test]
        fn should_surface_lexer_errors() {
            expect_action_error("'abc", "Unterminated quote");
        }
    }

    mod parse_binding {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_parse_pipes() {
            check_binding("a | b", Some("(a | b)"));
            check_binding("a | b:c", Some("(a | b:c)"));
            check_binding("a | b:(c | d)", Some("(a | b:((c | d)))"));
            check_binding("a | b | c", Some("((a | b) | c)"));
        }

        #[test]
        fn should_parse_pipes_in_ternaries() {
            check_binding("a ? 1 : 2 | b", Some("a ? 1 : (2 | b)"));
        }

        #[test]
        fn should_record_pipe_name_spans() {
            let ast = parse_binding("value | date:'short'").unwrap();
            let AST::BindingPipe(pipe) = ast else { panic!("expected a pipe") };
            assert_eq!(pipe.name, "date");
            assert_eq!(pipe.name_span, AbsoluteSourceSpan::new(8, 12));
            assert_eq!(pipe.args.len(), 1);
        }

        #[test]
        fn should_reject_assignments() {
            expect_binding_error("a = 1", "Bindings cannot contain assignments");
        }

        #[test]
        fn should_reject_chains() {
            expect_binding_error("1;2", "Binding expression cannot contain chained expression");
        }

        #[test]
        fn should_report_missing_pipe_names() {
            expect_binding_error("a | ", "expected identifier or keyword");
        }

        #[test]
        fn should_parse_safe_calls_and_reads_together() {
            check_binding("a?.b?.c()", None);
        }
    }

    mod spans {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_record_implicit_read_spans() {
            let AST::PropertyRead(read) = parse_binding("foo.bar").unwrap() else {
                panic!("expected a property read");
            };
            assert_eq!(read.span, ParseSpan::new(0, 7));
            assert_eq!(read.name_span, AbsoluteSourceSpan::new(4, 7));
            let inner = read.receiver.as_implicit_read().expect("implicit receiver read");
            assert_eq!(inner.source_span, AbsoluteSourceSpan::new(0, 3));
        }

        #[test]
        fn should_apply_the_absolute_offset() {
            let result = Parser::new().parse_binding("a.b", "test", 100).unwrap();
            assert_eq!(result.absolute_offset, 100);
            assert_eq!(result.source.as_deref(), Some("a.b"));
            assert_eq!(result.ast.source_span(), AbsoluteSourceSpan::new(100, 103));
            assert_eq!(result.ast.span(), ParseSpan::new(0, 3));
        }

        #[test]
        fn should_record_call_argument_spans() {
            let AST::Call(call) = parse_binding("fn(a, b)").unwrap() else {
                panic!("expected a call");
            };
            assert_eq!(call.argument_span, AbsoluteSourceSpan::new(3, 7));
            assert_eq!(call.source_span, AbsoluteSourceSpan::new(0, 8));
        }

        #[test]
        fn should_record_conditional_spans() {
            let AST::Conditional(cond) = parse_binding("a ? b : c").unwrap() else {
                panic!("expected a conditional");
            };
            assert_eq!(cond.source_span, AbsoluteSourceSpan::new(0, 9));
            assert_eq!(cond.false_exp.source_span(), AbsoluteSourceSpan::new(8, 9));
        }

        #[test]
        fn should_record_arrow_parameter_spans() {
            let AST::ArrowFunction(arrow) = parse_binding("(first, second) => first").unwrap() else {
                panic!("expected an arrow function");
            };
            assert_eq!(arrow.parameters[1].name, "second");
            assert_eq!(arrow.parameters[1].source_span, AbsoluteSourceSpan::new(8, 14));
        }
    }

    mod interpolation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_return_none_without_interpolation() {
            let result = Parser::new().parse_interpolation("nothing", "test", 0).unwrap();
            assert!(result.is_none());
        }

        #[test]
        fn should_split_strings_and_expressions() {
            let split = Parser::new()
                .split_interpolation("a {{b}} c {{d}}", "test")
                .unwrap()
                .expect("has interpolation");
            assert_eq!(split.strings, vec!["a ", " c ", ""]);
            assert_eq!(split.expressions, vec![("b".to_string(), 4), ("d".to_string(), 12)]);
        }

        #[test]
        fn should_parse_interpolated_expressions_at_their_offsets() {
            let result = Parser::new()
                .parse_interpolation("{{ a }} and {{ b | upper }}", "test", 10)
                .unwrap()
                .expect("has interpolation");
            assert_eq!(unparse(&result.ast), "{{ a }} and {{ (b | upper) }}");
            let AST::Interpolation(interpolation) = result.ast else {
                panic!("expected an interpolation");
            };
            assert_eq!(interpolation.expressions[0].source_span(), AbsoluteSourceSpan::new(13, 14));
            assert_eq!(interpolation.source_span, AbsoluteSourceSpan::new(10, 37));
        }

        #[test]
        fn should_reject_blank_expressions() {
            let err = Parser::new().parse_interpolation("{{ }}", "test", 0).unwrap_err();
            assert!(err.to_string().contains("Blank expressions are not allowed in interpolated strings"));
        }

        #[test]
        fn should_reject_unterminated_interpolations() {
            let err = Parser::new().parse_interpolation("{{ a", "test", 0).unwrap_err();
            assert!(err.to_string().contains("Unterminated interpolation"));
        }
    }
}
