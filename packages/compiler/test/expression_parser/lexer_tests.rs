/**
 * Lexer Tests
 *
 * Token kinds, offsets and values produced for template expressions.
 */

#[cfg(test)]
mod tests {
    use ng_template_compiler::expression_parser::lexer::{Lexer, Token, TokenType};
    use pretty_assertions::assert_eq;

    fn lex(text: &str) -> Vec<Token> {
        Lexer::new().tokenize(text)
    }

    fn expect_token(token: &Token, index: usize, end: usize) {
        assert_eq!(token.index, index, "Token index mismatch");
        assert_eq!(token.end, end, "Token end mismatch");
    }

    fn expect_character_token(token: &Token, index: usize, end: usize, character: char) {
        expect_token(token, index, end);
        assert!(token.is_character(character), "Expected character token '{}'", character);
    }

    fn expect_operator_token(token: &Token, index: usize, end: usize, operator: &str) {
        expect_token(token, index, end);
        assert!(token.is_operator(operator), "Expected operator token '{}'", operator);
    }

    fn expect_number_token(token: &Token, index: usize, end: usize, n: f64) {
        expect_token(token, index, end);
        assert!(token.is_number(), "Expected number token");
        assert!((token.num_value - n).abs() < f64::EPSILON, "Expected number {}", n);
    }

    fn expect_string_token(token: &Token, index: usize, end: usize, value: &str) {
        expect_token(token, index, end);
        assert!(token.is_string(), "Expected string token");
        assert_eq!(token.str_value, value);
    }

    fn expect_identifier_token(token: &Token, index: usize, end: usize, identifier: &str) {
        expect_token(token, index, end);
        assert!(token.is_identifier(), "Expected identifier token");
        assert_eq!(token.str_value, identifier);
    }

    fn expect_keyword_token(token: &Token, index: usize, end: usize, keyword: &str) {
        expect_token(token, index, end);
        assert!(token.is_keyword_value(keyword), "Expected keyword '{}'", keyword);
    }

    fn expect_error(tokens: &[Token], message: &str) {
        let last = tokens.last().expect("expected at least one token");
        assert!(last.is_error(), "Expected an error token, got {:?}", last);
        assert!(
            last.str_value.contains(message),
            "Expected error containing '{}', got '{}'",
            message,
            last.str_value
        );
    }

    mod identifiers {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_tokenize_a_simple_identifier() {
            let tokens = lex("j");
            assert_eq!(tokens.len(), 1);
            expect_identifier_token(&tokens[0], 0, 1, "j");
        }

        #[test]
        fn should_tokenize_a_dotted_identifier() {
            let tokens = lex("j.k");
            assert_eq!(tokens.len(), 3);
            expect_identifier_token(&tokens[0], 0, 1, "j");
            expect_character_token(&tokens[1], 1, 2, '.');
            expect_identifier_token(&tokens[2], 2, 3, "k");
        }

        #[test]
        fn should_accept_dollar_and_underscore() {
            let tokens = lex("$a _b c$1");
            expect_identifier_token(&tokens[0], 0, 2, "$a");
            expect_identifier_token(&tokens[1], 3, 5, "_b");
            expect_identifier_token(&tokens[2], 6, 9, "c$1");
        }

        #[test]
        fn should_tokenize_keywords() {
            let tokens = lex("null undefined true false this typeof");
            expect_keyword_token(&tokens[0], 0, 4, "null");
            expect_keyword_token(&tokens[1], 5, 14, "undefined");
            expect_keyword_token(&tokens[2], 15, 19, "true");
            expect_keyword_token(&tokens[3], 20, 25, "false");
            expect_keyword_token(&tokens[4], 26, 30, "this");
            expect_keyword_token(&tokens[5], 31, 37, "typeof");
        }

        #[test]
        fn should_tokenize_private_identifiers() {
            let tokens = lex("this.#secret");
            assert_eq!(tokens.len(), 3);
            expect_token(&tokens[2], 5, 12);
            assert!(tokens[2].is_private_identifier());
            assert_eq!(tokens[2].str_value, "#secret");
        }

        #[test]
        fn should_reject_a_bare_hash() {
            expect_error(&lex("# a"), "Invalid character [#]");
        }
    }

    mod operators {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_tokenize_safe_navigation() {
            let tokens = lex("a?.b");
            expect_operator_token(&tokens[1], 1, 3, "?.");
        }

        #[test]
        fn should_tokenize_nullish_operators() {
            let tokens = lex("a ?? b ??= c");
            expect_operator_token(&tokens[1], 2, 4, "??");
            expect_operator_token(&tokens[3], 7, 10, "??=");
        }

        #[test]
        fn should_tokenize_equality_operators() {
            let tokens = lex("a == b != c === d !== e");
            expect_operator_token(&tokens[1], 2, 4, "==");
            expect_operator_token(&tokens[3], 7, 9, "!=");
            expect_operator_token(&tokens[5], 12, 15, "===");
            expect_operator_token(&tokens[7], 18, 21, "!==");
        }

        #[test]
        fn should_tokenize_logical_and_assignment_operators() {
            let tokens = lex("a && b || c &&= d += e");
            expect_operator_token(&tokens[1], 2, 4, "&&");
            expect_operator_token(&tokens[3], 7, 9, "||");
            expect_operator_token(&tokens[5], 12, 15, "&&=");
            expect_operator_token(&tokens[7], 18, 20, "+=");
        }

        #[test]
        fn should_tokenize_exponentiation() {
            let tokens = lex("a ** b");
            expect_operator_token(&tokens[1], 2, 4, "**");
        }

        #[test]
        fn should_tokenize_comparison_operators() {
            let tokens = lex("a < b <= c > d >= e");
            expect_operator_token(&tokens[1], 2, 3, "<");
            expect_operator_token(&tokens[3], 6, 8, "<=");
            expect_operator_token(&tokens[5], 11, 12, ">");
            expect_operator_token(&tokens[7], 15, 17, ">=");
        }

        #[test]
        fn should_tokenize_pipes_and_brackets() {
            let tokens = lex("a[0] | b:1");
            expect_character_token(&tokens[1], 1, 2, '[');
            expect_character_token(&tokens[3], 3, 4, ']');
            expect_operator_token(&tokens[4], 5, 6, "|");
            expect_character_token(&tokens[6], 8, 9, ':');
        }

        #[test]
        fn should_report_unexpected_characters() {
            expect_error(&lex("a ~ b"), "Unexpected character [~]");
        }
    }

    mod numbers {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_tokenize_integers_and_decimals() {
            let tokens = lex("88 0.5 .5");
            expect_number_token(&tokens[0], 0, 2, 88.0);
            expect_number_token(&tokens[1], 3, 6, 0.5);
            expect_number_token(&tokens[2], 7, 9, 0.5);
        }

        #[test]
        fn should_tokenize_exponents() {
            let tokens = lex("1e3 2E-2 5e+1");
            expect_number_token(&tokens[0], 0, 3, 1000.0);
            expect_number_token(&tokens[1], 4, 8, 0.02);
            expect_number_token(&tokens[2], 9, 13, 50.0);
        }

        #[test]
        fn should_reject_incomplete_exponents() {
            expect_error(&lex("1e"), "Invalid exponent");
        }

        #[test]
        fn should_accept_numeric_separators() {
            let tokens = lex("1_000_000");
            expect_number_token(&tokens[0], 0, 9, 1_000_000.0);
        }

        #[test]
        fn should_reject_misplaced_separators() {
            expect_error(&lex("1__0"), "Invalid numeric separator");
            expect_error(&lex("1_"), "Invalid numeric separator");
        }

        #[test]
        fn should_not_confuse_ternary_with_safe_navigation() {
            let tokens = lex("a?.1:2");
            expect_operator_token(&tokens[1], 1, 2, "?");
            expect_number_token(&tokens[2], 2, 4, 0.1);
        }
    }

    mod strings {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_tokenize_quoted_strings() {
            let tokens = lex(r#"'a' "b""#);
            expect_string_token(&tokens[0], 0, 3, "a");
            expect_string_token(&tokens[1], 4, 7, "b");
        }

        #[test]
        fn should_unescape_strings() {
            let tokens = lex(r#"'a\'b\n'"#);
            expect_string_token(&tokens[0], 0, 8, "a'b\n");
        }

        #[test]
        fn should_decode_unicode_escapes() {
            let tokens = lex(r"'\u0041'");
            expect_string_token(&tokens[0], 0, 8, "A");
        }

        #[test]
        fn should_reject_bad_unicode_escapes() {
            expect_error(&lex(r"'\u00G0'"), "Invalid unicode escape");
        }

        #[test]
        fn should_reject_unterminated_strings() {
            expect_error(&lex("'abc"), "Unterminated quote");
        }
    }

    mod template_literals {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_tokenize_a_plain_template_literal() {
            let tokens = lex("`hello`");
            assert_eq!(tokens.len(), 2);
            expect_token(&tokens[0], 0, 6);
            assert!(tokens[0].is_template_literal_part());
            assert_eq!(tokens[0].str_value, "hello");
            expect_token(&tokens[1], 6, 7);
            assert!(tokens[1].is_template_literal_end());
        }

        #[test]
        fn should_tokenize_interpolations() {
            let tokens = lex("`hello ${name}`");
            let kinds: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
            assert_eq!(
                kinds,
                vec![
                    TokenType::TemplateLiteralPart,
                    TokenType::Operator,
                    TokenType::Identifier,
                    TokenType::Character,
                    TokenType::TemplateLiteralPart,
                    TokenType::TemplateLiteralEnd,
                ]
            );
            expect_token(&tokens[0], 0, 7);
            assert!(tokens[1].is_template_literal_interpolation_start());
            expect_token(&tokens[1], 7, 9);
            expect_identifier_token(&tokens[2], 9, 13, "name");
            expect_character_token(&tokens[3], 13, 14, '}');
            expect_token(&tokens[5], 14, 15);
        }

        #[test]
        fn should_reject_unterminated_template_literals() {
            expect_error(&lex("`abc"), "Unterminated template literal");
        }
    }

    mod regular_expressions {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_treat_slash_after_operand_as_division() {
            let tokens = lex("a / b");
            expect_operator_token(&tokens[1], 2, 3, "/");
        }

        #[test]
        fn should_tokenize_regex_with_flags() {
            let tokens = lex("x = /a+b/gi");
            assert_eq!(tokens[2].token_type, TokenType::RegExpBody);
            assert_eq!(tokens[2].str_value, "a+b");
            expect_token(&tokens[2], 4, 9);
            assert_eq!(tokens[3].token_type, TokenType::RegExpFlags);
            assert_eq!(tokens[3].str_value, "gi");
        }

        #[test]
        fn should_keep_slashes_inside_character_classes() {
            let tokens = lex("/[/]/");
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].str_value, "[/]");
        }
    }
}
