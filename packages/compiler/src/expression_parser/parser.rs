//! Expression parser
//!
//! Recursive descent over the token stream produced by [`Lexer`]. Bindings
//! allow pipes but no assignments or chains; actions (event handlers) allow
//! assignments and `;` chains but no pipes.

use crate::error::{CompilerError, Result};
use crate::expression_parser::ast::*;
use crate::expression_parser::lexer::{Lexer, Token, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFlags {
    Binding,
    Action,
}

/// Text and expression pieces of a `{{ }}` interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInterpolation {
    pub strings: Vec<String>,
    /// `(source, start offset of the source inside the input)`
    pub expressions: Vec<(String, usize)>,
}

#[derive(Debug, Default)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser { lexer: Lexer::new() }
    }

    pub fn parse_action(&self, input: &str, location: &str, absolute_offset: usize) -> Result<ASTWithSource> {
        let ast = self.parse(input, location, absolute_offset, ParseFlags::Action)?;
        Ok(ASTWithSource::new(ast, Some(input.to_string()), location.to_string(), absolute_offset))
    }

    pub fn parse_binding(&self, input: &str, location: &str, absolute_offset: usize) -> Result<ASTWithSource> {
        let ast = self.parse(input, location, absolute_offset, ParseFlags::Binding)?;
        Ok(ASTWithSource::new(ast, Some(input.to_string()), location.to_string(), absolute_offset))
    }

    /// Parses text containing `{{ }}` blocks. Returns `None` when there is no interpolation.
    pub fn parse_interpolation(
        &self,
        input: &str,
        location: &str,
        absolute_offset: usize,
    ) -> Result<Option<ASTWithSource>> {
        let split = match self.split_interpolation(input, location)? {
            Some(split) => split,
            None => return Ok(None),
        };

        let mut expressions = Vec::with_capacity(split.expressions.len());
        for (source, offset) in &split.expressions {
            expressions.push(self.parse(source, location, absolute_offset + offset, ParseFlags::Binding)?);
        }
        let span = ParseSpan::new(0, input.len());
        let ast = AST::Interpolation(Interpolation {
            span,
            source_span: span.to_absolute(absolute_offset),
            strings: split.strings,
            expressions,
        });
        Ok(Some(ASTWithSource::new(ast, Some(input.to_string()), location.to_string(), absolute_offset)))
    }

    pub fn split_interpolation(&self, input: &str, location: &str) -> Result<Option<SplitInterpolation>> {
        let mut strings = Vec::new();
        let mut expressions = Vec::new();
        let mut index = 0;
        while index < input.len() {
            let start = match input[index..].find("{{") {
                Some(rel) => index + rel,
                None => break,
            };
            let expr_start = start + 2;
            let end = match input[expr_start..].find("}}") {
                Some(rel) => expr_start + rel,
                None => {
                    return Err(CompilerError::ExpressionParse {
                        message: "Unterminated interpolation, expected }}".to_string(),
                        input: input.to_string(),
                        location: location.to_string(),
                        index: start,
                    })
                }
            };
            strings.push(input[index..start].to_string());
            let source = &input[expr_start..end];
            if source.trim().is_empty() {
                return Err(CompilerError::ExpressionParse {
                    message: "Blank expressions are not allowed in interpolated strings".to_string(),
                    input: input.to_string(),
                    location: location.to_string(),
                    index: expr_start,
                });
            }
            expressions.push((source.to_string(), expr_start));
            index = end + 2;
        }
        if expressions.is_empty() {
            return Ok(None);
        }
        strings.push(input[index.min(input.len())..].to_string());
        Ok(Some(SplitInterpolation { strings, expressions }))
    }

    fn parse(&self, input: &str, location: &str, absolute_offset: usize, flags: ParseFlags) -> Result<AST> {
        let tokens = self.lexer.tokenize(input);
        let mut parser = ParseAST {
            input,
            location,
            absolute_offset,
            tokens,
            index: 0,
            last_end: 0,
            flags,
        };
        parser.parse_chain()
    }
}

struct ParseAST<'a> {
    input: &'a str,
    location: &'a str,
    absolute_offset: usize,
    tokens: Vec<Token>,
    index: usize,
    last_end: usize,
    flags: ParseFlags,
}

impl<'a> ParseAST<'a> {
    fn next(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    fn input_index(&self) -> usize {
        self.next().map_or(self.input.len(), |t| t.index)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if let Some(token) = &token {
            self.last_end = token.end;
            self.index += 1;
        }
        token
    }

    fn span(&self, start: usize) -> ParseSpan {
        ParseSpan::new(start, self.last_end.max(start))
    }

    fn source_span(&self, start: usize) -> AbsoluteSourceSpan {
        self.span(start).to_absolute(self.absolute_offset)
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        let token_error = self.next().filter(|t| t.is_error()).map(|t| t.str_value.clone());
        Err(CompilerError::ExpressionParse {
            message: token_error.unwrap_or_else(|| message.into()),
            input: self.input.to_string(),
            location: self.location.to_string(),
            index: self.input_index(),
        })
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.next().map_or(false, |t| t.is_character(code)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if self.next().map_or(false, |t| t.is_operator(op)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_character(&mut self, code: char) -> Result<()> {
        if self.consume_optional_character(code) {
            Ok(())
        } else {
            self.error(format!("Missing expected {}", code))
        }
    }

    fn expect_identifier_or_keyword(&mut self) -> Result<Token> {
        match self.next() {
            Some(t) if t.is_identifier() || t.is_keyword() => {
                let token = t.clone();
                self.advance();
                Ok(token)
            }
            Some(t) if t.is_private_identifier() => {
                let name = t.str_value.clone();
                self.error(format!("Private identifiers are not supported. Unexpected private identifier: {}", name))
            }
            _ => self.error("Unexpected token, expected identifier or keyword"),
        }
    }

    fn parse_chain(&mut self) -> Result<AST> {
        let start = self.input_index();
        let mut expressions = Vec::new();
        while self.next().is_some() {
            let expr = self.parse_pipe()?;
            expressions.push(expr);

            if self.consume_optional_character(';') {
                if self.flags == ParseFlags::Binding {
                    return self.error("Binding expression cannot contain chained expression");
                }
                while self.consume_optional_character(';') {}
            } else if self.next().is_some() {
                let text = self.next().map(|t| t.str_value.clone()).unwrap_or_default();
                return self.error(format!("Unexpected token '{}'", text));
            }
        }

        match expressions.len() {
            0 => {
                let span = ParseSpan::new(start, start);
                Ok(AST::EmptyExpr(EmptyExpr { span, source_span: span.to_absolute(self.absolute_offset) }))
            }
            1 => Ok(expressions.remove(0)),
            _ => Ok(AST::Chain(Chain {
                span: self.span(start),
                source_span: self.source_span(start),
                expressions,
            })),
        }
    }

    fn parse_pipe(&mut self) -> Result<AST> {
        let start = self.input_index();
        let mut result = self.parse_expression()?;
        if self.next().map_or(false, |t| t.is_operator("|")) {
            if self.flags == ParseFlags::Action {
                return self.error("Cannot have a pipe in an action expression");
            }
            while self.consume_optional_operator("|") {
                let name_token = self.expect_identifier_or_keyword()?;
                let name_span = AbsoluteSourceSpan::new(
                    self.absolute_offset + name_token.index,
                    self.absolute_offset + name_token.end,
                );
                let mut args = Vec::new();
                while self.consume_optional_character(':') {
                    args.push(self.parse_expression()?);
                }
                result = AST::BindingPipe(BindingPipe {
                    span: self.span(start),
                    source_span: self.source_span(start),
                    name_span,
                    exp: Box::new(result),
                    name: name_token.str_value,
                    args,
                });
            }
        }
        Ok(result)
    }

    fn parse_expression(&mut self) -> Result<AST> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<AST> {
        let start = self.input_index();
        let left = self.parse_conditional()?;
        let op = match self.next() {
            Some(t) if t.token_type == TokenType::Operator && is_assignment_operation(&t.str_value) => {
                t.str_value.clone()
            }
            _ => return Ok(left),
        };
        if self.flags == ParseFlags::Binding {
            return self.error("Bindings cannot contain assignments");
        }
        if !matches!(left, AST::PropertyRead(_) | AST::KeyedRead(_)) {
            return self.error("Assignment target must be a property or keyed read");
        }
        self.advance();
        let right = self.parse_assignment()?;
        Ok(AST::Binary(Binary {
            span: self.span(start),
            source_span: self.source_span(start),
            operation: op,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_conditional(&mut self) -> Result<AST> {
        let start = self.input_index();
        let condition = self.parse_logical_or()?;
        if !self.consume_optional_operator("?") {
            return Ok(condition);
        }
        let true_exp = self.parse_pipe()?;
        if !self.consume_optional_character(':') {
            let text = &self.input[start..self.input_index().min(self.input.len())];
            return self.error(format!("Conditional expression {} requires all 3 expressions", text));
        }
        let false_exp = self.parse_pipe()?;
        Ok(AST::Conditional(Conditional {
            span: self.span(start),
            source_span: self.source_span(start),
            condition: Box::new(condition),
            true_exp: Box::new(true_exp),
            false_exp: Box::new(false_exp),
        }))
    }

    fn binary(&self, start: usize, operation: String, left: AST, right: AST) -> AST {
        AST::Binary(Binary {
            span: self.span(start),
            source_span: self.source_span(start),
            operation,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Parses a left-associative level of binary operators.
    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        keywords: &[&str],
        next: fn(&mut Self) -> Result<AST>,
    ) -> Result<AST> {
        let start = self.input_index();
        let mut result = next(self)?;
        loop {
            let op = match self.next() {
                Some(t)
                    if (t.token_type == TokenType::Operator && operators.contains(&t.str_value.as_str()))
                        || (t.is_keyword() && keywords.contains(&t.str_value.as_str())) =>
                {
                    t.str_value.clone()
                }
                _ => return Ok(result),
            };
            self.advance();
            let right = next(self)?;
            result = self.binary(start, op, result, right);
        }
    }

    fn parse_logical_or(&mut self) -> Result<AST> {
        self.parse_binary_level(&["||"], &[], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<AST> {
        self.parse_binary_level(&["&&"], &[], Self::parse_nullish_coalescing)
    }

    fn parse_nullish_coalescing(&mut self) -> Result<AST> {
        self.parse_binary_level(&["??"], &[], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<AST> {
        self.parse_binary_level(&["==", "!=", "===", "!=="], &[], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<AST> {
        self.parse_binary_level(&["<", ">", "<=", ">="], &["in"], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<AST> {
        self.parse_binary_level(&["+", "-"], &[], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<AST> {
        self.parse_binary_level(&["*", "/", "%"], &[], Self::parse_exponentiation)
    }

    fn parse_exponentiation(&mut self) -> Result<AST> {
        let start = self.input_index();
        let left = self.parse_prefix()?;
        if !self.consume_optional_operator("**") {
            return Ok(left);
        }
        if matches!(left, AST::Unary(_) | AST::PrefixNot(_) | AST::TypeofExpression(_) | AST::VoidExpression(_)) {
            return self.error("Unary operator used immediately before exponentiation expression");
        }
        let right = self.parse_exponentiation()?;
        Ok(self.binary(start, "**".to_string(), left, right))
    }

    fn parse_prefix(&mut self) -> Result<AST> {
        let start = self.input_index();
        let token = match self.next() {
            Some(t) => t.clone(),
            None => return self.parse_call_chain(),
        };
        if token.is_operator("+") || token.is_operator("-") {
            self.advance();
            let expr = self.parse_prefix()?;
            return Ok(AST::Unary(Unary {
                span: self.span(start),
                source_span: self.source_span(start),
                operator: token.str_value,
                expr: Box::new(expr),
            }));
        }
        if token.is_operator("!") {
            self.advance();
            let expression = self.parse_prefix()?;
            return Ok(AST::PrefixNot(PrefixNot {
                span: self.span(start),
                source_span: self.source_span(start),
                expression: Box::new(expression),
            }));
        }
        if token.is_keyword_value("typeof") {
            self.advance();
            let expression = self.parse_prefix()?;
            return Ok(AST::TypeofExpression(TypeofExpression {
                span: self.span(start),
                source_span: self.source_span(start),
                expression: Box::new(expression),
            }));
        }
        if token.is_keyword_value("void") {
            self.advance();
            let expression = self.parse_prefix()?;
            return Ok(AST::VoidExpression(VoidExpression {
                span: self.span(start),
                source_span: self.source_span(start),
                expression: Box::new(expression),
            }));
        }
        self.parse_call_chain()
    }

    fn parse_call_chain(&mut self) -> Result<AST> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;
        loop {
            if self.consume_optional_character('.') {
                result = self.parse_access_member(result, start, false)?;
            } else if self.consume_optional_operator("?.") {
                if self.consume_optional_character('(') {
                    result = self.parse_call(result, start, true)?;
                } else if self.consume_optional_character('[') {
                    result = self.parse_keyed_read(result, start, true)?;
                } else {
                    result = self.parse_access_member(result, start, true)?;
                }
            } else if self.consume_optional_character('[') {
                result = self.parse_keyed_read(result, start, false)?;
            } else if self.consume_optional_character('(') {
                result = self.parse_call(result, start, false)?;
            } else if self.next().map_or(false, |t| t.is_operator("!")) {
                self.advance();
                result = AST::NonNullAssert(NonNullAssert {
                    span: self.span(start),
                    source_span: self.source_span(start),
                    expression: Box::new(result),
                });
            } else if self.next().map_or(false, |t| t.is_template_literal_part()) {
                let template = self.parse_template_literal()?;
                result = AST::TaggedTemplateLiteral(TaggedTemplateLiteral {
                    span: self.span(start),
                    source_span: self.source_span(start),
                    tag: Box::new(result),
                    template,
                });
            } else {
                return Ok(result);
            }
        }
    }

    fn parse_access_member(&mut self, receiver: AST, start: usize, is_safe: bool) -> Result<AST> {
        let name_token = self.expect_identifier_or_keyword()?;
        let name_span = AbsoluteSourceSpan::new(
            self.absolute_offset + name_token.index,
            self.absolute_offset + name_token.end,
        );
        let span = self.span(start);
        let source_span = self.source_span(start);
        let receiver = Box::new(receiver);
        let name = name_token.str_value;
        Ok(if is_safe {
            AST::SafePropertyRead(SafePropertyRead { span, source_span, name_span, receiver, name })
        } else {
            AST::PropertyRead(PropertyRead { span, source_span, name_span, receiver, name })
        })
    }

    fn parse_keyed_read(&mut self, receiver: AST, start: usize, is_safe: bool) -> Result<AST> {
        let key = self.parse_pipe()?;
        self.expect_character(']')?;
        let span = self.span(start);
        let source_span = self.source_span(start);
        let receiver = Box::new(receiver);
        let key = Box::new(key);
        Ok(if is_safe {
            AST::SafeKeyedRead(SafeKeyedRead { span, source_span, receiver, key })
        } else {
            AST::KeyedRead(KeyedRead { span, source_span, receiver, key })
        })
    }

    fn parse_call(&mut self, receiver: AST, start: usize, is_safe: bool) -> Result<AST> {
        let arg_start = self.input_index();
        let args = self.parse_expression_list(')')?;
        let argument_span = ParseSpan::new(arg_start, self.input_index()).to_absolute(self.absolute_offset);
        self.expect_character(')')?;
        let span = self.span(start);
        let source_span = self.source_span(start);
        let receiver = Box::new(receiver);
        Ok(if is_safe {
            AST::SafeCall(SafeCall { span, source_span, receiver, args, argument_span })
        } else {
            AST::Call(Call { span, source_span, receiver, args, argument_span })
        })
    }

    /// Comma separated expressions up to (not including) `terminator`. Supports spreads.
    fn parse_expression_list(&mut self, terminator: char) -> Result<Vec<AST>> {
        let mut result = Vec::new();
        if self.next().map_or(false, |t| t.is_character(terminator)) {
            return Ok(result);
        }
        loop {
            if self.next().map_or(false, |t| t.is_operator("...")) {
                result.push(self.parse_spread()?);
            } else {
                result.push(self.parse_pipe()?);
            }
            if !self.consume_optional_character(',') {
                return Ok(result);
            }
            if self.next().map_or(false, |t| t.is_character(terminator)) {
                return Ok(result);
            }
        }
    }

    fn parse_spread(&mut self) -> Result<AST> {
        let start = self.input_index();
        self.advance();
        let expression = self.parse_pipe()?;
        Ok(AST::SpreadElement(SpreadElement {
            span: self.span(start),
            source_span: self.source_span(start),
            expression: Box::new(expression),
        }))
    }

    fn literal(&self, start: usize, value: LiteralValue) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span: self.span(start),
            source_span: self.source_span(start),
            value,
        })
    }

    fn parse_primary(&mut self) -> Result<AST> {
        let start = self.input_index();
        let token = match self.next() {
            Some(t) => t.clone(),
            None => return self.error("Unexpected end of expression"),
        };

        if token.is_character('(') {
            if self.is_arrow_function_start() {
                return self.parse_arrow_function(start);
            }
            self.advance();
            let expression = self.parse_pipe()?;
            self.expect_character(')')?;
            return Ok(AST::ParenthesizedExpression(ParenthesizedExpression {
                span: self.span(start),
                source_span: self.source_span(start),
                expression: Box::new(expression),
            }));
        }

        if token.is_keyword() {
            match token.str_value.as_str() {
                "null" => {
                    self.advance();
                    return Ok(self.literal(start, LiteralValue::Null));
                }
                "undefined" => {
                    self.advance();
                    return Ok(self.literal(start, LiteralValue::Undefined));
                }
                "true" => {
                    self.advance();
                    return Ok(self.literal(start, LiteralValue::Boolean(true)));
                }
                "false" => {
                    self.advance();
                    return Ok(self.literal(start, LiteralValue::Boolean(false)));
                }
                "this" => {
                    self.advance();
                    return Ok(AST::ThisReceiver(ThisReceiver {
                        span: self.span(start),
                        source_span: self.source_span(start),
                    }));
                }
                _ => {}
            }
        }

        if token.is_character('[') {
            self.advance();
            let expressions = self.parse_expression_list(']')?;
            self.expect_character(']')?;
            return Ok(AST::LiteralArray(LiteralArray {
                span: self.span(start),
                source_span: self.source_span(start),
                expressions,
            }));
        }

        if token.is_character('{') {
            return self.parse_literal_map(start);
        }

        if token.is_identifier() || token.is_keyword() {
            if self.peek(1).map_or(false, |t| t.is_operator("=>")) {
                return self.parse_arrow_function(start);
            }
            return self.parse_implicit_read(start);
        }

        if token.is_number() {
            self.advance();
            return Ok(self.literal(start, LiteralValue::Number(token.num_value)));
        }

        if token.is_string() {
            self.advance();
            return Ok(self.literal(start, LiteralValue::String(token.str_value)));
        }

        if token.is_template_literal_part() {
            return Ok(AST::TemplateLiteral(self.parse_template_literal()?));
        }

        if token.token_type == TokenType::RegExpBody {
            self.advance();
            let flags = match self.next() {
                Some(t) if t.token_type == TokenType::RegExpFlags => {
                    let flags = t.str_value.clone();
                    self.advance();
                    Some(flags)
                }
                _ => None,
            };
            return Ok(AST::RegularExpressionLiteral(RegularExpressionLiteral {
                span: self.span(start),
                source_span: self.source_span(start),
                body: token.str_value,
                flags,
            }));
        }

        if token.is_private_identifier() {
            return self.error(format!(
                "Private identifiers are not supported. Unexpected private identifier: {}",
                token.str_value
            ));
        }

        self.error(format!("Unexpected token {}", token.str_value))
    }

    fn parse_implicit_read(&mut self, start: usize) -> Result<AST> {
        let receiver_span = ParseSpan::new(start, start);
        let receiver = AST::ImplicitReceiver(ImplicitReceiver {
            span: receiver_span,
            source_span: receiver_span.to_absolute(self.absolute_offset),
        });
        self.parse_access_member(receiver, start, false)
    }

    fn parse_literal_map(&mut self, start: usize) -> Result<AST> {
        self.expect_character('{')?;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if !self.consume_optional_character('}') {
            loop {
                if self.next().map_or(false, |t| t.is_operator("...")) {
                    keys.push(LiteralMapKey { key: String::new(), quoted: false, is_spread: true });
                    values.push(self.parse_spread()?);
                } else {
                    let key_start = self.input_index();
                    let quoted = self.next().map_or(false, |t| t.is_string());
                    let key_token = match self.next() {
                        Some(t) if t.is_string() || t.is_identifier() || t.is_keyword() => t.clone(),
                        _ => return self.error("Expected identifier, keyword, or string"),
                    };
                    self.advance();
                    keys.push(LiteralMapKey { key: key_token.str_value.clone(), quoted, is_spread: false });
                    if quoted || self.next().map_or(false, |t| t.is_character(':')) {
                        self.expect_character(':')?;
                        values.push(self.parse_pipe()?);
                    } else {
                        // Shorthand `{a}` reads `a` from the implicit receiver.
                        let receiver_span = ParseSpan::new(key_start, key_start);
                        let name_span = self.source_span(key_start);
                        values.push(AST::PropertyRead(PropertyRead {
                            span: self.span(key_start),
                            source_span: name_span,
                            name_span,
                            receiver: Box::new(AST::ImplicitReceiver(ImplicitReceiver {
                                span: receiver_span,
                                source_span: receiver_span.to_absolute(self.absolute_offset),
                            })),
                            name: key_token.str_value,
                        }));
                    }
                }
                if !self.consume_optional_character(',') || self.next().map_or(false, |t| t.is_character('}')) {
                    break;
                }
            }
            self.expect_character('}')?;
        }
        Ok(AST::LiteralMap(LiteralMap {
            span: self.span(start),
            source_span: self.source_span(start),
            keys,
            values,
        }))
    }

    fn parse_template_literal(&mut self) -> Result<TemplateLiteral> {
        let start = self.input_index();
        let mut elements = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let token = match self.advance() {
                Some(t) => t,
                None => return self.error("Unterminated template literal"),
            };
            if token.is_template_literal_part() {
                let span = ParseSpan::new(token.index, token.end);
                elements.push(TemplateLiteralElement {
                    span,
                    source_span: span.to_absolute(self.absolute_offset),
                    text: token.str_value,
                });
            } else if token.is_template_literal_interpolation_start() {
                expressions.push(self.parse_pipe()?);
                self.expect_character('}')?;
            } else if token.is_template_literal_end() {
                break;
            } else {
                return self.error(format!("Unexpected token {} in template literal", token.str_value));
            }
        }
        Ok(TemplateLiteral {
            span: self.span(start),
            source_span: self.source_span(start),
            elements,
            expressions,
        })
    }

    /// Looks ahead from `(` for `ident, ident) =>`.
    fn is_arrow_function_start(&self) -> bool {
        let mut offset = 1;
        let mut expect_name = true;
        loop {
            match self.peek(offset) {
                Some(t) if t.is_character(')') => {
                    return self.peek(offset + 1).map_or(false, |t| t.is_operator("=>"));
                }
                Some(t) if expect_name && t.is_identifier() => expect_name = false,
                Some(t) if !expect_name && t.is_character(',') => expect_name = true,
                _ => return false,
            }
            offset += 1;
        }
    }

    fn parse_arrow_function(&mut self, start: usize) -> Result<AST> {
        let mut tokens = Vec::new();
        if self.consume_optional_character('(') {
            while !self.consume_optional_character(')') {
                tokens.push(self.expect_identifier_or_keyword()?);
                self.consume_optional_character(',');
            }
        } else {
            tokens.push(self.expect_identifier_or_keyword()?);
        }
        if !self.consume_optional_operator("=>") {
            return self.error("Missing expected =>");
        }
        if self.next().map_or(false, |t| t.is_character('{')) {
            return self.error("Multi-line arrow functions are not supported");
        }
        let parameters = tokens
            .into_iter()
            .map(|token| {
                let span = ParseSpan::new(token.index, token.end);
                ArrowFunctionParameter {
                    name: token.str_value,
                    span,
                    source_span: span.to_absolute(self.absolute_offset),
                }
            })
            .collect();
        let body = self.parse_expression()?;
        Ok(AST::ArrowFunction(ArrowFunction {
            span: self.span(start),
            source_span: self.source_span(start),
            parameters,
            body: Box::new(body),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(input: &str) -> AST {
        Parser::new().parse_binding(input, "test", 0).map(|r| r.ast).unwrap()
    }

    #[test]
    fn parses_implicit_property_read_with_spans() {
        let ast = binding("foo.bar");
        match ast {
            AST::PropertyRead(read) => {
                assert_eq!(read.name, "bar");
                assert_eq!(read.name_span, AbsoluteSourceSpan::new(4, 7));
                assert_eq!(read.source_span, AbsoluteSourceSpan::new(0, 7));
                let inner = read.receiver.as_implicit_read().unwrap();
                assert_eq!(inner.name, "foo");
                assert_eq!(inner.source_span, AbsoluteSourceSpan::new(0, 3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn applies_absolute_offset() {
        let ast = Parser::new().parse_binding("a", "test", 20).unwrap().ast;
        assert_eq!(ast.source_span(), AbsoluteSourceSpan::new(20, 21));
    }

    #[test]
    fn rejects_assignment_in_binding() {
        assert!(Parser::new().parse_binding("a = 1", "test", 0).is_err());
        assert!(Parser::new().parse_action("a = 1", "test", 0).is_ok());
    }

    #[test]
    fn rejects_pipe_in_action() {
        assert!(Parser::new().parse_action("a | b", "test", 0).is_err());
    }

    #[test]
    fn parses_pipes_with_arguments() {
        match binding("value | date:'short':tz") {
            AST::BindingPipe(pipe) => {
                assert_eq!(pipe.name, "date");
                assert_eq!(pipe.args.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_safe_navigation_forms() {
        assert!(matches!(binding("a?.b"), AST::SafePropertyRead(_)));
        assert!(matches!(binding("a?.[0]"), AST::SafeKeyedRead(_)));
        assert!(matches!(binding("a?.()"), AST::SafeCall(_)));
        assert!(matches!(binding("a?.b()"), AST::Call(_)));
    }

    #[test]
    fn parses_arrow_functions() {
        match binding("(a, b) => a + b") {
            AST::ArrowFunction(arrow) => {
                assert_eq!(arrow.parameters.len(), 2);
                assert!(matches!(*arrow.body, AST::Binary(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(binding("x => x"), AST::ArrowFunction(_)));
        assert!(matches!(binding("(a)"), AST::ParenthesizedExpression(_)));
    }

    #[test]
    fn parses_action_chain() {
        let ast = Parser::new().parse_action("a(); b = $event", "test", 0).unwrap().ast;
        match ast {
            AST::Chain(chain) => assert_eq!(chain.expressions.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_interpolation() {
        let result = Parser::new().parse_interpolation("Hi {{ name }}!", "test", 5).unwrap().unwrap();
        match result.ast {
            AST::Interpolation(interp) => {
                assert_eq!(interp.strings, vec!["Hi ".to_string(), "!".to_string()]);
                assert_eq!(interp.expressions[0].source_span(), AbsoluteSourceSpan::new(11, 15));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Parser::new().parse_interpolation("plain", "test", 0).unwrap().is_none());
    }

    #[test]
    fn parses_literal_map_shorthand_and_spread() {
        match binding("{a, 'b-c': 1, ...rest}") {
            AST::LiteralMap(map) => {
                assert_eq!(map.keys.len(), 3);
                assert!(map.keys[1].quoted);
                assert!(map.keys[2].is_spread);
                assert!(map.values[0].as_implicit_read().is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_template_literals() {
        match binding("`a${b}c`") {
            AST::TemplateLiteral(tpl) => {
                assert_eq!(tpl.elements.len(), 2);
                assert_eq!(tpl.expressions.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(binding("tag`x`"), AST::TaggedTemplateLiteral(_)));
    }

    #[test]
    fn parses_negative_numbers_as_unary() {
        match binding("-1") {
            AST::Unary(unary) => assert_eq!(unary.operator, "-"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
