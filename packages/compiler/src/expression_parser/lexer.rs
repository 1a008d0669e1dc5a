//! Expression lexer
//!
//! Splits a template expression into tokens. Template literals are scanned
//! incrementally: text parts are emitted as `TemplateLiteralPart` tokens and
//! the lexer resumes template scanning once the `}` closing a `${` is seen.

use crate::chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Character,
    Identifier,
    PrivateIdentifier,
    Keyword,
    String,
    Operator,
    Number,
    Error,
    TemplateLiteralPart,
    TemplateLiteralEnd,
    RegExpBody,
    RegExpFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

const KEYWORDS: &[&str] = &[
    "var", "let", "as", "null", "undefined", "true", "false", "if", "else", "this", "typeof",
    "void", "in",
];

impl Token {
    fn new(index: usize, end: usize, token_type: TokenType, str_value: impl Into<String>) -> Self {
        Token { index, end, token_type, num_value: 0.0, str_value: str_value.into() }
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_private_identifier(&self) -> bool {
        self.token_type == TokenType::PrivateIdentifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_keyword_value(&self, keyword: &str) -> bool {
        self.is_keyword() && self.str_value == keyword
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }

    pub fn is_template_literal_part(&self) -> bool {
        self.token_type == TokenType::TemplateLiteralPart
    }

    pub fn is_template_literal_end(&self) -> bool {
        self.token_type == TokenType::TemplateLiteralEnd
    }

    pub fn is_template_literal_interpolation_start(&self) -> bool {
        self.is_operator("${")
    }
}

#[derive(Debug, Default)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

struct Scanner<'a> {
    input: &'a str,
    index: usize,
    peek: char,
    tokens: Vec<Token>,
    /// Brace depth at which each open `${` interpolation returns to template text.
    template_stack: Vec<i32>,
    brace_depth: i32,
    resume_template: bool,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            input,
            index: 0,
            peek: input.chars().next().unwrap_or(chars::EOF),
            tokens: Vec::new(),
            template_stack: Vec::new(),
            brace_depth: 0,
            resume_template: false,
        }
    }

    fn scan(mut self) -> Vec<Token> {
        while let Some(token) = self.scan_token() {
            let stop = token.is_error();
            self.tokens.push(token);
            if stop {
                break;
            }
        }
        self.tokens
    }

    fn at_end(&self) -> bool {
        self.index >= self.input.len()
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.input[self.index.min(self.input.len())..]
            .chars()
            .next()
            .unwrap_or(chars::EOF);
    }

    fn peek_at(&self, ahead: usize) -> char {
        self.input[self.index..].chars().nth(ahead).unwrap_or(chars::EOF)
    }

    fn error(&self, message: &str) -> Token {
        let position = self.index;
        Token::new(
            position,
            position,
            TokenType::Error,
            format!("Lexer Error: {} at column {} in expression [{}]", message, position, self.input),
        )
    }

    fn scan_token(&mut self) -> Option<Token> {
        if self.resume_template {
            self.resume_template = false;
            return Some(self.scan_template_literal_part(self.index));
        }

        while !self.at_end() && chars::is_whitespace(self.peek) {
            self.advance();
        }
        if self.at_end() {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        let token = match ch {
            '.' => {
                if chars::is_digit(self.peek_at(1)) {
                    return Some(self.scan_number(start));
                }
                if self.peek_at(1) == '.' && self.peek_at(2) == '.' {
                    self.advance();
                    self.advance();
                    self.advance();
                    return Some(Token::new(start, self.index, TokenType::Operator, "..."));
                }
                self.scan_character(start, ch)
            }
            '(' | ')' | '[' | ']' | ',' | ':' | ';' => self.scan_character(start, ch),
            '{' => {
                self.brace_depth += 1;
                self.scan_character(start, ch)
            }
            '}' => {
                self.brace_depth -= 1;
                let token = self.scan_character(start, ch);
                if self.template_stack.last() == Some(&self.brace_depth) {
                    self.template_stack.pop();
                    self.resume_template = true;
                }
                token
            }
            '\'' | '"' => self.scan_string(ch),
            '`' => {
                self.advance();
                self.scan_template_literal_part(start)
            }
            '#' => self.scan_private_identifier(),
            '/' if self.regex_allowed() => self.scan_regex_body(start),
            '+' | '-' | '/' | '%' | '^' => self.scan_operator_with_assign(start, ch),
            '*' => {
                self.advance();
                let mut op = String::from("*");
                if self.peek == '*' {
                    self.advance();
                    op.push('*');
                }
                if self.peek == '=' {
                    self.advance();
                    op.push('=');
                }
                Token::new(start, self.index, TokenType::Operator, op)
            }
            '?' => {
                self.advance();
                if self.peek == '.' && !chars::is_digit(self.peek_at(1)) {
                    self.advance();
                    Token::new(start, self.index, TokenType::Operator, "?.")
                } else if self.peek == '?' {
                    self.advance();
                    if self.peek == '=' {
                        self.advance();
                        Token::new(start, self.index, TokenType::Operator, "??=")
                    } else {
                        Token::new(start, self.index, TokenType::Operator, "??")
                    }
                } else {
                    Token::new(start, self.index, TokenType::Operator, "?")
                }
            }
            '<' | '>' => {
                self.advance();
                let mut op = ch.to_string();
                if self.peek == '=' {
                    self.advance();
                    op.push('=');
                }
                Token::new(start, self.index, TokenType::Operator, op)
            }
            '!' | '=' => {
                self.advance();
                let mut op = ch.to_string();
                if ch == '=' && self.peek == '>' {
                    self.advance();
                    return Some(Token::new(start, self.index, TokenType::Operator, "=>"));
                }
                if self.peek == '=' {
                    self.advance();
                    op.push('=');
                    if self.peek == '=' {
                        self.advance();
                        op.push('=');
                    }
                }
                Token::new(start, self.index, TokenType::Operator, op)
            }
            '&' | '|' => {
                self.advance();
                let mut op = ch.to_string();
                if self.peek == ch {
                    self.advance();
                    op.push(ch);
                    if self.peek == '=' {
                        self.advance();
                        op.push('=');
                    }
                }
                Token::new(start, self.index, TokenType::Operator, op)
            }
            _ => {
                self.advance();
                return Some(self.error(&format!("Unexpected character [{}]", ch)));
            }
        };
        Some(token)
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        let mut token = Token::new(start, self.index, TokenType::Character, ch.to_string());
        token.num_value = ch as u32 as f64;
        token
    }

    fn scan_operator_with_assign(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        let mut op = ch.to_string();
        if self.peek == '=' {
            self.advance();
            op.push('=');
        }
        Token::new(start, self.index, TokenType::Operator, op)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        while chars::is_identifier_part(self.peek) {
            self.advance();
        }
        let text = &self.input[start..self.index];
        let token_type = if KEYWORDS.contains(&text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, text)
    }

    fn scan_private_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        if !chars::is_identifier_start(self.peek) {
            return self.error("Invalid character [#]");
        }
        while chars::is_identifier_part(self.peek) {
            self.advance();
        }
        Token::new(start, self.index, TokenType::PrivateIdentifier, &self.input[start..self.index])
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut simple = self.peek != chars::PERIOD;
        let mut has_separators = false;
        self.advance();
        loop {
            if chars::is_digit(self.peek) {
                // no-op
            } else if self.peek == '_' {
                let prev = self.input[..self.index].chars().last().unwrap_or(chars::EOF);
                if !chars::is_digit(prev) || !chars::is_digit(self.peek_at(1)) {
                    return self.error("Invalid numeric separator");
                }
                has_separators = true;
            } else if self.peek == '.' {
                simple = false;
            } else if chars::is_exponent_start(self.peek) {
                self.advance();
                if chars::is_exponent_sign(self.peek) {
                    self.advance();
                }
                if !chars::is_digit(self.peek) {
                    return self.error("Invalid exponent");
                }
                simple = false;
            } else {
                break;
            }
            self.advance();
        }

        let mut text = self.input[start..self.index].to_string();
        if has_separators {
            text.retain(|c| c != '_');
        }
        let value = if simple {
            text.parse::<i64>().map(|v| v as f64).unwrap_or(f64::NAN)
        } else {
            text.parse::<f64>().unwrap_or(f64::NAN)
        };
        let mut token = Token::new(start, self.index, TokenType::Number, text);
        token.num_value = value;
        token
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();
        let mut value = String::new();
        loop {
            if self.at_end() {
                return self.error("Unterminated quote");
            }
            match self.peek {
                c if c == quote => break,
                chars::BACKSLASH => match self.scan_escape() {
                    Ok(c) => value.push(c),
                    Err(token) => return token,
                },
                c => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        self.advance();
        Token::new(start, self.index, TokenType::String, value)
    }

    fn scan_escape(&mut self) -> Result<char, Token> {
        self.advance();
        if self.peek == 'u' {
            let hex_start = self.index + 1;
            let hex_end = hex_start + 4;
            let input = self.input;
            let hex = input.get(hex_start..hex_end).unwrap_or("");
            let code = match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                Some(code) => code,
                None => return Err(self.error(&format!("Invalid unicode escape [\\u{}]", hex))),
            };
            for _ in 0..5 {
                self.advance();
            }
            Ok(code)
        } else {
            let c = chars::unescape(self.peek);
            self.advance();
            Ok(c)
        }
    }

    fn scan_template_literal_part(&mut self, start: usize) -> Token {
        let mut value = String::new();
        loop {
            if self.at_end() {
                return self.error("Unterminated template literal");
            }
            match self.peek {
                chars::BT => {
                    let part_end = self.index;
                    self.advance();
                    self.tokens.push(Token::new(start, part_end, TokenType::TemplateLiteralPart, value));
                    return Token::new(part_end, self.index, TokenType::TemplateLiteralEnd, "");
                }
                chars::DOLLAR if self.peek_at(1) == chars::LBRACE => {
                    let part_end = self.index;
                    self.tokens.push(Token::new(start, part_end, TokenType::TemplateLiteralPart, value));
                    self.advance();
                    self.advance();
                    self.template_stack.push(self.brace_depth);
                    self.brace_depth += 1;
                    return Token::new(part_end, self.index, TokenType::Operator, "${");
                }
                chars::BACKSLASH => match self.scan_escape() {
                    Ok(c) => value.push(c),
                    Err(token) => return token,
                },
                c => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    /// A `/` starts a regular expression unless it follows an operand.
    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(prev) => match prev.token_type {
                TokenType::Identifier
                | TokenType::PrivateIdentifier
                | TokenType::Number
                | TokenType::String
                | TokenType::TemplateLiteralEnd
                | TokenType::RegExpBody
                | TokenType::RegExpFlags => false,
                TokenType::Keyword => !matches!(
                    prev.str_value.as_str(),
                    "this" | "true" | "false" | "null" | "undefined"
                ),
                TokenType::Character => !(prev.is_character(')') || prev.is_character(']')),
                TokenType::Operator => !prev.is_operator("!"),
                _ => true,
            },
        }
    }

    fn scan_regex_body(&mut self, start: usize) -> Token {
        self.advance();
        let body_start = self.index;
        let mut in_class = false;
        loop {
            if self.at_end() {
                return self.error("Unterminated regular expression");
            }
            match self.peek {
                chars::BACKSLASH => {
                    self.advance();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
            self.advance();
        }
        let body = self.input[body_start..self.index].to_string();
        self.advance();
        let body_token = Token::new(start, self.index, TokenType::RegExpBody, body);

        let flags_start = self.index;
        while chars::is_ascii_letter(self.peek) {
            self.advance();
        }
        if self.index > flags_start {
            self.tokens.push(body_token);
            return Token::new(
                flags_start,
                self.index,
                TokenType::RegExpFlags,
                &self.input[flags_start..self.index],
            );
        }
        body_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<Token> {
        Lexer::new().tokenize(text)
    }

    #[test]
    fn tokenizes_property_chain() {
        let tokens = lex("a.b?.c");
        let values: Vec<_> = tokens.iter().map(|t| t.str_value.as_str()).collect();
        assert_eq!(values, vec!["a", ".", "b", "?.", "c"]);
        assert!(tokens[3].is_operator("?."));
    }

    #[test]
    fn keeps_ternary_with_decimal_branch() {
        let tokens = lex("a?.5:1");
        assert!(tokens[1].is_operator("?"));
        assert!(tokens[2].is_number());
        assert_eq!(tokens[2].num_value, 0.5);
    }

    #[test]
    fn scans_numbers_and_separators() {
        let tokens = lex("1_000 2.5e3");
        assert_eq!(tokens[0].num_value, 1000.0);
        assert_eq!(tokens[1].num_value, 2500.0);
    }

    #[test]
    fn scans_escaped_strings() {
        let tokens = lex(r#"'a\'b' "A""#);
        assert_eq!(tokens[0].str_value, "a'b");
        assert_eq!(tokens[1].str_value, "A");
    }

    #[test]
    fn scans_template_literal_with_interpolation() {
        let tokens = lex("`a${b}c`");
        let kinds: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
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
        assert_eq!(tokens[4].str_value, "c");
    }

    #[test]
    fn scans_arrow_and_spread() {
        let tokens = lex("(...a) => b");
        assert!(tokens[1].is_operator("..."));
        assert!(tokens[4].is_operator("=>"));
    }

    #[test]
    fn distinguishes_regex_from_division() {
        let tokens = lex("a / b");
        assert!(tokens[1].is_operator("/"));
        let tokens = lex("/ab+c/gi.test(x)");
        assert_eq!(tokens[0].token_type, TokenType::RegExpBody);
        assert_eq!(tokens[0].str_value, "ab+c");
        assert_eq!(tokens[1].token_type, TokenType::RegExpFlags);
    }

    #[test]
    fn reports_unterminated_quote() {
        let tokens = lex("'abc");
        assert!(tokens.last().map_or(false, |t| t.is_error()));
    }
}
