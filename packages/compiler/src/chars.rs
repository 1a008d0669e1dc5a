//! Character classes shared by the expression lexer and span utilities.

pub const EOF: char = '\0';
pub const NEWLINE: char = '\n';
pub const DQ: char = '"';
pub const SQ: char = '\'';
pub const BT: char = '`';
pub const DOLLAR: char = '$';
pub const BACKSLASH: char = '\\';
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';
pub const PERIOD: char = '.';

pub fn is_whitespace(code: char) -> bool {
    (code >= '\t' && code <= ' ') || code == '\u{00A0}'
}

pub fn is_digit(code: char) -> bool {
    code.is_ascii_digit()
}

pub fn is_ascii_letter(code: char) -> bool {
    code.is_ascii_alphabetic()
}

pub fn is_identifier_start(code: char) -> bool {
    is_ascii_letter(code) || code == '_' || code == DOLLAR
}

pub fn is_identifier_part(code: char) -> bool {
    is_ascii_letter(code) || is_digit(code) || code == '_' || code == DOLLAR
}

pub fn is_exponent_start(code: char) -> bool {
    code == 'e' || code == 'E'
}

pub fn is_exponent_sign(code: char) -> bool {
    code == '-' || code == '+'
}

pub fn is_quote(code: char) -> bool {
    code == SQ || code == DQ || code == BT
}

/// Resolves the character produced by a single-letter escape such as `\n`.
pub fn unescape(code: char) -> char {
    match code {
        'n' => '\n',
        'f' => '\u{000C}',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{000B}',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_classes() {
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('_'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_part('1'));
        assert!(!is_identifier_part('-'));
    }

    #[test]
    fn whitespace_includes_nbsp() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\n'));
        assert!(is_whitespace('\u{00A0}'));
        assert!(!is_whitespace('a'));
    }
}
