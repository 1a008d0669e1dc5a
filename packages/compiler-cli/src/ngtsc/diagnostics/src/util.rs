use super::error_code::ErrorCode;

/// Numeric form of an Angular code, `-99` followed by its digits. Host
/// checkers report Angular codes this way so they never clash with their own.
pub fn ng_error_code(code: ErrorCode) -> i32 {
    let value = code.code();
    let digits = value.to_string().len() as u32;
    -(99 * 10i32.pow(digits) + value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefix_angular_codes_with_99() {
        assert_eq!(ng_error_code(ErrorCode::MissingPipe), -998004);
        assert_eq!(ng_error_code(ErrorCode::ConflictingLetDeclaration), -998017);
    }

    #[test]
    fn should_render_error_codes() {
        assert_eq!(ErrorCode::SchemaInvalidElement.to_string(), "NG8001");
    }
}
