//! Escape expressions.
//!
//! A backslash in table text is followed by exactly one code character
//! which expands to one literal character:
//!
//! | code | expands to |
//! |------|------------|
//! | `b`  | backspace (0x08) |
//! | `t`  | tab |
//! | `v`  | vertical tab (0x0B) |
//! | `n`  | line feed |
//! | `r`  | carriage return |
//! | `f`  | form feed (0x0C) |
//! | `a`  | bell (0x07) |
//! | `'` `"` `\` `,` | themselves |
//! | `e`  | `\` |

use crate::error::EscapeError;

/// Character that introduces an escape expression.
pub const ESCAPE: char = '\\';

/// Expand a single escape code, `None` if it has no table entry.
pub fn expand_code(code: char) -> Option<char> {
    let out = match code {
        'b' => '\u{08}',
        't' => '\t',
        'v' => '\u{0B}',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{0C}',
        'a' => '\u{07}',
        '\'' => '\'',
        '"' => '"',
        '\\' | 'e' => '\\',
        ',' => ',',
        _ => return None,
    };
    Some(out)
}

/// Expand an escape expression given as text.
///
/// The input must be exactly one character long.
pub fn expand(expression: &str) -> Result<char, EscapeError> {
    let mut chars = expression.chars();
    let code = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => return Err(EscapeError::InvalidEscapeArgument(expression.to_string())),
    };
    expand_code(code).ok_or(EscapeError::UnknownEscapeCode(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_codes() {
        assert_eq!(expand("b"), Ok('\u{08}'));
        assert_eq!(expand("t"), Ok('\t'));
        assert_eq!(expand("v"), Ok('\u{0B}'));
        assert_eq!(expand("n"), Ok('\n'));
        assert_eq!(expand("r"), Ok('\r'));
        assert_eq!(expand("f"), Ok('\u{0C}'));
        assert_eq!(expand("a"), Ok('\u{07}'));
    }

    #[test]
    fn test_literal_codes() {
        assert_eq!(expand("'"), Ok('\''));
        assert_eq!(expand("\""), Ok('"'));
        assert_eq!(expand("\\"), Ok('\\'));
        assert_eq!(expand("e"), Ok('\\'));
        assert_eq!(expand(","), Ok(','));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(expand("x"), Err(EscapeError::UnknownEscapeCode('x')));
        assert_eq!(expand_code('N'), None);
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            expand(""),
            Err(EscapeError::InvalidEscapeArgument(String::new()))
        );
        assert_eq!(
            expand("tn"),
            Err(EscapeError::InvalidEscapeArgument("tn".into()))
        );
    }
}
