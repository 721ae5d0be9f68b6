//! Folder and file name validation.
//!
//! A valid name:
//! - Must be non-empty
//! - Must not be `.` or `..`
//! - Must not contain whitespace or any of
//!   `\ / $ % ? @ " ' ! > < * & { } # = ` | : +`
//!
//! The error for a bad character names the first offending character in
//! the name, scanning left to right.

use crate::error::{NamespaceError, NamespaceResult};

/// Characters that are forbidden anywhere in a name.
pub const FORBIDDEN_CHARS: &[char] = &[
    '\\', '/', '$', '%', '?', '@', '"', '\'', '!', '>', '<', '*', '&', '{', '}', '#', '=', '`',
    '|', ':', '+',
];

/// Returns `true` if `ch` may not appear in a name.
pub fn is_forbidden(ch: char) -> bool {
    ch.is_whitespace() || FORBIDDEN_CHARS.contains(&ch)
}

/// Validate a folder or file name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use vtree_namespace::names::validate_name;
///
/// assert!(validate_name("report-2024.txt").is_ok());
/// assert!(validate_name("a b").is_err());
/// assert!(validate_name("").is_err());
/// ```
pub fn validate_name(name: &str) -> NamespaceResult<()> {
    if name.is_empty() {
        return Err(NamespaceError::InvalidArgument(
            "name must not be empty".into(),
        ));
    }

    if let Some(ch) = name.chars().find(|c| is_forbidden(*c)) {
        return Err(NamespaceError::InvalidCharacter {
            name: name.to_string(),
            ch,
        });
    }

    if name == "." || name == ".." {
        return Err(NamespaceError::InvalidArgument(format!(
            "name must not be {name:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn offending(name: &str) -> char {
        match validate_name(name) {
            Err(NamespaceError::InvalidCharacter { ch, .. }) => ch,
            other => panic!("expected InvalidCharacter for {name:?}, got {other:?}"),
        }
    }

    #[test]
    fn valid_names() {
        assert!(validate_name("docs").is_ok());
        assert!(validate_name("report-2024.txt").is_ok());
        assert!(validate_name("under_score").is_ok());
        assert!(validate_name("v1.0").is_ok());
        assert!(validate_name("ünïcødé").is_ok());
        assert!(validate_name(".hidden").is_ok());
    }

    #[test]
    fn reject_empty_name() {
        assert!(matches!(
            validate_name(""),
            Err(NamespaceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn reject_dot_names() {
        assert!(matches!(
            validate_name(".."),
            Err(NamespaceError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_name("."),
            Err(NamespaceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn reject_each_forbidden_char() {
        for ch in FORBIDDEN_CHARS {
            let name = format!("a{ch}b");
            assert_eq!(offending(&name), *ch, "name {name:?}");
        }
    }

    #[test]
    fn reject_whitespace() {
        assert_eq!(offending("has space"), ' ');
        assert_eq!(offending("has\ttab"), '\t');
        assert_eq!(offending("has\nnewline"), '\n');
        assert_eq!(offending("nbsp\u{00a0}here"), '\u{00a0}');
    }

    #[test]
    fn reports_first_offender_left_to_right() {
        assert_eq!(offending("a+b$c"), '+');
        assert_eq!(offending("a$b+c"), '$');
        assert_eq!(offending("x y/z"), ' ');
        assert_eq!(offending("#{}"), '#');
    }

    #[test]
    fn error_message_cites_the_character() {
        let err = validate_name("bad|name").unwrap_err();
        assert_eq!(err.to_string(), "invalid character '|' in name \"bad|name\"");
    }

    proptest! {
        #[test]
        fn names_from_safe_alphabet_are_valid(name in "[a-zA-Z0-9._-]{1,24}") {
            prop_assume!(name != "." && name != "..");
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn inserted_forbidden_char_is_reported(
            head in "[a-z0-9]{0,8}",
            tail in "[a-z0-9$%+ ]{0,8}",
            idx in 0..FORBIDDEN_CHARS.len(),
        ) {
            let ch = FORBIDDEN_CHARS[idx];
            let name = format!("{head}{ch}{tail}");
            match validate_name(&name) {
                Err(NamespaceError::InvalidCharacter { ch: found, .. }) => prop_assert_eq!(found, ch),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
