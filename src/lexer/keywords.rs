//! Keyword recognition and classification.
//!
//! Keywords are case-sensitive. The scanner matches them as identifiers and
//! reclassifies them through [`is_keyword`].

/// Every reserved word of the language.
pub const KEYWORDS: &[&str] = &[
    "int", "char", "float", "double", "void", "long", "short", "unsigned", "signed", "bool", "if",
    "else", "while", "for", "return", "break", "continue",
];

/// Keywords that may start a declaration as a type name.
pub const TYPE_NAMES: &[&str] = &[
    "int", "char", "float", "double", "void", "long", "short", "unsigned", "signed", "bool",
];

/// Returns true if `name` is a reserved word.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Returns true if `name` is a keyword usable as a type name.
pub fn is_type_name(name: &str) -> bool {
    TYPE_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_are_keywords() {
        for name in TYPE_NAMES {
            assert!(is_keyword(name), "{name} should be a keyword");
        }
    }

    #[test]
    fn control_keywords_are_not_type_names() {
        for name in ["if", "else", "while", "for", "return"] {
            assert!(is_keyword(name));
            assert!(!is_type_name(name));
        }
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert!(!is_keyword("INT"));
        assert!(!is_keyword("Return"));
        assert!(!is_keyword("printf"));
    }
}
