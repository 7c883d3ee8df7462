//! Ordered source-to-target operator substitution
//!
//! Maps source-language operator tokens to their JavaScript spelling. The
//! table is ordered and first-match-wins: two-character comparisons appear
//! before their one-character prefixes so `<=` can never be rewritten through
//! the `=` entry, and keyword operators are matched against the whole token so
//! they cannot fire inside identifiers.

/// The substitution table. Entries are (source token, replacement), matched
/// by exact token equality, top to bottom.
static SUBSTITUTIONS: &[(&str, &str)] = &[
    ("<>", " != "),
    ("<=", " <= "),
    (">=", " >= "),
    ("=", " == "),
    ("<", " < "),
    (">", " > "),
    ("&", " + "),
    ("+", " + "),
    ("-", " - "),
    ("*", " * "),
    ("/", " / "),
    ("\\", " / "),
    // Exponentiation is handled by the expression parser; a ^ that survives
    // to substitution is a translation gap worth flagging in the output.
    ("^", " BUG exp(), "),
    ("Xor", " ^ "),
    ("And", " && "),
    ("Or", " || "),
    ("Is", " == "),
    ("IsNot", " != "),
    ("Mod", " % "),
    ("New", "new "),
    ("Not", "!"),
];

/// Replace a source operator token by its JavaScript form. Tokens without a
/// table entry (names, literals, punctuation) pass through unchanged.
pub fn substitute(token: &str) -> String {
    for (source, replacement) in SUBSTITUTIONS {
        if *source == token {
            return (*replacement).to_string();
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_becomes_strict() {
        assert_eq!(substitute("="), " == ");
        assert_eq!(substitute("<>"), " != ");
    }

    #[test]
    fn test_two_char_comparisons_survive() {
        // Order sensitivity: these must not fall through to the "=" entry
        assert_eq!(substitute("<="), " <= ");
        assert_eq!(substitute(">="), " >= ");
    }

    #[test]
    fn test_concat_and_integer_division() {
        assert_eq!(substitute("&"), " + ");
        assert_eq!(substitute("\\"), " / ");
    }

    #[test]
    fn test_keyword_operators_whole_token() {
        assert_eq!(substitute("And"), " && ");
        assert_eq!(substitute("Or"), " || ");
        assert_eq!(substitute("Mod"), " % ");
        assert_eq!(substitute("Not"), "!");
        // A name merely containing an operator word is untouched
        assert_eq!(substitute("Android"), "Android");
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        assert_eq!(substitute("Like"), "Like");
        assert_eq!(substitute("foo"), "foo");
        assert_eq!(substitute(","), ",");
    }
}
