//! Priority-ordered token rule table
//!
//! The unconsumed remainder of a logical line is classified by the first
//! rule whose pattern matches at the start. The order is a
//! correctness-critical total order: word-bounded keyword operators must be
//! tried before the single-character operator fallback, the compound block
//! terminators before the bare identifier rule, and the two-character
//! comparison operators before the one-character class, or tokens would be
//! split apart.

use crate::tokens::TokenKind;
use regex::Regex;
use std::sync::OnceLock;

/// One (pattern, kind) entry of the rule table
pub struct TokenRule {
    pub pattern: Regex,
    pub kind: TokenKind,
}

static RULE_TABLE: OnceLock<Vec<TokenRule>> = OnceLock::new();

fn build_rule(pattern: &str, kind: TokenKind) -> TokenRule {
    TokenRule {
        // The table is static; a malformed pattern is a programming error
        // caught by the rule-table tests.
        pattern: Regex::new(pattern).expect("invalid token rule pattern"),
        kind,
    }
}

/// The rule table, built once per process
pub fn rule_table() -> &'static [TokenRule] {
    RULE_TABLE.get_or_init(|| {
        vec![
            build_rule(
                r"^(?i)\b(Mod|Is|Not|AndAlso|And|OrElse|Or|Xor|Eqv|Like|New)\b",
                TokenKind::Operator,
            ),
            build_rule(
                r"^(?i)\b(End +(If|Sub|Function|While|With|Select))\b",
                TokenKind::BlockEnd,
            ),
            build_rule(r"^(?i)\b(Exit)\b", TokenKind::Exit),
            build_rule(
                r"^(?i)\b(Private|Public|Static|Let|Set)\b",
                TokenKind::Discard,
            ),
            build_rule(r"^(?i)\b(Attribute|Option|Declare)\b", TokenKind::Punt),
            build_rule(r"^(?i)\b(Open .* For |Close #\w+)\b", TokenKind::Punt),
            build_rule(r"^(?i)\b(Print #|Line Input #)\b", TokenKind::Punt),
            build_rule(
                r"^(?i)\b(On Error (Resume Next|GoTo 0)|Resume|GoTo)\b",
                TokenKind::Punt,
            ),
            build_rule(r"^(?i)\b(On Error)\b", TokenKind::ErrorMark),
            build_rule(
                r"^(?i)\b(Then|Else|To|Downto|Step|As|ByVal|ByRef)\b",
                TokenKind::Keyword,
            ),
            build_rule(r"^(?i)\b(Type|End Type)\b", TokenKind::TypeMark),
            build_rule(r"^[a-zA-Z]\w*\$?", TokenKind::Identifier),
            build_rule(r"^#\d+/\d+/\d+#", TokenKind::DateLiteral),
            build_rule(
                r"^((\d+\.?\d*)|(\.\d+))([eE][-+]?\d+)?[&#]?",
                TokenKind::Number,
            ),
            build_rule(r"^&H[a-fA-F0-9]+", TokenKind::HexLiteral),
            build_rule(r"^(<>|<=|>=|:=)", TokenKind::Operator),
            build_rule(r"^[*^/\\+\-&=><]", TokenKind::Operator),
            build_rule(r#"^"[^"]*""#, TokenKind::Str),
            build_rule(r"^.", TokenKind::Chr),
        ]
    })
}

/// Classify the start of a line remainder. Returns the matched text and its
/// kind, or None when no rule fires (only possible on an empty remainder,
/// which callers map to an end-of-line token).
pub fn match_rule(remainder: &str) -> Option<(&str, TokenKind)> {
    for rule in rule_table() {
        if let Some(found) = rule.pattern.find(remainder) {
            return Some((found.as_str(), rule.kind));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_operators_before_identifiers() {
        let (text, kind) = match_rule("And b").unwrap();
        assert_eq!(text, "And");
        assert_eq!(kind, TokenKind::Operator);
    }

    #[test]
    fn test_operator_words_need_word_boundary() {
        // "Android" must lex as an identifier, not the operator "And"
        let (text, kind) = match_rule("Android = 1").unwrap();
        assert_eq!(text, "Android");
        assert_eq!(kind, TokenKind::Identifier);
    }

    #[test]
    fn test_block_terminators_are_single_tokens() {
        let (text, kind) = match_rule("End If").unwrap();
        assert_eq!(text, "End If");
        assert_eq!(kind, TokenKind::BlockEnd);

        let (text, kind) = match_rule("End  Function").unwrap();
        assert_eq!(text, "End  Function");
        assert_eq!(kind, TokenKind::BlockEnd);
    }

    #[test]
    fn test_two_char_operators_not_split() {
        let (text, kind) = match_rule("<= 5").unwrap();
        assert_eq!(text, "<=");
        assert_eq!(kind, TokenKind::Operator);

        let (text, _) = match_rule("<>x").unwrap();
        assert_eq!(text, "<>");

        let (text, _) = match_rule(":= 3").unwrap();
        assert_eq!(text, ":=");
    }

    #[test]
    fn test_literals() {
        let (text, kind) = match_rule("#12/31/1999# + 1").unwrap();
        assert_eq!(text, "#12/31/1999#");
        assert_eq!(kind, TokenKind::DateLiteral);

        let (text, kind) = match_rule("&HFF00 + 1").unwrap();
        assert_eq!(text, "&HFF00");
        assert_eq!(kind, TokenKind::HexLiteral);

        let (text, kind) = match_rule("3.14e-2& * x").unwrap();
        assert_eq!(text, "3.14e-2&");
        assert_eq!(kind, TokenKind::Number);
    }

    #[test]
    fn test_discard_and_punt() {
        assert_eq!(match_rule("Public x").unwrap().1, TokenKind::Discard);
        assert_eq!(match_rule("Attribute VB_Name").unwrap().1, TokenKind::Punt);
        assert_eq!(match_rule("On Error Resume Next").unwrap().1, TokenKind::Punt);
        assert_eq!(match_rule("On Error GoTo handler").unwrap().1, TokenKind::ErrorMark);
    }

    #[test]
    fn test_identifier_with_type_suffix() {
        let (text, kind) = match_rule("name$ = x").unwrap();
        assert_eq!(text, "name$");
        assert_eq!(kind, TokenKind::Identifier);
    }

    #[test]
    fn test_single_char_fallback() {
        let (text, kind) = match_rule("(a)").unwrap();
        assert_eq!(text, "(");
        assert_eq!(kind, TokenKind::Chr);
    }

    #[test]
    fn test_empty_remainder_matches_nothing() {
        assert!(match_rule("").is_none());
    }
}
