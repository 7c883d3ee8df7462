//! Token kinds for the line-oriented scanner
//!
//! Every token the lexer can produce belongs to this closed set, so the
//! statement dispatcher can be matched exhaustively. Kinds mirror the rule
//! table in `lexical::rules`: a token's kind is decided by the first rule
//! that matches the line remainder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed classification of scanner output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// User or host-application name, e.g. `counter`, `Range`
    Identifier,
    /// Numeric literal, type-suffix characters already stripped
    Number,
    /// Double-quoted string literal
    Str,
    /// `#m/d/y#` literal, rewritten to a quoted string
    DateLiteral,
    /// `&H...` literal, rewritten with a `0x` prefix
    HexLiteral,
    /// Symbol or keyword operator (`+`, `<=`, `And`, `Like`, ...)
    Operator,
    /// Structural keyword (`Then`, `Else`, `To`, `Step`, `As`, ...)
    Keyword,
    /// Compound block terminator (`End If`, `End Sub`, ...)
    BlockEnd,
    /// `Exit` marker; the following token names the construct left
    Exit,
    /// `Type` / `End Type` marker
    TypeMark,
    /// Visibility noise with no translation value; dropped and rescanned
    Discard,
    /// Statement intentionally passed through untranslated
    Punt,
    /// `On Error` marker introducing error-handling translation
    ErrorMark,
    /// Any single character not matched earlier
    Chr,
    /// Exhausted logical line
    EndOfLine,
    /// The end-of-input sentinel line
    EndOfInput,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::DateLiteral => "date",
            TokenKind::HexLiteral => "hex",
            TokenKind::Operator => "operator",
            TokenKind::Keyword => "keyword",
            TokenKind::BlockEnd => "block-end",
            TokenKind::Exit => "exit",
            TokenKind::TypeMark => "type",
            TokenKind::Discard => "discard",
            TokenKind::Punt => "punt",
            TokenKind::ErrorMark => "on-error",
            TokenKind::Chr => "char",
            TokenKind::EndOfLine => "end-of-line",
            TokenKind::EndOfInput => "end-of-input",
        }
    }

    /// Kinds that can begin a call argument in the space-separated call form
    /// (`DoThing arg1, arg2`)
    pub fn is_value_shaped(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Number | TokenKind::Str
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scanned token: matched text plus its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_shaped_kinds() {
        assert!(TokenKind::Identifier.is_value_shaped());
        assert!(TokenKind::Number.is_value_shaped());
        assert!(TokenKind::Str.is_value_shaped());
        assert!(!TokenKind::Keyword.is_value_shaped());
        assert!(!TokenKind::EndOfLine.is_value_shaped());
    }

    #[test]
    fn test_token_display() {
        let token = Token::new("Dim", TokenKind::Identifier);
        assert_eq!(token.to_string(), "Dim");
        assert!(!token.is_empty());
    }
}
