//! Logical line scanning
//!
//! One `LogicalLine` holds one statement's worth of input after the
//! preprocessor has merged continuations. Construction isolates the trailing
//! comment and collects string literals; after that the line is scanned
//! token by token through the rule table. The canonical text is immutable
//! while scanning: `peek` classifies at the current read offset without
//! moving it, `consume` moves the offset past the matched text.

use crate::config::constants::compile_time::lexical::MAX_PEEK_PER_LINE;
use crate::config::constants::compile_time::translation::EOF_SENTINEL;
use crate::config::runtime::LexicalPreferences;
use crate::grammar::{keywords, operators};
use crate::lexical::rules::match_rule;
use crate::log_debug;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind};
use regex::Regex;
use std::sync::OnceLock;

/// Lexical scanning errors, fatal for the whole conversion
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Unknown token at line {line}, can't parse: {remainder}")]
    UnknownToken { line: usize, remainder: String },

    #[error("Looping because of illegal input at line {line}: {text}")]
    RunawayLookahead { line: usize, text: String },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::UnknownToken { .. } => codes::lexical::UNKNOWN_TOKEN,
            LexerError::RunawayLookahead { .. } => codes::lexical::RUNAWAY_LOOKAHEAD,
        }
    }
}

static CANON_RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

/// Visibility/binding rewrites applied once per line before scanning. The
/// property accessors are folded into functions with mangled names because a
/// Get/Let/Set triple shares one name in the source.
fn canon_rules() -> &'static [(Regex, &'static str)] {
    CANON_RULES.get_or_init(|| {
        [
            (r"(Public|Private|Friend) +Sub", "Sub"),
            (r"(Public|Private|Friend) +Function", "Function"),
            (r"(Public|Private|Friend) +Dim", "Dim"),
            (r"(Public|Private|Friend) +Global", "Global"),
            (r"(Public|Private|Friend|Global) +Const", "Const"),
            (r"(Public|Private|Friend) +Declare", "Declare"),
            (r"(Public|Private|Static)", "Dim"),
        ]
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("invalid canonicalization pattern"),
                *replacement,
            )
        })
        .collect()
    })
}

fn canonicalize(text: &str) -> String {
    let mut text = text
        .replace("Property Get ", "Function Get")
        .replace("Property Let ", "Function Let")
        .replace("Property Set ", "Function Set")
        .replace("End Property", "End Function");
    for (pattern, replacement) in canon_rules() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

/// One logical line of source, scanned in place
#[derive(Debug)]
pub struct LogicalLine {
    /// Untouched input text
    original: String,
    /// Canonicalized statement text (comment stripped, strings collected)
    canonical: String,
    /// Read offset into `canonical`; everything before it is consumed
    offset: usize,
    /// Trailing comment, without the leading quote
    comment: String,
    /// The most recently classified token
    token: Token,
    /// peek() calls since parse_line; capped to fail fast on input that
    /// would otherwise loop forever
    peek_count: u32,
    /// 1-based source line number, for error reporting
    line_no: usize,
    preferences: LexicalPreferences,
}

impl Default for LogicalLine {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicalLine {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            original: String::new(),
            canonical: String::new(),
            offset: 0,
            comment: String::new(),
            token: Token::new("", TokenKind::EndOfLine),
            peek_count: 0,
            line_no: 0,
            preferences,
        }
    }

    /// Parse raw line text: isolate a trailing comment while coping with
    /// quotes inside strings and strings inside comments, collect string
    /// literals (handling doubled quotes and backslash escapes), rewrite
    /// bracketed references, then canonicalize the statement text.
    pub fn parse_line(&mut self, line: &str, line_no: usize) -> &mut Self {
        self.original = line.to_string();
        self.offset = 0;
        self.comment.clear();
        self.token = Token::new("", TokenKind::EndOfLine);
        self.peek_count = 0;
        self.line_no = line_no;

        let mut statement = String::new();
        let mut rest: &str = line;

        while let Some(first) = rest.chars().next() {
            if first == '\'' {
                self.comment = rest[1..].to_string();
                break;
            } else if first == '"' {
                rest = collect_string(rest, &mut statement);
            } else if first == '[' {
                rest = collect_bracketed(rest, &mut statement);
            } else {
                statement.push(first);
                rest = &rest[first.len_utf8()..];
            }
        }

        self.canonical = canonicalize(statement.trim());
        self
    }

    /// Source line number this logical line came from
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// The trimmed original input
    pub fn original(&self) -> &str {
        self.original.trim()
    }

    /// Whatever remains of the canonical statement text
    pub fn remaining(&self) -> &str {
        self.canonical[self.offset..].trim()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }

    /// Text of the most recently classified token
    pub fn current_token(&self) -> &str {
        &self.token.text
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Kind of the most recently classified token. Meaningful only after a
    /// peek() or consume() on this line.
    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }

    fn is_sentinel(&self) -> bool {
        self.original.trim() == EOF_SENTINEL
    }

    /// Return the next token without consuming it
    pub fn peek(&mut self) -> Result<String, LexerError> {
        if self.is_sentinel() {
            self.token = Token::new(EOF_SENTINEL, TokenKind::EndOfInput);
            return Ok(self.token.text.clone());
        }

        self.peek_count += 1;
        if self.peek_count > MAX_PEEK_PER_LINE {
            return Err(LexerError::RunawayLookahead {
                line: self.line_no,
                text: self.original().to_string(),
            });
        }

        let (token, _) = self.scan()?;
        self.token = token;
        Ok(self.token.text.clone())
    }

    /// Return the next token and consume it
    pub fn consume(&mut self) -> Result<String, LexerError> {
        if self.is_sentinel() {
            self.token = Token::new(EOF_SENTINEL, TokenKind::EndOfInput);
            return Ok(self.token.text.clone());
        }

        let (token, next_offset) = self.scan()?;
        self.offset = next_offset;
        self.token = token;

        if self.preferences.log_token_details {
            log_debug!("Token consumed",
                "text" => self.token.text,
                "kind" => self.token.kind,
                "line" => self.line_no
            );
        }

        Ok(self.token.text.clone())
    }

    /// Step over an expected token
    pub fn eat(&mut self, expected: &str) -> Result<(), LexerError> {
        let token = self.consume()?;
        if token != expected {
            log_debug!("eat() stepped over unexpected token",
                "expected" => expected,
                "found" => token,
                "line" => self.line_no
            );
        }
        Ok(())
    }

    /// Whatever remains of the line, as translated operator text
    pub fn rest(&mut self) -> Result<String, LexerError> {
        let mut rest = String::new();
        loop {
            let next = self.peek()?;
            if next.is_empty() || next == EOF_SENTINEL {
                break;
            }
            rest.push_str(&operators::substitute(&self.consume()?));
        }
        Ok(rest)
    }

    /// Classify at the current offset. Discard-classified matches are
    /// dropped and scanning restarts after them; the returned offset is
    /// where consumption would leave the cursor.
    fn scan(&self) -> Result<(Token, usize), LexerError> {
        let mut offset = self.offset;

        loop {
            // skip leading whitespace without consuming tokens
            let remainder = &self.canonical[offset..];
            let trimmed = remainder.trim_start();
            offset += remainder.len() - trimmed.len();
            let remainder = &self.canonical[offset..];

            let Some((text, kind)) = match_rule(remainder) else {
                if remainder.is_empty() {
                    return Ok((Token::new("", TokenKind::EndOfLine), offset));
                }
                // Structurally possible, but unreachable behind the
                // catch-all single-character rule.
                return Err(LexerError::UnknownToken {
                    line: self.line_no,
                    remainder: remainder.to_string(),
                });
            };

            if kind == TokenKind::Discard {
                offset += text.len();
                continue;
            }

            let mut length = text.len();
            let mut token = text.to_string();

            match kind {
                // The string rule is a fast heuristic; redo the walk exactly,
                // skipping escaped quotes.
                TokenKind::Str => {
                    token = exact_string(remainder);
                    length = token.len();
                }
                // #m/d/y# becomes a quoted string literal
                TokenKind::DateLiteral => {
                    token = format!("\"{}\"", &text[1..text.len() - 1]);
                }
                TokenKind::HexLiteral => {
                    token = token.replacen("&H", "0x", 1);
                }
                // drop the trailing type indicator
                TokenKind::Number => {
                    while token.ends_with('&') || token.ends_with('#') {
                        token.pop();
                    }
                }
                _ => {}
            }

            // ! is a component separator in the source language
            if token == "!" {
                token = ".".to_string();
            }

            let token = Token::new(keywords::canonicalize_keyword(&token), kind);
            return Ok((token, offset + length));
        }
    }
}

/// Collect a quoted string from the start of `rest` into `statement`,
/// converting doubled quotes to escaped form. Returns the residue. An
/// unterminated string is closed at end of line.
fn collect_string<'a>(rest: &'a str, statement: &mut String) -> &'a str {
    statement.push('"');
    let mut chars = rest[1..].char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => {
                statement.push('\\');
                statement.push('\\');
            }
            '"' => {
                if let Some((_, '"')) = chars.peek() {
                    chars.next();
                    statement.push_str("\\\"");
                } else {
                    statement.push('"');
                    return &rest[1 + i + 1..];
                }
            }
            other => statement.push(other),
        }
    }

    statement.push('"');
    ""
}

/// Collect a `[bracketed]` reference into a Range("...") call, with the
/// component separator rewritten. Returns the residue.
fn collect_bracketed<'a>(rest: &'a str, statement: &mut String) -> &'a str {
    let mut inside = String::new();

    for (i, ch) in rest[1..].char_indices() {
        match ch {
            ']' => {
                statement.push_str(&format!("Range(\"{}\")", inside));
                return &rest[1 + i + 1..];
            }
            '!' => inside.push('.'),
            other => inside.push(other),
        }
    }

    statement.push_str(&format!("Range(\"{}\")", inside));
    ""
}

/// The exact walk behind the string heuristic: the remainder starts with a
/// quote; find the matching close, skipping backslash escapes.
fn exact_string(remainder: &str) -> String {
    let chars: Vec<char> = remainder.chars().collect();
    let mut i = 1;
    while i < chars.len() {
        if chars[i] == '"' {
            break;
        }
        if chars[i] == '\\' {
            i += 1;
        }
        i += 1;
    }
    let end = (i + 1).min(chars.len());
    chars[..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn line(text: &str) -> LogicalLine {
        let mut logical = LogicalLine::new();
        logical.parse_line(text, 1);
        logical
    }

    #[test]
    fn test_comment_isolated() {
        let parsed = line("x = 1 ' tally");
        assert!(parsed.has_comment());
        assert_eq!(parsed.comment().trim(), "tally");
        assert_eq!(parsed.remaining(), "x = 1");
    }

    #[test]
    fn test_quote_inside_string_not_a_comment() {
        let parsed = line(r#"msg = "it's fine" ' real comment"#);
        assert_eq!(parsed.comment().trim(), "real comment");
        assert!(parsed.remaining().contains("it's fine"));
    }

    #[test]
    fn test_doubled_quotes_escaped() {
        let mut parsed = line(r#"msg = "say ""hi""""#);
        parsed.consume().unwrap(); // msg
        parsed.consume().unwrap(); // =
        let token = parsed.consume().unwrap();
        assert_eq!(token, "\"say \\\"hi\\\"\"");
        assert_eq!(parsed.kind(), TokenKind::Str);
    }

    #[test]
    fn test_bracketed_reference_rewritten() {
        let parsed = line("[Sheet1!A1] = 5");
        assert!(parsed.remaining().starts_with("Range(\"Sheet1.A1\")"));
    }

    #[test]
    fn test_visibility_canonicalized() {
        assert_eq!(line("Private Sub Foo()").remaining(), "Sub Foo()");
        assert_eq!(line("Public Const N = 3").remaining(), "Const N = 3");
        assert_eq!(line("Property Get Value").remaining(), "Function GetValue");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut parsed = line("Dim x");
        assert_eq!(parsed.peek().unwrap(), "Dim");
        assert_eq!(parsed.peek().unwrap(), "Dim");
        assert_eq!(parsed.consume().unwrap(), "Dim");
        assert_eq!(parsed.consume().unwrap(), "x");
        assert_eq!(parsed.consume().unwrap(), "");
        assert_eq!(parsed.kind(), TokenKind::EndOfLine);
    }

    #[test]
    fn test_keyword_casing_applied() {
        let mut parsed = line("dim x");
        assert_eq!(parsed.consume().unwrap(), "Dim");
    }

    #[test]
    fn test_date_literal_rewritten() {
        let mut parsed = line("d = #12/31/1999#");
        parsed.consume().unwrap();
        parsed.consume().unwrap();
        assert_eq!(parsed.consume().unwrap(), "\"12/31/1999\"");
        assert_eq!(parsed.kind(), TokenKind::DateLiteral);
    }

    #[test]
    fn test_hex_literal_rewritten() {
        let mut parsed = line("h = &HFF");
        parsed.consume().unwrap();
        parsed.consume().unwrap();
        assert_eq!(parsed.consume().unwrap(), "0xFF");
    }

    #[test]
    fn test_number_suffix_stripped() {
        let mut parsed = line("n = 42&");
        parsed.consume().unwrap();
        parsed.consume().unwrap();
        assert_eq!(parsed.consume().unwrap(), "42");
    }

    #[test]
    fn test_discard_tokens_skipped() {
        let mut parsed = line("Let x = 1");
        assert_eq!(parsed.consume().unwrap(), "x");
    }

    #[test]
    fn test_sentinel_line() {
        let mut parsed = line(EOF_SENTINEL);
        assert_eq!(parsed.peek().unwrap(), EOF_SENTINEL);
        assert_eq!(parsed.kind(), TokenKind::EndOfInput);
    }

    #[test]
    fn test_runaway_lookahead_detected() {
        let mut parsed = line("x = 1");
        let mut result = Ok(String::new());
        for _ in 0..=MAX_PEEK_PER_LINE {
            result = parsed.peek();
            if result.is_err() {
                break;
            }
        }
        assert_matches!(result, Err(LexerError::RunawayLookahead { line: 1, .. }));
    }

    #[test]
    fn test_rest_translates_operators() {
        let mut parsed = line("a & b");
        assert_eq!(parsed.rest().unwrap(), "a + b");
    }
}
