//! Line preprocessing
//!
//! Turns raw source lines into the logical-line stream the translator
//! consumes: trims, merges continuation lines, expands one-line `If` forms
//! into their multi-line equivalent, and appends the end-of-input sentinel.
//! After this pass the statement translator only ever sees multi-line
//! conditionals.

use crate::config::constants::compile_time::lexical::MAX_LINE_LENGTH;
use crate::config::constants::compile_time::translation::EOF_SENTINEL;
use crate::lexical::LogicalLine;
use crate::log_success;
use crate::logging::codes;
use regex::Regex;
use std::sync::OnceLock;

/// Preprocessing errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PreprocessError {
    #[error("Line {line} too long after continuation merging: {length} characters (max {MAX_LINE_LENGTH})")]
    LineTooLong { line: usize, length: usize },
}

impl PreprocessError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PreprocessError::LineTooLong { .. } => codes::lexical::LINE_TOO_LONG,
        }
    }
}

static CONTINUATION: OnceLock<Regex> = OnceLock::new();
static ONE_LINE_IF_THEN_ELSE: OnceLock<Regex> = OnceLock::new();
static ONE_LINE_IF_THEN: OnceLock<Regex> = OnceLock::new();
static THEN_TAIL: OnceLock<Regex> = OnceLock::new();
static UP_TO_THEN: OnceLock<Regex> = OnceLock::new();
static ELSE_TAIL: OnceLock<Regex> = OnceLock::new();
static UP_TO_ELSE: OnceLock<Regex> = OnceLock::new();

fn continuation() -> &'static Regex {
    CONTINUATION.get_or_init(|| Regex::new(r"(.*)_$").expect("invalid continuation pattern"))
}

fn one_line_if_then_else() -> &'static Regex {
    ONE_LINE_IF_THEN_ELSE
        .get_or_init(|| Regex::new(r"(?i)^If\b.*Then .+ Else .*").expect("invalid If pattern"))
}

fn one_line_if_then() -> &'static Regex {
    ONE_LINE_IF_THEN.get_or_init(|| Regex::new(r"(?i)^If\b.*Then .+").expect("invalid If pattern"))
}

fn then_tail() -> &'static Regex {
    THEN_TAIL.get_or_init(|| Regex::new(r"(?i)Then .*").expect("invalid Then pattern"))
}

fn up_to_then() -> &'static Regex {
    UP_TO_THEN.get_or_init(|| Regex::new(r"(?i).*Then ").expect("invalid Then pattern"))
}

fn else_tail() -> &'static Regex {
    ELSE_TAIL.get_or_init(|| Regex::new(r"(?i)Else .*").expect("invalid Else pattern"))
}

fn up_to_else() -> &'static Regex {
    UP_TO_ELSE.get_or_init(|| Regex::new(r"(?i).*Else ").expect("invalid Else pattern"))
}

/// Test whether a line is a one-line `If ... Then ... [Else ...]`. The
/// Then-Else form is visible on the raw text; the Then-only form is checked
/// on the parsed statement so string literals and comments cannot trigger a
/// rewrite.
pub fn is_one_line_if(line: &str) -> bool {
    if one_line_if_then_else().is_match(line) {
        return true;
    }
    let mut parsed = LogicalLine::new();
    parsed.parse_line(line, 0);
    one_line_if_then().is_match(parsed.remaining())
}

/// Prepare raw input lines for translation
pub fn cleanup(raw: &[String]) -> Result<Vec<String>, PreprocessError> {
    let mut lines: Vec<String> = raw.iter().map(|line| line.trim().to_string()).collect();

    // Merge continuation lines (ending with _) into one long one
    for i in (0..lines.len()).rev() {
        if i + 1 >= lines.len() {
            continue;
        }
        if let Some(captures) = continuation().captures(&lines[i]) {
            let merged = format!("{}{}", &captures[1], lines[i + 1]);
            lines[i] = merged;
            lines.remove(i + 1);
        }
    }

    for (i, line) in lines.iter().enumerate() {
        if line.len() > MAX_LINE_LENGTH {
            return Err(PreprocessError::LineTooLong {
                line: i + 1,
                length: line.len(),
            });
        }
    }

    // Convert 1-line If's into multi-line
    for i in (0..lines.len()).rev() {
        if is_one_line_if(&lines[i]) {
            rewrite_one_line_if(&mut lines, i);
        }
    }

    lines.push(EOF_SENTINEL.to_string());

    log_success!(codes::success::PREPROCESS_COMPLETE, "Line preprocessing completed",
        "input_lines" => raw.len(),
        "logical_lines" => lines.len()
    );

    Ok(lines)
}

/// Expand `If a Then b [Else c]` in place into the multi-line form the
/// statement translator handles (`If a Then` / `b` / [`Else` / `c`] /
/// `End If`).
fn rewrite_one_line_if(lines: &mut Vec<String>, index: usize) {
    let original = lines[index].clone();

    lines[index] = then_tail().replace(&original, "Then").into_owned();

    let then_part = up_to_then().replace(&original, "").into_owned();
    let then_part = else_tail().replace(&then_part, "").trim().to_string();

    let mut at = index + 1;
    lines.insert(at, then_part);

    if up_to_else().is_match(&original) && else_tail().is_match(&original) {
        let else_part = up_to_else().replace(&original, "").trim().to_string();
        at += 1;
        lines.insert(at, "Else".to_string());
        at += 1;
        lines.insert(at, else_part);
    }

    lines.insert(at + 1, "End If".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_sentinel_appended() {
        let lines = cleanup(&strings(&["x = 1"])).unwrap();
        assert_eq!(lines, vec!["x = 1", EOF_SENTINEL]);
    }

    #[test]
    fn test_continuation_merged() {
        let lines = cleanup(&strings(&["total = a + _", "b + _", "c", "done = True"])).unwrap();
        assert_eq!(lines[0], "total = a + b + c");
        assert_eq!(lines[1], "done = True");
    }

    #[test]
    fn test_one_line_if_then_expanded() {
        let lines = cleanup(&strings(&["If a Then b = 1"])).unwrap();
        assert_eq!(lines, vec!["If a Then", "b = 1", "End If", EOF_SENTINEL]);
    }

    #[test]
    fn test_one_line_if_then_else_expanded() {
        let lines = cleanup(&strings(&["If a Then b = 1 Else b = 2"])).unwrap();
        assert_eq!(
            lines,
            vec!["If a Then", "b = 1", "Else", "b = 2", "End If", EOF_SENTINEL]
        );
    }

    #[test]
    fn test_multi_line_if_untouched() {
        let input = strings(&["If a Then", "b = 1", "End If"]);
        let lines = cleanup(&input).unwrap();
        assert_eq!(lines[..3], input[..]);
    }

    #[test]
    fn test_then_inside_string_not_expanded() {
        let input = strings(&[r#"x = "If a Then b""#]);
        let lines = cleanup(&input).unwrap();
        assert_eq!(lines[0], input[0]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_then_inside_comment_not_expanded() {
        let input = strings(&["x = 1 ' set x Then move on"]);
        let lines = cleanup(&input).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_trailing_continuation_without_next_line() {
        let lines = cleanup(&strings(&["x = a + _"])).unwrap();
        assert_eq!(lines[0], "x = a + _");
    }
}
