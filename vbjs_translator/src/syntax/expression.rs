//! Expression translation by precedence climbing
//!
//! Recursive descent over one logical line, lowest precedence parsed
//! outermost: named argument, logical operators, Not, relational operators,
//! the additive/concatenation/shift family, unary sign, exponentiation,
//! factor. The chain is simpler than the full precedence ladder of the
//! source language; it assumes the input is already sensibly parenthesized,
//! so it does not generate spurious parens of its own.

use crate::config::constants::compile_time::translation::EMPTY_ARGUMENT;
use crate::grammar::{keywords, operators};
use crate::lexical::LogicalLine;
use crate::state::TranslationState;
use crate::syntax::error::{TranslationError, TranslationResult};
use crate::tokens::TokenKind;

/// Next expression from the line. Handles the `name := value` named-argument
/// form, which has no target equivalent: it is broken into a label string
/// and the value, leaving the reordering to the caller of the generated
/// code. This is a documented lossy step.
pub fn expression(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut expr = arg(line, state)?;
    if line.peek()? == ":=" {
        line.consume()?;
        expr = format!("\"{} :=\", {}", expr, logic(line, state)?);
    }
    Ok(expr)
}

/// Logical tier: chains of And/Or/Xor, left-associative
fn arg(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut expr = logic(line, state)?;
    while keywords::is_logical_op(&line.peek()?) {
        let op = operators::substitute(&line.consume()?);
        expr.push_str(&op);
        expr.push_str(&logic(line, state)?);
    }
    Ok(expr)
}

/// Not tier: prefix negation, parenthesizing its operand when the operand
/// contains operator characters
fn logic(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut expr = if line.peek()? != "Not" {
        relation(line, state)?
    } else {
        String::new()
    };
    while line.peek()? == "Not" {
        let op = operators::substitute(&line.consume()?);
        expr.push_str(&op);
        expr.push_str(&add_paren(&logic(line, state)?));
    }
    Ok(expr)
}

/// Relational tier. The string-pattern-match operator has no target
/// equivalent and becomes a 2-argument call form.
fn relation(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut expr = terms(line, state)?;
    while keywords::is_relational_op(&line.peek()?) {
        let op = operators::substitute(&line.consume()?);
        if op == "Like" {
            expr = format!("Like({},{})", expr, terms(line, state)?);
        } else {
            expr.push_str(&op);
            expr.push_str(&terms(line, state)?);
        }
    }
    Ok(expr)
}

/// The additive/concatenation/shift family, one left-associative tier
fn terms(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut expr = unary(line, state)?;
    while keywords::is_arithmetic_op(&line.peek()?) {
        let op = operators::substitute(&line.consume()?);
        expr.push_str(&op);
        expr.push_str(&unary(line, state)?);
    }
    Ok(expr)
}

/// Unary sign run
fn unary(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut signs = String::new();
    loop {
        let next = line.peek()?;
        if next == "+" || next == "-" {
            signs.push_str(&line.consume()?);
        } else {
            break;
        }
    }
    Ok(format!("{}{}", signs, power(line, state)?))
}

/// Exponentiation, right-recursive. The target has no operator for it, so
/// an explicit exp() call is emitted.
fn power(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let mut expr = factor(line, state)?;
    while line.peek()? == "^" {
        line.consume()?;
        expr = format!("exp({}, {})", expr, power(line, state)?);
    }
    Ok(expr)
}

/// Single entity: number, name, string, .member, or (expr)
fn factor(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    let peeked = line.peek()?;
    let mut expr = String::new();

    if line.kind() == TokenKind::Identifier {
        let entity = name(line, state)?;
        expr.push_str(&entity);
        if state.is_array_name(&entity) && line.peek()? == "(" {
            let inner = balanced_parens(line, state)?;
            expr.push_str(&set_brackets(&inner));
        }
    } else if line.kind() == TokenKind::Number || line.kind() == TokenKind::Str {
        expr.push_str(&line.consume()?);
    } else if peeked == "." {
        expr.push_str(&with_prefix(line, state)?);
        expr.push_str(&line.consume()?);
        expr.push_str(&name(line, state)?);
    } else if peeked == "Not" {
        expr.push_str(&logic(line, state)?);
    } else if peeked == "(" {
        expr.push_str(&line.consume()?);
        expr.push_str(&expression(line, state)?);
        expr.push_str(&line.consume()?);
    } else {
        expr.push_str(&line.consume()?);
    }

    Ok(expr)
}

/// Next name from the line, with `.members` expanded against the active
/// With target, subscripts bracketed for known arrays, and trailing member
/// chains collected (e.g. `Range("A3").Cells(1, j)`).
pub fn name(line: &mut LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    if line.peek()? == "." {
        let prefix = with_prefix(line, state)?;
        return Ok(format!("{}{}{}", prefix, line.consume()?, name(line, state)?));
    }
    if line.kind() != TokenKind::Identifier {
        return Ok(String::new());
    }

    let mut result = line.consume()?;
    if line.peek()? == "(" {
        // e.g. Range("A3")
        let mut expressions = expression_list(line, state)?;
        if state.is_array_name(&result) {
            expressions = set_brackets(&expressions);
        }
        result.push_str(&expressions);
    }
    if line.peek()? == "(" {
        // e.g. Range("A1")(cnt)
        result.push_str(&expression_list(line, state)?);
    }
    while line.peek()? == "." {
        result.push_str(&line.consume()?);
        result.push_str(&name(line, state)?);
    }
    Ok(result)
}

/// A comma-separated expression list, called with ( as the peek token.
/// Includes the parens in the result and fills omitted arguments with the
/// placeholder value.
pub fn expression_list(
    line: &mut LogicalLine,
    state: &TranslationState,
) -> TranslationResult<String> {
    let mut expressions = line.consume()?; // "("
    loop {
        let next = line.peek()?;
        if next == ")" || next.is_empty() {
            break;
        }
        if next == "," {
            // empty argument
            expressions.push_str(EMPTY_ARGUMENT);
            expressions.push_str(&line.consume()?);
            expressions.push(' ');
            if line.peek()? == ")" {
                expressions.push_str(EMPTY_ARGUMENT);
            }
            continue;
        }
        expressions.push_str(&expression(line, state)?);
        if line.peek()? == "," {
            expressions.push_str(&line.consume()?);
            expressions.push(' ');
            if line.peek()? == ")" {
                expressions.push_str(EMPTY_ARGUMENT);
            }
        }
    }
    expressions.push_str(&line.consume()?); // terminating ")"
    Ok(expressions)
}

/// A balanced-paren token sequence, called with ( as the peek token. The
/// items are not required to be expressions; operators are translated and
/// known-array subscripts bracketed along the way.
pub fn balanced_parens(
    line: &mut LogicalLine,
    state: &TranslationState,
) -> TranslationResult<String> {
    let mut balanced = line.consume()?; // "("
    loop {
        let next = line.peek()?;
        if next == ")" || next.is_empty() {
            break;
        }
        if next == "(" {
            balanced.push_str(&balanced_parens(line, state)?);
        } else if next == "." {
            balanced.push_str(&with_prefix(line, state)?);
            balanced.push_str(&line.consume()?);
            balanced.push_str(&name(line, state)?);
        } else if line.kind() == TokenKind::Identifier {
            let entity = name(line, state)?;
            balanced.push_str(&entity);
            if state.is_array_name(&entity) && line.peek()? == "(" {
                let inner = balanced_parens(line, state)?;
                balanced.push_str(&set_brackets(&inner));
            }
        } else {
            balanced.push_str(&operators::substitute(&line.consume()?));
        }
    }
    balanced.push_str(&line.consume()?); // terminating ")"
    Ok(balanced)
}

/// Convert a parenthesized subscript list to bracket form, `(i, j)` to
/// `[i][j]`. Subscripts containing nested calls are left alone; splitting
/// on commas inside them would tear the call apart.
pub fn set_brackets(text: &str) -> String {
    let inner = if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        ""
    };
    if inner.contains('(') {
        return format!("[{}]", inner);
    }
    let parts: Vec<&str> = inner.split(',').map(|part| part.trim()).collect();
    format!("[{}]", parts.join("]["))
}

/// Add outer parens if the text appears to need them
fn add_paren(text: &str) -> String {
    if text
        .chars()
        .any(|ch| "-+*/%^<>=!&|".contains(ch))
    {
        format!("({})", text)
    } else {
        text.to_string()
    }
}

/// The innermost active With target; a dotted member with no With open is a
/// structural error.
fn with_prefix(line: &LogicalLine, state: &TranslationState) -> TranslationResult<String> {
    state
        .with_name()
        .map(|name| name.to_string())
        .ok_or(TranslationError::WithStackUnderflow {
            line: line.line_no(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> LogicalLine {
        let mut line = LogicalLine::new();
        line.parse_line(text, 1);
        line
    }

    fn expr(text: &str) -> String {
        let state = TranslationState::new();
        expression(&mut parse(text), &state).unwrap()
    }

    fn expr_with(text: &str, state: &TranslationState) -> String {
        expression(&mut parse(text), state).unwrap()
    }

    #[test]
    fn test_equality_is_strict() {
        assert_eq!(expr("a = b"), "a == b");
    }

    #[test]
    fn test_relational_chain() {
        assert_eq!(expr("a <= b"), "a <= b");
        assert_eq!(expr("a <> b"), "a != b");
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(expr("a And b Or c"), "a && b || c");
    }

    #[test]
    fn test_not_parenthesizes_compound_operand() {
        assert_eq!(expr("Not a = b"), "!(a == b)");
        assert_eq!(expr("Not flag"), "!flag");
    }

    #[test]
    fn test_concatenation_becomes_plus() {
        assert_eq!(expr("first & last"), "first + last");
    }

    #[test]
    fn test_integer_division() {
        assert_eq!(expr("a \\ b"), "a / b");
    }

    #[test]
    fn test_exponent_becomes_call() {
        assert_eq!(expr("a ^ b"), "exp(a, b)");
        // right-recursive
        assert_eq!(expr("a ^ b ^ c"), "exp(a, exp(b, c))");
    }

    #[test]
    fn test_pattern_match_becomes_call() {
        assert_eq!(expr("s Like p"), "Like(s,p)");
    }

    #[test]
    fn test_named_argument_is_lossy_two_part_form() {
        assert_eq!(expr("Title := caption"), "\"Title :=\", caption");
    }

    #[test]
    fn test_unary_sign() {
        assert_eq!(expr("-x + y"), "-x + y");
    }

    #[test]
    fn test_known_array_subscript_bracketed() {
        let mut state = TranslationState::new();
        state.add_global_name("grid");
        assert_eq!(expr_with("grid(1, 2)", &state), "grid[1][2]");
    }

    #[test]
    fn test_unknown_name_keeps_call_parens() {
        assert_eq!(expr("grid(1, 2)"), "grid(1, 2)");
    }

    #[test]
    fn test_member_chain_collected() {
        assert_eq!(expr("Sheet.Cells(1, j).Value"), "Sheet.Cells(1, j).Value");
    }

    #[test]
    fn test_with_member_expanded() {
        let mut state = TranslationState::new();
        state.push_with_name("config");
        assert_eq!(expr_with(".Timeout + 1", &state), "config.Timeout + 1");
    }

    #[test]
    fn test_with_member_without_with_is_error() {
        let state = TranslationState::new();
        let result = expression(&mut parse(".Timeout"), &state);
        assert!(matches!(
            result,
            Err(TranslationError::WithStackUnderflow { line: 1 })
        ));
    }

    #[test]
    fn test_empty_arguments_filled() {
        let state = TranslationState::new();
        let mut line = parse("(, 2)");
        let list = expression_list(&mut line, &state).unwrap();
        assert_eq!(list, "(undefined, 2)");
    }

    #[test]
    fn test_trailing_empty_argument_filled() {
        let state = TranslationState::new();
        let mut line = parse("(1, )");
        let list = expression_list(&mut line, &state).unwrap();
        assert_eq!(list, "(1, undefined)");
    }

    #[test]
    fn test_set_brackets() {
        assert_eq!(set_brackets("(1, 2, 3)"), "[1][2][3]");
        assert_eq!(set_brackets("(5)"), "[5]");
        // nested call subscripts are not torn apart
        assert_eq!(set_brackets("(f(1, 2))"), "[f(1, 2)]");
    }

    #[test]
    fn test_parenthesized_expression() {
        assert_eq!(expr("(a + b) * c"), "(a + b) * c");
    }
}
