//! Statement translation
//!
//! The top-level dispatcher inspects the next token of the current logical
//! line and routes to one handler per construct; nested bodies recurse back
//! into the dispatcher. Each handler consumes its own leading keywords,
//! emits a header line, iterates the dispatcher until its terminator
//! appears, consumes the terminator, and adjusts the indent depth around
//! the body. Anything the dispatcher cannot classify degrades to a
//! commented pass-through line; a single unsupported statement never aborts
//! the conversion.

use crate::config::constants::compile_time::translation::{
    EOF_SENTINEL, INDENT_UNIT, MAX_BLOCK_DEPTH, UNTOUCHED_MARKER,
};
use crate::config::runtime::TranslationPreferences;
use crate::grammar::operators;
use crate::lexical::LogicalLine;
use crate::log_debug;
use crate::state::TranslationState;
use crate::syntax::error::{TranslationError, TranslationResult};
use crate::syntax::expression;
use crate::tokens::TokenKind;
use regex::Regex;
use std::sync::OnceLock;

static CALL_WITH_ARGS: OnceLock<Regex> = OnceLock::new();
static SIMPLE_TERM: OnceLock<Regex> = OnceLock::new();
static RANGE_BOUNDS: OnceLock<Regex> = OnceLock::new();

fn call_with_args() -> &'static Regex {
    CALL_WITH_ARGS.get_or_init(|| Regex::new(r"\(.*\)$").expect("invalid call pattern"))
}

fn simple_term() -> &'static Regex {
    SIMPLE_TERM.get_or_init(|| Regex::new(r#"^(\w+|"[^"]*")$"#).expect("invalid term pattern"))
}

fn range_bounds() -> &'static Regex {
    RANGE_BOUNDS.get_or_init(|| Regex::new(r"(.*)To(.*)").expect("invalid range pattern"))
}

/// Translate preprocessed logical lines (sentinel included) into generated
/// JavaScript text
pub fn translate_lines(
    lines: Vec<String>,
    prefs: &TranslationPreferences,
) -> TranslationResult<String> {
    Translator::new(lines, prefs.clone()).run()
}

/// One conversion in flight: the logical-line stream, the per-conversion
/// state, and the append-only output buffer
pub struct Translator {
    lines: Vec<String>,
    /// Index of the next line to load
    cursor: usize,
    /// 1-based number of the currently loaded line
    line_index: usize,
    current: LogicalLine,
    state: TranslationState,
    output: Vec<String>,
    prefs: TranslationPreferences,
}

impl Translator {
    pub fn new(lines: Vec<String>, prefs: TranslationPreferences) -> Self {
        Self {
            lines,
            cursor: 0,
            line_index: 0,
            current: LogicalLine::new(),
            state: TranslationState::new(),
            output: Vec::new(),
            prefs,
        }
    }

    /// Run the conversion to completion
    pub fn run(mut self) -> TranslationResult<String> {
        self.advance();
        while self.current.peek()? != EOF_SENTINEL {
            self.translate()?;
        }

        // Consistency check on indent level
        if self.state.depth() != 0 {
            return Err(TranslationError::UnbalancedNesting {
                depth: self.state.depth(),
            });
        }

        if self.output.is_empty() {
            Ok(String::new())
        } else {
            Ok(self.output.join("\n") + "\n")
        }
    }

    /// Advance to the next logical line; past the end the sentinel stays
    /// current
    fn advance(&mut self) {
        if self.cursor < self.lines.len() {
            let text = self.lines[self.cursor].clone();
            self.line_index = self.cursor + 1;
            self.current.parse_line(&text, self.line_index);
            self.cursor += 1;
        }
    }

    /// Generate a single output line at the current indent, with the source
    /// comment (if any) re-attached
    fn gen_line(&mut self, pieces: &[&str]) {
        let js_line: String = pieces.concat();

        let mut comment = String::new();
        if self.prefs.emit_source_comments && self.current.has_comment() {
            comment = format!(" // {}", self.current.comment().trim());
        }
        if js_line.is_empty() {
            comment = comment.trim().to_string();
        }

        let blanks = INDENT_UNIT.repeat(self.state.depth().max(0) as usize);
        self.output.push(format!("{}{}{}", blanks, js_line, comment));
    }

    /// Lines the translator doesn't know how to handle are commented out
    fn mark_untouched(&self, pieces: &[&str]) -> String {
        if self.prefs.mark_untouched_lines {
            format!("// {}{}", pieces.concat(), UNTOUCHED_MARKER)
        } else {
            format!("// {};", pieces.concat())
        }
    }

    /// Put parens around a string unless it is a bare word or string literal
    fn parenthesize(text: &str) -> String {
        if simple_term().is_match(text) {
            text.to_string()
        } else {
            format!("({})", text)
        }
    }

    /// Register a declared array name, local or global per current nesting
    fn set_array_name(&mut self, name: &str) {
        if self.state.sub_nesting() > 0 {
            self.state.add_local_name(name);
        } else {
            self.state.add_global_name(name);
        }
    }

    /// Empty lines might include comments; either way, print them
    fn skip_empty_lines(&mut self) -> TranslationResult<()> {
        while self.current.peek()?.is_empty() {
            self.translate_empty();
        }
        Ok(())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Decide what kind of statement the current line starts with and call
    /// the right translation function
    fn translate(&mut self) -> TranslationResult<()> {
        if self.state.depth() >= MAX_BLOCK_DEPTH {
            return Err(TranslationError::BlockTooDeep {
                line: self.line_index,
            });
        }

        let peeked = self.current.peek()?;
        let kind = self.current.kind();

        if kind == TokenKind::EndOfInput {
            return Err(TranslationError::UnexpectedEndOfInput {
                line: self.line_index,
                text: self.current.original().to_string(),
            });
        }

        if self.prefs.log_statement_details {
            log_debug!("Dispatching statement",
                "token" => peeked,
                "kind" => kind,
                "line" => self.line_index
            );
        }

        if peeked.is_empty() {
            self.translate_empty();
            Ok(())
        } else if peeked.eq_ignore_ascii_case("Dim")
            || peeked.eq_ignore_ascii_case("ReDim")
            || peeked == "Global"
            || peeked == "Const"
        {
            self.translate_dim()
        } else if peeked.eq_ignore_ascii_case("If") {
            self.translate_if()
        } else if peeked.eq_ignore_ascii_case("For") {
            self.translate_for()
        } else if peeked.eq_ignore_ascii_case("Do") {
            self.translate_do()
        } else if peeked.eq_ignore_ascii_case("While") {
            self.translate_while()
        } else if peeked.eq_ignore_ascii_case("Sub") {
            self.translate_sub()
        } else if peeked.eq_ignore_ascii_case("Function") {
            self.translate_function()
        } else if peeked.eq_ignore_ascii_case("Call") {
            self.translate_call()
        } else if peeked.eq_ignore_ascii_case("Select") {
            self.translate_select()
        } else if peeked.eq_ignore_ascii_case("Exit") {
            self.translate_exit()
        } else if peeked.eq_ignore_ascii_case("With") {
            self.translate_with()
        } else if peeked.eq_ignore_ascii_case("Type") {
            self.translate_type()
        } else if kind == TokenKind::Punt {
            self.translate_punt()
        } else if peeked == "On Error" {
            self.translate_on_error()
        } else if kind == TokenKind::Identifier || peeked == "." {
            self.translate_assignment_or_call()
        } else {
            self.translate_other()
        }
    }

    // ========================================================================
    // Statement handlers
    // ========================================================================

    /// Empty line (perhaps with comment)
    fn translate_empty(&mut self) {
        self.gen_line(&[""]);
        self.advance();
    }

    /// Dim x As type, y(10) As type, z As type = expr.
    /// Arrays become sized Array construction; names are remembered so later
    /// subscripts can switch from () to [].
    fn translate_dim(&mut self) -> TranslationResult<()> {
        let decl_kind = self.current.consume()?; // Dim, ReDim, Global or Const

        loop {
            let mut var = self.current.consume()?;
            if var == "Preserve" {
                var = self.current.consume()?;
            }

            let mut indices: Vec<String> = Vec::new();
            let mut is_user_defined_type = false;

            let mut dim = String::new(); // not an array
            if self.current.peek()? == "(" {
                dim = expression::balanced_parens(&mut self.current, &self.state)?;

                indices = dim
                    .chars()
                    .filter(|ch| *ch != '(' && *ch != ')')
                    .collect::<String>()
                    .split(',')
                    .map(|index| index.to_string())
                    .collect();
                for index in indices.iter_mut() {
                    // Only the upper bound of a `lo To hi` range survives;
                    // the lower limit is not stored.
                    if let Some(bounds) = range_bounds().captures(index) {
                        *index = bounds[2].trim().to_string();
                    }
                }

                if dim.contains("To") {
                    dim = dim.replace("To", " To ");
                    dim = format!("(/* {} */)", dim);
                }
            }

            let mut vtype = String::new();
            if self.current.peek()? == "As" {
                // As [New] type
                self.current.eat("As")?;
                if self.current.peek()? == "New" {
                    vtype.push_str("New ");
                    self.current.eat("New")?;
                }
                vtype.push_str(&expression::name(&mut self.current, &self.state)?);

                // Dim foo As String * 100 (String with length 100)
                if self.current.peek()? == "*" {
                    vtype.push_str(&self.current.consume()?);
                    vtype.push_str(&expression::expression(&mut self.current, &self.state)?);
                }
            }

            let mut expr = String::new();
            if self.current.peek()? == "=" {
                // some kind of initializer
                self.current.eat("=")?;
                if self.current.peek()? == "{" {
                    self.current.eat("{")?;
                    loop {
                        let next = self.current.peek()?;
                        if next == "}" || next == EOF_SENTINEL {
                            break;
                        }
                        expr.push_str(&self.current.consume()?);
                    }
                    self.current.eat("}")?;
                } else {
                    // scalar
                    expr.push_str(&expression::expression(&mut self.current, &self.state)?);
                }
            }

            if !vtype.is_empty() {
                if self.state.is_type_name(&vtype) {
                    is_user_defined_type = true;
                } else {
                    vtype = format!("// {}", vtype);
                }
            }

            if dim.is_empty() {
                // it's not an array
                if !expr.is_empty() {
                    expr = format!(" = {}", expr);
                }
                if is_user_defined_type {
                    self.gen_line(&["var ", &var, &expr, " = new ", &vtype, "();"]);
                } else {
                    self.gen_line(&["var ", &var, &expr, "; ", &vtype]);
                }
            } else if decl_kind.eq_ignore_ascii_case("ReDim") {
                if !self.state.is_array_name(&var) {
                    // uses ReDim to declare the array
                    self.gen_line(&[
                        "var ", &var, " = new Array", &dim, "; ", &vtype, " // ReDim decl",
                    ]);
                    self.set_array_name(&var);
                } else if dim.contains(',') {
                    // flag multi-dim ReDim
                    self.generate_multi_dim_array(&var, &vtype, &indices);
                }
            } else {
                // it is an array
                if expr.is_empty() {
                    if indices.len() > 1 {
                        let vtype_multi = format!("{} // multi-dim", vtype);
                        self.generate_multi_dim_array(&var, &vtype_multi, &indices);
                    } else {
                        self.gen_line(&["var ", &var, " = new Array(", &indices[0], ");"]);
                    }
                } else {
                    self.gen_line(&["var ", &var, " = new Array(", &expr, "); ", &vtype]);
                }
                self.set_array_name(&var);
            }

            if self.current.peek()? != "," {
                break;
            }
            self.current.eat(",")?;
        }

        self.advance();
        Ok(())
    }

    /// Generate and properly initialize a multi-dimensional array: arrays of
    /// arrays, each dimension initialized by a synthesized nested loop.
    /// Source-language variable names cannot start with an underscore, so
    /// the `_a`, `_b`, ... loop variables cannot clash with user names.
    fn generate_multi_dim_array(&mut self, var: &str, vtype: &str, indices: &[String]) {
        // Array declaration for first dimension
        self.gen_line(&["var ", var, " = new Array(", &indices[0], "); ", vtype]);

        let mut idx = b'a';
        let mut subscript = String::new();

        // Nested for-loops initializing the remaining n-1 dimensions
        for i in 1..indices.len() {
            let internal = format!("_{}", idx as char);
            self.gen_line(&[
                "for (var ", &internal, " = 0; ", &internal, " < ", &indices[i - 1], "; ++",
                &internal, ") {",
            ]);
            self.state.indent();
            subscript.push_str(&format!("[{}]", internal));
            idx += 1;
            let target = format!("{}{}", var, subscript);
            self.gen_line(&[&target, " = new Array(", &indices[i], ");"]);
        }

        // Back out of the nested for loops
        for _ in 1..indices.len() {
            self.state.undent();
            self.gen_line(&["}"]);
        }
    }

    /// If ... Then / stat / [ElseIf ... / stat] [Else / stat] End If.
    /// Each ElseIf closes and reopens a block at the same depth.
    fn translate_if(&mut self) -> TranslationResult<()> {
        self.current.eat("If")?;
        let mut condition = expression::expression(&mut self.current, &self.state)?;
        self.current.eat("Then")?;
        self.gen_line(&["if (", &condition, ") {"]);
        self.state.indent();
        self.advance();

        loop {
            let next = self.current.peek()?;
            if next == "End If" || next == "Else" || next == "ElseIf" {
                break;
            }
            self.translate()?;
        }

        while self.current.peek()? == "ElseIf" {
            self.current.eat("ElseIf")?;
            self.state.undent();
            condition = expression::expression(&mut self.current, &self.state)?;
            self.current.eat("Then")?;
            self.gen_line(&["} else if (", &condition, ") {"]);
            self.state.indent();
            self.advance();

            loop {
                let next = self.current.peek()?;
                if next == "End If" || next == "Else" || next == "ElseIf" {
                    break;
                }
                self.translate()?;
            }
        }

        if self.current.peek()? == "Else" {
            self.current.eat("Else")?;
            self.state.undent();
            self.gen_line(&["} else {"]);
            self.advance();
            self.state.indent();
            while self.current.peek()? != "End If" {
                self.translate()?;
            }
        }

        self.current.eat("End If")?;
        self.state.undent();
        self.gen_line(&["}"]);
        self.advance();
        Ok(())
    }

    /// For i = startExpr To stopExpr [Step stepExpr] =>
    /// for (var i = start; i <= stop; i += step)
    fn translate_for(&mut self) -> TranslationResult<()> {
        self.current.eat("For")?;

        if self.current.peek()? == "Each" {
            return self.translate_for_each();
        }

        let var = self.current.consume()?;
        self.current.eat("=")?;
        let start_expr = expression::expression(&mut self.current, &self.state)?;
        let updown = self.current.consume()?;

        let (mut rel, mut incr) = if updown == "To" {
            ("<=", "+=")
        } else {
            // Downto
            (">=", "-=")
        };

        let stop_expr = expression::expression(&mut self.current, &self.state)?;

        let step_expr = if self.current.peek()? == "Step" {
            self.current.eat("Step")?;
            let step = expression::expression(&mut self.current, &self.state)?;
            if step.starts_with('-') {
                rel = ">=";
                incr = "+=";
            }
            step
        } else {
            "1".to_string()
        };

        // Collapse increments/decrements of 1 to ++/--
        let reincr = if step_expr == "1" && incr == "+=" {
            format!("++{}", var)
        } else if step_expr == "-1" && incr == "-=" {
            format!("++{}", var)
        } else if step_expr == "1" && incr == "-=" {
            format!("--{}", var)
        } else if step_expr == "-1" && incr == "+=" {
            format!("--{}", var)
        } else {
            format!("{} {} {}", var, incr, step_expr)
        };

        // The target hoists all variables to function scope
        self.gen_line(&[
            "for (var ", &var, " = ", &start_expr, "; ", &var, " ", rel, " ", &stop_expr, "; ",
            &reincr, ") {",
        ]);
        self.state.indent();
        self.advance();

        loop {
            let next = self.current.peek()?;
            if next == "Next" || next == EOF_SENTINEL {
                break;
            }
            self.translate()?;
        }

        self.state.undent();
        self.gen_line(&["}"]);
        self.advance();
        Ok(())
    }

    /// For Each var In whatever ... Next
    fn translate_for_each(&mut self) -> TranslationResult<()> {
        self.current.eat("Each")?;
        let var = self.current.consume()?;
        if self.current.peek()? == "As" {
            // skip optional As type
            self.current.eat("As")?;
            expression::name(&mut self.current, &self.state)?;
        }
        self.current.eat("In")?;
        let collection = expression::expression(&mut self.current, &self.state)?;
        self.gen_line(&["for (var ", &var, " in ", &collection, ") {"]);
        self.state.indent();
        self.advance();

        loop {
            let next = self.current.peek()?;
            if next == "Next" || next == EOF_SENTINEL {
                break;
            }
            self.translate()?;
        }

        self.state.undent();
        self.gen_line(&["}"]);
        self.advance();
        Ok(())
    }

    /// Do [While/Until e] ... Loop [While/Until e]. Pre-test conditions
    /// become the loop header; post-test conditions become a guarded break
    /// before the closing brace.
    fn translate_do(&mut self) -> TranslationResult<()> {
        self.current.eat("Do")?;
        if self.current.peek()? == "While" {
            self.current.eat("While")?;
            let condition = expression::expression(&mut self.current, &self.state)?;
            self.gen_line(&["while (", &condition, ") {"]);
        } else if self.current.peek()? == "Until" {
            self.current.eat("Until")?;
            let condition = expression::expression(&mut self.current, &self.state)?;
            self.gen_line(&["while (!(", &condition, ")) {"]);
        } else {
            self.gen_line(&["while (1) {"]);
        }

        self.advance();
        self.state.indent();

        while self.current.peek()? != "Loop" {
            self.translate()?;
        }

        self.current.eat("Loop")?;
        if self.current.peek()? == "While" {
            self.current.eat("While")?;
            let condition = expression::expression(&mut self.current, &self.state)?;
            self.gen_line(&["if (!(", &condition, "))"]);
            self.state.indent();
            self.gen_line(&["break;"]);
            self.state.undent();
        } else if self.current.peek()? == "Until" {
            self.current.eat("Until")?;
            let condition = expression::expression(&mut self.current, &self.state)?;
            self.gen_line(&["if (", &condition, ")"]);
            self.state.indent();
            self.gen_line(&["break;"]);
            self.state.undent();
        }

        self.state.undent();
        self.gen_line(&["}"]);
        self.advance();
        Ok(())
    }

    /// While e ... End While/Wend
    fn translate_while(&mut self) -> TranslationResult<()> {
        self.current.eat("While")?;
        let condition = expression::expression(&mut self.current, &self.state)?;
        self.advance();
        self.gen_line(&["while (", &condition, ") {"]);
        self.state.indent();

        loop {
            let next = self.current.peek()?;
            if next == "End While" || next == "Wend" {
                break;
            }
            self.translate()?;
        }

        self.current.consume()?; // End While or Wend
        self.state.undent();
        self.gen_line(&["}"]);
        self.advance();
        Ok(())
    }

    /// Sub name(arglist) ... End Sub
    fn translate_sub(&mut self) -> TranslationResult<()> {
        self.state.enter_sub();
        self.current.eat("Sub")?;
        let subname = self.current.consume()?;
        let arg_list = self.collect_arg_list()?;
        self.gen_line(&["function ", &subname, "(", &arg_list, ") {"]);
        self.state.indent();
        self.advance();

        loop {
            let next = self.current.peek()?;
            if next == "End Sub" || next == EOF_SENTINEL {
                break;
            }
            self.translate()?;
        }

        self.current.eat("End Sub")?;
        self.state.undent();
        self.gen_line(&["}"]);
        self.state.leave_sub();
        self.advance();
        Ok(())
    }

    /// Function whatever(arglist) As whatever ... End Function.
    /// The source returns values by assigning to the function's own name, so
    /// a named return-value variable is synthesized: initialized empty at
    /// entry, returned at exit, and substituted for self-assignments.
    fn translate_function(&mut self) -> TranslationResult<()> {
        self.state.enter_sub();
        self.current.eat("Function")?;
        let function_name = self.current.consume()?;
        self.state.set_function_name(&function_name);
        let arg_list = self.collect_arg_list()?;
        let return_variable = format!("_{}", function_name);

        // Collect the trailing return type, skipping `As`
        let mut ret = String::new();
        while self.current.has_token() {
            self.current.consume()?;
            if !self.current.current_token().eq_ignore_ascii_case("As") {
                ret.push_str(self.current.current_token());
            } else {
                self.current.eat("As")?;
                ret.push_str(self.current.current_token());
            }
        }
        if !ret.is_empty() {
            ret = format!(" // {}", ret);
        }

        self.gen_line(&["function ", &function_name, "(", &arg_list, ") {", &ret]);
        self.state.indent();
        self.gen_line(&["var ", &return_variable, " = \"\"; // Stores return value"]);
        self.advance();

        while self.current.peek()? != "End Function" {
            self.translate()?;
        }

        self.current.eat("End Function")?;
        self.gen_line(&["return ", &return_variable, ";"]);
        self.state.undent();
        self.state.set_function_name("");
        self.gen_line(&["}"]);
        self.state.leave_sub();
        self.advance();
        Ok(())
    }

    /// Collect the argument list for Sub and Function definitions. ByVal is
    /// deleted; ByRef and Optional are preserved as comments, as are
    /// default-value expressions; As clauses are dropped.
    fn collect_arg_list(&mut self) -> TranslationResult<String> {
        let mut arg_list = String::new();
        if self.current.peek()? != "(" {
            return Ok(arg_list);
        }

        self.current.eat("(")?;

        while self.current.peek()? != ")" {
            let mut marker = "";
            let next = self.current.peek()?;
            if next == "ByRef" {
                marker = "/*ByRef*/";
                self.current.eat("ByRef")?;
            } else if next == "Optional" {
                marker = "/*Optional*/";
                self.current.eat("Optional")?;
            } else if next == "ByVal" {
                self.current.eat("ByVal")?;
            }

            let bare_name = self.current.peek()?;
            let full_name = expression::name(&mut self.current, &self.state)?;
            if bare_name != full_name {
                // the parameter carried () markers: it names an array
                self.set_array_name(&bare_name);
            }

            arg_list.push_str(marker);
            arg_list.push_str(&bare_name);

            if self.current.peek()? == "As" {
                self.current.consume()?; // As
                expression::name(&mut self.current, &self.state)?; // type
            }

            if self.current.peek()? == "=" {
                // presumably only if Optional
                self.current.eat("=")?;
                let default = expression::expression(&mut self.current, &self.state)?;
                arg_list.push_str(&format!(" /*= {}*/", default));
            }

            if self.current.peek()? == "," {
                arg_list.push_str(&self.current.consume()?);
                arg_list.push(' ');
            }
        }
        self.current.eat(")")?;
        Ok(arg_list)
    }

    /// Translate foo, foo(bar) and foo bar. Disambiguation rests on a
    /// single token of lookahead after the leading name; there is no type
    /// information to verify the guess.
    fn translate_assignment_or_call(&mut self) -> TranslationResult<()> {
        let name = expression::name(&mut self.current, &self.state)?;
        let expr: String;

        if self.current.peek()? == ":" {
            // a label?
            let rest = self.current.rest()?.trim().to_string();
            let untouched = self.mark_untouched(&[&name, " ", &rest]);
            self.gen_line(&[&untouched]);
            self.advance();
            return Ok(());
        }

        // For cases like: foo (p1), (p2). These are transformed into
        // foo ((p1), (p2)) and re-parsed.
        if self.current.peek()? == "," && self.current.original().contains(' ') {
            let original = self.current.original().to_string();
            let line_no = self.current.line_no();
            self.current.parse_line(&original, line_no); // start over
            let canonical = self.current.remaining().to_string();

            if let Some(separator) = canonical.find(' ') {
                let mut rebuilt = format!(
                    "{}({})",
                    &canonical[..separator],
                    canonical[separator + 1..].trim()
                );
                if self.current.has_comment() {
                    // restore the comment if there was one
                    rebuilt = format!("{}' {}", rebuilt, self.current.comment());
                }
                self.current.parse_line(&rebuilt, line_no); // parse the modified line
                return self.translate_assignment_or_call();
            }

            let untouched = self.mark_untouched(&[&canonical]);
            self.gen_line(&[&untouched]);
            self.advance();
            return Ok(());
        }

        if self.current.peek()? == "=" {
            // assignment
            self.current.eat("=")?;
            let mut target = name;
            if target == self.state.function_name() {
                target = format!("_{}", target);
            }

            let mut newstr = "";
            let next = self.current.peek()?;
            if next == "New" {
                self.current.eat("New")?;
                newstr = "new ";
            } else if next.starts_with("Array") {
                newstr = "new ";
                self.set_array_name(&target);
            }

            let value = expression::expression(&mut self.current, &self.state)?;
            expr = format!("{} = {}{}", target, newstr, value);
        } else if self.current.kind().is_value_shaped() || self.current.peek()? == "-" {
            // probably foo bar,glop
            let mut params = String::new();
            loop {
                let next = self.current.peek()?;
                if next.is_empty() || self.current.kind() == TokenKind::Keyword || next == ":" {
                    break;
                }
                params.push_str(&expression::expression(&mut self.current, &self.state)?);
                if self.current.peek()? == "," {
                    params.push_str(&self.current.consume()?);
                    params.push(' ');
                }
            }
            expr = format!("{}({})", name, params);
        } else {
            // who knows
            let rest = self.current.rest()?.trim().to_string();
            if rest.is_empty() && !call_with_args().is_match(&name) {
                expr = format!("{}()", name); // guess it's a function call
            } else {
                expr = format!("{} {}", name, rest);
            }
        }
        self.gen_line(&[expr.trim(), ";"]);

        // Handles multiple statements on one line separated by :
        if self.current.peek()? == ":" {
            self.current.eat(":")?;
        } else {
            self.advance();
        }
        Ok(())
    }

    /// An explicit Call statement, either Call foo(this, that) or
    /// Call foo this, that
    fn translate_call(&mut self) -> TranslationResult<()> {
        self.current.eat("Call")?;
        let name = expression::name(&mut self.current, &self.state)?;
        let mut params = String::new();

        if self.current.peek()?.is_empty() {
            // Call foo(...) or Call foo
            if call_with_args().is_match(&name) {
                self.gen_line(&[&name, ";"]);
            } else {
                self.gen_line(&[&name, "();"]);
            }
        } else if self.current.peek()? == "(" {
            while !self.current.peek()?.is_empty() {
                params.push_str(&expression::expression(&mut self.current, &self.state)?);
                if self.current.peek()? == "," {
                    params.push_str(&self.current.consume()?);
                    params.push(' ');
                }
            }
            self.gen_line(&[&name, &params, ";"]);
        } else {
            while !self.current.peek()?.is_empty() {
                params.push_str(&expression::expression(&mut self.current, &self.state)?);
                if self.current.peek()? == "," {
                    params.push_str(&self.current.consume()?);
                    params.push(' ');
                }
            }
            self.gen_line(&[&name, "(", &params, ");"]);
        }

        self.advance();
        Ok(())
    }

    /// Select Case e ... Case ... [Case Else] End Select
    fn translate_select(&mut self) -> TranslationResult<()> {
        self.current.eat("Select")?;
        self.current.eat("Case")?;
        let selector = expression::expression(&mut self.current, &self.state)?;
        self.skip_empty_lines()?;
        let mut clause = 1;

        while self.current.peek()? != "End Select" {
            if self.current.peek()? == "Case" {
                self.translate_case(&selector, clause)?;
                clause += 1;
            }
        }

        self.current.eat("End Select")?;
        self.gen_line(&["}"]);
        self.advance();
        Ok(())
    }

    /// Innards of a single Case: comma-separated alternatives, each a bare
    /// expression, an [Is] relop expression, or a lo To hi range; the
    /// alternatives are OR'd together
    fn translate_case(&mut self, selector: &str, clause: usize) -> TranslationResult<()> {
        self.current.eat("Case")?;
        let else_part = if clause == 1 { "" } else { "} else " };

        if self.current.peek()? == "Else" {
            self.current.eat("Else")?;
            self.gen_line(&["} else {"]);
        } else {
            let mut if_expr = String::new();
            loop {
                let next = self.current.peek()?;
                if next.is_empty() || next == ":" {
                    break;
                }
                if next == "Is" {
                    self.current.eat("Is")?;
                }
                if self.current.kind() == TokenKind::Operator
                    && !(self.current.peek()? == "-" || self.current.peek()? == "+")
                {
                    let rel_op = operators::substitute(&self.current.consume()?);
                    let alternative = expression::expression(&mut self.current, &self.state)?;
                    if_expr.push_str(&format!(
                        "{} {} {}",
                        selector,
                        rel_op.trim(),
                        Self::parenthesize(&alternative)
                    ));
                } else {
                    let alternative = expression::expression(&mut self.current, &self.state)?;
                    if self.current.peek()? == "To" {
                        self.current.eat("To")?;
                        let upper = expression::expression(&mut self.current, &self.state)?;
                        if_expr.push_str(&format!(
                            "{} >= {} && {} <= {}",
                            selector, alternative, selector, upper
                        ));
                    } else {
                        if_expr.push_str(&format!(
                            "{} == {}",
                            selector,
                            Self::parenthesize(&alternative)
                        ));
                    }
                }
                if self.current.peek()? == "," {
                    self.current.eat(",")?;
                    if_expr.push_str(" || ");
                }
            }
            self.gen_line(&[else_part, "if (", &if_expr, ") {"]);
        }

        self.state.indent();
        if self.current.peek()? == ":" {
            // one-liner Case body
            self.current.eat(":")?;
            self.translate()?;
        } else {
            self.advance();
            loop {
                let next = self.current.peek()?;
                if next == "Case" || next == "End Select" {
                    break;
                }
                self.translate()?;
            }
        }
        self.state.undent();
        Ok(())
    }

    /// Exit For/While/Do, Exit Sub, Exit Function
    fn translate_exit(&mut self) -> TranslationResult<()> {
        self.current.eat("Exit")?;
        let token = self.current.consume()?;
        if token == "For" || token == "While" || token == "Do" {
            self.gen_line(&["break;"]);
        } else if token == "Sub" {
            self.gen_line(&["return;"]);
        } else if token == "Function" {
            let return_variable = format!("_{}", self.state.function_name());
            self.gen_line(&["return ", &return_variable, ";"]);
        } else {
            let rest = self.current.rest()?;
            self.gen_line(&[&rest, "; // BUG"]);
        }

        self.advance();
        Ok(())
    }

    /// With name ... End With. The target has no equivalent implicit-scope
    /// construct, so the block emits only a comment marker and every dotted
    /// member access inside is rewritten with the alias prefix.
    fn translate_with(&mut self) -> TranslationResult<()> {
        self.current.eat("With")?;
        let target = expression::name(&mut self.current, &self.state)?;
        self.state.push_with_name(&target);
        self.gen_line(&["// With ", &target]);
        self.advance();

        while self.current.peek()? != "End With" {
            self.translate()?;
        }

        self.current.eat("End With")?;
        if self.state.pop_with_name().is_none() {
            return Err(TranslationError::WithStackUnderflow {
                line: self.line_index,
            });
        }
        self.advance();
        Ok(())
    }

    /// User-defined Type blocks become a constructor function plus one
    /// prototype-field assignment per member. Members whose declared type is
    /// itself a user type are instantiated rather than left as comments.
    fn translate_type(&mut self) -> TranslationResult<()> {
        self.current.eat("Type")?;
        let type_name = self.current.consume()?;

        // Remember the name for later variable declarations of this type
        self.state.add_type_name(&type_name);

        self.advance();

        // class constructor
        self.gen_line(&[&type_name, " = function() {};  // Creates an empty class"]);

        while self.current.peek()? != "End Type" {
            let member = self.current.consume()?;
            let mut is_user_defined_type = false;
            let mut vtype = String::new();
            if self.current.peek()? == "As" {
                self.current.eat("As")?;
                vtype = self.current.peek()?;
            }

            if self.state.is_type_name(&vtype) {
                is_user_defined_type = true;
            } else {
                vtype = format!("// {}", vtype);
            }

            if member.is_empty() {
                // only a comment
                let rest = self.current.rest()?;
                self.gen_line(&[&rest]);
            } else if is_user_defined_type {
                self.gen_line(&[&type_name, ".prototype.", &member, " = new ", &vtype, "();"]);
            } else {
                self.gen_line(&[&type_name, ".prototype.", &member, "; ", &vtype]);
            }
            self.advance();
        }

        self.current.eat("End Type")?;
        self.advance();
        Ok(())
    }

    /// On Error Resume/GoTo. The label form becomes a guarded block: the
    /// statements up to the label are protected, the statements from the
    /// label to the end of the routine become the failure handler. This is
    /// an approximation, not line-based resumption.
    fn translate_on_error(&mut self) -> TranslationResult<()> {
        self.current.eat("On Error")?;
        if self.current.peek()? == "Resume" {
            self.current.eat("Resume")?;
            let rest = self.current.rest()?;
            let untouched = format!("// On Error Resume {}{}", rest, UNTOUCHED_MARKER);
            self.gen_line(&[&untouched]);
            self.advance();
        } else if self.current.peek()? == "GoTo" {
            self.current.eat("GoTo")?;
            let label = self.current.consume()?;
            if label == "0" {
                // special case: restore normal handling
                let untouched = format!("// On Error GoTo 0{}", UNTOUCHED_MARKER);
                self.gen_line(&[&untouched]);
                self.advance();
                return Ok(());
            }

            self.gen_line(&["try {"]);
            self.state.indent();
            self.advance();

            while self.current.peek()? != label {
                self.translate()?;
            }

            self.advance();
            self.state.undent();
            self.gen_line(&["} catch(e) { // ", &label]);
            self.state.indent();

            loop {
                let next = self.current.peek()?;
                if next == "End Sub" || next == "End Function" {
                    break;
                }
                self.translate()?;
            }

            self.state.undent();
            self.gen_line(&["}"]);
        }
        Ok(())
    }

    /// Something sufficiently bad that we know to ignore it,
    /// e.g. Attribute/Option/Declare/file I/O/GoTo/Resume
    fn translate_punt(&mut self) -> TranslationResult<()> {
        let text = self.current.remaining().to_string();
        let untouched = self.mark_untouched(&[&text]);
        self.gen_line(&[&untouched]);
        self.advance();
        Ok(())
    }

    /// Not sure, so just put it out
    fn translate_other(&mut self) -> TranslationResult<()> {
        let rest = self.current.rest()?;
        let untouched = self.mark_untouched(&[&rest]);
        self.gen_line(&[&untouched]);
        self.advance();
        Ok(())
    }
}
