//! Per-conversion translation state
//!
//! One instance lives for exactly one conversion and is passed by reference
//! through the expression parser and statement translator. Nothing here is
//! process-global, so conversions can run side by side in one process.

use std::collections::HashSet;

/// Mutable context threaded through a single conversion
#[derive(Debug, Default)]
pub struct TranslationState {
    /// Stack of active With targets, innermost last
    with_names: Vec<String>,

    /// Names of module-level arrays
    global_names: HashSet<String>,

    /// Names of routine-local arrays; cleared when Sub/Function nesting
    /// returns to zero (locals do not persist across calls)
    local_names: HashSet<String>,

    /// User-defined type names. Variables of these types are instantiated
    /// (`new TypeName()`) rather than erased to a comment, because the type
    /// carries prototype fields.
    type_names: HashSet<String>,

    /// Sub/Function nesting counter
    sub_nesting: u32,

    /// Output indent depth; must return to 0 by end of conversion
    depth: i32,

    /// Name of the function currently being translated, for rewriting the
    /// return-by-self-assignment idiom
    function_name: String,
}

impl TranslationState {
    pub fn new() -> Self {
        Self::default()
    }

    // === ARRAY NAMES ===

    pub fn add_global_name(&mut self, name: &str) {
        self.global_names.insert(name.to_string());
    }

    pub fn add_local_name(&mut self, name: &str) {
        self.local_names.insert(name.to_string());
    }

    pub fn is_array_name(&self, name: &str) -> bool {
        self.local_names.contains(name) || self.global_names.contains(name)
    }

    pub fn clear_local_names(&mut self) {
        self.local_names.clear();
    }

    // === WITH TARGETS ===

    /// Push a With target onto the stack
    pub fn push_with_name(&mut self, name: &str) {
        self.with_names.push(name.to_string());
    }

    /// The innermost active With target, if any
    pub fn with_name(&self) -> Option<&str> {
        self.with_names.last().map(|name| name.as_str())
    }

    /// Pop the innermost With target. Popping with no With active is a
    /// structural error surfaced by the caller.
    pub fn pop_with_name(&mut self) -> Option<String> {
        self.with_names.pop()
    }

    // === USER TYPE NAMES (monotonic, never cleared) ===

    pub fn add_type_name(&mut self, name: &str) {
        self.type_names.insert(name.to_string());
    }

    pub fn is_type_name(&self, name: &str) -> bool {
        self.type_names.contains(name)
    }

    // === SUB/FUNCTION NESTING ===

    pub fn enter_sub(&mut self) {
        self.sub_nesting += 1;
    }

    pub fn leave_sub(&mut self) {
        self.sub_nesting = self.sub_nesting.saturating_sub(1);
        if self.sub_nesting == 0 {
            self.clear_local_names();
        }
    }

    pub fn sub_nesting(&self) -> u32 {
        self.sub_nesting
    }

    // === INDENT DEPTH ===

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn undent(&mut self) {
        self.depth -= 1;
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    // === ENCLOSING FUNCTION ===

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn set_function_name(&mut self, name: &str) {
        self.function_name = name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_name_membership() {
        let mut state = TranslationState::new();
        state.add_global_name("grid");
        state.add_local_name("row");

        assert!(state.is_array_name("grid"));
        assert!(state.is_array_name("row"));
        assert!(!state.is_array_name("col"));
    }

    #[test]
    fn test_locals_cleared_at_zero_nesting() {
        let mut state = TranslationState::new();
        state.enter_sub();
        state.add_local_name("row");
        state.enter_sub();
        state.add_local_name("inner");

        state.leave_sub();
        // still nested, locals survive
        assert!(state.is_array_name("row"));

        state.leave_sub();
        assert!(!state.is_array_name("row"));
        assert!(!state.is_array_name("inner"));
    }

    #[test]
    fn test_globals_survive_sub_exit() {
        let mut state = TranslationState::new();
        state.add_global_name("grid");
        state.enter_sub();
        state.leave_sub();
        assert!(state.is_array_name("grid"));
    }

    #[test]
    fn test_with_stack_order() {
        let mut state = TranslationState::new();
        assert_eq!(state.with_name(), None);

        state.push_with_name("outer");
        state.push_with_name("inner");
        assert_eq!(state.with_name(), Some("inner"));

        assert_eq!(state.pop_with_name().as_deref(), Some("inner"));
        assert_eq!(state.with_name(), Some("outer"));

        state.pop_with_name();
        assert_eq!(state.pop_with_name(), None);
    }

    #[test]
    fn test_type_names_monotonic() {
        let mut state = TranslationState::new();
        state.add_type_name("Employee");
        state.enter_sub();
        state.leave_sub();
        assert!(state.is_type_name("Employee"));
        assert!(!state.is_type_name("Missing"));
    }

    #[test]
    fn test_depth_tracking() {
        let mut state = TranslationState::new();
        state.indent();
        state.indent();
        state.undent();
        assert_eq!(state.depth(), 1);
        state.undent();
        assert_eq!(state.depth(), 0);
    }
}
