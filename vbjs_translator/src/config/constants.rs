pub mod compile_time {
    pub mod file_processing {
        /// Maximum file size allowed for processing (4MB)
        /// SECURITY: Prevents resource exhaustion via oversized macro files
        pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

        /// Maximum number of source lines per conversion
        /// SECURITY: Bounds preprocessing work on pathological inputs
        pub const MAX_SOURCE_LINES: usize = 100_000;
    }

    pub mod lexical {
        /// Maximum peek() calls per logical line before the scan is declared
        /// runaway. Malformed input that no rule consumes would otherwise
        /// spin forever in the recursive descent.
        pub const MAX_PEEK_PER_LINE: u32 = 1000;

        /// Maximum length of a single logical line after continuation
        /// merging
        /// SECURITY: Bounds per-line regex work
        pub const MAX_LINE_LENGTH: usize = 65_536;
    }

    pub mod translation {
        /// Maximum nesting depth of translated block constructs
        /// SECURITY: Prevents stack overflow in the recursive dispatcher
        pub const MAX_BLOCK_DEPTH: i32 = 256;

        /// Indent emitted per nesting level in generated output
        pub const INDENT_UNIT: &str = "  ";

        /// Sentinel line appended after the last source line. Must never
        /// appear as ordinary source text.
        pub const EOF_SENTINEL: &str = "(EOF)";

        /// Placeholder generated for omitted call arguments, e.g. `f(, 2)`
        pub const EMPTY_ARGUMENT: &str = "undefined";

        /// Trailing marker attached to lines passed through untranslated
        pub const UNTOUCHED_MARKER: &str = "; // UNTOUCHED";
    }
}
