//! Consolidated error codes and classification system
//!
//! Single source of truth for all error and success codes used by the
//! translator, together with their behavioral metadata.

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E006");
    pub const TOO_MANY_LINES: Code = Code::new("E007");
    pub const READ_FAILURE: Code = Code::new("E008");
}

/// Lexical error codes
pub mod lexical {
    use super::Code;

    pub const UNKNOWN_TOKEN: Code = Code::new("E020");
    pub const RUNAWAY_LOOKAHEAD: Code = Code::new("E021");
    pub const LINE_TOO_LONG: Code = Code::new("E022");
}

/// Translation error codes
pub mod translation {
    use super::Code;

    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E040");
    pub const UNBALANCED_NESTING: Code = Code::new("E041");
    pub const WITH_STACK_UNDERFLOW: Code = Code::new("E042");
    pub const BLOCK_TOO_DEEP: Code = Code::new("E043");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("S001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("S005");
    pub const PREPROCESS_COMPLETE: Code = Code::new("S010");
    pub const TRANSLATION_COMPLETE: Code = Code::new("S020");
}

// ============================================================================
// CODE METADATA
// ============================================================================

/// Get the severity for an error code
pub fn get_severity(code: &str) -> Severity {
    match code {
        "ERR001" | "ERR002" => Severity::Critical,
        "E005" | "E006" | "E007" | "E008" => Severity::High,
        "E020" | "E021" | "E022" => Severity::High,
        "E040" | "E041" | "E042" | "E043" => Severity::High,
        _ => Severity::Low,
    }
}

/// Get the human-readable description for a code
pub fn get_description(code: &str) -> &'static str {
    match code {
        "ERR001" => "Internal translator error",
        "ERR002" => "Logging or configuration initialization failed",
        "E005" => "Input file not found",
        "E006" => "Input file exceeds the size boundary",
        "E007" => "Input file exceeds the line-count boundary",
        "E008" => "Input file could not be read",
        "E020" => "No lexer rule matched the line remainder",
        "E021" => "Per-line lookahead ceiling exceeded",
        "E022" => "Logical line exceeds the length boundary",
        "E040" => "End of input reached inside an open construct",
        "E041" => "Nonzero indent depth at end of conversion",
        "E042" => "With-block terminator without a matching With",
        "E043" => "Block nesting exceeds the depth boundary",
        "S001" => "System initialization completed",
        "S005" => "Source file loaded",
        "S010" => "Line preprocessing completed",
        "S020" => "Translation completed",
        _ => "Unknown error",
    }
}

/// Whether a failure with this code leaves no usable output
pub fn requires_halt(code: &str) -> bool {
    // Every fatal code aborts the whole conversion; unsupported constructs
    // never reach the error path at all.
    code.starts_with("ERR") || code.starts_with('E')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(lexical::RUNAWAY_LOOKAHEAD.to_string(), "E021");
        assert_eq!(lexical::RUNAWAY_LOOKAHEAD.as_str(), "E021");
    }

    #[test]
    fn test_all_codes_have_descriptions() {
        let codes = [
            "ERR001", "ERR002", "E005", "E006", "E007", "E008", "E020", "E021", "E022", "E040",
            "E041", "E042", "E043", "S001", "S005", "S010", "S020",
        ];
        for code in codes {
            assert_ne!(get_description(code), "Unknown error", "missing: {}", code);
        }
    }

    #[test]
    fn test_severity_classification() {
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert_eq!(get_severity("E021"), Severity::High);
        assert_eq!(get_severity("S020"), Severity::Low);
    }

    #[test]
    fn test_halt_classification() {
        assert!(requires_halt("E041"));
        assert!(!requires_halt("S020"));
    }
}
