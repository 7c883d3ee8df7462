//! Fatal translation errors
//!
//! Every kind here aborts the whole conversion and carries the offending
//! line number and text where available. Unsupported-but-recognized
//! statements are deliberately NOT errors: they degrade to commented
//! pass-through output.

use crate::config::constants::compile_time::translation::MAX_BLOCK_DEPTH;
use crate::lexical::LexerError;
use crate::logging::codes;

pub type TranslationResult<T> = Result<T, TranslationError>;

/// Fatal conversion errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslationError {
    #[error("Unexpected end of input at line {line}: {text}")]
    UnexpectedEndOfInput { line: usize, text: String },

    #[error("Statement nesting error: depth = {depth}")]
    UnbalancedNesting { depth: i32 },

    #[error("With-block member access or terminator without a matching With at line {line}")]
    WithStackUnderflow { line: usize },

    #[error("Block nesting exceeds {MAX_BLOCK_DEPTH} levels at line {line}")]
    BlockTooDeep { line: usize },

    #[error(transparent)]
    Lexical(#[from] LexerError),
}

impl TranslationError {
    /// Get error code for the global logging system
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::UnexpectedEndOfInput { .. } => codes::translation::UNEXPECTED_END_OF_INPUT,
            Self::UnbalancedNesting { .. } => codes::translation::UNBALANCED_NESTING,
            Self::WithStackUnderflow { .. } => codes::translation::WITH_STACK_UNDERFLOW,
            Self::BlockTooDeep { .. } => codes::translation::BLOCK_TOO_DEEP,
            Self::Lexical(inner) => inner.error_code(),
        }
    }

    /// Source line the error refers to, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEndOfInput { line, .. }
            | Self::WithStackUnderflow { line }
            | Self::BlockTooDeep { line } => Some(*line),
            Self::Lexical(LexerError::UnknownToken { line, .. })
            | Self::Lexical(LexerError::RunawayLookahead { line, .. }) => Some(*line),
            Self::UnbalancedNesting { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TranslationError::UnbalancedNesting { depth: 2 };
        assert_eq!(err.error_code().as_str(), "E041");

        let err = TranslationError::Lexical(LexerError::RunawayLookahead {
            line: 7,
            text: "x".into(),
        });
        assert_eq!(err.error_code().as_str(), "E021");
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_display_carries_line() {
        let err = TranslationError::UnexpectedEndOfInput {
            line: 3,
            text: "If a Then".into(),
        };
        let message = err.to_string();
        assert!(message.contains("line 3"));
        assert!(message.contains("If a Then"));
    }
}
