// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationPreferences {
    /// Whether trailing source comments are re-attached to generated lines
    pub emit_source_comments: bool,

    /// Whether untranslated statements keep the trailing UNTOUCHED marker
    pub mark_untouched_lines: bool,

    /// Whether to log per-statement translation details
    pub log_statement_details: bool,
}

impl Default for TranslationPreferences {
    fn default() -> Self {
        Self {
            emit_source_comments: env::var("VBJS_EMIT_SOURCE_COMMENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            mark_untouched_lines: env::var("VBJS_MARK_UNTOUCHED_LINES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_statement_details: env::var("VBJS_LOG_STATEMENT_DETAILS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to log every consumed token (very verbose)
    pub log_token_details: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            log_token_details: env::var("VBJS_LOG_TOKEN_DETAILS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_preferences_defaults() {
        let prefs = TranslationPreferences::default();
        assert!(prefs.emit_source_comments);
        assert!(prefs.mark_untouched_lines);
    }

    #[test]
    fn test_lexical_preferences_defaults() {
        let prefs = LexicalPreferences::default();
        assert!(!prefs.log_token_details);
    }
}
