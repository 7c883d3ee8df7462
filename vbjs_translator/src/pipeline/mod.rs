//! Conversion pipeline
//!
//! One-direction flow: raw lines -> preprocessor -> logical-line stream ->
//! statement translator -> output text. A conversion either runs to
//! completion or fails atomically with a fatal error; there is no partial
//! recovery at this granularity.

mod error;
pub mod output;

pub use error::PipelineError;
pub use output::PipelineOutput;

use crate::config::runtime::TranslationPreferences;
use crate::logging::codes;
use crate::{file_processor, preprocess, syntax};
use crate::{log_error, log_info, log_success};

/// Convert macro source text with default preferences
pub fn convert_source(source: &str) -> Result<PipelineOutput, PipelineError> {
    convert_source_with_preferences(source, &TranslationPreferences::default())
}

/// Convert macro source text already split into lines
pub fn convert_lines(
    raw: &[String],
    prefs: &TranslationPreferences,
) -> Result<PipelineOutput, PipelineError> {
    if raw.is_empty() {
        return Ok(PipelineOutput::new(String::new(), 0));
    }

    log_info!("Starting conversion pipeline", "input_lines" => raw.len());

    // Stage 1: line preprocessing
    let logical = match preprocess::cleanup(raw) {
        Ok(lines) => lines,
        Err(error) => {
            log_error!(error.error_code(), "Preprocessing failed", "detail" => error);
            return Err(error.into());
        }
    };
    let logical_line_count = logical.len();

    // Stage 2: statement translation
    let javascript = match syntax::translate_lines(logical, prefs) {
        Ok(javascript) => javascript,
        Err(error) => {
            if let Some(line) = error.line() {
                log_error!(error.error_code(), "Translation failed", line = line, "detail" => error);
            } else {
                log_error!(error.error_code(), "Translation failed", "detail" => error);
            }
            return Err(error.into());
        }
    };

    let result = PipelineOutput::new(javascript, logical_line_count);

    log_success!(codes::success::TRANSLATION_COMPLETE, "Translation completed",
        "input_lines" => raw.len(),
        "logical_lines" => result.logical_line_count,
        "output_lines" => result.output_line_count
    );

    Ok(result)
}

/// Convert macro source text with custom preferences
pub fn convert_source_with_preferences(
    source: &str,
    prefs: &TranslationPreferences,
) -> Result<PipelineOutput, PipelineError> {
    if source.is_empty() {
        return Ok(PipelineOutput::new(String::new(), 0));
    }
    let raw: Vec<String> = source.lines().map(|line| line.to_string()).collect();
    convert_lines(&raw, prefs)
}

/// Process a single file through the complete pipeline
/// (file -> preprocess -> translate)
pub fn process_file(file_path: &str) -> Result<PipelineOutput, PipelineError> {
    let source_file = file_processor::load_file(file_path)?;
    convert_lines(&source_file.lines, &TranslationPreferences::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TranslationError;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_empty_source() {
        let result = convert_source("").unwrap();
        assert_eq!(result.javascript, "");
    }

    #[test]
    fn test_simple_conversion() {
        let result = convert_source("Dim x(5)\nx(2) = 3").unwrap();
        assert!(result.javascript.contains("var x = new Array(5);"));
        assert!(result.javascript.contains("x[2] = 3;"));
    }

    #[test]
    fn test_unclosed_block_is_fatal() {
        let result = convert_source("If a Then\nb = 1");
        assert_matches!(
            result,
            Err(PipelineError::Translation(
                TranslationError::UnexpectedEndOfInput { .. }
            ))
        );
    }

    #[test]
    fn test_process_missing_file() {
        let result = process_file("no/such/input.bas");
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
    }

    #[test]
    fn test_process_file_end_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Sub Greet()").unwrap();
        writeln!(file, "MsgBox \"hello\"").unwrap();
        writeln!(file, "End Sub").unwrap();

        let result = process_file(file.path().to_str().unwrap()).unwrap();
        assert!(result.javascript.contains("function Greet() {"));
        assert!(result.javascript.contains("MsgBox(\"hello\");"));
        assert!(result.javascript.ends_with("}\n"));
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        match error {
            PipelineError::Pipeline { message } => {
                assert_eq!(message, "Test error");
            }
            _ => panic!("Wrong error type"),
        }
    }
}
