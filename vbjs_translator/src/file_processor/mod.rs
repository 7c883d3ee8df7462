//! Source file loading with compile-time boundaries
//!
//! Reads a macro source file, enforces size and line-count limits, and hands
//! the raw line list to the preprocessor.

use crate::config::constants::compile_time::file_processing::{MAX_FILE_SIZE, MAX_SOURCE_LINES};
use crate::logging::codes;
use crate::{log_debug, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// File processing errors
#[derive(Debug, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("File too large: {size} bytes (max {MAX_FILE_SIZE})")]
    FileTooLarge { size: u64 },

    #[error("Too many lines: {count} (max {MAX_SOURCE_LINES})")]
    TooManyLines { count: usize },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::NotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
            FileProcessorError::Io { .. } => codes::file_processing::READ_FAILURE,
        }
    }
}

/// Metadata about a loaded source file
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
}

/// A loaded source file split into raw lines
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub metadata: FileMetadata,
    pub lines: Vec<String>,
}

/// Load a source file, enforcing the compile-time boundaries
pub fn load_file(file_path: &str) -> Result<SourceFile, FileProcessorError> {
    let path = Path::new(file_path);

    if !path.exists() {
        return Err(FileProcessorError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let size = fs::metadata(path)
        .map_err(|source| FileProcessorError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    if size > MAX_FILE_SIZE {
        return Err(FileProcessorError::FileTooLarge { size });
    }

    let text = fs::read_to_string(path).map_err(|source| FileProcessorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let source_file = from_text(path.to_path_buf(), size, &text)?;

    log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source file loaded",
        "file" => path.display(),
        "size_bytes" => size,
        "lines" => source_file.metadata.line_count
    );

    Ok(source_file)
}

/// Build a source file from already-loaded text (library entry point)
pub fn from_text(path: PathBuf, size: u64, text: &str) -> Result<SourceFile, FileProcessorError> {
    let lines: Vec<String> = text.lines().map(|line| line.to_string()).collect();

    if lines.len() > MAX_SOURCE_LINES {
        return Err(FileProcessorError::TooManyLines { count: lines.len() });
    }

    log_debug!("Source text split into lines", "count" => lines.len());

    Ok(SourceFile {
        metadata: FileMetadata {
            path,
            size,
            line_count: lines.len(),
        },
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_load_missing_file() {
        let result = load_file("no/such/file.bas");
        assert_matches!(result, Err(FileProcessorError::NotFound { .. }));
    }

    #[test]
    fn test_load_file_splits_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Dim x").unwrap();
        writeln!(file, "x = 1").unwrap();

        let loaded = load_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.lines, vec!["Dim x", "x = 1"]);
        assert_eq!(loaded.metadata.line_count, 2);
    }

    #[test]
    fn test_error_codes_map() {
        let err = FileProcessorError::FileTooLarge { size: u64::MAX };
        assert_eq!(err.error_code().as_str(), "E006");
    }
}
