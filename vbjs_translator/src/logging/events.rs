//! Event system for translator logging

use super::codes::Code;
use std::collections::HashMap;
use std::time::SystemTime;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Source line number the event refers to, if any
    pub line: Option<usize>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level: LogLevel::Error,
            code: error_code,
            message: message.to_string(),
            line: None,
            context: HashMap::new(),
        }
    }

    /// Create a new warning event (warnings may not have codes)
    pub fn warning(message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level: LogLevel::Warning,
            code: Code::new("W000"),
            message: message.to_string(),
            line: None,
            context: HashMap::new(),
        }
    }

    /// Create a new info event
    pub fn info(message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level: LogLevel::Info,
            code: Code::new("I000"),
            message: message.to_string(),
            line: None,
            context: HashMap::new(),
        }
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level: LogLevel::Info,
            code: success_code,
            message: message.to_string(),
            line: None,
            context: HashMap::new(),
        }
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level: LogLevel::Debug,
            code: Code::new("D000"),
            message: message.to_string(),
            line: None,
            context: HashMap::new(),
        }
    }

    /// Add source line information
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    /// Format for console output
    pub fn format(&self) -> String {
        let mut formatted = format!("[{}] [{}] {}", self.level.as_str(), self.code, self.message);

        if let Some(line) = self.line {
            formatted.push_str(&format!(" (line {})", line));
        }

        if !self.context.is_empty() {
            let mut keys: Vec<&String> = self.context.keys().collect();
            keys.sort();
            let pairs: Vec<String> = keys
                .iter()
                .map(|k| format!("{}={}", k, self.context[*k]))
                .collect();
            formatted.push_str(&format!(" {{{}}}", pairs.join(", ")));
        }

        formatted
    }

    /// Format as a JSON object for structured sinks
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::Map::new();
        value.insert("level".into(), self.level.as_str().into());
        value.insert("code".into(), self.code.as_str().into());
        value.insert("message".into(), self.message.as_str().into());
        if let Some(line) = self.line {
            value.insert("line".into(), line.into());
        }
        if !self.context.is_empty() {
            value.insert(
                "context".into(),
                serde_json::to_value(&self.context)?,
            );
        }
        serde_json::to_string(&serde_json::Value::Object(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_event_format_includes_line() {
        let event = LogEvent::error(codes::lexical::RUNAWAY_LOOKAHEAD, "looping").with_line(12);
        let formatted = event.format();
        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E021"));
        assert!(formatted.contains("line 12"));
    }

    #[test]
    fn test_event_json_roundtrip() {
        let event = LogEvent::success(codes::success::TRANSLATION_COMPLETE, "done")
            .with_context("lines", "10");
        let json = event.format_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["code"], "S020");
        assert_eq!(parsed["context"]["lines"], "10");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
    }
}
