// Internal modules
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod preprocess;
pub mod state;
pub mod syntax;
pub mod tokens;

// Re-export key types for library consumers
pub use pipeline::{convert_source, process_file, PipelineError, PipelineOutput};
pub use syntax::{TranslationError, Translator};
