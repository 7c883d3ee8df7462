//! Compile-time boundaries and runtime preferences for the translator.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{LexicalPreferences, TranslationPreferences};
