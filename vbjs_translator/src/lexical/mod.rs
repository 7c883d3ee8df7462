//! Line-oriented lexical scanning
//!
//! The scanner classifies the unconsumed remainder of one logical line
//! through a priority-ordered rule table, with one-token lookahead that
//! never consumes input.

pub mod line;
pub mod rules;

pub use line::{LexerError, LogicalLine};
pub use rules::{match_rule, rule_table};
