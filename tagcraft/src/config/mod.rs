//! Various configuration options to control tagcraft

mod engine_options;
mod parse_options;
mod write_options;

pub use engine_options::EngineOptions;
pub use parse_options::{ParseOptions, ParsingMode};
pub use write_options::WriteOptions;
