//! Command implementations.

mod config;
mod decompose;
mod input;
mod split;

pub use config::execute_config;
pub use decompose::execute_decompose;
pub use input::read_document;
pub use split::execute_split;
