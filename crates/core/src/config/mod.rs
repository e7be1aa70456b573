//! Configuration loading and schema definitions
//!
//! Tool-level configuration shared by the pipeline and the CLI.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
