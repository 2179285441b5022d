pub mod completeness;
pub mod config;
pub mod consolidate;
pub mod coverage;
pub mod error;
pub mod filename;
pub mod grouping;
pub mod io;
pub mod merge;
pub mod model;
pub mod rename;
pub mod validate;

pub use error::{Result, ToolError, ValidationError, ValidationKind};
