// Utilities
pub mod error;
pub mod formatter;
pub mod glob;
