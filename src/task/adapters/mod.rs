//! Adapter implementations for task ports.

pub mod json_file;
pub mod memory;
