//! CLI command implementations

pub mod calc;
pub mod completions;
pub mod init;
pub mod stats;
pub mod vendor;
