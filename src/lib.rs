// Library exports for linesift
// This allows the binary and the test suite to share one set of modules

pub mod cli;
pub mod config;
pub mod filter;
pub mod ipc;
pub mod source;
