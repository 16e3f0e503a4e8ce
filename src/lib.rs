// cloudrun-logs - lib.rs
//
// Library entry point shared by the `cloudrun-logs` CLI and the
// `cloudrun-logs-mcp` server, and exercised directly by the integration
// tests.

pub mod app;
pub mod core;
pub mod mcp;
pub mod platform;
pub mod remote;
pub mod util;
