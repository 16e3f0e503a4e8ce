// cloudrun-logs - app/mod.rs
//
// Application layer: query orchestration and boundary input handling.
// Dependencies: core, remote, platform config.
// Must NOT depend on: mcp or the CLI binary.

pub mod backend;
pub mod query;
pub mod request;
