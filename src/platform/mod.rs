// cloudrun-logs - platform/mod.rs
//
// Platform abstraction layer.
// Dependencies: standard library, directories crate, util.
// Must NOT depend on: core, app, remote, mcp.

pub mod config;
