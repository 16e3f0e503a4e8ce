// cloudrun-logs - mcp/mod.rs
//
// Model Context Protocol front end over stdio.
// Dependencies: app, remote traits, util.

pub mod protocol;
pub mod server;
pub mod tools;
