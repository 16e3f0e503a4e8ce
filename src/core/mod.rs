// cloudrun-logs - core/mod.rs
//
// Core business logic layer: filter construction and result normalisation.
// Must NOT depend on: remote, app, mcp, or platform.

pub mod filter;
pub mod logs;
pub mod model;
pub mod render;
pub mod services;
