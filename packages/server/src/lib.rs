// Market Research Server - API Core
//
// HTTP surface over the extraction cascade and the quality-gated research
// pipeline. Handlers live in server/routes; wiring in server/app.

pub mod config;
pub mod server;

pub use config::*;
