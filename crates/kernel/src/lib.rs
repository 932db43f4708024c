//! pixfeed kernel library.
//!
//! Page loaders for a photo-sharing app backed by PocketBase, served as JSON
//! over HTTP. The `pixfeed` binary is the entry point for running the server.

pub mod backend;
pub mod config;
pub mod demo;
pub mod error;
pub mod feed;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
