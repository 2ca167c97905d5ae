//! Web API module.
//!
//! Serves the catalog as JSON over HTTP, with permissive CORS so the
//! catalog can be fetched directly from browser front ends.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
