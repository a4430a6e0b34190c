//! HTTP API module for the diagnostic routes.

pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
