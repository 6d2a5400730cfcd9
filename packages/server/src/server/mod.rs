// HTTP server setup (Axum) - the API layer over the pass domain
pub mod app;
pub mod error;
pub mod middleware;
pub mod routes;

pub use app::*;
pub use error::ApiError;
