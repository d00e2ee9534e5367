//! API middleware components

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::RequireAuthorization;
pub use cors::cors_middleware;
pub use logging::{logging_middleware, truncate_for_log, RequestId};
