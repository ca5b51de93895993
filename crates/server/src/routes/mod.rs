//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `videos`: indexing and originality analysis

pub mod health;
pub mod videos;

use crate::error::ServerError;

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
