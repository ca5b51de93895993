//! VOFP Server - HTTP API for video originality checks
//!
//! A thin layer over [`vofp::OriginalityPipeline`]. Every request is handled
//! independently; the corpus is the only shared state.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe, reports corpus size
//! - `POST /index` - `{"url": ...}` → `{"indexed": true}`
//! - `POST /analyze` - `{"url": ...}` → `{"original": bool}`
//!
//! Failures answer with `{"error": {"code", "message"}}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
