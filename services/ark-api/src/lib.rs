//! ARK API
//!
//! OpenAI-compatible HTTP front end for ARK. Chat completion requests are
//! turned into `Query` resources; the service watches each query until it
//! finishes and answers with the first target's response.
//!
//! Also provides the duration parsers used for query budgets and the OpenAPI
//! document, with security declarations matching the configured auth mode.

pub mod auth;
pub mod completion;
pub mod config;
pub mod duration;
pub mod error;
pub mod openapi;
pub mod query;
pub mod routes;
pub mod timeout;

pub use config::Config;
pub use error::{ApiError, ErrorDetail, TargetError};
pub use routes::{build_router, AppState};
