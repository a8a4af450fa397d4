//! ARK CRD Definitions
//!
//! Kubernetes Custom Resource Definitions consumed by the ARK API service.

pub mod query;

pub use query::*;
