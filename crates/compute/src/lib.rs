//! Compute backend clients for the Relay platform.
//!
//! This crate provides:
//! - `LambdaClient` — fire-and-forget async function invocation
//! - `EcsClient` — synchronous Fargate `RunTask`
//! - `BatchClient` — synchronous `SubmitJob`
//! - `Dispatcher` — exhaustive platform dispatch over the three clients
//!
//! Each client speaks the backend's documented HTTP API and nothing
//! more; request signing is handled by the deployment's egress
//! credential proxy, so clients only attach `X-Amz-Date` and target
//! headers. Endpoints are derived from the region and overridable for
//! tests.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // All client methods can fail the same way

pub mod batch;
pub mod dispatcher;
pub mod error;
pub mod fargate;
pub mod lambda;
pub mod payload;

pub use batch::{BatchClient, BatchJob};
pub use dispatcher::{ComputeConfig, DispatchReceipt, Dispatcher};
pub use error::ComputeError;
pub use fargate::{EcsClient, EcsTask};
pub use lambda::{LambdaClient, LambdaInvocation};
pub use payload::{EnvPair, WorkPayload};
