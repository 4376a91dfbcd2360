//! HTTP/SSE control surface
//!
//! Exposes the coordinator's caller API and its observer events.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
