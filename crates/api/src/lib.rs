//! HTTP API for the farmstand backend.

pub mod app;
pub mod context;
pub mod middleware;
