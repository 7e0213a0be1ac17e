//! CareerWise proxy: forwards résumé + GitHub analysis requests to an external
//! analysis service and normalises its responses.
//!
//! - **request**: Request Builder, validation of raw user input
//! - **gateway**: Backend Gateway and Error Normalizer
//! - **proxy** / **routes**: the HTTP endpoints exposed by the server
//! - **session**: client-side orchestration state machine
//! - **models** / **render**: the aggregated result and its text rendering

pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod proxy;
pub mod render;
pub mod request;
pub mod routes;
pub mod session;
pub mod state;
