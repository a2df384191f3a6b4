//! Admin Gateway Library
//!
//! Exposes the access gate, handlers and stores of the admin gateway
//! for use in integration tests and the server binary.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
