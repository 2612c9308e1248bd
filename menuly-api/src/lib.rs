//! # Menuly API Server Library
//!
//! The HTTP surface of Menuly: session lookup, staff management, QR code
//! listing and operational admin endpoints, all backed by the hosted backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and admin key checks
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
