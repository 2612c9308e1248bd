//! # Menuly Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the Menuly API server and the admin tooling.
//!
//! ## Module Organization
//!
//! - `baas`: Backend-as-a-service client (Supabase) and an in-memory mock
//! - `auth`: Session resolution, authorization, admin keys, passwords
//! - `models`: Records owned by the backend (profiles, QR codes, auth users)
//! - `client`: Client-side session flow (route guard, navigation helper)

pub mod auth;
pub mod baas;
pub mod client;
pub mod models;

/// Current version of the Menuly shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
