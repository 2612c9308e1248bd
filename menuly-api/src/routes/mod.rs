/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Backend reachability
/// - `session`: The caller's session
/// - `staff`: Staff accounts owned by the caller
/// - `qr_codes`: The caller's QR codes
/// - `admin`: Operational user management (admin key)

pub mod admin;
pub mod health;
pub mod qr_codes;
pub mod session;
pub mod staff;
