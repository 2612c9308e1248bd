/// Records owned by the hosted backend
///
/// The backend is the source of truth for every record in this module. These
/// types only describe the JSON shapes exchanged with it; no invariants are
/// enforced in-process.
///
/// # Models
///
/// - `profile`: Owner and staff profiles (`profiles` table)
/// - `qr_code`: Menu QR codes (`qr_codes` table)
/// - `user`: Backend auth users and the admin-create payload

pub mod profile;
pub mod qr_code;
pub mod user;

pub use profile::{Profile, ProfileRole};
pub use qr_code::{ErrorCorrection, QrCode, QrDesign};
pub use user::{AuthUser, NewAuthUser};
