// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: No /api prefix (e.g., /auth/*, /validate)

pub mod auth;
pub mod validate;

pub use validate::validate_post as validate;
