pub mod session;

// Re-export handler functions for use in routing
pub use session::check_permission as session_permission;
pub use session::logout as session_logout;
pub use session::whoami as session_whoami;
