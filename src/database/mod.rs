pub mod credentials;
pub mod manager;
pub mod models;
pub mod sessions;

pub use credentials::PgCredentialStore;
pub use manager::{DatabaseError, DatabaseManager};
pub use sessions::PgSessionStore;
