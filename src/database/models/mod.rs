pub mod session;
pub mod user;

pub use session::SessionRow;
pub use user::UserRow;
