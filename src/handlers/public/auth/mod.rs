pub mod login;
pub mod register;

pub use login::login_post as login;
pub use register::register_post as register;
