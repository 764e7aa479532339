pub mod manage;

// Re-export handler functions for use in routing
pub use manage::create as account_create;
pub use manage::delete as account_delete;
pub use manage::list as account_list;
pub use manage::toggle_admin as account_toggle_admin;
pub use manage::update as account_update;
