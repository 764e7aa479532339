// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth) → Protected (bearer session)

pub mod protected;
pub mod public;
pub mod system;
