// handlers/protected/mod.rs - Protected handlers (session authentication required)
//
// Security Level: Bearer session token
// Route Prefix: /api/*
// Middleware: session_auth_middleware injects AuthUser

pub mod auth;
pub mod accounts;
