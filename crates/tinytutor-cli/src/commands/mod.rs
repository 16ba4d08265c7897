//! Command handlers.

pub mod config;
pub mod session;
pub mod tutor;
