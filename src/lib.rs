// Main library entry point for tryhard.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
