pub mod ast;
pub mod config;
pub mod equal;
pub mod matcher;
pub mod rewrite;
pub mod shared;
pub mod stats;
pub mod walker;
pub mod zero;
