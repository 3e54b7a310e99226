pub mod commands;
pub mod config;
pub mod layout;
pub mod logging;
pub mod package;
pub mod runtime;
pub mod tree;
