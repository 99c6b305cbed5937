//! sysundo: single-step undo for rm, mv and cp
//!
//! This library backs up the files a destructive shell command is about to
//! touch, runs the command, and restores the most recent backup on request.

pub mod cli;
pub mod config;
pub mod error;
pub mod init;
pub mod interceptor;
pub mod lang;
pub mod logger;
pub mod manifest;
pub mod paths;
pub mod restorer;
pub mod selector;
pub mod store;
