//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem, and external processes.
//! This module is the only place where side effects occur.

pub mod cmmi;
pub mod dirs;
pub mod download;
pub mod filesystem;
pub mod locator;
pub mod process;
pub mod setup_py;
