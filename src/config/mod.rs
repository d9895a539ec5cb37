//! Configuration and constants
//!
//! - [`defaults`] - Default option values and limits
//! - [`urls`] - Default source archive locations

pub mod defaults;
pub mod urls;
