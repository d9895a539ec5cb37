//! Core business logic module
//!
//! Decides what to build and how; the helpers that download, compile and
//! touch the filesystem live in [`crate::infra`] and are reached through
//! the [`native::SourceBuilder`] and [`builder::BindingBuilder`] traits.
//!
//! # Submodules
//!
//! - [`platform`] - Platform capability table
//! - [`library`] - libxml2 / libxslt descriptors
//! - [`options`] - Option resolution and validation
//! - [`options_file`] - `staticlxml.toml` loading
//! - [`native`] - Reuse-or-build decision per native library
//! - [`toolchain`] - Config executable discovery and `LDSHARED` adjustment
//! - [`build_env`] - Compile flags and the binding build environment
//! - [`builder`] - Binding build seam
//! - [`installer`] - Install driver

pub mod build_env;
pub mod builder;
pub mod installer;
pub mod library;
pub mod native;
pub mod options;
pub mod options_file;
pub mod platform;
pub mod toolchain;
