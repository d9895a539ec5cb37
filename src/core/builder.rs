//! Binding build seam
//!
//! The binding helper compiles and installs lxml against the resolved
//! native libraries. The install driver only talks to it through
//! [`BindingBuilder`].

use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::build_env::{CompileFlags, ToolchainEnvironment};
use crate::error::BindingBuildError;

/// Everything the binding helper needs
#[derive(Debug, Clone)]
pub struct BindingBuildSpec {
    /// Part name
    pub name: String,
    /// Install directory
    pub destination: PathBuf,
    /// Search paths and libraries
    pub flags: CompileFlags,
    /// Environment for the build
    pub environment: HashMap<String, String>,
}

impl BindingBuildSpec {
    /// Assemble a spec from flags and a toolchain environment
    pub fn new(
        name: &str,
        destination: PathBuf,
        flags: CompileFlags,
        toolchain: &ToolchainEnvironment,
    ) -> Self {
        Self {
            name: name.to_string(),
            destination,
            flags,
            environment: toolchain.to_env_map(),
        }
    }
}

/// Compiles and installs the binding
pub trait BindingBuilder {
    /// The host's shared-object link command, if it reports one
    fn shared_link_command(&self) -> Result<Option<String>, BindingBuildError>;

    /// Build and install, returning the installed file locations
    fn build(&self, spec: &BindingBuildSpec) -> Result<Vec<PathBuf>, BindingBuildError>;
}
