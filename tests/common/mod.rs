//! Common test utilities and helpers
//!
//! Shared scratch directories and stub build helpers for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::Command;

use staticlxml::core::builder::{BindingBuildSpec, BindingBuilder};
use staticlxml::core::library::NativeLibrary;
use staticlxml::core::native::{SourceBuildSpec, SourceBuilder};
use staticlxml::error::{BindingBuildError, SourceBuildError};
use tempfile::TempDir;

/// Test project context
///
/// A temporary directory standing in for the parts root.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Lay out a finished native library install: marker plus libraries
    pub fn install_library(&self, dir: &str, library: &NativeLibrary) -> PathBuf {
        let root = self.dir.path().join(dir);
        populate_install(&root, library);
        root
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the marker, a static archive and a shared library under `root`
pub fn populate_install(root: &Path, library: &NativeLibrary) {
    std::fs::create_dir_all(root.join("bin")).expect("Failed to create bin");
    std::fs::create_dir_all(root.join("lib")).expect("Failed to create lib");
    std::fs::write(root.join("bin").join(library.marker), b"#!/bin/sh\n").expect("marker");
    std::fs::write(root.join("lib").join(format!("{}.a", library.name)), b"").expect("archive");
    std::fs::write(root.join("lib").join(format!("{}.so", library.name)), b"").expect("so");
    std::fs::write(root.join("lib").join(format!("{}.dylib", library.name)), b"").expect("dylib");
}

/// Source builder stub: installs into `<root>/<library>` and counts calls
pub struct StubSourceBuilder {
    pub root: PathBuf,
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl StubSourceBuilder {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn built(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn flags_for(&self, library: &str) -> Option<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .find(|(name, _)| name == library)
            .map(|(_, flags)| flags.clone())
    }
}

impl SourceBuilder for StubSourceBuilder {
    fn install_dir(&self, library: &NativeLibrary) -> PathBuf {
        self.root.join(library.name)
    }

    fn build(&self, spec: &SourceBuildSpec<'_>) -> Result<PathBuf, SourceBuildError> {
        self.calls.borrow_mut().push((
            spec.library.name.to_string(),
            spec.extra_configure_flags.to_vec(),
        ));
        let dir = self.install_dir(spec.library);
        populate_install(&dir, spec.library);
        Ok(dir)
    }
}

/// Binding builder stub: records specs and reports fixed installed files
pub struct StubBindingBuilder {
    pub ldshared: Option<String>,
    pub specs: RefCell<Vec<BindingBuildSpec>>,
}

impl StubBindingBuilder {
    pub fn new(ldshared: Option<&str>) -> Self {
        Self {
            ldshared: ldshared.map(String::from),
            specs: RefCell::new(Vec::new()),
        }
    }

    pub fn last_spec(&self) -> BindingBuildSpec {
        self.specs.borrow().last().cloned().expect("binding was not built")
    }
}

impl BindingBuilder for StubBindingBuilder {
    fn shared_link_command(&self) -> Result<Option<String>, BindingBuildError> {
        Ok(self.ldshared.clone())
    }

    fn build(&self, spec: &BindingBuildSpec) -> Result<Vec<PathBuf>, BindingBuildError> {
        self.specs.borrow_mut().push(spec.clone());
        Ok(vec![
            spec.destination.join("lxml").join("etree.so"),
            spec.destination.join("lxml").join("objectify.so"),
        ])
    }
}

/// Run the staticlxml binary with arguments in `dir`
pub fn run_staticlxml(dir: &Path, args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_staticlxml"));
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute staticlxml")
}
