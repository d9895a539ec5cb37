//! Error types for staticlxml
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Bad or missing user-supplied options
///
/// Always fatal. Messages name the offending option and how to fix it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A library is not built but no location for it was given
    #[error("You must either configure `{location_option}` or set `{build_option}` to `true`")]
    MissingLocation {
        library: String,
        build_option: String,
        location_option: String,
    },

    /// Static linking needs both native libraries built from source
    #[error("Static build is only possible if both `{first}` and `{second}` are `true`")]
    StaticRequiresBuild { first: String, second: String },

    /// No config executable configured and none discovered
    #[error("No `{tool}` binary configured and none found in {searched}. Set `{option}` to its path")]
    ConfigNotFound {
        tool: String,
        option: String,
        searched: String,
    },
}

/// An external build helper failed
#[derive(Error, Debug)]
pub enum BuildFailure {
    /// The source-build helper failed for a native library
    #[error("Build failed for library '{library}': {error}")]
    SourceBuild { library: String, error: String },

    /// The binding build helper failed
    #[error("Build failed for binding '{binding}': {error}")]
    Binding { binding: String, error: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// Checksum verification failed
    #[error("Checksum verification failed for '{file}'")]
    ChecksumFailed { file: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Max retries exceeded
    #[error("Download failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to list a directory
    #[error("Failed to read directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Failed to remove a file
    #[error("Failed to remove file '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },

    /// Failed to remove a directory tree
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// A relative path could not be anchored at the working directory
    #[error("Failed to make '{path}' absolute: {error}")]
    Absolute { path: PathBuf, error: String },
}

/// External command errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program could not be started
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// The program ran and reported failure
    #[error("'{command}' exited with {status}: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

/// Source-build helper errors
#[derive(Error, Debug)]
pub enum SourceBuildError {
    /// Download failed
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Filesystem failure
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// configure, make or tar failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The extracted archive has no configure script
    #[error("No configure script found under '{dir}'")]
    NoConfigureScript { dir: PathBuf },
}

/// Binding build helper errors
#[derive(Error, Debug)]
pub enum BindingBuildError {
    /// setup.py or the interpreter failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Filesystem failure
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// The Python interpreter could not be found
    #[error("Python interpreter '{python}' not found")]
    InterpreterNotFound { python: String },

    /// The binding source tree has no setup.py
    #[error("No setup.py found in '{dir}'")]
    NoSetupScript { dir: PathBuf },
}

/// Top-level staticlxml error type
#[derive(Error, Debug)]
pub enum StaticLxmlError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildFailure),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
