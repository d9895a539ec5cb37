//! Native library build coordination
//!
//! Decides per library whether a finished build can be reused or the
//! source-build helper has to run. A build counts as finished when its
//! config executable exists under `<dir>/bin`; an interrupted build never
//! installs it, so the next run rebuilds.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::library::NativeLibrary;
use crate::core::options::LibraryRequest;
use crate::error::{BuildFailure, SourceBuildError};

/// Everything the source-build helper needs for one library
#[derive(Debug, Clone)]
pub struct SourceBuildSpec<'a> {
    /// Library being built
    pub library: &'static NativeLibrary,
    /// Source archive
    pub url: &'a str,
    /// Expected SHA-256 of the archive
    pub sha256: Option<&'a str>,
    /// Flags appended to `configure`
    pub extra_configure_flags: &'a [String],
}

/// Downloads, configures, compiles and installs a native library
pub trait SourceBuilder {
    /// Directory the library installs into
    fn install_dir(&self, library: &NativeLibrary) -> PathBuf;

    /// Build and install, returning the install directory
    fn build(&self, spec: &SourceBuildSpec<'_>) -> Result<PathBuf, SourceBuildError>;
}

/// How an installation came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOrigin {
    /// Built from source during this run
    Built,
    /// A finished build from an earlier run
    Reused,
    /// An existing installation named in the options
    Configured,
}

impl fmt::Display for InstallOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Built => write!(f, "built"),
            Self::Reused => write!(f, "reused"),
            Self::Configured => write!(f, "configured"),
        }
    }
}

/// A resolved native library installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryInstallation {
    /// Library installed here
    pub library: &'static NativeLibrary,
    /// Install root
    pub location: PathBuf,
    /// Where it came from
    pub origin: InstallOrigin,
    /// Config executable, once resolved
    pub config_executable: Option<PathBuf>,
}

impl LibraryInstallation {
    /// Create an installation without a resolved config executable
    pub fn new(library: &'static NativeLibrary, location: PathBuf, origin: InstallOrigin) -> Self {
        Self {
            library,
            location,
            origin,
            config_executable: None,
        }
    }

    /// `<location>/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.location.join("bin")
    }

    /// `<location>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.location.join("lib")
    }

    /// Header directory
    pub fn include_dir(&self) -> PathBuf {
        self.location.join(self.library.include_subdir)
    }
}

/// Configure flags for a library
///
/// libxslt is pointed at the libxml2 it must link against.
pub fn configure_flags(library: &NativeLibrary, libxml2_location: Option<&Path>) -> Vec<String> {
    let mut flags = Vec::new();
    if let Some(prefix) = libxml2_location {
        flags.push(format!("--with-libxml-prefix={}", prefix.display()));
    }
    flags.push(defaults::WITHOUT_PYTHON_FLAG.to_string());
    tracing::debug!("{library} configure flags: {}", flags.join(" "));
    flags
}

/// Whether `dir` holds a finished build of `library`
pub fn is_built(library: &NativeLibrary, dir: &Path) -> bool {
    dir.join("bin").join(library.marker).exists()
}

/// Reuse a finished build or run the source-build helper
pub fn ensure_built(
    library: &'static NativeLibrary,
    request: &LibraryRequest,
    extra_configure_flags: &[String],
    builder: &dyn SourceBuilder,
) -> Result<LibraryInstallation, BuildFailure> {
    let candidate = builder.install_dir(library);

    if !request.force && is_built(library, &candidate) {
        tracing::info!("Skipping build of {library}: already there");
        return Ok(LibraryInstallation::new(
            library,
            candidate,
            InstallOrigin::Reused,
        ));
    }
    if request.force {
        tracing::info!("Rebuilding {library}: force requested");
    }

    let url = request.url_or_default(library);
    tracing::info!("Using {library} download url {url}");

    let spec = SourceBuildSpec {
        library,
        url,
        sha256: request.sha256.as_deref(),
        extra_configure_flags,
    };
    let location = builder
        .build(&spec)
        .map_err(|e| BuildFailure::SourceBuild {
            library: library.name.to_string(),
            error: e.to_string(),
        })?;

    Ok(LibraryInstallation::new(
        library,
        location,
        InstallOrigin::Built,
    ))
}
