//! Toolchain configuration
//!
//! Finds the `xml2-config` / `xslt-config` executables the binding build
//! queries for compiler flags, and adjusts the host's shared-object link
//! command (`LDSHARED`) for the platform.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::native::LibraryInstallation;
use crate::core::options::BuildRequest;
use crate::core::platform::PlatformCaps;
use crate::error::ConfigurationError;
use crate::infra::filesystem::absolute_path;
use crate::infra::locator::{locate, SearchPath};

/// How a config executable was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named in the options
    Explicit,
    /// Found by searching the installation
    Discovered,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::Discovered => write!(f, "discovered"),
        }
    }
}

/// A resolved config executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigExecutable {
    /// Path to the executable
    pub path: PathBuf,
    /// How it was found
    pub source: ConfigSource,
}

/// Resolve the config executable of one installation
///
/// An explicit path wins; otherwise `<location>/bin` is searched and a
/// warning names what was found. A discovered path is always absolute, as
/// the binding build reads it from another working directory.
pub fn resolve_config(
    installation: &LibraryInstallation,
    explicit: Option<&Path>,
) -> Result<ConfigExecutable, ConfigurationError> {
    let library = installation.library;

    if let Some(path) = explicit {
        tracing::debug!("{}: {}", library.marker, path.display());
        return Ok(ConfigExecutable {
            path: path.to_path_buf(),
            source: ConfigSource::Explicit,
        });
    }

    let bin_dir = installation.bin_dir();
    let found = locate(library.marker, &SearchPath::dir(&bin_dir)).ok_or_else(|| {
        ConfigurationError::ConfigNotFound {
            tool: library.marker.to_string(),
            option: library.config_option.to_string(),
            searched: bin_dir.display().to_string(),
        }
    })?;
    // `.` is searched first, so a hit may be relative to the working directory
    let path = absolute_path(&found).unwrap_or(found);

    tracing::warn!("Using {} found in {}.", library.marker, path.display());
    Ok(ConfigExecutable {
        path,
        source: ConfigSource::Discovered,
    })
}

/// Resolve both config executables, libxml2 first
pub fn resolve_configs(
    libxml2: &LibraryInstallation,
    libxslt: &LibraryInstallation,
    request: &BuildRequest,
) -> Result<(ConfigExecutable, ConfigExecutable), ConfigurationError> {
    let xml2 = resolve_config(libxml2, request.libxml2.config.as_deref())?;
    let xslt = resolve_config(libxslt, request.libxslt.config.as_deref())?;
    Ok((xml2, xslt))
}

/// Adjust the host's `LDSHARED` for the platform
///
/// Known-bad search flags are removed and, for static builds, the flag that
/// makes the linker try static archives first is appended. Platforms with
/// nothing to adjust get the value back untouched.
pub fn compute_link_environment(
    ldshared: &str,
    platform: &PlatformCaps,
    static_build: bool,
) -> String {
    tracing::debug!("LDSHARED={ldshared}");

    let static_flag = platform.static_link_flag.filter(|_| static_build);
    let strips = ldshared
        .split_whitespace()
        .any(|token| is_stripped(platform, token));
    if !strips && static_flag.is_none() {
        return ldshared.to_string();
    }

    let mut tokens: Vec<&str> = Vec::new();
    for token in ldshared.split_whitespace() {
        if is_stripped(platform, token) {
            tracing::warn!("Removing '{token}' from LDSHARED");
        } else {
            tokens.push(token);
        }
    }
    if let Some(flag) = static_flag {
        tracing::info!("Static build, adding '{flag}'");
        tokens.push(flag);
    }

    let adjusted = tokens.join(" ");
    tracing::debug!("LDSHARED'={adjusted}");
    adjusted
}

fn is_stripped(platform: &PlatformCaps, token: &str) -> bool {
    platform.ldshared_strip.iter().any(|flag| *flag == token)
}
