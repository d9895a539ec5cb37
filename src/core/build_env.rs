//! Binding build environment
//!
//! Derives the compiler search paths and the environment variables handed
//! to the binding build from the two native library installations.
//! libxml2's paths always come first: some toolchains resolve symbols by
//! first match.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::core::library::{LIBXML2, LIBXSLT};
use crate::core::native::LibraryInstallation;
use crate::core::platform::PlatformCaps;

/// Search paths and libraries for compiling the binding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileFlags {
    /// Header directories (`-I`)
    pub include_dirs: Vec<PathBuf>,
    /// Library directories (`-L`)
    pub library_dirs: Vec<PathBuf>,
    /// Runtime search paths (`-R`)
    pub rpath: Vec<PathBuf>,
    /// Extra libraries to link (`-l`)
    pub libraries: BTreeSet<String>,
}

impl CompileFlags {
    /// Derive flags from the libxml2 and libxslt installations
    pub fn from_installations(
        libxml2: &LibraryInstallation,
        libxslt: &LibraryInstallation,
        platform: &PlatformCaps,
    ) -> Self {
        Self {
            include_dirs: vec![libxml2.include_dir(), libxslt.include_dir()],
            library_dirs: vec![libxml2.lib_dir(), libxslt.lib_dir()],
            rpath: vec![libxml2.lib_dir(), libxslt.lib_dir()],
            libraries: platform
                .extra_libraries
                .iter()
                .map(|l| (*l).to_string())
                .collect(),
        }
    }

    /// Option-style rendering: key and space-separated value
    pub fn to_options(&self) -> Vec<(&'static str, String)> {
        vec![
            ("include-dirs", join_paths(&self.include_dirs, " ")),
            ("library-dirs", join_paths(&self.library_dirs, " ")),
            ("rpath", join_paths(&self.rpath, " ")),
            ("libraries", self.libraries.iter().cloned().collect::<Vec<_>>().join(" ")),
        ]
    }
}

/// Join paths with a separator
pub fn join_paths(paths: &[PathBuf], separator: &str) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Environment for the binding build
///
/// The binding's `setup.py` reads `XML_CONFIG` / `XSLT_CONFIG` to query
/// compiler flags and links with `LDSHARED`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolchainEnvironment {
    /// Path to `xml2-config`
    pub xml_config: PathBuf,
    /// Path to `xslt-config`
    pub xslt_config: PathBuf,
    /// Shared-object link command, when the host reports one
    pub ldshared: Option<String>,
}

impl ToolchainEnvironment {
    /// Create an environment from the two config executables
    pub fn new(xml_config: PathBuf, xslt_config: PathBuf) -> Self {
        Self {
            xml_config,
            xslt_config,
            ldshared: None,
        }
    }

    /// Set the shared-object link command
    #[must_use]
    pub fn with_ldshared(mut self, ldshared: Option<String>) -> Self {
        self.ldshared = ldshared;
        self
    }

    /// Convert to environment variable map for process execution
    pub fn to_env_map(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert(LIBXML2.env_var.to_string(), self.xml_config.display().to_string());
        env.insert(LIBXSLT.env_var.to_string(), self.xslt_config.display().to_string());

        if let Some(ref ldshared) = self.ldshared {
            env.insert("LDSHARED".to_string(), ldshared.clone());
        }

        env
    }

    /// Check that both config executables are set
    pub fn validate(&self) -> Result<(), BuildEnvError> {
        if self.xml_config.as_os_str().is_empty() {
            return Err(BuildEnvError::MissingVariable(LIBXML2.env_var.to_string()));
        }
        if self.xslt_config.as_os_str().is_empty() {
            return Err(BuildEnvError::MissingVariable(LIBXSLT.env_var.to_string()));
        }
        if self.ldshared.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(BuildEnvError::InvalidValue {
                variable: "LDSHARED".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

/// Build environment errors
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEnvError {
    /// Required variable is missing
    MissingVariable(String),
    /// Variable has invalid value
    InvalidValue { variable: String, reason: String },
}

impl std::fmt::Display for BuildEnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVariable(var) => write!(f, "Missing required environment variable: {var}"),
            Self::InvalidValue { variable, reason } => {
                write!(f, "Invalid value for {variable}: {reason}")
            }
        }
    }
}

impl std::error::Error for BuildEnvError {}
