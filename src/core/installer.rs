//! Install driver
//!
//! Sequences one install: libxml2, then libxslt against it, then the config
//! executables, the optional static stripping, and finally the binding.
//! Any failure aborts the install; the visited states are kept on the
//! outcome.

use std::fmt;
use std::path::PathBuf;

use crate::core::build_env::{CompileFlags, ToolchainEnvironment};
use crate::core::builder::{BindingBuildSpec, BindingBuilder};
use crate::core::library::{NativeLibrary, LIBXML2, LIBXSLT};
use crate::core::native::{
    configure_flags, ensure_built, InstallOrigin, LibraryInstallation, SourceBuilder,
};
use crate::core::options::{BuildRequest, ResolvedConfiguration};
use crate::core::platform::PlatformCaps;
use crate::core::toolchain::{compute_link_environment, resolve_configs};
use crate::error::{BuildFailure, ConfigurationError, StaticLxmlError};
use crate::infra::filesystem::strip_dynamic_artifacts;

/// Stage of an install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// Nothing done yet
    Init,
    /// libxml2 built, reused or configured
    Libxml2Built,
    /// libxslt built, reused or configured
    LibxsltBuilt,
    /// Both config executables found
    ConfigsResolved,
    /// Shared libraries removed for a static build
    StaticStripped,
    /// Binding installed
    BindingBuilt,
    /// Finished
    Done,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Libxml2Built => "libxml2-built",
            Self::LibxsltBuilt => "libxslt-built",
            Self::ConfigsResolved => "configs-resolved",
            Self::StaticStripped => "static-stripped",
            Self::BindingBuilt => "binding-built",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful install
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// Files the binding helper installed
    pub locations: Vec<PathBuf>,
    /// Effective configuration, including resolved locations and flags
    pub resolved: ResolvedConfiguration,
    /// States visited, in order
    pub states: Vec<InstallState>,
    /// libxml2 installation
    pub libxml2: LibraryInstallation,
    /// libxslt installation
    pub libxslt: LibraryInstallation,
    /// Environment the binding was built with
    pub environment: ToolchainEnvironment,
}

/// Drives one install through its states
pub struct Installer<'a> {
    request: BuildRequest,
    resolved: ResolvedConfiguration,
    platform: &'a PlatformCaps,
    sources: &'a dyn SourceBuilder,
    binding: &'a dyn BindingBuilder,
    states: Vec<InstallState>,
}

impl<'a> Installer<'a> {
    /// Create an installer for a resolved request
    pub fn new(
        request: BuildRequest,
        resolved: ResolvedConfiguration,
        platform: &'a PlatformCaps,
        sources: &'a dyn SourceBuilder,
        binding: &'a dyn BindingBuilder,
    ) -> Self {
        Self {
            request,
            resolved,
            platform,
            sources,
            binding,
            states: Vec::new(),
        }
    }

    /// Run the install
    pub fn install(mut self) -> Result<InstallOutcome, StaticLxmlError> {
        self.enter(InstallState::Init);

        let xml2_flags = configure_flags(&LIBXML2, None);
        let mut libxml2 = self.native(&LIBXML2, &xml2_flags)?;
        self.enter(InstallState::Libxml2Built);

        let xslt_flags = configure_flags(&LIBXSLT, Some(&libxml2.location));
        let mut libxslt = self.native(&LIBXSLT, &xslt_flags)?;
        self.enter(InstallState::LibxsltBuilt);

        let (xml2_config, xslt_config) = resolve_configs(&libxml2, &libxslt, &self.request)?;
        libxml2.config_executable = Some(xml2_config.path.clone());
        libxslt.config_executable = Some(xslt_config.path.clone());
        self.enter(InstallState::ConfigsResolved);

        if self.request.static_build {
            for installation in [&libxml2, &libxslt] {
                strip_dynamic_artifacts(&installation.location, self.platform)?;
            }
            self.enter(InstallState::StaticStripped);
        }

        let ldshared = self
            .binding
            .shared_link_command()
            .map_err(|e| self.binding_failure(e))?
            .map(|l| compute_link_environment(&l, self.platform, self.request.static_build));

        let environment = ToolchainEnvironment::new(xml2_config.path, xslt_config.path)
            .with_ldshared(ldshared);
        environment
            .validate()
            .map_err(|e| self.binding_failure(e))?;

        let flags = CompileFlags::from_installations(&libxml2, &libxslt, self.platform);
        for (key, value) in flags.to_options() {
            self.resolved.set(key, value);
        }

        let spec = BindingBuildSpec::new(
            &self.request.name,
            self.request.destination.clone(),
            flags,
            &environment,
        );
        tracing::info!("Building {} into {}", spec.name, spec.destination.display());
        let locations = self
            .binding
            .build(&spec)
            .map_err(|e| self.binding_failure(e))?;
        self.enter(InstallState::BindingBuilt);

        self.enter(InstallState::Done);
        Ok(InstallOutcome {
            locations,
            resolved: self.resolved,
            states: self.states,
            libxml2,
            libxslt,
            environment,
        })
    }

    fn enter(&mut self, state: InstallState) {
        tracing::debug!("install state: {state}");
        self.states.push(state);
    }

    fn native(
        &mut self,
        library: &'static NativeLibrary,
        flags: &[String],
    ) -> Result<LibraryInstallation, StaticLxmlError> {
        let request = self.request.library(library);

        let installation = if request.build {
            let installation = ensure_built(library, request, flags, self.sources)?;
            self.resolved
                .set(library.url_option, request.url_or_default(library));
            installation
        } else {
            let location = request.location.clone().ok_or_else(|| {
                ConfigurationError::MissingLocation {
                    library: library.name.to_string(),
                    build_option: library.build_option.to_string(),
                    location_option: library.location_option.to_string(),
                }
            })?;
            tracing::warn!("Using configured {library} at {}", location.display());
            LibraryInstallation::new(library, location, InstallOrigin::Configured)
        };

        self.resolved.set(
            library.location_option,
            installation.location.display().to_string(),
        );
        tracing::info!("{library} {}: {}", installation.origin, installation.location.display());
        Ok(installation)
    }

    fn binding_failure(&self, error: impl ToString) -> StaticLxmlError {
        BuildFailure::Binding {
            binding: self.request.name.clone(),
            error: error.to_string(),
        }
        .into()
    }
}
