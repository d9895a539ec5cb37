//! Option resolution
//!
//! Turns the raw string-keyed options of a part into a typed
//! [`BuildRequest`] and validates the constraints between them. The
//! canonical form of every option is returned as a [`ResolvedConfiguration`]
//! so callers can inspect the effective configuration; resolving that
//! configuration again yields the same request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::library::{native_libraries, NativeLibrary, LIBXML2, LIBXSLT};
use crate::core::platform::PlatformCaps;
use crate::error::ConfigurationError;

/// Raw options of a part, keyed by option name
pub type OptionMap = BTreeMap<String, String>;

/// Force rebuilding both native libraries
pub const OPT_FORCE: &str = "force";
/// Link the binding against static archives
pub const OPT_STATIC_BUILD: &str = "static-build";
/// Parts root; the native libraries and the binding install under it
pub const OPT_LOCATION: &str = "location";
/// Output only: the binding's install directory
pub const OPT_DESTINATION: &str = "destination";
/// Python interpreter used for the binding build
pub const OPT_PYTHON: &str = "python";
/// Binding source archive
pub const OPT_BINDING_URL: &str = "lxml-url";
/// Already extracted binding source tree
pub const OPT_BINDING_SOURCE: &str = "lxml-source";

/// Coerce an option value to a boolean
///
/// Only the literal strings `true` and `True` are true.
pub fn parse_bool(value: Option<&str>) -> bool {
    matches!(value, Some("true" | "True"))
}

/// Canonical string form of a boolean option
pub fn canonical_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn non_empty<'a>(options: &'a OptionMap, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

/// Per-library part of a build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRequest {
    /// Build from source rather than use `location`
    pub build: bool,
    /// Rebuild even if a finished build is already present
    pub force: bool,
    /// Existing installation to use instead of building
    pub location: Option<PathBuf>,
    /// Source archive override
    pub url: Option<String>,
    /// Expected SHA-256 of the source archive
    pub sha256: Option<String>,
    /// Explicit config executable
    pub config: Option<PathBuf>,
}

impl LibraryRequest {
    /// Source archive to build from
    pub fn url_or_default<'a>(&'a self, library: &'a NativeLibrary) -> &'a str {
        self.url.as_deref().unwrap_or(library.default_url)
    }
}

/// Typed, validated configuration for one install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Part name
    pub name: String,
    /// libxml2 request
    pub libxml2: LibraryRequest,
    /// libxslt request
    pub libxslt: LibraryRequest,
    /// Link the binding statically
    pub static_build: bool,
    /// Global force flag, the default for both libraries
    pub force: bool,
    /// Parts root
    pub location: PathBuf,
    /// Binding install directory
    pub destination: PathBuf,
    /// Python interpreter
    pub python: String,
    /// Binding source archive override
    pub binding_url: Option<String>,
    /// Binding source tree
    pub binding_source: Option<PathBuf>,
}

impl BuildRequest {
    /// The request for one of the native libraries
    pub fn library(&self, library: &NativeLibrary) -> &LibraryRequest {
        if library == &LIBXSLT {
            &self.libxslt
        } else {
            &self.libxml2
        }
    }
}

/// Effective configuration after resolution
///
/// Holds every option in canonical form: aliases replaced by their
/// canonical keys and booleans spelled `true` / `false`. The installer adds
/// resolved locations, URLs and compile flags as it goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    options: OptionMap,
}

impl ResolvedConfiguration {
    /// Get an option value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Record an option value
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.options.insert(key.to_string(), value.into());
    }

    /// All options
    pub fn as_map(&self) -> &OptionMap {
        &self.options
    }

    /// Consume into the option map
    pub fn into_map(self) -> OptionMap {
        self.options
    }
}

/// Replace generic alias keys with their canonical names
///
/// The canonical key wins when both are present.
pub fn normalize_aliases(raw: &OptionMap) -> OptionMap {
    let mut options = raw.clone();
    for library in native_libraries() {
        for (alias, canonical) in library.aliases {
            if let Some(value) = options.remove(*alias) {
                if options.contains_key(*canonical) {
                    tracing::debug!("Ignoring '{alias}': '{canonical}' is also set");
                } else {
                    options.insert((*canonical).to_string(), value);
                }
            }
        }
    }
    options
}

/// Resolves raw options into a [`BuildRequest`]
#[derive(Debug, Clone)]
pub struct OptionResolver<'a> {
    platform: &'a PlatformCaps,
    name: String,
    default_location: PathBuf,
}

impl<'a> OptionResolver<'a> {
    /// Create a resolver for the given platform and default parts root
    pub fn new(platform: &'a PlatformCaps, default_location: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            name: defaults::DEFAULT_PART_NAME.to_string(),
            default_location: default_location.into(),
        }
    }

    /// Set the part name
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Resolve and validate raw options
    pub fn resolve(
        &self,
        raw: &OptionMap,
    ) -> Result<(BuildRequest, ResolvedConfiguration), ConfigurationError> {
        let mut options = normalize_aliases(raw);

        let force = parse_bool(options.get(OPT_FORCE).map(String::as_str));
        options.insert(OPT_FORCE.to_string(), canonical_bool(force).to_string());

        let libxml2 = resolve_library(&mut options, &LIBXML2, force)?;
        let libxslt = resolve_library(&mut options, &LIBXSLT, force)?;

        let static_build = match options.get(OPT_STATIC_BUILD) {
            Some(value) => parse_bool(Some(value)),
            None => self.platform.static_build_default,
        };
        if static_build && !(libxml2.build && libxslt.build) {
            return Err(ConfigurationError::StaticRequiresBuild {
                first: LIBXML2.build_option.to_string(),
                second: LIBXSLT.build_option.to_string(),
            });
        }
        if static_build {
            tracing::info!("Static build requested.");
        }
        options.insert(
            OPT_STATIC_BUILD.to_string(),
            canonical_bool(static_build).to_string(),
        );

        let location = non_empty(&options, OPT_LOCATION)
            .map_or_else(|| self.default_location.clone(), PathBuf::from);
        let destination = location.join(&self.name);
        options.insert(OPT_LOCATION.to_string(), path_string(&location));
        options.insert(OPT_DESTINATION.to_string(), path_string(&destination));

        let python = non_empty(&options, OPT_PYTHON)
            .unwrap_or(defaults::DEFAULT_PYTHON)
            .to_string();

        let request = BuildRequest {
            name: self.name.clone(),
            libxml2,
            libxslt,
            static_build,
            force,
            location,
            destination,
            python,
            binding_url: non_empty(&options, OPT_BINDING_URL).map(String::from),
            binding_source: non_empty(&options, OPT_BINDING_SOURCE).map(PathBuf::from),
        };

        Ok((request, ResolvedConfiguration { options }))
    }
}

fn resolve_library(
    options: &mut OptionMap,
    library: &NativeLibrary,
    global_force: bool,
) -> Result<LibraryRequest, ConfigurationError> {
    let build = options
        .get(library.build_option)
        .map_or(true, |v| parse_bool(Some(v)));
    options.insert(
        library.build_option.to_string(),
        canonical_bool(build).to_string(),
    );

    let force = options
        .get(library.force_option)
        .map_or(global_force, |v| parse_bool(Some(v)));
    options.insert(
        library.force_option.to_string(),
        canonical_bool(force).to_string(),
    );

    let location = non_empty(options, library.location_option).map(PathBuf::from);
    if !build && location.is_none() {
        return Err(ConfigurationError::MissingLocation {
            library: library.name.to_string(),
            build_option: library.build_option.to_string(),
            location_option: library.location_option.to_string(),
        });
    }

    Ok(LibraryRequest {
        build,
        force,
        location,
        url: non_empty(options, library.url_option).map(String::from),
        sha256: non_empty(options, library.sha256_option).map(String::from),
        config: non_empty(options, library.config_option).map(PathBuf::from),
    })
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::PlatformClass;
    use crate::test_utils::generators::{bool_spelling, option_map};
    use proptest::prelude::*;

    fn elf() -> PlatformCaps {
        PlatformCaps::for_class(PlatformClass::Elf)
    }

    fn macos() -> PlatformCaps {
        PlatformCaps::for_class(PlatformClass::MacOs)
    }

    fn opts(pairs: &[(&str, &str)]) -> OptionMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    // ============================================
    // Unit Tests
    // ============================================

    #[test]
    fn test_parse_bool_literals() {
        assert!(parse_bool(Some("true")));
        assert!(parse_bool(Some("True")));
        assert!(!parse_bool(Some("TRUE")));
        assert!(!parse_bool(Some("yes")));
        assert!(!parse_bool(Some("1")));
        assert!(!parse_bool(Some("")));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_defaults_on_elf() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, resolved) = resolver.resolve(&OptionMap::new()).unwrap();

        assert!(request.libxml2.build);
        assert!(request.libxslt.build);
        assert!(!request.static_build);
        assert!(!request.force);
        assert_eq!(request.location, PathBuf::from("/parts"));
        assert_eq!(request.destination, PathBuf::from("/parts/lxml"));
        assert_eq!(request.python, "python3");

        assert_eq!(resolved.get("build-libxml2"), Some("true"));
        assert_eq!(resolved.get("build-libxslt"), Some("true"));
        assert_eq!(resolved.get("static-build"), Some("false"));
        assert_eq!(resolved.get("force"), Some("false"));
        assert_eq!(resolved.get("destination"), Some("/parts/lxml"));
    }

    #[test]
    fn test_static_default_on_macos() {
        let caps = macos();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, resolved) = resolver.resolve(&OptionMap::new()).unwrap();

        assert!(request.static_build);
        assert_eq!(resolved.get("static-build"), Some("true"));
    }

    #[test]
    fn test_explicit_static_overrides_platform_default() {
        let caps = macos();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, _) = resolver
            .resolve(&opts(&[("static-build", "false")]))
            .unwrap();
        assert!(!request.static_build);
    }

    #[test]
    fn test_missing_xml2_location_rejected() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let err = resolver
            .resolve(&opts(&[("build-libxml2", "false")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::MissingLocation { ref location_option, .. }
                if location_option == "xml2-location"
        ));
    }

    #[test]
    fn test_missing_xslt_location_rejected() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let err = resolver
            .resolve(&opts(&[("build-libxslt", "false"), ("xslt-location", "  ")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::MissingLocation { ref library, .. } if library == "libxslt"
        ));
    }

    #[test]
    fn test_configured_location_accepted() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, _) = resolver
            .resolve(&opts(&[
                ("build-libxslt", "false"),
                ("xslt-location", "/opt/xslt"),
            ]))
            .unwrap();

        assert!(!request.libxslt.build);
        assert_eq!(request.libxslt.location, Some(PathBuf::from("/opt/xslt")));
    }

    #[test]
    fn test_static_build_requires_both_builds() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let err = resolver
            .resolve(&opts(&[
                ("static-build", "true"),
                ("build-libxml2", "false"),
                ("xml2-location", "/opt/xml2"),
            ]))
            .unwrap_err();

        assert!(matches!(err, ConfigurationError::StaticRequiresBuild { .. }));
    }

    #[test]
    fn test_generic_aliases_are_canonicalized() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, resolved) = resolver
            .resolve(&opts(&[
                ("build-lib-a", "false"),
                ("lib-a-location", "/opt/xml2"),
                ("lib-b-url", "https://example.com/libxslt.tar.gz"),
            ]))
            .unwrap();

        assert!(!request.libxml2.build);
        assert_eq!(request.libxml2.location, Some(PathBuf::from("/opt/xml2")));
        assert_eq!(
            request.libxslt.url.as_deref(),
            Some("https://example.com/libxslt.tar.gz")
        );
        assert!(resolved.get("build-lib-a").is_none());
        assert_eq!(resolved.get("build-libxml2"), Some("false"));
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, _) = resolver
            .resolve(&opts(&[("lib-a-url", "alias"), ("libxml2-url", "canonical")]))
            .unwrap();
        assert_eq!(request.libxml2.url.as_deref(), Some("canonical"));
    }

    #[test]
    fn test_force_applies_to_both_libraries() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, _) = resolver.resolve(&opts(&[("force", "True")])).unwrap();
        assert!(request.force);
        assert!(request.libxml2.force);
        assert!(request.libxslt.force);
    }

    #[test]
    fn test_per_library_force_overrides_global() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, resolved) = resolver
            .resolve(&opts(&[("force", "true"), ("force-libxslt", "false")]))
            .unwrap();
        assert!(request.libxml2.force);
        assert!(!request.libxslt.force);
        assert_eq!(resolved.get("force-libxslt"), Some("false"));
    }

    #[test]
    fn test_custom_name_and_location() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts").with_name("lxml-static");
        let (request, _) = resolver
            .resolve(&opts(&[("location", "/srv/build")]))
            .unwrap();
        assert_eq!(request.destination, PathBuf::from("/srv/build/lxml-static"));
    }

    #[test]
    fn test_library_accessor() {
        let caps = elf();
        let resolver = OptionResolver::new(&caps, "/parts");
        let (request, _) = resolver
            .resolve(&opts(&[("libxslt-url", "x"), ("libxml2-url", "y")]))
            .unwrap();
        assert_eq!(request.library(&LIBXSLT).url.as_deref(), Some("x"));
        assert_eq!(request.library(&LIBXML2).url.as_deref(), Some("y"));
        assert_eq!(
            request.library(&LIBXSLT).url_or_default(&LIBXSLT),
            "x"
        );
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Static builds are rejected unless both libraries are built
        #[test]
        fn prop_static_requires_both_builds(
            xml2 in bool_spelling(),
            xslt in bool_spelling(),
        ) {
            let caps = elf();
            let resolver = OptionResolver::new(&caps, "/parts");
            let raw = opts(&[
                ("static-build", "true"),
                ("build-libxml2", &xml2),
                ("build-libxslt", &xslt),
                ("xml2-location", "/opt/xml2"),
                ("xslt-location", "/opt/xslt"),
            ]);
            let both = parse_bool(Some(&xml2)) && parse_bool(Some(&xslt));
            let result = resolver.resolve(&raw);
            if both {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(
                    matches!(result, Err(ConfigurationError::StaticRequiresBuild { .. })),
                    "expected rejection, got {:?}", result
                );
            }
        }

        /// A library that is not built needs a location
        #[test]
        fn prop_unbuilt_library_needs_location(build in bool_spelling()) {
            let caps = elf();
            let resolver = OptionResolver::new(&caps, "/parts");
            let raw = opts(&[("build-libxslt", &build), ("static-build", "false")]);
            let result = resolver.resolve(&raw);
            if parse_bool(Some(&build)) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(
                    matches!(result, Err(ConfigurationError::MissingLocation { .. })),
                    "expected rejection, got {:?}", result
                );
            }
        }

        /// Resolving the resolved configuration again yields the same request
        #[test]
        fn prop_resolution_round_trips(raw in option_map()) {
            let caps = elf();
            let resolver = OptionResolver::new(&caps, "/parts");
            if let Ok((request, resolved)) = resolver.resolve(&raw) {
                let (again, resolved_again) = resolver.resolve(resolved.as_map()).unwrap();
                prop_assert_eq!(request, again);
                prop_assert_eq!(resolved, resolved_again);
            }
        }
    }
}
