//! Platform capability table
//!
//! Everything that differs between macOS and ELF hosts lives here as data:
//! the dynamic library extension, which linker flags must be stripped from
//! `LDSHARED`, the flag that makes the linker prefer static archives, whether
//! static builds are the default, and libraries the binding must link
//! explicitly. The table is resolved once at startup and handed to the
//! platform-agnostic components.

use std::fmt;

/// Class of host platform, as far as linking is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformClass {
    /// Linux, the BSDs and other ELF systems
    Elf,
    /// macOS (Mach-O)
    MacOs,
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformClass::Elf => write!(f, "elf"),
            PlatformClass::MacOs => write!(f, "macos"),
        }
    }
}

/// Detect the class of the current host
pub fn detect_platform_class() -> PlatformClass {
    match std::env::consts::OS {
        "macos" | "ios" => PlatformClass::MacOs,
        _ => PlatformClass::Elf,
    }
}

/// Platform-specific link behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCaps {
    /// Platform class these capabilities describe
    pub class: PlatformClass,
    /// Extension of shared libraries, without the dot
    pub dylib_extension: &'static str,
    /// Whether static builds are requested when `static-build` is unset
    pub static_build_default: bool,
    /// Search flags removed from `LDSHARED` (e.g. MacPorts' `-L/opt/local/lib`)
    pub ldshared_strip: &'static [&'static str],
    /// Flag appended to `LDSHARED` for static builds
    pub static_link_flag: Option<&'static str>,
    /// Libraries the binding links explicitly
    pub extra_libraries: &'static [&'static str],
}

impl PlatformCaps {
    /// Capabilities for a given platform class
    pub fn for_class(class: PlatformClass) -> Self {
        match class {
            PlatformClass::Elf => Self {
                class,
                dylib_extension: "so",
                static_build_default: false,
                ldshared_strip: &[],
                static_link_flag: None,
                extra_libraries: &[],
            },
            PlatformClass::MacOs => Self {
                class,
                dylib_extension: "dylib",
                static_build_default: true,
                ldshared_strip: &["-L/opt/local/lib"],
                static_link_flag: Some("-Wl,-search_paths_first"),
                // libxml2 and libxslt need it, lxml's setup.py does not ask for it
                extra_libraries: &["iconv"],
            },
        }
    }

    /// Capabilities of the current host
    pub fn detect() -> Self {
        Self::for_class(detect_platform_class())
    }

    /// Whether a file name is a shared library on this platform
    ///
    /// Versioned ELF names such as `libxml2.so.2.9.14` count as well.
    pub fn is_dynamic_library(&self, file_name: &str) -> bool {
        let suffix = format!(".{}", self.dylib_extension);
        if file_name.ends_with(&suffix) {
            return true;
        }
        self.class == PlatformClass::Elf && file_name.contains(&format!("{suffix}."))
    }
}

impl Default for PlatformCaps {
    fn default() -> Self {
        Self::detect()
    }
}
