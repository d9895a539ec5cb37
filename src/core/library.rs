//! Native library descriptors
//!
//! The two native libraries are fixed: libxml2 is always resolved first
//! because libxslt's configure step needs its install prefix. Each
//! descriptor carries the option keys and file names the rest of the crate
//! needs, so no component hard-codes a library name.

use std::fmt;

/// Static description of one native library
#[derive(Debug, PartialEq, Eq)]
pub struct NativeLibrary {
    /// Library name, also the parts sub-directory it builds into
    pub name: &'static str,
    /// Config executable installed under `bin/`; its presence marks a finished build
    pub marker: &'static str,
    /// Environment variable the binding build reads the config executable from
    pub env_var: &'static str,
    /// Header directory relative to the install root
    pub include_subdir: &'static str,
    /// Default source archive
    pub default_url: &'static str,
    /// `build-*` option
    pub build_option: &'static str,
    /// `force-*` option
    pub force_option: &'static str,
    /// `*-location` option
    pub location_option: &'static str,
    /// `*-url` option
    pub url_option: &'static str,
    /// `*-sha256` option
    pub sha256_option: &'static str,
    /// `*-config` option
    pub config_option: &'static str,
    /// Generic alias keys, paired with the canonical key they stand for
    pub aliases: &'static [(&'static str, &'static str)],
}

impl fmt::Display for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The XML parsing library
pub static LIBXML2: NativeLibrary = NativeLibrary {
    name: "libxml2",
    marker: "xml2-config",
    env_var: "XML_CONFIG",
    include_subdir: "include/libxml2",
    default_url: crate::config::urls::LIBXML2_URL,
    build_option: "build-libxml2",
    force_option: "force-libxml2",
    location_option: "xml2-location",
    url_option: "libxml2-url",
    sha256_option: "libxml2-sha256",
    config_option: "xml2-config",
    aliases: &[
        ("build-lib-a", "build-libxml2"),
        ("force-lib-a", "force-libxml2"),
        ("lib-a-location", "xml2-location"),
        ("lib-a-url", "libxml2-url"),
        ("lib-a-config", "xml2-config"),
    ],
};

/// The XSLT library, linked against libxml2
pub static LIBXSLT: NativeLibrary = NativeLibrary {
    name: "libxslt",
    marker: "xslt-config",
    env_var: "XSLT_CONFIG",
    include_subdir: "include",
    default_url: crate::config::urls::LIBXSLT_URL,
    build_option: "build-libxslt",
    force_option: "force-libxslt",
    location_option: "xslt-location",
    url_option: "libxslt-url",
    sha256_option: "libxslt-sha256",
    config_option: "xslt-config",
    aliases: &[
        ("build-lib-b", "build-libxslt"),
        ("force-lib-b", "force-libxslt"),
        ("lib-b-location", "xslt-location"),
        ("lib-b-url", "libxslt-url"),
        ("lib-b-config", "xslt-config"),
    ],
};

/// Both libraries in dependency order
pub fn native_libraries() -> [&'static NativeLibrary; 2] {
    [&LIBXML2, &LIBXSLT]
}
