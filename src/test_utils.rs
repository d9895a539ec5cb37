//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::options::OptionMap;

    /// Spellings a user might write for a boolean option
    pub fn bool_spelling() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("true".to_string()),
            Just("True".to_string()),
            Just("TRUE".to_string()),
            Just("false".to_string()),
            Just("False".to_string()),
            Just("yes".to_string()),
            Just("1".to_string()),
            Just(String::new()),
        ]
    }

    /// Generate an absolute path
    pub fn abs_path() -> impl Strategy<Value = String> {
        "(/[a-z][a-z0-9_-]{0,8}){1,4}"
    }

    /// Generate a source archive URL
    pub fn url() -> impl Strategy<Value = String> {
        (
            prop_oneof!["https", "http"],
            "[a-z]{3,10}",
            "[a-z]{2,5}",
            "[a-z0-9-]{1,20}",
        )
            .prop_map(|(scheme, domain, tld, path)| {
                format!("{scheme}://{domain}.{tld}/{path}.tar.gz")
            })
    }

    /// Generate an option value fitting the given key
    fn value_for(key: &'static str) -> BoxedStrategy<String> {
        if key.ends_with("-location") || key.ends_with("-config") || key == "location" {
            abs_path().boxed()
        } else if key.ends_with("-url") {
            url().boxed()
        } else {
            bool_spelling().boxed()
        }
    }

    /// Generate a raw option map, including generic alias keys
    pub fn option_map() -> impl Strategy<Value = OptionMap> {
        const KEYS: &[&str] = &[
            "force",
            "static-build",
            "location",
            "build-libxml2",
            "build-libxslt",
            "build-lib-a",
            "build-lib-b",
            "force-libxml2",
            "force-lib-b",
            "xml2-location",
            "xslt-location",
            "lib-a-location",
            "libxml2-url",
            "lib-b-url",
            "xslt-config",
        ];
        let entries: Vec<_> = KEYS
            .iter()
            .map(|key| proptest::option::of(value_for(key)).prop_map(move |v| (*key, v)))
            .collect();
        entries.prop_map(|pairs| {
            pairs
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
                .collect()
        })
    }
}

/// Scratch directories addressed by paths relative to the working directory
#[cfg(test)]
pub mod scratch {
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// A temporary directory under the working directory, and its relative path
    pub fn relative_tempdir() -> (TempDir, PathBuf) {
        let dir = tempfile::Builder::new()
            .prefix(".staticlxml-test")
            .tempdir_in(".")
            .unwrap();
        let cwd = std::env::current_dir().unwrap();
        let relative = dir
            .path()
            .strip_prefix(&cwd)
            .unwrap_or(dir.path())
            .to_path_buf();
        (dir, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use super::scratch::relative_tempdir;
    use proptest::prelude::*;

    #[test]
    fn test_relative_tempdir_is_relative() {
        let (_guard, relative) = relative_tempdir();
        assert!(relative.is_relative());
        assert!(relative.is_dir());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_abs_path_generator(path in abs_path()) {
            prop_assert!(path.starts_with('/'));
            prop_assert!(!path.ends_with('/'));
        }

        #[test]
        fn test_url_generator(url in url()) {
            prop_assert!(url.starts_with("http"));
            prop_assert!(url.ends_with(".tar.gz"));
        }

        #[test]
        fn test_option_map_generator_keys_are_known(map in option_map()) {
            for key in map.keys() {
                prop_assert!(!key.is_empty());
            }
        }
    }
}
