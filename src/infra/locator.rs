//! Executable lookup
//!
//! A `which`-style search over an explicit path list. Besides exact file
//! names, the file stem of each entry (name without its last extension) is
//! matched against the wanted name as a shell pattern, so `xml2-config`
//! also finds `xml2-config.sh` and `xml2-*` finds any of them.
//!
//! The current directory is always searched first. Entries within a
//! directory are visited in lexicographic order, so when several files
//! match the result is the same on every platform.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

/// Where to look for an executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPath {
    /// An explicit path list, separated like `PATH`
    Explicit(OsString),
    /// The process `PATH`
    Ambient,
}

impl SearchPath {
    /// Search a single directory
    pub fn dir(path: &Path) -> Self {
        Self::Explicit(path.as_os_str().to_os_string())
    }

    /// Directories to search, current directory first
    pub fn directories(&self) -> Vec<PathBuf> {
        let joined = match self {
            Self::Explicit(list) => list.clone(),
            Self::Ambient => std::env::var_os("PATH").unwrap_or_default(),
        };

        let mut dirs: Vec<PathBuf> = std::env::split_paths(&joined)
            .filter(|p| p.is_dir())
            .collect();

        let current = PathBuf::from(".");
        if !dirs.contains(&current) {
            dirs.insert(0, current);
        }
        dirs
    }
}

/// Find the first entry matching `name` along `search`
///
/// Returns `None` when nothing matches; whether that is fatal is up to the
/// caller.
pub fn locate(name: &str, search: &SearchPath) -> Option<PathBuf> {
    let matcher = Glob::new(name).ok().map(|g| g.compile_matcher());

    search
        .directories()
        .into_iter()
        .find_map(|dir| locate_in(&dir, name, matcher.as_ref()))
}

fn locate_in(dir: &Path, name: &str, matcher: Option<&GlobMatcher>) -> Option<PathBuf> {
    let mut entries: Vec<OsString> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name())
        .collect();
    entries.sort();

    entries
        .into_iter()
        .find(|file_name| matches_name(file_name, name, matcher))
        .map(|file_name| dir.join(file_name))
}

fn matches_name(file_name: &OsStr, name: &str, matcher: Option<&GlobMatcher>) -> bool {
    if file_name == OsStr::new(name) {
        return true;
    }
    let Some(matcher) = matcher else {
        return false;
    };
    Path::new(file_name)
        .file_stem()
        .is_some_and(|stem| matcher.is_match(stem))
}
