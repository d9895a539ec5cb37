//! Platform-specific directory management
//!
//! Native libraries build into the parts directory, one sub-directory per
//! library; source archives are cached under the downloads directory.
//! Follows XDG on Linux and `~/Library` on macOS.
//!
//! Environment variables can override default directories:
//! - `STATICLXML_PARTS_DIR` - Override parts directory
//! - `STATICLXML_CACHE_DIR` - Override cache directory

use std::env;
use std::path::PathBuf;

/// Environment variable names for directory overrides
pub const ENV_PARTS_DIR: &str = "STATICLXML_PARTS_DIR";
pub const ENV_CACHE_DIR: &str = "STATICLXML_CACHE_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "staticlxml";

const PARTS_SUBDIR: &str = "parts";
const DOWNLOADS_SUBDIR: &str = "downloads";

/// Platform-specific directory provider for staticlxml
#[derive(Debug, Clone)]
pub struct StaticLxmlDirs {
    parts_dir: PathBuf,
    cache_dir: PathBuf,
}

impl StaticLxmlDirs {
    /// Create a new `StaticLxmlDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts_dir: Self::resolve_parts_dir(),
            cache_dir: Self::resolve_cache_dir(),
        }
    }

    /// Use explicit directories
    #[must_use]
    pub fn with_dirs(parts_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            parts_dir,
            cache_dir,
        }
    }

    /// Default parts root
    ///
    /// - Linux: `$XDG_DATA_HOME/staticlxml/parts` or `~/.local/share/staticlxml/parts`
    /// - macOS: `~/Library/Application Support/staticlxml/parts`
    #[must_use]
    pub fn parts_dir(&self) -> PathBuf {
        self.parts_dir.clone()
    }

    /// Cache directory
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    /// Source archive cache, under the cache directory
    #[must_use]
    pub fn downloads_dir(&self) -> PathBuf {
        self.cache_dir.join(DOWNLOADS_SUBDIR)
    }

    fn resolve_parts_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_PARTS_DIR) {
            return PathBuf::from(path);
        }

        dirs::data_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".local").join("share").join(APP_NAME))
                    .unwrap_or_else(|| {
                        PathBuf::from(".").join(".local").join("share").join(APP_NAME)
                    })
            })
            .join(PARTS_SUBDIR)
    }

    fn resolve_cache_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CACHE_DIR) {
            return PathBuf::from(path);
        }

        dirs::cache_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".cache").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".cache").join(APP_NAME))
            })
    }
}

impl Default for StaticLxmlDirs {
    fn default() -> Self {
        Self::new()
    }
}
