//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod check;
pub mod install;
pub mod locate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::config::defaults;
use crate::core::library::native_libraries;
use crate::core::options::{
    normalize_aliases, BuildRequest, OptionMap, OptionResolver, ResolvedConfiguration,
    OPT_BINDING_SOURCE, OPT_LOCATION,
};
use crate::core::options_file::{overlay, OptionsFile};
use crate::core::platform::PlatformCaps;
use crate::infra::dirs::StaticLxmlDirs;
use crate::infra::filesystem::absolute_path;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build libxml2, libxslt and the lxml binding
    Install {
        #[command(flatten)]
        options: OptionArgs,
    },

    /// Resolve the options and show the effective configuration
    Check {
        #[command(flatten)]
        options: OptionArgs,
    },

    /// Find an executable along a search path
    Locate {
        /// File name or shell pattern matched against file stems
        name: String,

        /// Path list to search instead of PATH
        #[arg(long)]
        path: Option<String>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Install { options } => install::execute(&options).await,
            Self::Check { options } => check::execute(&options),
            Self::Locate { name, path } => locate::execute(&name, path.as_deref()),
        }
    }
}

/// Where options come from
#[derive(Args, Debug, Clone)]
pub struct OptionArgs {
    /// Options file
    #[arg(long = "config", default_value = defaults::DEFAULT_OPTIONS_FILE)]
    pub config: PathBuf,

    /// Part name; selects the table in the options file and names the install directory
    #[arg(long, default_value = defaults::DEFAULT_PART_NAME)]
    pub name: String,

    /// Set an option, overriding the options file (repeatable)
    #[arg(
        short = 'o',
        long = "option",
        value_name = "KEY=VALUE",
        value_parser = parse_key_val
    )]
    pub options: Vec<(String, String)>,

    /// Parts root for native library builds
    #[arg(long, env = "STATICLXML_PARTS_DIR")]
    pub parts_dir: Option<PathBuf>,
}

impl OptionArgs {
    /// Raw options: the options file overlaid by `--option` flags
    ///
    /// Relative paths are anchored at the working directory, since the
    /// build tools run from inside the unpacked source trees.
    pub fn raw_options(&self) -> Result<OptionMap> {
        let file = OptionsFile::load_from_path(&self.config)
            .with_context(|| format!("Failed to load options from {}", self.config.display()))?;
        let mut raw = normalize_aliases(&overlay(file.options_for(&self.name), &self.options));

        for key in path_options() {
            let Some(value) = raw.get_mut(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let path = absolute_path(Path::new(value.as_str()))?;
            *value = path.display().to_string();
        }
        Ok(raw)
    }

    /// Directories, honouring `--parts-dir`, anchored at the working directory
    pub fn dirs(&self) -> Result<StaticLxmlDirs> {
        let dirs = StaticLxmlDirs::new();
        let parts = self.parts_dir.clone().unwrap_or_else(|| dirs.parts_dir());
        Ok(StaticLxmlDirs::with_dirs(
            absolute_path(&parts)?,
            absolute_path(&dirs.cache_dir())?,
        ))
    }

    /// Resolve options for the host platform
    pub fn resolve(
        &self,
        platform: &PlatformCaps,
        parts_root: &Path,
    ) -> Result<(BuildRequest, ResolvedConfiguration)> {
        let raw = self.raw_options()?;
        tracing::debug!("raw options for {}: {raw:?}", self.name);
        let resolved = OptionResolver::new(platform, parts_root)
            .with_name(&self.name)
            .resolve(&raw)
            .with_context(|| format!("Invalid options for part '{}'", self.name))?;
        Ok(resolved)
    }
}

/// Options whose values are filesystem paths
fn path_options() -> Vec<&'static str> {
    let mut keys = vec![OPT_LOCATION, OPT_BINDING_SOURCE];
    for library in native_libraries() {
        keys.push(library.location_option);
        keys.push(library.config_option);
    }
    keys
}

/// Parse a `key=value` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty option name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
