//! Configure-make-make-install source builds
//!
//! Fetches a source archive (over HTTP, or straight from a local path),
//! unpacks it with `tar` into a scratch directory next to the install
//! directory, then runs `configure --prefix=<dir>`, `make` and
//! `make install`. The scratch directory is removed afterwards.

use std::path::{Path, PathBuf};
use std::process::Command;

use tokio::runtime::Handle;

use crate::core::library::NativeLibrary;
use crate::core::native::{SourceBuildSpec, SourceBuilder};
use crate::error::SourceBuildError;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem::{
    absolute_path, create_dir_all, find_dir_containing, remove_dir_all_if_exists,
};
use crate::infra::process;

/// How deep below the unpack directory a build script may sit
const SCRIPT_SEARCH_DEPTH: usize = 2;

/// Source builder for autotools projects
#[derive(Debug, Clone)]
pub struct CmmiBuilder {
    parts_root: PathBuf,
    downloads_dir: PathBuf,
    handle: Handle,
    manager: DownloadManager,
    jobs: usize,
}

impl CmmiBuilder {
    /// Create a builder that drives downloads on `handle`
    pub fn new(parts_root: PathBuf, downloads_dir: PathBuf, handle: Handle) -> Self {
        Self {
            parts_root,
            downloads_dir,
            handle,
            manager: DownloadManager::new(),
            jobs: num_cpus::get(),
        }
    }

    /// Set the number of parallel make jobs
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Parts root the libraries install under
    pub fn parts_root(&self) -> &Path {
        &self.parts_root
    }

    /// Get a source archive, returning its local path
    ///
    /// Local paths and `file://` URLs are used in place.
    pub fn fetch(&self, url: &str, sha256: Option<&str>) -> Result<PathBuf, SourceBuildError> {
        if let Some(local) = local_archive(url) {
            tracing::debug!("Using local archive {}", local.display());
            return Ok(local);
        }
        let archive = self
            .handle
            .block_on(self.manager.fetch_cached(url, &self.downloads_dir, sha256))?;
        Ok(archive)
    }

    /// Fetch and unpack an archive into `work_dir`, replacing its contents
    pub fn unpack(
        &self,
        url: &str,
        sha256: Option<&str>,
        work_dir: &Path,
    ) -> Result<PathBuf, SourceBuildError> {
        let archive = self.fetch(url, sha256)?;

        remove_dir_all_if_exists(work_dir)?;
        create_dir_all(work_dir)?;

        tracing::info!("Unpacking {}", archive.display());
        let mut tar = Command::new("tar");
        tar.arg("xf").arg(&archive).arg("-C").arg(work_dir);
        process::run(&mut tar)?;

        Ok(work_dir.to_path_buf())
    }

    fn work_dir(&self, library: &NativeLibrary) -> PathBuf {
        self.parts_root.join(format!("{}__compile__", library.name))
    }
}

impl SourceBuilder for CmmiBuilder {
    fn install_dir(&self, library: &NativeLibrary) -> PathBuf {
        self.parts_root.join(library.name)
    }

    fn build(&self, spec: &SourceBuildSpec<'_>) -> Result<PathBuf, SourceBuildError> {
        let library = spec.library;
        // configure runs inside the source tree and rejects a relative prefix
        let dest = absolute_path(&self.install_dir(library))?;
        let work_dir = absolute_path(&self.work_dir(library))?;

        self.unpack(spec.url, spec.sha256, &work_dir)?;
        let source_dir = find_dir_containing(&work_dir, "configure", SCRIPT_SEARCH_DEPTH)
            .ok_or_else(|| SourceBuildError::NoConfigureScript {
                dir: work_dir.clone(),
            })?;

        create_dir_all(&dest)?;

        tracing::info!("Configuring {library}");
        let mut configure = Command::new(source_dir.join("configure"));
        configure
            .arg(format!("--prefix={}", dest.display()))
            .args(spec.extra_configure_flags)
            .current_dir(&source_dir);
        process::run(&mut configure)?;

        tracing::info!("Compiling {library} with {} jobs", self.jobs);
        let mut make = Command::new("make");
        make.arg(format!("-j{}", self.jobs)).current_dir(&source_dir);
        process::run(&mut make)?;

        let mut install = Command::new("make");
        install.arg("install").current_dir(&source_dir);
        process::run(&mut install)?;

        remove_dir_all_if_exists(&work_dir)?;
        tracing::info!("Installed {library} to {}", dest.display());
        Ok(dest)
    }
}

/// Local archive path for a URL, if it names one
fn local_archive(url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if url.contains("://") {
        return None;
    }
    let path = PathBuf::from(url);
    path.is_file().then_some(path)
}
