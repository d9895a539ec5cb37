//! Install command implementation
//!
//! Implements `staticlxml install`: resolves the options, then runs the
//! whole build on a blocking worker. Downloads are driven on the runtime
//! this command was started from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::runtime::Handle;

use super::OptionArgs;
use crate::cli::output::{create_spinner, is_json, print_detail, print_success};
use crate::config::urls;
use crate::core::installer::{InstallOutcome, Installer};
use crate::core::options::{BuildRequest, ResolvedConfiguration};
use crate::core::platform::PlatformCaps;
use crate::infra::cmmi::CmmiBuilder;
use crate::infra::dirs::StaticLxmlDirs;
use crate::infra::filesystem::find_dir_containing;
use crate::infra::setup_py::SetupPyBuilder;

/// Execute the install command
pub async fn execute(args: &OptionArgs) -> Result<()> {
    let platform = PlatformCaps::detect();
    let dirs = args.dirs()?;
    let (request, resolved) = args.resolve(&platform, &dirs.parts_dir())?;

    tracing::info!("Installing '{}' into {}", request.name, request.destination.display());
    let spinner = create_spinner(&format!("Building {}...", request.name));

    let handle = Handle::current();
    let outcome = tokio::task::spawn_blocking(move || {
        run_install(request, resolved, &platform, &dirs, handle)
    })
    .await
    .context("Install worker panicked")?;

    spinner.finish_and_clear();
    let outcome = outcome?;
    report(&outcome)
}

fn run_install(
    request: BuildRequest,
    resolved: ResolvedConfiguration,
    platform: &PlatformCaps,
    dirs: &StaticLxmlDirs,
    handle: Handle,
) -> Result<InstallOutcome> {
    let sources = source_builder(&request, dirs, handle);
    let source_dir = binding_source(&request, &sources)?;
    let binding = SetupPyBuilder::new(&request.python, source_dir)?;

    let outcome = Installer::new(request, resolved, platform, &sources, &binding).install()?;
    Ok(outcome)
}

/// Native libraries install next to the binding, under `location`
fn source_builder(request: &BuildRequest, dirs: &StaticLxmlDirs, handle: Handle) -> CmmiBuilder {
    CmmiBuilder::new(request.location.clone(), dirs.downloads_dir(), handle)
}

/// Source tree of the binding: configured, or unpacked from its archive
fn binding_source(request: &BuildRequest, sources: &CmmiBuilder) -> Result<PathBuf> {
    if let Some(dir) = &request.binding_source {
        return Ok(dir.clone());
    }

    let url = request.binding_url.as_deref().unwrap_or(urls::LXML_URL);
    let work_dir = sources
        .parts_root()
        .join(format!("{}__source__", request.name));
    sources
        .unpack(url, None, &work_dir)
        .with_context(|| format!("Failed to fetch binding source from {url}"))?;

    find_dir_containing(&work_dir, "setup.py", 2)
        .with_context(|| format!("No setup.py in the archive from {url}"))
}

fn report(outcome: &InstallOutcome) -> Result<()> {
    if is_json() {
        let states: Vec<String> = outcome.states.iter().map(ToString::to_string).collect();
        let json = serde_json::json!({
            "status": "success",
            "locations": outcome.locations,
            "states": states,
            "libxml2": {
                "location": outcome.libxml2.location,
                "origin": outcome.libxml2.origin.to_string(),
            },
            "libxslt": {
                "location": outcome.libxslt.location,
                "origin": outcome.libxslt.origin.to_string(),
            },
            "options": outcome.resolved.as_map(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    print_success(&format!("Installed {} files", outcome.locations.len()));
    for installation in [&outcome.libxml2, &outcome.libxslt] {
        print_detail(&format!(
            "{} ({}): {}",
            installation.library,
            installation.origin,
            installation.location.display()
        ));
    }
    for location in &outcome.locations {
        print_detail(&location.display().to_string());
    }
    Ok(())
}
