//! Locate command implementation
//!
//! Implements `staticlxml locate`: a front end to the executable lookup.

use std::ffi::OsString;

use anyhow::{bail, Result};

use crate::cli::output::is_json;
use crate::infra::locator::{locate, SearchPath};

/// Execute the locate command
pub fn execute(name: &str, path: Option<&str>) -> Result<()> {
    let search = path.map_or(SearchPath::Ambient, |p| SearchPath::Explicit(OsString::from(p)));
    let found = locate(name, &search);

    if is_json() {
        let json = serde_json::json!({
            "name": name,
            "path": found,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if let Some(path) = &found {
        println!("{}", path.display());
    }

    if found.is_none() {
        bail!("'{name}' not found");
    }
    Ok(())
}
