//! Check command implementation
//!
//! Implements `staticlxml check`: resolves the options without building and
//! prints the effective configuration.

use anyhow::Result;

use super::OptionArgs;
use crate::cli::output::{is_json, print_detail, print_info, print_success};
use crate::core::library::{LIBXML2, LIBXSLT};
use crate::core::platform::PlatformCaps;

/// Execute the check command
pub fn execute(args: &OptionArgs) -> Result<()> {
    let platform = PlatformCaps::detect();
    let dirs = args.dirs()?;
    let (request, resolved) = args.resolve(&platform, &dirs.parts_dir())?;

    if is_json() {
        let json = serde_json::json!({
            "status": "success",
            "name": request.name,
            "platform": platform.class.to_string(),
            "options": resolved.as_map(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    print_success(&format!("Options for '{}' are valid", request.name));
    print_info(&format!("Platform: {}", platform.class));
    for (library, req) in [(&LIBXML2, &request.libxml2), (&LIBXSLT, &request.libxslt)] {
        let how = match &req.location {
            _ if req.build => format!("build from {}", req.url_or_default(library)),
            Some(location) => format!("use {}", location.display()),
            None => "unset".to_string(),
        };
        print_detail(&format!("{library}: {how}"));
    }
    print_detail(&format!("destination: {}", request.destination.display()));

    print_info("Effective configuration:");
    for (key, value) in resolved.as_map() {
        print_detail(&format!("{key} = {value}"));
    }
    Ok(())
}
