//! Preflight checks for kernel builds.
//!
//! Validates that the host system has required tools before building.
//! This prevents cryptic errors halfway through a kernel build.
//!
//! # Example
//!
//! ```rust
//! use kernel_device_builder::preflight::{command_exists, check_required_tools};
//!
//! // Check a single command
//! if !command_exists("bc") {
//!     println!("bc not installed");
//! }
//!
//! // Check multiple tools
//! let tools = &[("flex", "flex"), ("bison", "bison")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Result};
use std::path::Path;

use crate::device::Device;
use crate::fragments::{self, ResolvedConfig};

/// Check if a command exists on the host system's PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Host tools a kernel build needs.
///
/// Each tuple is (command_name, package_name).
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("make", "make"),
    ("git", "git"),
    ("bc", "bc"),
    ("flex", "flex"),
    ("bison", "bison"),
];

/// Check that specific tools are available.
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` with list of missing tools and their packages
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<_> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .collect();

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Check every tool in [`REQUIRED_TOOLS`].
pub fn check_host_tools() -> Result<()> {
    check_required_tools(REQUIRED_TOOLS)
}

/// Check host tools and the device's config files together.
///
/// Every problem found is reported in one error, tools first.
pub fn check_build_inputs(
    tools: &[(&str, &str)],
    kernel_source: &Path,
    device: &Device,
) -> Result<Vec<ResolvedConfig>> {
    let tools_result = check_required_tools(tools);
    let configs_result = fragments::check(kernel_source, device);

    match (tools_result, configs_result) {
        (Ok(()), Ok(resolved)) => Ok(resolved),
        (Err(e), Ok(_)) | (Ok(()), Err(e)) => Err(e),
        (Err(tools_err), Err(configs_err)) => bail!("{}\n{}", tools_err, configs_err),
    }
}
