//! Locating a device's defconfig and fragments inside a kernel tree.
//!
//! Files are only located and hashed here. Merging them into a `.config`
//! is left to the kernel's own build.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::device::Device;

/// A defconfig or fragment mapped onto the kernel source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Path as written in the descriptor.
    pub name: String,
    /// `<kernel_source>/arch/<arch>/configs/<name>`
    pub path: PathBuf,
    pub exists: bool,
}

/// Directory that defconfigs and fragments are relative to.
pub fn configs_dir(kernel_source: &Path, device: &Device) -> PathBuf {
    kernel_source
        .join("arch")
        .join(device.target_arch.kernel_name())
        .join("configs")
}

/// Resolve the defconfig followed by each fragment, in order.
pub fn resolve(kernel_source: &Path, device: &Device) -> Vec<ResolvedConfig> {
    let dir = configs_dir(kernel_source, device);
    device
        .defconfig_targets()
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            let exists = path.is_file();
            ResolvedConfig { name, path, exists }
        })
        .collect()
}

/// Fail unless the kernel tree exists and holds every config the device names.
///
/// All missing files are reported together.
pub fn check(kernel_source: &Path, device: &Device) -> Result<Vec<ResolvedConfig>> {
    if !kernel_source.is_dir() {
        bail!("Kernel source not found at {}", kernel_source.display());
    }
    if !kernel_source.join("Makefile").is_file() {
        bail!(
            "Invalid kernel source at {} - no Makefile found",
            kernel_source.display()
        );
    }

    let resolved = resolve(kernel_source, device);
    let missing: Vec<_> = resolved.iter().filter(|config| !config.exists).collect();

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|config| format!("  {} ({})", config.name, config.path.display()))
            .collect::<Vec<_>>()
            .join("\n");
        bail!(
            "Missing kernel config files for '{}':\n{}",
            device.product_device,
            msg
        );
    }

    debug!(
        product = %device.product_device,
        count = resolved.len(),
        "all kernel config files present"
    );
    Ok(resolved)
}

/// SHA-256 over every resolved config's name and contents, in order.
///
/// Changes whenever a fragment is edited, added, removed or reordered, so a
/// cached `.config` can be compared against it.
pub fn fingerprint(kernel_source: &Path, device: &Device) -> Result<String> {
    let resolved = check(kernel_source, device)?;

    let mut hasher = Sha256::new();
    for config in &resolved {
        let contents = fs::read(&config.path)
            .with_context(|| format!("reading kernel config '{}'", config.path.display()))?;
        hasher.update(config.name.as_bytes());
        hasher.update([0u8]);
        hasher.update((contents.len() as u64).to_le_bytes());
        hasher.update(&contents);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
