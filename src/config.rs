//! Build configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! [build]
//! kernel_source = "kernel"
//! out_dir = "out"
//!
//! [[device]]
//! inherits = "sm8150"
//! product_device = "cepheus"
//! ```
//!
//! Relative paths resolve against the directory holding the file.
//! `BUILD_KERNEL_SOURCE` and `BUILD_KERNEL_OUT` override the paths.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::device::CustomDevice;

pub const CONFIG_FILE_NAME: &str = "build-kernel.toml";
pub const ENV_KERNEL_SOURCE: &str = "BUILD_KERNEL_SOURCE";
pub const ENV_OUT_DIR: &str = "BUILD_KERNEL_OUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Kernel source tree (holds the top-level Makefile).
    pub kernel_source: PathBuf,
    /// Root of per-device output directories.
    pub out_dir: PathBuf,
    /// Variants declared in the config file.
    pub devices: Vec<CustomDevice>,
    /// File the values came from, if any.
    pub source_file: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            kernel_source: PathBuf::from("."),
            out_dir: PathBuf::from("out"),
            devices: Vec::new(),
            source_file: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    #[serde(default)]
    build: BuildToml,
    #[serde(default)]
    device: Vec<CustomDevice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildToml {
    kernel_source: Option<String>,
    out_dir: Option<String>,
}

impl BuildConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading build config '{}'", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config = Self::from_toml_str(&raw, base_dir)
            .with_context(|| format!("parsing build config '{}'", path.display()))?;
        config.source_file = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML text, resolving relative paths against `base_dir`.
    pub fn from_toml_str(raw: &str, base_dir: &Path) -> Result<Self> {
        let parsed: ConfigToml = toml::from_str(raw)?;
        let defaults = Self::default();

        let kernel_source = parsed
            .build
            .kernel_source
            .map(|p| resolve_path(base_dir, &p))
            .unwrap_or(defaults.kernel_source);
        let out_dir = parsed
            .build
            .out_dir
            .map(|p| resolve_path(base_dir, &p))
            .unwrap_or(defaults.out_dir);

        Ok(Self {
            kernel_source,
            out_dir,
            devices: parsed.device,
            source_file: None,
        })
    }

    /// Load configuration using the standard lookup order.
    ///
    /// An explicit path must exist. Otherwise `./build-kernel.toml`, then
    /// `<config dir>/build-kernel/config.toml`, then built-in defaults.
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("resolving current directory")?;
        let user_dir = dirs::config_dir();

        let mut config = Self::load_from(explicit, &cwd, user_dir.as_deref())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());

        if let Some(path) = &config.source_file {
            info!(config = %path.display(), "loaded build config");
        }
        Ok(config)
    }

    /// Lookup without environment overrides, searching `cwd` and then
    /// `user_config_dir/build-kernel`.
    pub fn load_from(
        explicit: Option<&Path>,
        cwd: &Path,
        user_config_dir: Option<&Path>,
    ) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match discover(cwd, user_config_dir) {
                Some(path) => Self::from_file(&path),
                None => {
                    debug!("no build config found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Apply `BUILD_KERNEL_SOURCE` / `BUILD_KERNEL_OUT` as returned by `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(source) = lookup(ENV_KERNEL_SOURCE).filter(|v| !v.trim().is_empty()) {
            self.kernel_source = PathBuf::from(source);
        }
        if let Some(out) = lookup(ENV_OUT_DIR).filter(|v| !v.trim().is_empty()) {
            self.out_dir = PathBuf::from(out);
        }
    }
}

/// First existing config file: `<cwd>/build-kernel.toml`, then
/// `<user_config_dir>/build-kernel/config.toml`.
fn discover(cwd: &Path, user_config_dir: Option<&Path>) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    user_config_dir
        .map(|dir| dir.join("build-kernel").join("config.toml"))
        .filter(|path| path.is_file())
}

fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BuildConfig::from_toml_str("", Path::new("/work")).unwrap();
        assert_eq!(config.kernel_source, PathBuf::from("."));
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_relative_paths_resolve_against_base() {
        let raw = "[build]\nkernel_source = \"kernel\"\nout_dir = \"/abs/out\"\n";
        let config = BuildConfig::from_toml_str(raw, Path::new("/work")).unwrap();
        assert_eq!(config.kernel_source, PathBuf::from("/work/kernel"));
        assert_eq!(config.out_dir, PathBuf::from("/abs/out"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let raw = "[build]\nkernel_src = \"kernel\"\n";
        assert!(BuildConfig::from_toml_str(raw, Path::new("/work")).is_err());

        let raw = "[[device]]\ninherits = \"sm8150\"\nproduct_device = \"x\"\ncolour = \"red\"\n";
        assert!(BuildConfig::from_toml_str(raw, Path::new("/work")).is_err());
    }

    #[test]
    fn test_device_entries_parsed() {
        let raw = r#"
[[device]]
inherits = "sm8150"
product_device = "cepheus"

[[device]]
inherits = "sm8150"
product_device = "raphael"
target_arch = "arm64"
fragments = ["vendor/xiaomi/raphael.config"]
board_kernel_pagesize = 4096
"#;
        let config = BuildConfig::from_toml_str(raw, Path::new("/work")).unwrap();
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.devices[0].product_device, "cepheus");
        assert!(config.devices[0].fragments.is_none());
        assert_eq!(
            config.devices[1].fragments.as_deref(),
            Some(&["vendor/xiaomi/raphael.config".to_string()][..])
        );
    }

    #[test]
    fn test_from_file_records_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[build]\nkernel_source = \"linux\"\n").unwrap();

        let config = BuildConfig::from_file(&path).unwrap();
        assert_eq!(config.kernel_source, temp_dir.path().join("linux"));
        assert_eq!(config.source_file.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(BuildConfig::load(Some(&missing)).is_err());
    }

    fn write_user_config(user_dir: &Path, body: &str) -> PathBuf {
        let path = user_dir.join("build-kernel").join("config.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_local_config_beats_user_config() {
        let cwd = tempfile::tempdir().unwrap();
        let user_dir = tempfile::tempdir().unwrap();
        let local = cwd.path().join(CONFIG_FILE_NAME);
        fs::write(&local, "[build]\nout_dir = \"local-out\"\n").unwrap();
        write_user_config(user_dir.path(), "[build]\nout_dir = \"user-out\"\n");

        assert_eq!(discover(cwd.path(), Some(user_dir.path())), Some(local.clone()));

        let config = BuildConfig::load_from(None, cwd.path(), Some(user_dir.path())).unwrap();
        assert_eq!(config.out_dir, cwd.path().join("local-out"));
        assert_eq!(config.source_file, Some(local));
    }

    #[test]
    fn test_user_config_used_without_local() {
        let cwd = tempfile::tempdir().unwrap();
        let user_dir = tempfile::tempdir().unwrap();
        let user = write_user_config(user_dir.path(), "[build]\nkernel_source = \"/src/linux\"\n");

        assert_eq!(discover(cwd.path(), Some(user_dir.path())), Some(user.clone()));

        let config = BuildConfig::load_from(None, cwd.path(), Some(user_dir.path())).unwrap();
        assert_eq!(config.kernel_source, PathBuf::from("/src/linux"));
        assert_eq!(config.source_file, Some(user));
    }

    #[test]
    fn test_defaults_without_any_config() {
        let cwd = tempfile::tempdir().unwrap();
        let user_dir = tempfile::tempdir().unwrap();

        assert_eq!(discover(cwd.path(), Some(user_dir.path())), None);
        assert_eq!(discover(cwd.path(), None), None);

        let config = BuildConfig::load_from(None, cwd.path(), Some(user_dir.path())).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn test_explicit_config_skips_discovery() {
        let cwd = tempfile::tempdir().unwrap();
        fs::write(cwd.path().join(CONFIG_FILE_NAME), "[build]\nout_dir = \"local-out\"\n").unwrap();
        let other = tempfile::tempdir().unwrap();
        let explicit = other.path().join("custom.toml");
        fs::write(&explicit, "[build]\nout_dir = \"explicit-out\"\n").unwrap();

        let config = BuildConfig::load_from(Some(&explicit), cwd.path(), None).unwrap();
        assert_eq!(config.out_dir, other.path().join("explicit-out"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_KERNEL_SOURCE, "/src/linux"),
            (ENV_OUT_DIR, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = BuildConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.kernel_source, PathBuf::from("/src/linux"));
        // blank values are ignored
        assert_eq!(config.out_dir, PathBuf::from("out"));
    }
}
