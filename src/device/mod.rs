//! Device descriptors.
//!
//! A [`Device`] is a static record describing one build target: its product
//! identity, architecture, base defconfig and the ordered list of kernel
//! config fragments layered on top. Variants are not subclasses; they are a
//! base record plus a [`DeviceOverrides`] patch, composed with
//! [`Device::extend`].
//!
//! ```rust
//! use kernel_device_builder::device::{fragment_path, DeviceOverrides};
//! use kernel_device_builder::device::xiaomi::sm8150;
//!
//! let vayu = sm8150::base().extend(DeviceOverrides {
//!     product_device: Some("vayu".into()),
//!     target_kernel_fragments: Some(vec![
//!         sm8150::COMMON_FRAGMENT.into(),
//!         fragment_path("xiaomi", "vayu"),
//!     ]),
//!     ..Default::default()
//! });
//! assert_eq!(vayu.product_device, "vayu");
//! ```

pub mod catalog;
pub mod registry;
pub mod xiaomi;

use std::path::{Component, Path};

use serde::Serialize;
use thiserror::Error;

use crate::arch::Arch;

pub use catalog::{base_profile, register_builtin_devices, register_custom_devices, CustomDevice};
pub use registry::{DeviceRegistry, RegistryError};

/// Immutable description of a kernel build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Product identifier, also the registry key (e.g. "vayu").
    pub product_device: String,
    /// Vendor directory used for fragment paths (e.g. "xiaomi").
    pub product_manufacturer: String,
    pub target_arch: Arch,
    /// Base defconfig, relative to `arch/<arch>/configs`.
    pub target_kernel_config: String,
    /// Config fragments applied after the defconfig, in order.
    pub target_kernel_fragments: Vec<String>,
    /// Kernel image file name under `arch/<arch>/boot`.
    pub board_kernel_image_name: String,
    pub board_include_dtb_in_bootimg: bool,
    pub board_kernel_separated_dtbo: bool,
    pub board_kernel_pagesize: u32,
}

/// Patch applied on top of a base [`Device`].
///
/// `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceOverrides {
    pub product_device: Option<String>,
    pub product_manufacturer: Option<String>,
    pub target_arch: Option<Arch>,
    pub target_kernel_config: Option<String>,
    pub target_kernel_fragments: Option<Vec<String>>,
    pub board_kernel_image_name: Option<String>,
    pub board_include_dtb_in_bootimg: Option<bool>,
    pub board_kernel_separated_dtbo: Option<bool>,
    pub board_kernel_pagesize: Option<u32>,
}

/// Reasons a descriptor cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("product identifier is empty")]
    EmptyProduct,

    #[error("product identifier '{0}' may only contain ASCII letters, digits, '-' and '_'")]
    InvalidProduct(String),

    #[error("device '{product}' has an empty {field}")]
    EmptyField { product: String, field: &'static str },

    #[error("device '{product}' references invalid config path '{path}'")]
    InvalidConfigPath { product: String, path: String },

    #[error("device '{product}' has invalid page size {pagesize} (must be a non-zero power of two)")]
    InvalidPageSize { product: String, pagesize: u32 },
}

impl Device {
    /// Build a new descriptor from this one with the given fields replaced.
    ///
    /// Fragment lists are replaced wholesale, never appended to.
    pub fn extend(&self, overrides: DeviceOverrides) -> Device {
        let base = self.clone();
        Device {
            product_device: overrides.product_device.unwrap_or(base.product_device),
            product_manufacturer: overrides
                .product_manufacturer
                .unwrap_or(base.product_manufacturer),
            target_arch: overrides.target_arch.unwrap_or(base.target_arch),
            target_kernel_config: overrides
                .target_kernel_config
                .unwrap_or(base.target_kernel_config),
            target_kernel_fragments: overrides
                .target_kernel_fragments
                .unwrap_or(base.target_kernel_fragments),
            board_kernel_image_name: overrides
                .board_kernel_image_name
                .unwrap_or(base.board_kernel_image_name),
            board_include_dtb_in_bootimg: overrides
                .board_include_dtb_in_bootimg
                .unwrap_or(base.board_include_dtb_in_bootimg),
            board_kernel_separated_dtbo: overrides
                .board_kernel_separated_dtbo
                .unwrap_or(base.board_kernel_separated_dtbo),
            board_kernel_pagesize: overrides
                .board_kernel_pagesize
                .unwrap_or(base.board_kernel_pagesize),
        }
    }

    /// Check the descriptor is complete enough to be registered.
    pub fn validate(&self) -> Result<(), DeviceError> {
        let product = &self.product_device;
        if product.is_empty() {
            return Err(DeviceError::EmptyProduct);
        }
        if !product
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DeviceError::InvalidProduct(product.clone()));
        }

        let required = [
            ("product_manufacturer", &self.product_manufacturer),
            ("target_kernel_config", &self.target_kernel_config),
            ("board_kernel_image_name", &self.board_kernel_image_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DeviceError::EmptyField {
                    product: product.clone(),
                    field,
                });
            }
        }

        for path in self.defconfig_targets() {
            if !is_relative_config_path(&path) {
                return Err(DeviceError::InvalidConfigPath {
                    product: product.clone(),
                    path,
                });
            }
        }

        let pagesize = self.board_kernel_pagesize;
        if !pagesize.is_power_of_two() {
            return Err(DeviceError::InvalidPageSize {
                product: product.clone(),
                pagesize,
            });
        }

        Ok(())
    }

    /// Make goals that produce `.config`: the defconfig followed by every fragment.
    pub fn defconfig_targets(&self) -> Vec<String> {
        std::iter::once(self.target_kernel_config.clone())
            .chain(self.target_kernel_fragments.iter().cloned())
            .collect()
    }
}

/// Conventional location of a vendor config fragment: `vendor/<vendor>/<name>.config`.
pub fn fragment_path(vendor: &str, name: &str) -> String {
    format!("vendor/{vendor}/{name}.config")
}

/// Relative file path written in normal form: no `.`/`..`, empty or trailing segments.
fn is_relative_config_path(raw: &str) -> bool {
    if raw.trim().is_empty() {
        return false;
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        return false;
    }

    let segments: Vec<&str> = raw.split('/').collect();
    let normal: Vec<&str> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();
    segments == normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Device {
        Device {
            product_device: "sample".into(),
            product_manufacturer: "acme".into(),
            target_arch: Arch::Arm64,
            target_kernel_config: "vendor/sample_defconfig".into(),
            target_kernel_fragments: vec!["vendor/acme/common.config".into()],
            board_kernel_image_name: "Image.gz".into(),
            board_include_dtb_in_bootimg: false,
            board_kernel_separated_dtbo: false,
            board_kernel_pagesize: 4096,
        }
    }

    #[test]
    fn test_extend_without_overrides_is_identity() {
        let base = sample();
        assert_eq!(base.extend(DeviceOverrides::default()), base);
    }

    #[test]
    fn test_extend_replaces_fragment_list() {
        let base = sample();
        let child = base.extend(DeviceOverrides {
            target_kernel_fragments: Some(vec!["vendor/acme/child.config".into()]),
            ..Default::default()
        });
        assert_eq!(child.target_kernel_fragments, vec!["vendor/acme/child.config"]);
        assert_eq!(child.target_kernel_config, base.target_kernel_config);
        assert_eq!(child.board_kernel_pagesize, 4096);
    }

    #[test]
    fn test_extend_does_not_touch_base() {
        let base = sample();
        let _ = base.extend(DeviceOverrides {
            product_device: Some("other".into()),
            board_kernel_pagesize: Some(2048),
            ..Default::default()
        });
        assert_eq!(base.product_device, "sample");
        assert_eq!(base.board_kernel_pagesize, 4096);
    }

    #[test]
    fn test_fragment_path_template() {
        assert_eq!(fragment_path("xiaomi", "vayu"), "vendor/xiaomi/vayu.config");
    }

    #[test]
    fn test_defconfig_targets_order() {
        let device = sample();
        assert_eq!(
            device.defconfig_targets(),
            vec!["vendor/sample_defconfig", "vendor/acme/common.config"]
        );
    }

    #[test]
    fn test_validate_rejects_empty_product() {
        let mut device = sample();
        device.product_device.clear();
        assert_eq!(device.validate(), Err(DeviceError::EmptyProduct));
    }

    #[test]
    fn test_validate_rejects_bad_product() {
        let mut device = sample();
        device.product_device = "va yu".into();
        assert!(matches!(device.validate(), Err(DeviceError::InvalidProduct(_))));
    }

    #[test]
    fn test_validate_rejects_traversal() {
        let mut device = sample();
        device.target_kernel_fragments = vec!["../../etc/passwd".into()];
        assert!(matches!(
            device.validate(),
            Err(DeviceError::InvalidConfigPath { .. })
        ));

        device.target_kernel_fragments = vec!["/abs/frag.config".into()];
        assert!(device.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_normal_paths() {
        let mut device = sample();
        for bad in ["vendor/./a.config", "vendor/b/", "vendor//a.config", "./a.config"] {
            device.target_kernel_fragments = vec![bad.into()];
            assert!(
                matches!(device.validate(), Err(DeviceError::InvalidConfigPath { .. })),
                "accepted {bad}"
            );
        }

        device.target_kernel_fragments = vec!["vendor/acme/ok.config".into()];
        assert!(device.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_page_size() {
        let mut device = sample();
        device.board_kernel_pagesize = 3000;
        assert!(matches!(
            device.validate(),
            Err(DeviceError::InvalidPageSize { pagesize: 3000, .. })
        ));
        device.board_kernel_pagesize = 0;
        assert!(device.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }
}
