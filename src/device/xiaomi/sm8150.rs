//! Shared profile for Xiaomi Snapdragon 855/860 (SM8150) devices.
//!
//! Not registrable on its own: it carries no product identifier.

use super::VENDOR;
use crate::arch::Arch;
use crate::device::{fragment_path, Device};

/// Name used by `inherits = "..."` in configuration files.
pub const PROFILE: &str = "sm8150";

/// Fragment shared by every device in the family.
pub const COMMON_FRAGMENT: &str = "vendor/xiaomi/sm8150-common.config";

pub fn base() -> Device {
    Device {
        product_device: String::new(),
        product_manufacturer: VENDOR.into(),
        target_arch: Arch::Arm64,
        target_kernel_config: "vendor/sm8150-perf_defconfig".into(),
        target_kernel_fragments: vec![COMMON_FRAGMENT.into()],
        board_kernel_image_name: "Image".into(),
        board_include_dtb_in_bootimg: true,
        board_kernel_separated_dtbo: true,
        board_kernel_pagesize: 4096,
    }
}

/// Fragment list for a family member: the common fragment, then its own.
pub fn fragments_for(product: &str) -> Vec<String> {
    vec![COMMON_FRAGMENT.into(), fragment_path(VENDOR, product)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_is_not_registrable() {
        assert!(base().validate().is_err());
    }

    #[test]
    fn test_common_fragment_matches_template() {
        assert_eq!(COMMON_FRAGMENT, fragment_path(VENDOR, "sm8150-common"));
    }
}
