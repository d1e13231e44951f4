//! POCO X3 Pro.

use super::sm8150;
use crate::device::{Device, DeviceOverrides};

pub const PRODUCT_DEVICE: &str = "vayu";

pub fn device() -> Device {
    sm8150::base().extend(DeviceOverrides {
        product_device: Some(PRODUCT_DEVICE.into()),
        target_kernel_fragments: Some(sm8150::fragments_for(PRODUCT_DEVICE)),
        ..Default::default()
    })
}
