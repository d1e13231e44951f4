//! Dump a device's build variables for scripts and downstream tooling.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::device::Device;
use crate::layout::OutputLayout;

/// Ordered `(KEY, value)` pairs describing a device build.
pub fn dumpvars(device: &Device, layout: &OutputLayout) -> Vec<(&'static str, String)> {
    vec![
        ("PRODUCT_DEVICE", device.product_device.clone()),
        ("PRODUCT_MANUFACTURER", device.product_manufacturer.clone()),
        ("TARGET_ARCH", device.target_arch.to_string()),
        ("TARGET_KERNEL_CONFIG", device.target_kernel_config.clone()),
        (
            "TARGET_KERNEL_FRAGMENTS",
            device.target_kernel_fragments.join(" "),
        ),
        (
            "BOARD_KERNEL_IMAGE_NAME",
            device.board_kernel_image_name.clone(),
        ),
        (
            "BOARD_INCLUDE_DTB_IN_BOOTIMG",
            device.board_include_dtb_in_bootimg.to_string(),
        ),
        (
            "BOARD_KERNEL_SEPARATED_DTBO",
            device.board_kernel_separated_dtbo.to_string(),
        ),
        (
            "BOARD_KERNEL_PAGESIZE",
            device.board_kernel_pagesize.to_string(),
        ),
        ("OUT_DIR", layout.out_path.display().to_string()),
        ("KERNEL_OBJ", layout.kernel_obj_path.display().to_string()),
    ]
}

/// `KEY=value` lines.
pub fn render_text(vars: &[(&'static str, String)]) -> String {
    vars.iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

/// Pretty JSON object with keys in dump order.
pub fn render_json(vars: &[(&'static str, String)]) -> Result<String> {
    let mut object = Map::new();
    for (key, value) in vars {
        object.insert((*key).to_string(), Value::String(value.clone()));
    }
    Ok(serde_json::to_string_pretty(&Value::Object(object))?)
}
