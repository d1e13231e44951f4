//! Per-device output directory layout.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::device::Device;

/// Where a device's build writes its objects and artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// `<out>/<product>`
    pub out_path: PathBuf,
    pub dtb_out: PathBuf,
    pub dtbo_out: PathBuf,
    /// Kernel `O=` directory.
    pub kernel_obj_path: PathBuf,
    /// `KERNEL_OBJ/arch/<arch>/boot`
    pub kernel_obj_boot_path: PathBuf,
    pub dtbs_path: PathBuf,
    pub kernel_image: PathBuf,
    include_dtb: bool,
    separated_dtbo: bool,
}

impl OutputLayout {
    pub fn new(out_root: &Path, device: &Device) -> Self {
        let out_path = out_root.join(&device.product_device);
        let kernel_obj_path = out_path.join("KERNEL_OBJ");
        let kernel_obj_boot_path = kernel_obj_path
            .join("arch")
            .join(device.target_arch.kernel_name())
            .join("boot");

        Self {
            dtb_out: out_path.join("dtb.img"),
            dtbo_out: out_path.join("dtbo.img"),
            dtbs_path: kernel_obj_boot_path.join("dts"),
            kernel_image: kernel_obj_boot_path.join(&device.board_kernel_image_name),
            out_path,
            kernel_obj_path,
            kernel_obj_boot_path,
            include_dtb: device.board_include_dtb_in_bootimg,
            separated_dtbo: device.board_kernel_separated_dtbo,
        }
    }

    /// Files a complete build is expected to leave behind, image first.
    pub fn expected_artifacts(&self) -> Vec<&Path> {
        let mut artifacts = vec![self.kernel_image.as_path()];
        if self.include_dtb {
            artifacts.push(&self.dtb_out);
        }
        if self.separated_dtbo {
            artifacts.push(&self.dtbo_out);
        }
        artifacts
    }

    /// Create the output and object directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.out_path, &self.kernel_obj_path] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}
