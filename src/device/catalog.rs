//! Built-in device catalog and the explicit registration step.
//!
//! Nothing is registered implicitly. Startup code builds a
//! [`DeviceRegistry`] and calls [`register_builtin_devices`] once, then
//! optionally [`register_custom_devices`] with variants read from the
//! build configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::registry::{DeviceRegistry, RegistryError};
use super::xiaomi::{sm8150, vayu};
use super::{fragment_path, Device, DeviceOverrides};
use crate::arch::Arch;

/// Constructors for every built-in device, one registration each.
const BUILTIN_DEVICES: &[fn() -> Device] = &[vayu::device as fn() -> Device];

/// Named base profiles that configured variants may inherit from.
const BASE_PROFILES: &[(&str, fn() -> Device)] = &[(sm8150::PROFILE, sm8150::base as fn() -> Device)];

/// Insert every built-in descriptor into `registry`.
///
/// Running this twice against the same registry fails with
/// [`RegistryError::Duplicate`].
pub fn register_builtin_devices(registry: &mut DeviceRegistry) -> Result<(), RegistryError> {
    for ctor in BUILTIN_DEVICES {
        registry.register(ctor())?;
    }
    Ok(())
}

impl DeviceRegistry {
    /// Fresh registry holding the built-in catalog.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        register_builtin_devices(&mut registry)?;
        Ok(registry)
    }
}

/// Look up a base profile by name (e.g. "sm8150").
pub fn base_profile(name: &str) -> Option<Device> {
    BASE_PROFILES
        .iter()
        .find(|(profile, _)| *profile == name)
        .map(|(_, ctor)| ctor())
}

/// Names accepted by [`base_profile`].
pub fn base_profile_names() -> Vec<&'static str> {
    BASE_PROFILES.iter().map(|(name, _)| *name).collect()
}

/// A device variant declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomDevice {
    /// Base profile name.
    pub inherits: String,
    pub product_device: String,
    pub product_manufacturer: Option<String>,
    pub target_arch: Option<Arch>,
    pub target_kernel_config: Option<String>,
    /// Full fragment list. When omitted, the base profile's fragments are
    /// followed by `vendor/<vendor>/<product>.config`.
    pub fragments: Option<Vec<String>>,
    pub board_kernel_image_name: Option<String>,
    pub board_include_dtb_in_bootimg: Option<bool>,
    pub board_kernel_separated_dtbo: Option<bool>,
    pub board_kernel_pagesize: Option<u32>,
}

impl CustomDevice {
    /// Resolve the variant against its base profile.
    pub fn to_device(&self) -> Result<Device> {
        let base = base_profile(&self.inherits).with_context(|| {
            format!(
                "device '{}' inherits unknown profile '{}'; expected one of: {}",
                self.product_device,
                self.inherits,
                base_profile_names().join(", ")
            )
        })?;

        let vendor = self
            .product_manufacturer
            .clone()
            .unwrap_or_else(|| base.product_manufacturer.clone());

        let fragments = match &self.fragments {
            Some(fragments) => fragments.clone(),
            None => base
                .target_kernel_fragments
                .iter()
                .cloned()
                .chain(std::iter::once(fragment_path(&vendor, &self.product_device)))
                .collect(),
        };

        Ok(base.extend(DeviceOverrides {
            product_device: Some(self.product_device.clone()),
            product_manufacturer: Some(vendor),
            target_arch: self.target_arch,
            target_kernel_config: self.target_kernel_config.clone(),
            target_kernel_fragments: Some(fragments),
            board_kernel_image_name: self.board_kernel_image_name.clone(),
            board_include_dtb_in_bootimg: self.board_include_dtb_in_bootimg,
            board_kernel_separated_dtbo: self.board_kernel_separated_dtbo,
            board_kernel_pagesize: self.board_kernel_pagesize,
        }))
    }
}

/// Register configured variants after the built-in catalog.
pub fn register_custom_devices(
    registry: &mut DeviceRegistry,
    devices: &[CustomDevice],
) -> Result<()> {
    for custom in devices {
        let device = custom.to_device()?;
        registry
            .register(device)
            .with_context(|| format!("registering configured device '{}'", custom.product_device))?;
        info!(
            product = %custom.product_device,
            inherits = %custom.inherits,
            "registered configured device"
        );
    }
    Ok(())
}
