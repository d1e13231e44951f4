//! Registry of device descriptors keyed by product identifier.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use thiserror::Error;
use tracing::debug;

use super::{Device, DeviceError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("device '{0}' is already registered")]
    Duplicate(String),

    #[error(transparent)]
    Invalid(#[from] DeviceError),
}

/// Registered devices, iterated in product identifier order.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert a descriptor.
    ///
    /// A product identifier can only be registered once; a second attempt
    /// fails and keeps the existing entry.
    pub fn register(&mut self, device: Device) -> std::result::Result<(), RegistryError> {
        device.validate()?;

        if self.devices.contains_key(&device.product_device) {
            return Err(RegistryError::Duplicate(device.product_device));
        }

        debug!(
            product = %device.product_device,
            fragments = device.target_kernel_fragments.len(),
            "registered device"
        );
        self.devices.insert(device.product_device.clone(), device);
        Ok(())
    }

    pub fn get(&self, codename: &str) -> Option<&Device> {
        self.devices.get(codename)
    }

    pub fn contains(&self, codename: &str) -> bool {
        self.devices.contains_key(codename)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn codenames(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Like [`get`](Self::get), but an unknown codename is an error naming
    /// every registered device.
    pub fn require(&self, codename: &str) -> Result<&Device> {
        match self.get(codename) {
            Some(device) => Ok(device),
            None => bail!(
                "unknown device '{}'; expected one of: {}",
                codename,
                self.codenames().join(", ")
            ),
        }
    }
}
