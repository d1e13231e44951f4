//! Device registry and build planning for Android kernel trees.
//!
//! A kernel tree is built for one device at a time. Each device is a
//! [`Device`] descriptor: product identity, architecture, base defconfig and
//! the config fragments layered on top. Descriptors derive from shared
//! family profiles through [`Device::extend`] and are collected in a
//! [`DeviceRegistry`] by an explicit startup step.
//!
//! # Architecture
//!
//! ```text
//! device::xiaomi::sm8150 (base profile)
//!     │
//!     └── extend ──> device::xiaomi::vayu
//!                         │
//!                         └── register_builtin_devices ──> DeviceRegistry
//!                                                             │
//!          config (build-kernel.toml) ── custom variants ─────┤
//!                                                             │
//!                      layout / fragments / dumpvars <────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use kernel_device_builder::DeviceRegistry;
//!
//! let registry = DeviceRegistry::with_builtin().unwrap();
//! let vayu = registry.get("vayu").unwrap();
//! assert_eq!(vayu.target_kernel_fragments[1], "vendor/xiaomi/vayu.config");
//! ```

pub mod arch;
pub mod config;
pub mod device;
pub mod dumpvars;
pub mod fragments;
pub mod layout;
pub mod logging;
pub mod preflight;

pub use arch::Arch;
pub use config::BuildConfig;
pub use device::{Device, DeviceOverrides, DeviceRegistry, RegistryError};
pub use layout::OutputLayout;
