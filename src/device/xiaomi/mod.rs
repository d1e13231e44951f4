//! Xiaomi devices.

pub mod sm8150;
pub mod vayu;

/// Vendor directory for Xiaomi fragments.
pub const VENDOR: &str = "xiaomi";
