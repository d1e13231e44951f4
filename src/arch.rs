//! Target CPU architectures understood by the kernel build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kernel target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    Arm,
    Arm64,
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Arch {
    /// Value passed as `ARCH=` and used under `arch/` in the kernel tree.
    pub fn kernel_name(&self) -> &'static str {
        match self {
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            // x86_64 kernels live under arch/x86
            Arch::X86 | Arch::X86_64 => "x86",
        }
    }

    /// Prefix handed to clang as `CLANG_TRIPLE`.
    pub fn clang_triple_prefix(&self) -> &'static str {
        match self {
            Arch::Arm => "arm-linux-gnueabi-",
            Arch::Arm64 => "aarch64-linux-gnu-",
            Arch::X86 | Arch::X86_64 => "x86_64-linux-gnu-",
        }
    }

    fn canonical(&self) -> &'static str {
        match self {
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

impl FromStr for Arch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arm" => Ok(Arch::Arm),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "x86" | "i386" => Ok(Arch::X86),
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            other => anyhow::bail!(
                "unsupported arch '{}' (expected arm, arm64, x86 or x86_64)",
                other
            ),
        }
    }
}
