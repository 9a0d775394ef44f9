//! CPU architecture types and utilities.

use std::fmt;

/// CPU architecture of a prebuilt native binary.
///
/// Each architecture has two names: the directory the native build writes its
/// outputs to, and the short alias used inside the flashable zip.
///
/// # Examples
///
/// ```no_run
/// use flashable_bundler::bundler::Arch;
///
/// assert_eq!(Arch::Arm64.lib_dir(), "arm64-v8a");
/// assert_eq!(Arch::Arm64.zip_dir(), "arm64");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// AArch64 (64-bit ARM)
    Arm64,
    /// ARMv7 (32-bit ARM)
    Arm,
    /// i686 (32-bit x86)
    X86,
    /// x86_64
    X64,
}

impl Arch {
    /// All architectures in archive order.
    pub const ALL: [Arch; 4] = [Arch::Arm64, Arch::Arm, Arch::X86, Arch::X64];

    /// Architectures whose binaries are inlined into the bootstrap script.
    ///
    /// Only the 32-bit variants, since every recovery shell can execute them.
    pub const BOOTSTRAP: [Arch; 2] = [Arch::Arm, Arch::X86];

    /// Build output directory name (`out/<lib_dir>/...`).
    pub fn lib_dir(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64-v8a",
            Arch::Arm => "armeabi-v7a",
            Arch::X86 => "x86",
            Arch::X64 => "x86_64",
        }
    }

    /// Directory alias inside the flashable zip.
    pub fn zip_dir(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
            Arch::X86 => "x86",
            Arch::X64 => "x64",
        }
    }

    /// Suffix of the bootstrap script variables (`EX_ARM`, `BB_X86`, ...).
    pub(crate) fn bootstrap_suffix(self) -> Option<&'static str> {
        match self {
            Arch::Arm => Some("ARM"),
            Arch::X86 => Some("X86"),
            Arch::Arm64 | Arch::X64 => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lib_dir())
    }
}
