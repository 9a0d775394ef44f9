//! Flashable package layout and assembly.
//!
//! # Module Organization
//!
//! - `layout` - [`PackageKind`] and the entry lists of both packages
//! - `stub` - version placeholder handling in `util_functions.sh`
//! - `assembler` - deterministic zip writing

mod assembler;
mod layout;
mod stub;

pub use assembler::{assemble, write_archive};
pub use layout::{
    ArchiveEntry, PackageKind, UPDATE_BINARY_PATH, UPDATER_SCRIPT_PATH, installer_entries,
    uninstaller_entries,
};
pub use stub::{VERSION_STUB, inject_version, strip_version};
