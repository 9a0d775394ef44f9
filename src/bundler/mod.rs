//! Flashable package bundler.
//!
//! Turns the outputs of a native and application build into recovery-flashable
//! installer and uninstaller zips, signed with the project keys.
//!
//! # Example
//!
//! ```no_run
//! use flashable_bundler::bundler::{Bundler, SettingsBuilder, VersionInfo};
//!
//! # async fn example() -> flashable_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .root("/src/magisk")
//!     .release(true)
//!     .build()?;
//!
//! let bundler = Bundler::new(settings)?;
//! for package in bundler.bundle_all(&VersionInfo::new("24.0", 24000)?).await? {
//!     println!("{}: {}", package.path.display(), package.checksum);
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod bootstrap;
mod builder;
pub mod error;
pub mod flashable;
pub mod settings;
pub mod signing;
mod utils;

pub use builder::{
    BundledPackage, Bundler, PackedEntry, calculate_sha256, clean, setup_signing,
};
pub use error::{Error, Result};
pub use flashable::PackageKind;
pub use settings::{Arch, Settings, SettingsBuilder, VersionInfo};
