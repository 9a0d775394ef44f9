//! Configuration structures for bundling operations.
//!
//! This module provides the immutable [`Settings`] passed to every component,
//! the [`SettingsBuilder`] that produces it, and the small value types it is
//! made of.

mod arch;
mod builder;
mod core;
mod package;
mod signing;

pub use arch::Arch;
pub use builder::{DEFAULT_PRODUCT_NAME, SettingsBuilder};
pub use core::Settings;
pub use package::VersionInfo;
pub use signing::{AdjusterKind, SigningSettings};
