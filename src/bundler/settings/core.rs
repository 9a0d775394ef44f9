//! Core Settings struct and implementations.

use super::{Arch, SigningSettings, VersionInfo};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Main settings for bundler operations.
///
/// Resolved once at startup by [`SettingsBuilder`](super::SettingsBuilder) and
/// passed by reference into every component. Nothing below the CLI reads the
/// environment.
///
/// # Examples
///
/// ```no_run
/// use flashable_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> flashable_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .root(".")
///     .release(true)
///     .build()?;
///
/// println!("apk: {}", settings.apk_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Project root. Scripts and prebuilts are looked up relative to it.
    root: PathBuf,

    /// Native build outputs and finished zips live here.
    out_dir: PathBuf,

    /// Directory for intermediate archives.
    scratch_dir: PathBuf,

    /// Package the release APK instead of the debug one.
    release: bool,

    /// Prefix of output file names.
    product_name: String,

    /// Signer and adjuster configuration.
    signing: SigningSettings,
}

impl Settings {
    /// Returns the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Returns the directory used for intermediate archives.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Whether this is a release build.
    pub fn release(&self) -> bool {
        self.release
    }

    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Returns the signing configuration.
    pub fn signing(&self) -> &SigningSettings {
        &self.signing
    }

    /// Path of a native binary produced for `arch`.
    pub fn binary_path(&self, arch: Arch, name: &str) -> PathBuf {
        self.out_dir.join(arch.lib_dir()).join(name)
    }

    /// Path of the application package for the configured flavor.
    pub fn apk_path(&self) -> PathBuf {
        let name = if self.release {
            "app-release.apk"
        } else {
            "app-debug.apk"
        };
        self.out_dir.join(name)
    }

    /// Path of a script in the source tree.
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.root.join("scripts").join(name)
    }

    /// Path of a file relative to the project root.
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Output path of the installer package, e.g. `out/Magisk-v24.0.zip`.
    pub fn installer_output(&self, version: &VersionInfo) -> PathBuf {
        self.out_dir.join(format!(
            "{}-v{}.zip",
            self.product_name,
            version.version_string()
        ))
    }

    /// Output path of the uninstaller package, e.g. `out/Magisk-uninstaller-20220301.zip`.
    pub fn uninstaller_output(&self, date: NaiveDate) -> PathBuf {
        self.out_dir.join(format!(
            "{}-uninstaller-{}.zip",
            self.product_name,
            date.format("%Y%m%d")
        ))
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        root: PathBuf,
        out_dir: PathBuf,
        scratch_dir: PathBuf,
        release: bool,
        product_name: String,
        signing: SigningSettings,
    ) -> Self {
        Self {
            root,
            out_dir,
            scratch_dir,
            release,
            product_name,
            signing,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bundler::{SettingsBuilder, VersionInfo};
    use chrono::NaiveDate;
    use std::path::Path;

    #[test]
    fn output_names_follow_the_release_conventions() {
        let settings = SettingsBuilder::new().root("/src/magisk").build().unwrap();

        let version = VersionInfo::new("24.0", 2400).unwrap();
        assert_eq!(
            settings.installer_output(&version),
            Path::new("/src/magisk/out/Magisk-v24.0.zip")
        );

        let date = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        assert_eq!(
            settings.uninstaller_output(date),
            Path::new("/src/magisk/out/Magisk-uninstaller-20220301.zip")
        );
    }

    #[test]
    fn apk_flavor_follows_release_flag() {
        let debug = SettingsBuilder::new().root("/r").build().unwrap();
        assert_eq!(debug.apk_path(), Path::new("/r/out/app-debug.apk"));

        let release = SettingsBuilder::new().root("/r").release(true).build().unwrap();
        assert_eq!(release.apk_path(), Path::new("/r/out/app-release.apk"));
    }
}
