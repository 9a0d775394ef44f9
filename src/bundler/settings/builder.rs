//! Builder for constructing Settings.

use super::{
    AdjusterKind, Settings, SigningSettings,
    signing::{DEFAULT_PRIVATE_KEY, DEFAULT_PUBLIC_KEY, DEFAULT_SIGNER_JAR},
};
use std::path::{Path, PathBuf};

/// Default product name used in output file names.
pub const DEFAULT_PRODUCT_NAME: &str = "Magisk";

/// Builder for constructing [`Settings`].
///
/// Relative paths are resolved against the project root when [`build`](Self::build)
/// is called, so the order of setter calls does not matter.
///
/// # Examples
///
/// ```no_run
/// use flashable_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> flashable_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .root("/src/magisk")
///     .release(true)
///     .zipadjust("ziptools/zipadjust")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone)]
pub struct SettingsBuilder {
    root: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    scratch_dir: Option<PathBuf>,
    release: bool,
    product_name: Option<String>,
    java: Option<PathBuf>,
    signer_jar: Option<PathBuf>,
    public_key: Option<PathBuf>,
    private_key: Option<PathBuf>,
    zipadjust: Option<PathBuf>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    ///
    /// Default: `<root>/out`
    pub fn out_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory for intermediate archives.
    ///
    /// Default: the system temp directory
    pub fn scratch_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.scratch_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Selects the release APK.
    ///
    /// Default: false (debug APK)
    pub fn release(mut self, release: bool) -> Self {
        self.release = release;
        self
    }

    /// Sets the prefix of output file names.
    ///
    /// Default: `Magisk`
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Sets the java launcher.
    ///
    /// Default: `java` from `PATH`
    pub fn java<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.java = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the signer jar.
    pub fn signer_jar<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.signer_jar = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the signing certificate.
    pub fn public_key<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.public_key = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the signing key.
    pub fn private_key<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.private_key = Some(path.as_ref().to_path_buf());
        self
    }

    /// Uses an external `zipadjust` binary instead of the native adjuster.
    pub fn zipadjust<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.zipadjust = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is missing.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let root = self.root.context("root is required")?;
        let resolve = |path: Option<PathBuf>, default: &str| {
            let path = path.unwrap_or_else(|| PathBuf::from(default));
            if path.is_absolute() {
                path
            } else {
                root.join(path)
            }
        };

        let out_dir = resolve(self.out_dir, "out");
        let signing = SigningSettings {
            // A bare program name is looked up in PATH later, so leave it alone.
            java: self.java.unwrap_or_else(|| PathBuf::from("java")),
            signer_jar: resolve(self.signer_jar, DEFAULT_SIGNER_JAR),
            public_key: resolve(self.public_key, DEFAULT_PUBLIC_KEY),
            private_key: resolve(self.private_key, DEFAULT_PRIVATE_KEY),
            adjuster: match self.zipadjust {
                Some(path) => AdjusterKind::Tool(resolve(Some(path), "")),
                None => AdjusterKind::Native,
            },
        };

        Ok(Settings::new(
            root,
            out_dir,
            self.scratch_dir.unwrap_or_else(std::env::temp_dir),
            self.release,
            self.product_name
                .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            signing,
        ))
    }
}
