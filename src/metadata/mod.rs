//! Optional `bundler.toml` at the project root.
//!
//! Values here sit below environment variables and command line flags.

use crate::bundler::SettingsBuilder;
use crate::error::{BundlerError, CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "bundler.toml";

/// Contents of `bundler.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Package the release APK instead of the debug one
    pub release: Option<bool>,

    /// Output directory for packages and native build outputs
    pub out_dir: Option<PathBuf>,

    /// Directory for intermediate archives
    pub scratch_dir: Option<PathBuf>,

    /// Prefix of output file names
    pub product_name: Option<String>,

    /// Signing collaborators
    #[serde(default)]
    pub signing: SigningConfig,
}

/// `[signing]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningConfig {
    /// Java launcher
    pub java: Option<PathBuf>,
    /// Signer jar
    pub signer_jar: Option<PathBuf>,
    /// Certificate (PEM)
    pub public_key: Option<PathBuf>,
    /// Private key (PKCS#8)
    pub private_key: Option<PathBuf>,
    /// External adjuster; the built-in one is used when unset
    pub zipadjust: Option<PathBuf>,
}

impl BundleConfig {
    /// Copies every value that is set onto `builder`.
    pub fn apply(self, mut builder: SettingsBuilder) -> SettingsBuilder {
        if let Some(release) = self.release {
            builder = builder.release(release);
        }
        if let Some(path) = self.out_dir {
            builder = builder.out_dir(path);
        }
        if let Some(path) = self.scratch_dir {
            builder = builder.scratch_dir(path);
        }
        if let Some(name) = self.product_name {
            builder = builder.product_name(name);
        }

        let signing = self.signing;
        if let Some(path) = signing.java {
            builder = builder.java(path);
        }
        if let Some(path) = signing.signer_jar {
            builder = builder.signer_jar(path);
        }
        if let Some(path) = signing.public_key {
            builder = builder.public_key(path);
        }
        if let Some(path) = signing.private_key {
            builder = builder.private_key(path);
        }
        if let Some(path) = signing.zipadjust {
            builder = builder.zipadjust(path);
        }
        builder
    }
}

/// Parses a config file.
pub fn load_config(path: &Path) -> Result<BundleConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_config".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;
    Ok(toml::from_str(&text)?)
}

/// Loads `explicit` if given, otherwise `<root>/bundler.toml` when present.
///
/// An explicit path that does not exist is an error; a missing default file is
/// not.
pub fn discover_config(root: &Path, explicit: Option<&Path>) -> Result<BundleConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if path.is_file() {
                log::debug!("Loading {}", path.display());
                load_config(&path)
            } else {
                Ok(BundleConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_key() {
        let config: BundleConfig = toml::from_str(
            r#"
            release = true
            out_dir = "build/out"
            product_name = "Magisk"

            [signing]
            java = "/opt/jdk/bin/java"
            signer_jar = "tools/zipsigner.jar"
            public_key = "keys/cert.pem"
            private_key = "keys/key.pk8"
            zipadjust = "ziptools/zipadjust"
            "#,
        )
        .unwrap();

        let settings = config
            .apply(SettingsBuilder::new().root("/src"))
            .build()
            .unwrap();
        assert!(settings.release());
        assert_eq!(settings.out_dir(), Path::new("/src/build/out"));
        assert_eq!(settings.signing().java, Path::new("/opt/jdk/bin/java"));
        assert_eq!(settings.signing().public_key, Path::new("/src/keys/cert.pem"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<BundleConfig>("relase = true").is_err());
    }

    #[test]
    fn default_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let config = discover_config(dir.path(), None).unwrap();
        assert!(config.release.is_none());

        assert!(discover_config(dir.path(), Some(&dir.path().join("nope.toml"))).is_err());
    }
}
