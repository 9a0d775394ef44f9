//! Signing tool configuration.

use std::path::PathBuf;

/// Default signer jar, relative to the project root.
pub const DEFAULT_SIGNER_JAR: &str = "crypto/build/libs/zipsigner-1.1.jar";
/// Default certificate, relative to the project root.
pub const DEFAULT_PUBLIC_KEY: &str = "ziptools/public.certificate.x509.pem";
/// Default private key, relative to the project root.
pub const DEFAULT_PRIVATE_KEY: &str = "ziptools/private.key.pk8";

/// How the `Signed -> Adjusted` stage is performed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdjusterKind {
    /// Rewrite the end-of-central-directory record in process.
    #[default]
    Native,
    /// Run an external `zipadjust <in> <out>` binary.
    Tool(PathBuf),
}

/// Paths of the external signing collaborators and key material.
///
/// All paths are absolute once produced by [`SettingsBuilder`](super::SettingsBuilder).
#[derive(Debug, Clone)]
pub struct SigningSettings {
    /// Java launcher used to run the signer jar.
    pub java: PathBuf,

    /// Whole-file zip signer jar.
    pub signer_jar: PathBuf,

    /// X.509 certificate in PEM form.
    pub public_key: PathBuf,

    /// PKCS#8 private key.
    pub private_key: PathBuf,

    /// Structural adjuster.
    pub adjuster: AdjusterKind,
}
