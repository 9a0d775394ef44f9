//! Signature passes backed by the zip signer jar.

use crate::bundler::error::{Error, Result};
use std::{
    future::Future,
    path::{Path, PathBuf},
    process::Output,
};
use tokio::process::Command;

/// Produces a signed copy of an archive.
pub trait ArchiveSigner {
    /// Signs `input` into `output`.
    fn sign(&self, input: &Path, output: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Signs an adjusted archive into `output`, updating the existing signature.
    fn resign(&self, input: &Path, output: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Runs `java -jar <signer> [-m] <public> <private> <in> <out>`.
#[derive(Debug, Clone)]
pub struct ZipSignerJar {
    java: PathBuf,
    jar: PathBuf,
    public_key: PathBuf,
    private_key: PathBuf,
}

impl ZipSignerJar {
    /// Creates a signer from a resolved Java executable and key material.
    pub fn new(
        java: impl Into<PathBuf>,
        jar: impl Into<PathBuf>,
        public_key: impl Into<PathBuf>,
        private_key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            java: java.into(),
            jar: jar.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    fn command(&self, update: bool, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar").arg(&self.jar);
        if update {
            cmd.arg("-m");
        }
        cmd.arg(&self.public_key)
            .arg(&self.private_key)
            .arg(input)
            .arg(output)
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, update: bool, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = self.command(update, input, output);
        log::debug!("Running {:?}", cmd.as_std());

        let result = cmd.output().await.map_err(|error| Error::CommandFailed {
            command: format!("{} -jar {}", self.java.display(), self.jar.display()),
            error,
        })?;
        check_status(&result, "zip signer")
    }
}

impl ArchiveSigner for ZipSignerJar {
    async fn sign(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(false, input, output).await
    }

    async fn resign(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(true, input, output).await
    }
}

/// Turns a non-zero exit into an error carrying the tail of stderr.
pub(super) fn check_status(output: &Output, tool: &str) -> Result<()> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        log::debug!("{tool} stdout: {}", stdout.trim());
    }

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: Vec<_> = stderr.trim().lines().rev().take(5).collect();
    let tail: Vec<_> = tail.into_iter().rev().collect();

    crate::bail!(
        "{tool} exited with {}{}",
        output.status,
        if tail.is_empty() {
            String::new()
        } else {
            format!(": {}", tail.join("\n"))
        }
    )
}
