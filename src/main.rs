//! Flashable Bundler - assembles and signs recovery-flashable zips.
//!
//! This binary packs prebuilt artifacts into installer and uninstaller zips and
//! signs them, leaving nothing at the output path unless every step succeeded.

use flashable_bundler::cli::{self, OutputManager};
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            let output = OutputManager::new(false, false);
            if output.error(&format!("Error: {e}")).is_err() {
                eprintln!("Error: {e}");
            }
            for suggestion in e.recovery_suggestions() {
                let _ = output.indent(&suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
