//! Bundle orchestration and coordination.
//!
//! This module provides the main [`Bundler`] orchestrator that turns prebuilt
//! artifacts into signed flashable packages.
//!
//! # Overview
//!
//! For each package the bundler:
//! 1. Gathers the required artifacts from [`Settings`](crate::bundler::Settings)
//! 2. Lays out and assembles the unsigned archive
//! 3. Runs the signing pipeline and publishes the result
//! 4. Returns a [`BundledPackage`] with size and checksum
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for packages
//! - [`orchestrator`] - Main [`Bundler`] struct and bundling operations
//! - [`signing`] - Signing pipeline setup and preflight checks
//! - [`tool_detection`] - External tool availability checking

mod checksum;
mod orchestrator;
mod signing;
mod tool_detection;

pub use checksum::calculate_sha256;
pub use orchestrator::{BundledPackage, Bundler, PackedEntry, clean};
pub use signing::setup_signing;
