//! Utility functions for bundling operations.

pub mod fs;
