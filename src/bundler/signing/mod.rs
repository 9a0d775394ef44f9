//! Two-pass signing of assembled archives.
//!
//! The signer runs once over the assembled archive, the trailer it leaves behind
//! is repaired, and the signer runs again in update mode. The archive handle
//! types make the order explicit: only an [`Archive<FinalSigned>`] can be
//! published.
//!
//! # Module Organization
//!
//! - `archive` - stage-typed archive handles
//! - `signer` - [`ArchiveSigner`] and the jar-based [`ZipSignerJar`]
//! - `adjust` - [`StructuralAdjuster`], the built-in [`TrailerAdjuster`] and
//!   the external [`ZipAdjustTool`]
//! - `pipeline` - [`SigningPipeline`]

mod adjust;
mod archive;
mod pipeline;
mod signer;

pub use adjust::{
    Adjuster, StructuralAdjuster, TrailerAdjuster, TrailerFix, ZipAdjustTool, adjust_trailer,
};
pub use archive::{Adjusted, Archive, FinalSigned, Signed, Stage, Unsigned};
pub use pipeline::SigningPipeline;
pub use signer::{ArchiveSigner, ZipSignerJar};
