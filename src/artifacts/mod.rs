//! Artifacts module - output naming and staged writes.
//!
//! Provides:
//! - `Clock`: Source of the run timestamp (system or frozen)
//! - `ArtifactNames`: `{prefix}_results_{ts}.xlsx` / `{prefix}_plot_{ts}.png`
//! - `Staging`: Write-then-rename of both artifacts with cleanup on failure

mod naming;
mod staging;

pub use naming::*;
pub use staging::*;
