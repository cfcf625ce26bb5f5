//! Artifact export module
//!
//! Persists diagnostic artifacts produced by a pipeline run so they can be
//! fetched after the run has returned.

mod artifact_store;

pub use artifact_store::{ArtifactId, ArtifactStore};
