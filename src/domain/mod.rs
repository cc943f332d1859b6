//! Domain models for repatch
//!
//! This module contains pure domain objects: the identity of a stored patch
//! and the outcome of applying it. They carry no I/O.

pub mod descriptor;
pub mod outcome;

pub use descriptor::PatchDescriptor;
pub use outcome::{ApplicationOutcome, BatchResult, FailureReason, PatchReport};
