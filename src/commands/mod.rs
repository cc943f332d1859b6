//! Command implementations for the Repatch CLI

pub mod apply;
pub mod helpers;
pub mod list;
