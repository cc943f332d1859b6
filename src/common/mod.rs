//! Common utilities shared across modules

pub mod path_normalizer;
