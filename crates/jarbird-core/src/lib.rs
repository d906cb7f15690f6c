//! Core data types for Jarbird.
//!
//! This crate defines the publication descriptor (the POM-like metadata of one
//! artifact) with its overlay and sync rules, the ambient project identity,
//! property lookup for repository credentials and the `jarbird.toml` manifest.
//!
//! Nothing in here touches the network.

pub mod clock;
pub mod descriptor;
pub mod manifest;
pub mod project;
pub mod properties;
pub mod source;
