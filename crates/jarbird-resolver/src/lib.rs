//! Descriptor resolution: fragment loading from `pom.yaml` files and the
//! fold that turns a chain of fragments into one complete descriptor.

pub mod fragment;
pub mod resolver;
