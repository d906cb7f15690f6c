//! Maven repository side of Jarbird: repository endpoints and their
//! registry, Maven directory layout, and POM rendering.

pub mod endpoint;
pub mod pom;
pub mod registry;
