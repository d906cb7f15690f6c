//! Publication model and task graph synthesis.
//!
//! Publications are declared on a [`scope::PublishScope`], finalized in a
//! batch into [`unit::FinalizedUnit`]s, and turned into a
//! [`graph::TaskGraph`] of `jbPublish…` tasks by
//! [`graph::TaskGraphBuilder`].

pub mod graph;
pub mod naming;
pub mod scope;
pub mod unit;
