//! Folding fragment chains into complete descriptors.

use std::sync::Arc;

use jarbird_core::clock::Clock;
use jarbird_core::descriptor::{Descriptor, Overlay};
use jarbird_core::project::ProjectInfo;
use jarbird_util::errors::{JarbirdError, JarbirdResult};

use crate::fragment::FragmentGroup;

/// Fold a chain of fragments ordered from most to least specific.
///
/// Each fragment is overlaid onto the accumulator, so scalars come from the
/// most specific fragment that sets them and lists are concatenated in
/// chain order.
pub fn merge_chain<'a>(chain: impl IntoIterator<Item = &'a Descriptor>) -> Descriptor {
    let mut merged = Descriptor::default();
    for fragment in chain {
        fragment.overlay_to(&mut merged);
    }
    merged
}

/// Merge `chain`, sync it with the ambient project and check that the
/// coordinates are complete.
pub fn resolve<'a>(
    unit: &str,
    chain: impl IntoIterator<Item = &'a Descriptor>,
    project: &ProjectInfo,
    clock: &dyn Clock,
) -> JarbirdResult<Descriptor> {
    let mut descriptor = merge_chain(chain);
    descriptor.sync_with(project, clock);
    match descriptor.missing_required() {
        Some(field) => Err(JarbirdError::MissingMetadata {
            unit: unit.to_string(),
            field: field.to_string(),
        }),
        None => Ok(descriptor),
    }
}

/// Fragments of one project plus an explicit link to the enclosing
/// project's resolver.
#[derive(Debug, Default)]
pub struct DescriptorResolver {
    fragments: FragmentGroup,
    parent: Option<Arc<DescriptorResolver>>,
}

impl DescriptorResolver {
    pub fn new(fragments: FragmentGroup, parent: Option<Arc<DescriptorResolver>>) -> Self {
        Self { fragments, parent }
    }

    /// The fragments that apply to `variant`, this project's first.
    pub fn chain(&self, variant: &str) -> Vec<Descriptor> {
        let mut chain = vec![self.fragments.for_variant(variant)];
        let mut ancestor = self.parent.as_deref();
        while let Some(resolver) = ancestor {
            chain.push(resolver.fragments.for_variant(variant));
            ancestor = resolver.parent.as_deref();
        }
        chain
    }

    pub fn resolve(
        &self,
        unit: &str,
        variant: &str,
        project: &ProjectInfo,
        clock: &dyn Clock,
    ) -> JarbirdResult<Descriptor> {
        resolve(unit, &self.chain(variant), project, clock)
    }
}
