//! Publishable units: one declared publication and the endpoints it targets.
//!
//! A unit moves through `Declared → Configuring → Finalized → GraphAttached`
//! and never skips a state. Declaration happens through [`UnitDeclaration`],
//! finalization consumes the unit and yields a read-only [`FinalizedUnit`].

use std::fmt;
use std::sync::Arc;

use jarbird_core::clock::Clock;
use jarbird_core::descriptor::{Coordinates, Descriptor, VariantMode};
use jarbird_core::manifest::RepositoryDecl;
use jarbird_core::project::ProjectInfo;
use jarbird_core::source::UnitSource;
use jarbird_maven::endpoint::{EndpointKind, RepositoryEndpoint};
use jarbird_maven::registry::EndpointRegistry;
use jarbird_resolver::resolver::{self, DescriptorResolver};
use jarbird_util::errors::{JarbirdError, JarbirdResult};

use crate::naming;

/// Name given to a publication that does not declare one.
pub const DEFAULT_PUB_NAME: &str = "lib";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnitPhase {
    Declared,
    Configuring,
    Finalized,
    GraphAttached,
}

impl fmt::Display for UnitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitPhase::Declared => "Declared",
            UnitPhase::Configuring => "Configuring",
            UnitPhase::Finalized => "Finalized",
            UnitPhase::GraphAttached => "GraphAttached",
        };
        f.write_str(name)
    }
}

impl UnitPhase {
    fn next(self) -> Option<UnitPhase> {
        match self {
            UnitPhase::Declared => Some(UnitPhase::Configuring),
            UnitPhase::Configuring => Some(UnitPhase::Finalized),
            UnitPhase::Finalized => Some(UnitPhase::GraphAttached),
            UnitPhase::GraphAttached => None,
        }
    }
}

fn advance(unit: &str, phase: &mut UnitPhase, to: UnitPhase) -> JarbirdResult<()> {
    if phase.next() != Some(to) {
        return Err(JarbirdError::Phase {
            unit: unit.to_string(),
            from: phase.to_string(),
            to: to.to_string(),
        });
    }
    *phase = to;
    Ok(())
}

/// Publication flags that fall back to the enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDefaults {
    pub signing: bool,
    pub docs: bool,
}

impl Default for UnitDefaults {
    fn default() -> Self {
        Self {
            signing: true,
            docs: true,
        }
    }
}

/// A publication still being declared.
#[derive(Debug)]
pub struct PublishableUnit {
    name: String,
    variant: String,
    variant_mode: VariantMode,
    source: UnitSource,
    signing: Option<bool>,
    docs: Option<bool>,
    /// Declared on the unit itself; the most specific fragment.
    fragment: Option<Descriptor>,
    descriptor: Option<Descriptor>,
    endpoints: Vec<Arc<RepositoryEndpoint>>,
    phase: UnitPhase,
}

impl PublishableUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            variant: String::new(),
            variant_mode: VariantMode::default(),
            source: UnitSource::default(),
            signing: None,
            docs: None,
            fragment: None,
            descriptor: None,
            endpoints: Vec::new(),
            phase: UnitPhase::Declared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn phase(&self) -> UnitPhase {
        self.phase
    }

    pub fn endpoints(&self) -> &[Arc<RepositoryEndpoint>] {
        &self.endpoints
    }

    /// Name with the variant folded in, unique within a scope.
    pub fn effective_name(&self) -> String {
        naming::publication_name(&self.name, &self.variant)
    }

    /// Open the unit for declaration calls. The first call moves it from
    /// `Declared` to `Configuring`.
    pub fn declare<'a>(
        &'a mut self,
        registry: &'a EndpointRegistry,
    ) -> JarbirdResult<UnitDeclaration<'a>> {
        match self.phase {
            UnitPhase::Declared => advance(&self.name, &mut self.phase, UnitPhase::Configuring)?,
            UnitPhase::Configuring => {}
            _ => {
                return Err(JarbirdError::Phase {
                    unit: self.effective_name(),
                    from: self.phase.to_string(),
                    to: UnitPhase::Configuring.to_string(),
                })
            }
        }
        Ok(UnitDeclaration {
            unit: self,
            registry,
        })
    }

    /// Fold the unit's own fragment with the hierarchy's fragments into the
    /// descriptor this unit publishes.
    pub fn resolve_descriptor(
        &mut self,
        resolver: &DescriptorResolver,
        project: &ProjectInfo,
        clock: &dyn Clock,
    ) -> JarbirdResult<()> {
        let mut chain: Vec<Descriptor> = self.fragment.iter().cloned().collect();
        chain.extend(resolver.chain(&self.variant));
        self.descriptor = Some(resolver::resolve(
            &self.effective_name(),
            &chain,
            project,
            clock,
        )?);
        Ok(())
    }

    /// Validate the unit and compute its effective endpoints.
    ///
    /// `inherited` are the endpoints declared by enclosing scopes, nearest
    /// first. `defaults` are the scope's signing/doc flags.
    pub fn finalize(
        mut self,
        inherited: &[Arc<RepositoryEndpoint>],
        defaults: UnitDefaults,
        registry: &EndpointRegistry,
    ) -> JarbirdResult<FinalizedUnit> {
        let unit = self.effective_name();
        if self.phase != UnitPhase::Configuring {
            return Err(JarbirdError::Phase {
                unit,
                from: self.phase.to_string(),
                to: UnitPhase::Finalized.to_string(),
            });
        }
        if let Some(message) = naming::invalid_pub_name(&self.name, &self.variant) {
            return Err(JarbirdError::Validation { unit, message });
        }

        let Some(descriptor) = self.descriptor.take() else {
            return Err(JarbirdError::Validation {
                unit,
                message: "descriptor has not been resolved".to_string(),
            });
        };
        if let Some(field) = descriptor.missing_required() {
            return Err(JarbirdError::MissingMetadata {
                unit,
                field: field.to_string(),
            });
        }

        let mut own = std::mem::take(&mut self.endpoints);
        if let Some(plugin) = &descriptor.plugin {
            if plugin.id.is_empty() {
                return Err(JarbirdError::Validation {
                    unit,
                    message: "plugin declared without plugin id".to_string(),
                });
            }
            if plugin.implementation_class.is_empty() {
                tracing::warn!("plugin '{}' of '{unit}' has no implementation class", plugin.id);
            }
            tracing::debug!("'{unit}' is a plugin, adding the plugin portal");
            own.push(registry.plugin_portal()?);
        }
        if !own.iter().any(|e| e.kind == EndpointKind::Local) {
            own.push(registry.maven_local());
        }

        let mut endpoints: Vec<Arc<RepositoryEndpoint>> = Vec::with_capacity(own.len());
        for endpoint in own.into_iter().chain(inherited.iter().cloned()) {
            if !endpoints.iter().any(|e| **e == *endpoint) {
                endpoints.push(endpoint);
            }
        }

        advance(&unit, &mut self.phase, UnitPhase::Finalized)?;
        Ok(FinalizedUnit {
            name: self.name,
            variant: self.variant,
            variant_mode: self.variant_mode,
            source: self.source,
            signing: self.signing.unwrap_or(defaults.signing),
            docs: self.docs.unwrap_or(defaults.docs),
            descriptor,
            endpoints,
            phase: self.phase,
        })
    }
}

/// Mutable view handed to declaration callbacks.
pub struct UnitDeclaration<'a> {
    unit: &'a mut PublishableUnit,
    registry: &'a EndpointRegistry,
}

impl UnitDeclaration<'_> {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.unit.name = name.to_string();
        self
    }

    pub fn variant(&mut self, variant: &str) -> &mut Self {
        self.unit.variant = variant.to_string();
        self
    }

    pub fn variant_mode(&mut self, mode: VariantMode) -> &mut Self {
        self.unit.variant_mode = mode;
        self
    }

    pub fn from(&mut self, source: UnitSource) -> &mut Self {
        self.unit.source = source;
        self
    }

    pub fn signing(&mut self, enabled: bool) -> &mut Self {
        self.unit.signing = Some(enabled);
        self
    }

    pub fn docs(&mut self, enabled: bool) -> &mut Self {
        self.unit.docs = Some(enabled);
        self
    }

    /// Metadata that overrides everything found in `pom.yaml` files.
    pub fn descriptor(&mut self, fragment: Descriptor) -> &mut Self {
        self.unit.fragment = Some(fragment);
        self
    }

    pub fn endpoint(&mut self, endpoint: Arc<RepositoryEndpoint>) -> &mut Self {
        if !self.unit.endpoints.contains(&endpoint) {
            self.unit.endpoints.push(endpoint);
        }
        self
    }

    pub fn maven_local(&mut self) -> &mut Self {
        let endpoint = self.registry.maven_local();
        self.endpoint(endpoint)
    }

    pub fn maven_repo(&mut self, key: &str) -> JarbirdResult<&mut Self> {
        let endpoint = self.registry.maven_repo(key)?;
        Ok(self.endpoint(endpoint))
    }

    pub fn plugin_portal(&mut self) -> JarbirdResult<&mut Self> {
        let endpoint = self.registry.plugin_portal()?;
        Ok(self.endpoint(endpoint))
    }

    pub fn artifactory(&mut self, key: &str) -> JarbirdResult<&mut Self> {
        let endpoint = self.registry.artifactory(key)?;
        Ok(self.endpoint(endpoint))
    }

    pub fn repository(&mut self, decl: &RepositoryDecl) -> JarbirdResult<&mut Self> {
        let endpoint = self.registry.get_decl(decl)?;
        Ok(self.endpoint(endpoint))
    }
}

/// A validated publication. Its descriptor and endpoints are frozen.
#[derive(Debug, Clone)]
pub struct FinalizedUnit {
    name: String,
    variant: String,
    variant_mode: VariantMode,
    source: UnitSource,
    signing: bool,
    docs: bool,
    descriptor: Descriptor,
    endpoints: Vec<Arc<RepositoryEndpoint>>,
    phase: UnitPhase,
}

impl FinalizedUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn variant_mode(&self) -> VariantMode {
        self.variant_mode
    }

    pub fn source(&self) -> &UnitSource {
        &self.source
    }

    pub fn signing(&self) -> bool {
        self.signing
    }

    pub fn docs(&self) -> bool {
        self.docs
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn phase(&self) -> UnitPhase {
        self.phase
    }

    pub fn effective_name(&self) -> String {
        naming::publication_name(&self.name, &self.variant)
    }

    pub fn is_snapshot(&self) -> bool {
        self.descriptor.is_snapshot()
    }

    pub fn is_plugin(&self) -> bool {
        self.descriptor.is_plugin()
    }

    pub fn coordinates(&self) -> Coordinates {
        self.descriptor.coordinates(&self.variant, self.variant_mode)
    }

    /// Every endpoint the unit targets.
    pub fn endpoints(&self) -> &[Arc<RepositoryEndpoint>] {
        &self.endpoints
    }

    /// Endpoints that get publish tasks. Snapshots skip release-only
    /// channels.
    pub fn graph_endpoints(&self) -> Vec<Arc<RepositoryEndpoint>> {
        let snapshot = self.is_snapshot();
        self.endpoints
            .iter()
            .filter(|e| {
                let skip = snapshot && e.kind.is_release_only();
                if skip {
                    tracing::debug!(
                        "'{}' is a snapshot, not publishing it to {}",
                        self.effective_name(),
                        e.kind
                    );
                }
                !skip
            })
            .cloned()
            .collect()
    }

    pub(crate) fn attach_to_graph(&mut self) -> JarbirdResult<()> {
        let unit = self.effective_name();
        advance(&unit, &mut self.phase, UnitPhase::GraphAttached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarbird_core::clock::FixedClock;
    use jarbird_core::descriptor::PluginInfo;
    use jarbird_resolver::fragment::FragmentGroup;
    use std::collections::BTreeMap;

    fn registry() -> EndpointRegistry {
        let props: BTreeMap<String, String> = [
            ("repository.maven.mock.release", "https://mock/release"),
            ("repository.maven.mock.snapshot", "https://mock/snapshot"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        EndpointRegistry::new(Arc::new(props))
    }

    fn descriptor(version: &str) -> Descriptor {
        Descriptor {
            group: "mygroup".into(),
            artifact_id: "myplugin".into(),
            version: version.into(),
            ..Default::default()
        }
    }

    fn resolved(unit: &mut PublishableUnit) {
        unit.resolve_descriptor(
            &DescriptorResolver::new(FragmentGroup::default(), None),
            &ProjectInfo::default(),
            &FixedClock(2021),
        )
        .unwrap();
    }

    #[test]
    fn no_declared_endpoints_means_local_only() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg).unwrap().descriptor(descriptor("0.1"));
        resolved(&mut unit);
        let done = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap();
        assert_eq!(done.endpoints().len(), 1);
        assert_eq!(done.endpoints()[0].kind, EndpointKind::Local);
        assert_eq!(done.phase(), UnitPhase::Finalized);
    }

    #[test]
    fn plugin_gets_portal() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        let mut d = descriptor("0.1");
        d.plugin = Some(PluginInfo {
            id: "mygroup.myplugin".into(),
            implementation_class: "mygroup.MyPlugin".into(),
            ..Default::default()
        });
        unit.declare(&reg)
            .unwrap()
            .descriptor(d)
            .maven_repo("mock")
            .unwrap();
        resolved(&mut unit);
        let done = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap();
        let kinds: Vec<_> = done.endpoints().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [EndpointKind::Maven, EndpointKind::PluginPortal, EndpointKind::Local]
        );
    }

    #[test]
    fn plugin_without_id_is_invalid() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        let mut d = descriptor("0.1");
        d.plugin = Some(PluginInfo {
            display_name: "nameless".into(),
            ..Default::default()
        });
        unit.declare(&reg).unwrap().descriptor(d);
        resolved(&mut unit);
        let err = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap_err();
        assert!(matches!(err, JarbirdError::Validation { .. }), "got: {err}");
    }

    #[test]
    fn empty_name_is_invalid() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg)
            .unwrap()
            .name("")
            .descriptor(descriptor("0.1"));
        resolved(&mut unit);
        let err = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap_err();
        match err {
            JarbirdError::Validation { message, .. } => {
                assert_eq!(message, "publication name is empty")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn name_reading_as_repository_aggregate_is_invalid() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg)
            .unwrap()
            .name("to-maven-repository")
            .descriptor(descriptor("0.1"));
        resolved(&mut unit);
        let err = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap_err();
        assert!(
            matches!(err, JarbirdError::Validation { ref message, .. } if message.contains("jbPublishToMavenRepository")),
            "got: {err}"
        );
    }

    #[test]
    fn inherited_endpoints_are_deduplicated() {
        let reg = registry();
        let mock = reg.maven_repo("mock").unwrap();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg)
            .unwrap()
            .descriptor(descriptor("0.1"))
            .maven_repo("mock")
            .unwrap()
            .maven_local();
        resolved(&mut unit);
        let inherited = vec![Arc::clone(&mock), reg.maven_local()];
        let done = unit
            .finalize(&inherited, UnitDefaults::default(), &reg)
            .unwrap();
        assert_eq!(done.endpoints().len(), 2);
    }

    #[test]
    fn finalize_without_declaration_skips_a_phase() {
        let reg = registry();
        let unit = PublishableUnit::new("lib");
        let err = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap_err();
        assert!(matches!(err, JarbirdError::Phase { .. }), "got: {err}");
    }

    #[test]
    fn unresolved_descriptor_is_rejected() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg).unwrap();
        let err = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap_err();
        assert!(matches!(err, JarbirdError::Validation { .. }), "got: {err}");
    }

    #[test]
    fn resolve_reports_missing_metadata_with_unit_name() {
        let reg = registry();
        let mut unit = PublishableUnit::new("core");
        unit.declare(&reg).unwrap().variant("jre8");
        let err = unit
            .resolve_descriptor(
                &DescriptorResolver::default(),
                &ProjectInfo::default(),
                &FixedClock(2021),
            )
            .unwrap_err();
        match err {
            JarbirdError::MissingMetadata { unit, field } => {
                assert_eq!(unit, "coreJre8");
                assert_eq!(field, "group");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snapshot_skips_release_only_endpoints() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg)
            .unwrap()
            .descriptor(descriptor("0.1-SNAPSHOT"))
            .plugin_portal()
            .unwrap();
        resolved(&mut unit);
        let done = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap();
        assert_eq!(done.endpoints().len(), 2);
        let graph: Vec<_> = done.graph_endpoints().iter().map(|e| e.kind).collect();
        assert_eq!(graph, [EndpointKind::Local]);
    }

    #[test]
    fn flags_fall_back_to_defaults() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg)
            .unwrap()
            .descriptor(descriptor("1.0"))
            .signing(false);
        resolved(&mut unit);
        let defaults = UnitDefaults {
            signing: true,
            docs: false,
        };
        let done = unit.finalize(&[], defaults, &reg).unwrap();
        assert!(!done.signing());
        assert!(!done.docs());
    }

    #[test]
    fn attach_twice_is_an_error() {
        let reg = registry();
        let mut unit = PublishableUnit::new("lib");
        unit.declare(&reg).unwrap().descriptor(descriptor("1.0"));
        resolved(&mut unit);
        let mut done = unit.finalize(&[], UnitDefaults::default(), &reg).unwrap();
        done.attach_to_graph().unwrap();
        assert_eq!(done.phase(), UnitPhase::GraphAttached);
        assert!(done.attach_to_graph().is_err());
    }
}
