//! Publishing scope: the publications of one project plus the defaults it
//! passes on to nested projects.

use std::collections::HashMap;
use std::sync::Arc;

use jarbird_core::clock::Clock;
use jarbird_core::manifest::RepositoryDecl;
use jarbird_core::project::ProjectInfo;
use jarbird_maven::endpoint::RepositoryEndpoint;
use jarbird_maven::registry::EndpointRegistry;
use jarbird_resolver::resolver::DescriptorResolver;
use jarbird_util::errors::{JarbirdError, JarbirdResult};

use crate::naming;
use crate::unit::{FinalizedUnit, PublishableUnit, UnitDeclaration, UnitDefaults, DEFAULT_PUB_NAME};

/// Result of finalizing a scope. Units that failed validation are reported
/// in `failures` and left out of `units`; they do not stop their siblings.
#[derive(Debug, Default)]
pub struct ScopeOutcome {
    pub units: Vec<FinalizedUnit>,
    pub failures: Vec<JarbirdError>,
}

impl ScopeOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct PublishScope {
    path: String,
    project: ProjectInfo,
    registry: Arc<EndpointRegistry>,
    resolver: Arc<DescriptorResolver>,
    parent: Option<Arc<PublishScope>>,
    endpoints: Vec<Arc<RepositoryEndpoint>>,
    signing: Option<bool>,
    docs: Option<bool>,
    units: Vec<PublishableUnit>,
}

impl PublishScope {
    /// `path` identifies the scope in messages, `:` for a root and
    /// `:member` for workspace members.
    pub fn new(
        path: &str,
        project: ProjectInfo,
        registry: Arc<EndpointRegistry>,
        resolver: Arc<DescriptorResolver>,
        parent: Option<Arc<PublishScope>>,
    ) -> Self {
        Self {
            path: path.to_string(),
            project,
            registry,
            resolver,
            parent,
            endpoints: Vec::new(),
            signing: None,
            docs: None,
            units: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn project(&self) -> &ProjectInfo {
        &self.project
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &Arc<DescriptorResolver> {
        &self.resolver
    }

    pub fn parent(&self) -> Option<&Arc<PublishScope>> {
        self.parent.as_ref()
    }

    pub fn units(&self) -> &[PublishableUnit] {
        &self.units
    }

    /// Add an endpoint every publication of this scope and of nested scopes
    /// targets.
    pub fn repository(&mut self, decl: &RepositoryDecl) -> JarbirdResult<&mut Self> {
        let endpoint = self.registry.get_decl(decl)?;
        if !self.endpoints.contains(&endpoint) {
            self.endpoints.push(endpoint);
        }
        Ok(self)
    }

    pub fn signing(&mut self, enabled: bool) -> &mut Self {
        self.signing = Some(enabled);
        self
    }

    pub fn docs(&mut self, enabled: bool) -> &mut Self {
        self.docs = Some(enabled);
        self
    }

    /// Declare a publication and configure it with `configure`.
    pub fn publish<F>(&mut self, configure: F) -> JarbirdResult<&PublishableUnit>
    where
        F: FnOnce(&mut UnitDeclaration<'_>) -> JarbirdResult<()>,
    {
        let mut unit = PublishableUnit::new(DEFAULT_PUB_NAME);
        {
            let mut declaration = unit.declare(&self.registry)?;
            configure(&mut declaration)?;
        }
        let index = self.units.len();
        self.units.push(unit);
        Ok(&self.units[index])
    }

    /// Declare a publication of a given variant.
    pub fn publish_variant<F>(&mut self, variant: &str, configure: F) -> JarbirdResult<&PublishableUnit>
    where
        F: FnOnce(&mut UnitDeclaration<'_>) -> JarbirdResult<()>,
    {
        self.publish(|unit| {
            unit.variant(variant);
            configure(unit)
        })
    }

    /// Declare the default `lib` publication if nothing was declared.
    /// Returns whether a publication was added.
    pub fn ensure_implicit_unit(&mut self) -> JarbirdResult<bool> {
        if !self.units.is_empty() {
            return Ok(false);
        }
        tracing::debug!("{}: no publication declared, using '{DEFAULT_PUB_NAME}'", self.path);
        self.publish(|_| Ok(()))?;
        Ok(true)
    }

    /// Endpoints declared by this scope and every enclosing scope, nearest
    /// first, without duplicates.
    pub fn inherited_endpoints(&self) -> Vec<Arc<RepositoryEndpoint>> {
        let mut all = self.endpoints.clone();
        if let Some(parent) = &self.parent {
            for endpoint in parent.inherited_endpoints() {
                if !all.contains(&endpoint) {
                    all.push(endpoint);
                }
            }
        }
        all
    }

    /// Signing and doc flags after walking the enclosing scopes.
    pub fn defaults(&self) -> UnitDefaults {
        let builtin = UnitDefaults::default();
        UnitDefaults {
            signing: self.lookup(|s| s.signing).unwrap_or(builtin.signing),
            docs: self.lookup(|s| s.docs).unwrap_or(builtin.docs),
        }
    }

    fn lookup(&self, field: impl Fn(&PublishScope) -> Option<bool> + Copy) -> Option<bool> {
        field(self).or_else(|| self.parent.as_ref().and_then(|p| p.lookup(field)))
    }

    /// Finalize every declared publication.
    ///
    /// A duplicate effective name fails the whole batch. Any other failure
    /// only drops the failing publication.
    pub fn finalize(&mut self, clock: &dyn Clock) -> JarbirdResult<ScopeOutcome> {
        self.check_duplicates()?;

        let inherited = self.inherited_endpoints();
        let defaults = self.defaults();
        let mut outcome = ScopeOutcome::default();
        for mut unit in std::mem::take(&mut self.units) {
            let result = unit
                .resolve_descriptor(&self.resolver, &self.project, clock)
                .and_then(|()| unit.finalize(&inherited, defaults, &self.registry));
            match result {
                Ok(done) => outcome.units.push(done),
                Err(e) => {
                    tracing::debug!("{}: {e}", self.path);
                    outcome.failures.push(e);
                }
            }
        }
        Ok(outcome)
    }

    fn check_duplicates(&self) -> JarbirdResult<()> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, unit) in self.units.iter().enumerate() {
            let name = unit.effective_name();
            if let Some(first) = seen.get(&name) {
                return Err(JarbirdError::DuplicateUnitName {
                    first: self.describe(*first),
                    second: self.describe(index),
                    name,
                });
            }
            seen.insert(name, index);
        }
        self.check_endpoint_tasks()
    }

    /// Repository keys that differ only in case or hyphenation share a
    /// `jbPublishTo<Endpoint>` task.
    fn check_endpoint_tasks(&self) -> JarbirdResult<()> {
        let inherited = self.inherited_endpoints();
        let declared = self.units.iter().flat_map(|u| u.endpoints().iter());
        let mut seen: HashMap<String, &Arc<RepositoryEndpoint>> = HashMap::new();
        for endpoint in inherited.iter().chain(declared) {
            if !endpoint.kind.is_named() {
                continue;
            }
            let task = naming::endpoint_task(endpoint.kind, &endpoint.id);
            match seen.get(&task) {
                Some(first) if first.id != endpoint.id => {
                    return Err(JarbirdError::TaskNameConflict {
                        task,
                        first: naming::endpoint_label(first.kind, &first.id),
                        second: naming::endpoint_label(endpoint.kind, &endpoint.id),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(task, endpoint);
                }
            }
        }
        Ok(())
    }

    fn describe(&self, index: usize) -> String {
        let unit = &self.units[index];
        let variant = if unit.variant().is_empty() {
            String::new()
        } else {
            format!(", variant '{}'", unit.variant())
        };
        format!("publication #{} in {} ('{}'{variant})", index + 1, self.path, unit.name())
    }
}
