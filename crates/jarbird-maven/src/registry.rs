//! Per-scope cache of repository endpoints.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use jarbird_core::manifest::RepositoryDecl;
use jarbird_core::properties::PropertySource;
use jarbird_util::errors::JarbirdResult;

use crate::endpoint::{EndpointKind, RepositoryEndpoint};

type CacheKey = (EndpointKind, String);

/// Builds endpoints on first reference and hands out the same instance for
/// every later reference to the same `(kind, key)`.
///
/// A registry may have a parent (the enclosing scope's registry). Endpoints
/// the parent already built are reused, and the local cache endpoint is
/// shared by the whole chain.
pub struct EndpointRegistry {
    properties: Arc<dyn PropertySource + Send + Sync>,
    parent: Option<Arc<EndpointRegistry>>,
    local: Arc<RepositoryEndpoint>,
    cache: Mutex<HashMap<CacheKey, Arc<RepositoryEndpoint>>>,
}

impl EndpointRegistry {
    pub fn new(properties: Arc<dyn PropertySource + Send + Sync>) -> Self {
        Self {
            properties,
            parent: None,
            local: Arc::new(RepositoryEndpoint::local()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_parent(
        properties: Arc<dyn PropertySource + Send + Sync>,
        parent: Arc<EndpointRegistry>,
    ) -> Self {
        Self {
            properties,
            local: Arc::clone(&parent.local),
            parent: Some(parent),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get or build the endpoint for `(kind, key)`.
    pub fn get(&self, kind: EndpointKind, key: &str) -> JarbirdResult<Arc<RepositoryEndpoint>> {
        if kind == EndpointKind::Local {
            return Ok(Arc::clone(&self.local));
        }
        let cache_key = (kind, if kind.is_named() { key.to_string() } else { String::new() });

        if let Some(found) = self.parent.as_ref().and_then(|p| p.cached(&cache_key)) {
            return Ok(found);
        }

        // Check and insert under one lock so concurrent callers share the
        // instance.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = cache.get(&cache_key) {
            return Ok(Arc::clone(found));
        }
        let endpoint = Arc::new(RepositoryEndpoint::build(kind, key, self.properties.as_ref())?);
        tracing::debug!("registered endpoint {endpoint}");
        cache.insert(cache_key, Arc::clone(&endpoint));
        Ok(endpoint)
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<RepositoryEndpoint>> {
        if let Some(found) = self.parent.as_ref().and_then(|p| p.cached(key)) {
            return Some(found);
        }
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn maven_local(&self) -> Arc<RepositoryEndpoint> {
        Arc::clone(&self.local)
    }

    pub fn maven_repo(&self, key: &str) -> JarbirdResult<Arc<RepositoryEndpoint>> {
        self.get(EndpointKind::Maven, key)
    }

    pub fn plugin_portal(&self) -> JarbirdResult<Arc<RepositoryEndpoint>> {
        self.get(EndpointKind::PluginPortal, "")
    }

    pub fn artifactory(&self, key: &str) -> JarbirdResult<Arc<RepositoryEndpoint>> {
        self.get(EndpointKind::Artifactory, key)
    }

    /// Endpoint for a repository declaration from `jarbird.toml`.
    pub fn get_decl(&self, decl: &RepositoryDecl) -> JarbirdResult<Arc<RepositoryEndpoint>> {
        match decl {
            RepositoryDecl::Local => Ok(self.maven_local()),
            RepositoryDecl::Maven(key) => self.maven_repo(key),
            RepositoryDecl::GradlePortal => self.plugin_portal(),
            RepositoryDecl::Artifactory(key) => self.artifactory(key),
        }
    }

    /// Number of endpoints built by this registry itself.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("cached", &self.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
