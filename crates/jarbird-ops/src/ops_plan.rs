//! Operation: load a project or workspace and plan its publications.
//!
//! Every other operation starts here. Planning reads `jarbird.toml`,
//! `jarbird.properties` and `pom.yaml` from the project, the workspace root
//! and `~/.jarbird`, declares the publications, finalizes them and
//! synthesizes the `jbPublish` task graph of every module.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jarbird_core::clock::{Clock, SystemClock};
use jarbird_core::manifest::{Manifest, PubDecl, MANIFEST_FILE};
use jarbird_core::project::ProjectInfo;
use jarbird_core::properties::LayeredProperties;
use jarbird_maven::registry::EndpointRegistry;
use jarbird_publish::graph::{TaskGraph, TaskGraphBuilder};
use jarbird_publish::scope::PublishScope;
use jarbird_publish::unit::{FinalizedUnit, UnitDeclaration};
use jarbird_resolver::fragment::FragmentGroup;
use jarbird_resolver::resolver::DescriptorResolver;
use jarbird_util::errors::{JarbirdError, JarbirdResult};

/// Where planning looks for per-user settings and what it takes as today.
pub struct PlanContext {
    pub home: PathBuf,
    pub clock: Box<dyn Clock>,
}

impl Default for PlanContext {
    fn default() -> Self {
        Self {
            home: jarbird_util::fs::jarbird_home(),
            clock: Box::new(SystemClock),
        }
    }
}

/// Planned publications of one project.
#[derive(Debug)]
pub struct ModulePlan {
    /// `:` for the root, `:member` for workspace members.
    pub path: String,
    pub dir: PathBuf,
    pub units: Vec<FinalizedUnit>,
    /// Publications that were declared but could not be finalized.
    pub failures: Vec<JarbirdError>,
    pub graph: TaskGraph,
}

#[derive(Debug)]
pub struct WorkspacePlan {
    pub root: ModulePlan,
    pub members: Vec<ModulePlan>,
}

impl WorkspacePlan {
    /// The root first, then members in manifest order.
    pub fn modules(&self) -> impl Iterator<Item = &ModulePlan> {
        std::iter::once(&self.root).chain(self.members.iter())
    }

    pub fn into_modules(self) -> impl Iterator<Item = ModulePlan> {
        std::iter::once(self.root).chain(self.members)
    }

    pub fn unit_count(&self) -> usize {
        self.modules().map(|m| m.units.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.modules().map(|m| m.failures.len()).sum()
    }

    /// Find a module by its path (`:` or `:member`).
    pub fn module(&self, path: &str) -> Option<&ModulePlan> {
        self.modules().find(|m| m.path == path)
    }
}

/// Plan the project containing `dir` with the default context.
pub fn plan(dir: &Path) -> miette::Result<WorkspacePlan> {
    plan_with(dir, &PlanContext::default())
}

/// Plan the project containing `dir`.
///
/// The nearest ancestor holding `jarbird.toml` is the root. Only failures
/// that make the whole batch meaningless (unreadable files, duplicate names,
/// unknown scope-level repositories) are returned as errors; a publication
/// that fails validation is recorded in its module's `failures`.
pub fn plan_with(dir: &Path, ctx: &PlanContext) -> miette::Result<WorkspacePlan> {
    let root_dir = jarbird_util::fs::find_ancestor_with(dir, MANIFEST_FILE).ok_or_else(|| {
        JarbirdError::Manifest {
            message: format!(
                "Could not find {MANIFEST_FILE} in {} or any parent directory",
                dir.display()
            ),
        }
    })?;
    tracing::debug!("planning publications of {}", root_dir.display());
    let manifest = Manifest::from_path(&root_dir.join(MANIFEST_FILE))?;

    let home_resolver = Arc::new(DescriptorResolver::new(
        FragmentGroup::load_dir(&ctx.home)?,
        None,
    ));

    let mut root_project = manifest.project.clone();
    if root_project.name.is_empty() {
        root_project.name = dir_name(&root_dir);
    }
    let root_props = LayeredProperties::from_dirs([root_dir.as_path(), ctx.home.as_path()])?;
    let root_fragments = FragmentGroup::load_dir(&root_dir)?;
    let has_members = manifest
        .workspace
        .as_ref()
        .is_some_and(|w| !w.members.is_empty());
    // A workspace root only publishes what it declares itself.
    let implicit = !root_fragments.is_empty() || (!has_members && !root_project.group.is_empty());
    let mut root_scope = PublishScope::new(
        ":",
        root_project.clone(),
        Arc::new(EndpointRegistry::new(Arc::new(root_props))),
        Arc::new(DescriptorResolver::new(root_fragments, Some(home_resolver))),
        None,
    );
    let (root_declared, mut root_failures) = declare(&mut root_scope, &manifest, implicit)?;
    let outcome = root_scope.finalize(ctx.clock.as_ref())?;
    root_failures.extend(outcome.failures);
    let mut root_units = outcome.units;
    let mut root_graph = TaskGraphBuilder::new().build(&mut root_units)?;
    if root_declared == 0 && !has_members {
        tracing::warn!("{}: nothing to publish", root_dir.display());
    }

    let root_scope = Arc::new(root_scope);
    let mut members = Vec::new();
    if let Some(workspace) = &manifest.workspace {
        for member in &workspace.members {
            let plan = plan_member(&root_dir, member, &root_project, &root_scope, ctx)?;
            root_graph.link_child(&plan.path, &plan.graph)?;
            members.push(plan);
        }
    }

    Ok(WorkspacePlan {
        root: ModulePlan {
            path: ":".to_string(),
            dir: root_dir,
            units: root_units,
            failures: root_failures,
            graph: root_graph,
        },
        members,
    })
}

fn plan_member(
    root_dir: &Path,
    member: &str,
    root_project: &ProjectInfo,
    root_scope: &Arc<PublishScope>,
    ctx: &PlanContext,
) -> miette::Result<ModulePlan> {
    let dir = root_dir.join(member);
    let path = format!(":{}", member.trim_matches('/').replace('/', ":"));
    let manifest_path = dir.join(MANIFEST_FILE);
    let has_manifest = manifest_path.is_file();
    let manifest = if has_manifest {
        Manifest::from_path(&manifest_path)?
    } else {
        tracing::debug!("{path}: no {MANIFEST_FILE}, using workspace defaults");
        Manifest::default()
    };

    let project = member_project(&manifest.project, root_project, &dir);
    let props = LayeredProperties::from_dirs([dir.as_path(), root_dir, ctx.home.as_path()])?;
    let fragments = FragmentGroup::load_dir(&dir)?;
    let has_fragments = !fragments.is_empty();
    let mut scope = PublishScope::new(
        &path,
        project,
        Arc::new(EndpointRegistry::with_parent(
            Arc::new(props),
            Arc::clone(root_scope.registry()),
        )),
        Arc::new(DescriptorResolver::new(
            fragments,
            Some(Arc::clone(root_scope.resolver())),
        )),
        Some(Arc::clone(root_scope)),
    );

    let (declared, mut failures) = declare(&mut scope, &manifest, has_manifest || has_fragments)?;
    let outcome = scope.finalize(ctx.clock.as_ref())?;
    failures.extend(outcome.failures);
    let mut units = outcome.units;
    let graph = TaskGraphBuilder::new().build(&mut units)?;
    if declared == 0 {
        tracing::warn!("{path}: nothing to publish");
    }

    Ok(ModulePlan {
        path,
        dir,
        units,
        failures,
        graph,
    })
}

/// Fields a member leaves empty come from the workspace root, except the
/// name, which defaults to the member's directory.
fn member_project(own: &ProjectInfo, root: &ProjectInfo, dir: &Path) -> ProjectInfo {
    let pick = |mine: &str, theirs: &str| {
        if mine.is_empty() {
            theirs.to_string()
        } else {
            mine.to_string()
        }
    };
    ProjectInfo {
        group: pick(&own.group, &root.group),
        name: pick(&own.name, &dir_name(dir)),
        version: pick(&own.version, &root.version),
        description: pick(&own.description, &root.description),
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Apply the manifest to `scope`. Returns how many publications were
/// declared and the declarations that failed.
fn declare(
    scope: &mut PublishScope,
    manifest: &Manifest,
    implicit: bool,
) -> JarbirdResult<(usize, Vec<JarbirdError>)> {
    for decl in &manifest.publish.repositories {
        scope.repository(decl)?;
    }
    if let Some(signing) = manifest.publish.signing {
        scope.signing(signing);
    }
    if let Some(docs) = manifest.publish.docs {
        scope.docs(docs);
    }

    let mut failures = Vec::new();
    for decl in &manifest.pubs {
        if let Err(e) = scope.publish(|unit| apply_pub(unit, decl)).map(|_| ()) {
            tracing::debug!("{}: {e}", scope.path());
            failures.push(e);
        }
    }
    if manifest.pubs.is_empty() && implicit {
        scope.ensure_implicit_unit()?;
    }
    Ok((scope.units().len() + failures.len(), failures))
}

fn apply_pub(unit: &mut UnitDeclaration<'_>, decl: &PubDecl) -> JarbirdResult<()> {
    if let Some(name) = &decl.name {
        unit.name(name);
    }
    if let Some(variant) = &decl.variant {
        unit.variant(variant);
    }
    if let Some(mode) = decl.variant_mode {
        unit.variant_mode(mode);
    }
    if let Some(source) = &decl.source {
        unit.from(source.clone());
    }
    if let Some(signing) = decl.signing {
        unit.signing(signing);
    }
    if let Some(docs) = decl.docs {
        unit.docs(docs);
    }
    for repository in &decl.repositories {
        unit.repository(repository)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_project_inherits_root_fields() {
        let root = ProjectInfo {
            group: "g".into(),
            name: "root".into(),
            version: "1.0".into(),
            description: "desc".into(),
        };
        let own = ProjectInfo {
            version: "2.0".into(),
            ..Default::default()
        };
        let project = member_project(&own, &root, Path::new("/ws/core"));
        assert_eq!(project.group, "g");
        assert_eq!(project.name, "core");
        assert_eq!(project.version, "2.0");
        assert_eq!(project.description, "desc");
    }

    #[test]
    fn dir_name_of_root_is_empty() {
        assert_eq!(dir_name(Path::new("/")), "");
        assert_eq!(dir_name(Path::new("/a/b")), "b");
    }
}
