//! Publishing task graph.
//!
//! Nodes are tasks; an edge runs from a dependency to the task that needs
//! it, so a topological walk yields dependencies first. Tasks of the host
//! build (the uploads themselves, or tasks of child projects) are not nodes:
//! they are recorded on the task that wraps them.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use jarbird_maven::endpoint::{EndpointKind, RepositoryEndpoint};
use jarbird_util::errors::{JarbirdError, JarbirdResult};

use crate::naming;
use crate::unit::FinalizedUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// One publication to one endpoint.
    Leaf,
    /// Plugin marker of one publication to one endpoint.
    Marker,
    /// All endpoints of one publication.
    Unit,
    /// All publications to one named repository.
    Endpoint,
    /// All publications to one kind of repository.
    Kind,
    /// Everything.
    Grand,
}

impl TaskKind {
    pub fn is_aggregate(self) -> bool {
        !matches!(self, TaskKind::Leaf | TaskKind::Marker)
    }

    /// What a task of this kind publishes, for error messages.
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Leaf => "a publication upload",
            TaskKind::Marker => "a plugin marker upload",
            TaskKind::Unit => "a publication aggregate",
            TaskKind::Endpoint => "a repository aggregate",
            TaskKind::Kind => "a repository kind aggregate",
            TaskKind::Grand => "the grand aggregate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub name: String,
    pub description: String,
    pub kind: TaskKind,
    /// Tasks outside this graph that must run first.
    pub external: Vec<String>,
}

/// Opaque handle returned by a [`TaskRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaskHandle(pub usize);

/// The host's task container.
pub trait TaskRegistry {
    /// Register a task. Registering an existing name returns the existing
    /// handle.
    fn register_task(&mut self, name: &str, depends_on: &[String], description: &str) -> TaskHandle;

    fn task_exists(&self, name: &str) -> bool;
}

/// A task as recorded by [`InMemoryTaskRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredTask {
    pub name: String,
    pub description: String,
    pub depends_on: Vec<String>,
}

/// A [`TaskRegistry`] that just records what it is given.
#[derive(Debug, Default)]
pub struct InMemoryTaskRegistry {
    tasks: Vec<RegisteredTask>,
    index: HashMap<String, TaskHandle>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[RegisteredTask] {
        &self.tasks
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTask> {
        self.index.get(name).map(|h| &self.tasks[h.0])
    }
}

impl TaskRegistry for InMemoryTaskRegistry {
    fn register_task(&mut self, name: &str, depends_on: &[String], description: &str) -> TaskHandle {
        if let Some(&handle) = self.index.get(name) {
            return handle;
        }
        let handle = TaskHandle(self.tasks.len());
        self.tasks.push(RegisteredTask {
            name: name.to_string(),
            description: description.to_string(),
            depends_on: depends_on.to_vec(),
        });
        self.index.insert(name.to_string(), handle);
        handle
    }

    fn task_exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// Task dependency graph backed by petgraph.
#[derive(Debug, Default)]
pub struct TaskGraph {
    graph: DiGraph<TaskNode, ()>,
    index: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task, or return the existing one with that name. A name
    /// already taken by a task of another kind is a conflict.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        kind: TaskKind,
    ) -> JarbirdResult<NodeIndex> {
        if let Some(&idx) = self.index.get(name) {
            let existing = self.graph[idx].kind;
            if existing != kind {
                return Err(JarbirdError::TaskNameConflict {
                    task: name.to_string(),
                    first: existing.label().to_string(),
                    second: kind.label().to_string(),
                });
            }
            return Ok(idx);
        }
        let idx = self.graph.add_node(TaskNode {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            external: Vec::new(),
        });
        self.index.insert(name.to_string(), idx);
        Ok(idx)
    }

    /// Make `task` depend on `dependency`. Repeated calls add one edge.
    pub fn depends_on(&mut self, task: NodeIndex, dependency: NodeIndex) {
        if task == dependency {
            return;
        }
        if !self.graph.edges(dependency).any(|e| e.target() == task) {
            self.graph.add_edge(dependency, task, ());
        }
    }

    /// Make `task` depend on a task outside this graph.
    pub fn depends_on_external(&mut self, task: NodeIndex, external: &str) {
        let node = &mut self.graph[task];
        if !node.external.iter().any(|e| e == external) {
            node.external.push(external.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn task(&self, name: &str) -> Option<&TaskNode> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All tasks, sorted by name.
    pub fn tasks(&self) -> Vec<&TaskNode> {
        let mut tasks: Vec<&TaskNode> = self.graph.node_weights().collect();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        tasks
    }

    /// Direct in-graph dependencies of `name`, sorted.
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|d| self.graph[d].name.as_str())
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Every task `name` reaches, directly or not.
    pub fn transitive_dependencies(&self, name: &str) -> BTreeSet<&str> {
        let mut seen = BTreeSet::new();
        let Some(&start) = self.index.get(name) else {
            return seen;
        };
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for dep in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if seen.insert(self.graph[dep].name.as_str()) {
                    stack.push(dep);
                }
            }
        }
        seen
    }

    /// Leaf and marker tasks `name` reaches.
    pub fn leaves_of(&self, name: &str) -> BTreeSet<&str> {
        self.transitive_dependencies(name)
            .into_iter()
            .filter(|n| self.task(n).is_some_and(|t| !t.kind.is_aggregate()))
            .collect()
    }

    /// Tasks in dependency order. A cycle is a bug in graph synthesis.
    pub fn topological_order(&self) -> JarbirdResult<Vec<&TaskNode>> {
        let order = toposort(&self.graph, None).map_err(|cycle| JarbirdError::TaskCycle {
            task: self.graph[cycle.node_id()].name.clone(),
        })?;
        Ok(order.into_iter().map(|idx| &self.graph[idx]).collect())
    }

    /// Hand every task to the host's registry, dependencies first.
    pub fn export(&self, registry: &mut dyn TaskRegistry) -> JarbirdResult<Vec<TaskHandle>> {
        let mut handles = Vec::with_capacity(self.len());
        for node in self.topological_order()? {
            let mut depends_on: Vec<String> = self
                .dependencies(&node.name)
                .into_iter()
                .map(str::to_string)
                .collect();
            depends_on.extend(node.external.iter().cloned());
            handles.push(registry.register_task(&node.name, &depends_on, &node.description));
        }
        Ok(handles)
    }

    /// Make this graph's aggregates also run the same aggregates of a
    /// child project at `child_path` (e.g. `:lib`).
    pub fn link_child(&mut self, child_path: &str, child: &TaskGraph) -> JarbirdResult<()> {
        for node in child.graph.node_weights() {
            if !matches!(node.kind, TaskKind::Grand | TaskKind::Kind | TaskKind::Endpoint) {
                continue;
            }
            let idx = self.register(&node.name, &node.description, node.kind)?;
            self.depends_on_external(idx, &format!("{child_path}:{}", node.name));
        }
        Ok(())
    }

    /// The tree under `root` drawn with box characters.
    pub fn render_tree(&self, root: &str) -> String {
        let mut output = String::new();
        let Some(node) = self.task(root) else {
            return output;
        };
        output.push_str(&format!("{} - {}\n", node.name, node.description));
        self.render_children(&mut output, root, "");
        output
    }

    fn render_children(&self, output: &mut String, name: &str, prefix: &str) {
        let mut children: Vec<String> = self
            .dependencies(name)
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(node) = self.task(name) {
            children.extend(node.external.iter().map(|e| format!("({e})")));
        }
        let count = children.len();
        for (i, child) in children.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            output.push_str(&format!("{prefix}{connector}{child}\n"));
            if self.contains(child) {
                let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
                self.render_children(output, child, &child_prefix);
            }
        }
    }
}

/// Synthesizes the task graph of a batch of finalized publications.
#[derive(Debug, Default)]
pub struct TaskGraphBuilder {
    graph: TaskGraph,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for `units`, attaching each of them to it.
    pub fn build(mut self, units: &mut [FinalizedUnit]) -> JarbirdResult<TaskGraph> {
        let grand = self.graph.register(
            naming::GRAND_TASK,
            &naming::grand_description(),
            TaskKind::Grand,
        )?;

        for unit in units.iter_mut() {
            unit.attach_to_graph()?;
            self.add_unit(grand, unit)?;
        }

        // Acyclic by construction; a cycle here is a wiring bug.
        self.graph.topological_order()?;
        Ok(self.graph)
    }

    fn add_unit(&mut self, grand: NodeIndex, unit: &FinalizedUnit) -> JarbirdResult<()> {
        let (name, variant) = (unit.name(), unit.variant());
        let unit_task = self.graph.register(
            &naming::unit_task(name, variant),
            &naming::unit_description(name, variant),
            TaskKind::Unit,
        )?;

        for endpoint in unit.graph_endpoints() {
            let aggregate = self.aggregate_for(grand, &endpoint)?;

            let leaf = self.graph.register(
                &naming::leaf_task(name, variant, endpoint.kind, &endpoint.id),
                &naming::leaf_description(name, variant, endpoint.kind, &endpoint.id),
                TaskKind::Leaf,
            )?;
            self.graph.depends_on_external(
                leaf,
                &naming::host_publish_task(name, variant, endpoint.kind, &endpoint.id),
            );
            self.graph.depends_on(unit_task, leaf);
            self.graph.depends_on(aggregate, leaf);

            if unit.is_plugin() && endpoint.kind.is_maven_layout() {
                let marker = self.graph.register(
                    &naming::marker_task(name, variant, endpoint.kind, &endpoint.id),
                    &naming::marker_description(name, variant, endpoint.kind, &endpoint.id),
                    TaskKind::Marker,
                )?;
                self.graph.depends_on_external(
                    marker,
                    &naming::host_marker_task(name, variant, endpoint.kind, &endpoint.id),
                );
                self.graph.depends_on(unit_task, marker);
                self.graph.depends_on(aggregate, marker);
            }
        }
        Ok(())
    }

    /// The aggregate a leaf for `endpoint` hangs under: the named
    /// repository's aggregate for Maven and Artifactory, otherwise the kind
    /// aggregate. Created on first use and linked up to the grand task.
    fn aggregate_for(
        &mut self,
        grand: NodeIndex,
        endpoint: &RepositoryEndpoint,
    ) -> JarbirdResult<NodeIndex> {
        let kind: EndpointKind = endpoint.kind;
        let kind_task = self.graph.register(
            &naming::kind_task(kind),
            &naming::kind_description(kind),
            TaskKind::Kind,
        )?;
        self.graph.depends_on(grand, kind_task);
        if !kind.is_named() {
            return Ok(kind_task);
        }
        let endpoint_task = self.graph.register(
            &naming::endpoint_task(kind, &endpoint.id),
            &naming::endpoint_description(kind, &endpoint.id),
            TaskKind::Endpoint,
        )?;
        self.graph.depends_on(kind_task, endpoint_task);
        Ok(endpoint_task)
    }
}
