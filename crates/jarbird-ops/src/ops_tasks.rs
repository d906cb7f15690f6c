//! Operation: list the synthesized publishing tasks.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use jarbird_publish::graph::{InMemoryTaskRegistry, RegisteredTask, TaskKind};
use jarbird_publish::naming::GRAND_TASK;
use jarbird_util::errors::JarbirdError;

use crate::ops_plan::{self, PlanContext, WorkspacePlan};

/// Options for `jarbird tasks`.
#[derive(Debug, Default)]
pub struct TasksOptions {
    /// Emit the registered tasks as JSON instead of a tree.
    pub json: bool,
}

#[derive(Serialize)]
struct TasksReport {
    projects: Vec<ProjectTasks>,
}

#[derive(Serialize)]
struct ProjectTasks {
    path: String,
    tasks: Vec<RegisteredTask>,
}

/// Render the task listing of the project containing `dir`.
pub fn tasks(dir: &Path, opts: &TasksOptions) -> miette::Result<String> {
    tasks_with(dir, opts, &PlanContext::default())
}

pub fn tasks_with(dir: &Path, opts: &TasksOptions, ctx: &PlanContext) -> miette::Result<String> {
    let plan = ops_plan::plan_with(dir, ctx)?;
    if opts.json {
        render_json(&plan)
    } else {
        Ok(render_text(&plan))
    }
}

fn render_json(plan: &WorkspacePlan) -> miette::Result<String> {
    let mut projects = Vec::new();
    for module in plan.modules() {
        let mut registry = InMemoryTaskRegistry::new();
        module.graph.export(&mut registry)?;
        projects.push(ProjectTasks {
            path: module.path.clone(),
            tasks: registry.tasks().to_vec(),
        });
    }
    let json = serde_json::to_string_pretty(&TasksReport { projects }).map_err(|e| {
        JarbirdError::Generic {
            message: format!("Failed to serialize tasks: {e}"),
        }
    })?;
    Ok(json + "\n")
}

fn render_text(plan: &WorkspacePlan) -> String {
    let mut out = String::new();
    for (i, module) in plan.modules().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "Project {}", module.path);
        out.push_str(&module.graph.render_tree(GRAND_TASK));

        let units: Vec<_> = module
            .graph
            .tasks()
            .into_iter()
            .filter(|t| t.kind == TaskKind::Unit)
            .collect();
        if !units.is_empty() {
            let _ = writeln!(out, "\nPublications:");
            for task in units {
                let _ = writeln!(out, "  {} - {}", task.name, task.description);
            }
        }

        for failure in &module.failures {
            let _ = writeln!(out, "warning: skipped: {failure}");
        }
    }
    out
}
