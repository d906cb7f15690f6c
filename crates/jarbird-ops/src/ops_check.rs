//! Operation: validate every publication without touching any repository.
//!
//! Plans the project and reports, per publication, the coordinates and the
//! endpoints it would be uploaded to. Publications that failed validation
//! are collected instead of aborting the run.

use std::path::Path;

use jarbird_util::errors::JarbirdError;

use crate::ops_plan::{self, PlanContext};

#[derive(Debug)]
pub struct UnitSummary {
    /// Module the publication belongs to.
    pub path: String,
    pub name: String,
    pub variant: String,
    pub coordinates: String,
    /// Plugin marker coordinates, for plugins.
    pub marker: Option<String>,
    /// Endpoints that get publish tasks, with the POM URL on each.
    pub endpoints: Vec<String>,
    /// Endpoints targeted but skipped, e.g. release-only ones for snapshots.
    pub skipped: Vec<String>,
    pub signing: bool,
    pub docs: bool,
}

#[derive(Debug, Default)]
pub struct CheckSummary {
    pub units: Vec<UnitSummary>,
    /// Module path and error of each publication that failed.
    pub failures: Vec<(String, JarbirdError)>,
}

impl CheckSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn check(dir: &Path) -> miette::Result<CheckSummary> {
    check_with(dir, &PlanContext::default())
}

pub fn check_with(dir: &Path, ctx: &PlanContext) -> miette::Result<CheckSummary> {
    let plan = ops_plan::plan_with(dir, ctx)?;
    let mut summary = CheckSummary::default();

    for module in plan.into_modules() {
        for unit in &module.units {
            let coords = unit.coordinates();
            let published = unit.graph_endpoints();
            let endpoints = published
                .iter()
                .map(|e| match e.pom_url(&coords) {
                    Some(url) => format!("{e} -> {url}"),
                    None => e.to_string(),
                })
                .collect();
            let skipped = unit
                .endpoints()
                .iter()
                .filter(|e| !published.contains(*e))
                .map(|e| e.to_string())
                .collect();
            summary.units.push(UnitSummary {
                path: module.path.clone(),
                name: unit.name().to_string(),
                variant: unit.variant().to_string(),
                coordinates: coords.to_string(),
                marker: unit
                    .descriptor()
                    .plugin
                    .as_ref()
                    .map(|p| p.marker_coordinates(&coords).to_string()),
                endpoints,
                skipped,
                signing: unit.signing(),
                docs: unit.docs(),
            });
        }
        let path = module.path;
        summary
            .failures
            .extend(module.failures.into_iter().map(|e| (path.clone(), e)));
    }

    tracing::debug!(
        "checked {} publication(s), {} failed",
        summary.units.len(),
        summary.failures.len()
    );
    Ok(summary)
}
