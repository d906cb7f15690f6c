//! Operation: render the POM a publication would upload.

use std::path::Path;

use jarbird_maven::pom;
use jarbird_publish::unit::FinalizedUnit;
use jarbird_util::errors::JarbirdError;

use crate::ops_plan::{self, ModulePlan, PlanContext, WorkspacePlan};

/// Options for `jarbird pom`.
#[derive(Debug, Default)]
pub struct PomOptions {
    /// Publication name, plain (`lib`) or with the variant folded in
    /// (`libJre8`).
    pub pub_name: Option<String>,
    pub variant: Option<String>,
    /// Render the plugin marker POM instead of the main one.
    pub marker: bool,
}

/// Render the POM of the single publication selected by `opts`.
pub fn pom(dir: &Path, opts: &PomOptions) -> miette::Result<String> {
    pom_with(dir, opts, &PlanContext::default())
}

pub fn pom_with(dir: &Path, opts: &PomOptions, ctx: &PlanContext) -> miette::Result<String> {
    let plan = ops_plan::plan_with(dir, ctx)?;
    let unit = select(&plan, dir, opts)?;
    let coords = unit.coordinates();
    tracing::debug!("rendering POM of '{}' ({coords})", unit.effective_name());

    if opts.marker {
        return pom::render_marker_pom(unit.descriptor(), &coords)?.ok_or_else(|| {
            JarbirdError::Generic {
                message: format!(
                    "Publication '{}' is not a plugin and has no marker POM",
                    unit.effective_name()
                ),
            }
            .into()
        });
    }
    Ok(pom::render_pom(unit.descriptor(), &coords)?)
}

/// Modules `dir` is inside of. At the workspace root that is all of them.
fn modules_at<'a>(plan: &'a WorkspacePlan, dir: &Path) -> Vec<&'a ModulePlan> {
    if let Some(member) = plan.members.iter().find(|m| dir.starts_with(&m.dir)) {
        return vec![member];
    }
    plan.modules().collect()
}

fn select<'a>(
    plan: &'a WorkspacePlan,
    dir: &Path,
    opts: &PomOptions,
) -> miette::Result<&'a FinalizedUnit> {
    let matches = |unit: &FinalizedUnit| {
        let name_ok = opts
            .pub_name
            .as_deref()
            .map_or(true, |n| unit.name() == n || unit.effective_name() == n);
        let variant_ok = opts.variant.as_deref().map_or(true, |v| unit.variant() == v);
        name_ok && variant_ok
    };

    let candidates: Vec<(&str, &FinalizedUnit)> = modules_at(plan, dir)
        .into_iter()
        .flat_map(|m| m.units.iter().map(move |u| (m.path.as_str(), u)))
        .filter(|(_, u)| matches(*u))
        .collect();

    match candidates.as_slice() {
        [(_, unit)] => Ok(*unit),
        [] => Err(JarbirdError::Generic {
            message: "No publication matches the selection".to_string(),
        }
        .into()),
        many => {
            let names: Vec<String> = many
                .iter()
                .map(|(path, u)| format!("{path} {}", u.effective_name()))
                .collect();
            Err(JarbirdError::Generic {
                message: format!(
                    "Several publications match, pick one with --pub or --variant: {}",
                    names.join(", ")
                ),
            }
            .into())
        }
    }
}
