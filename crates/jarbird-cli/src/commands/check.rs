//! Handler for `jarbird check`.

use miette::Result;

use jarbird_util::errors::JarbirdError;

pub fn exec() -> Result<()> {
    let cwd = super::current_dir()?;
    let summary = jarbird_ops::ops_check::check(&cwd)?;

    for unit in &summary.units {
        let label = if unit.variant.is_empty() {
            unit.name.clone()
        } else {
            format!("{} ({})", unit.name, unit.variant)
        };
        println!("{} {label}: {}", unit.path, unit.coordinates);
        if let Some(marker) = &unit.marker {
            println!("    marker: {marker}");
        }
        for endpoint in &unit.endpoints {
            println!("    -> {endpoint}");
        }
        for endpoint in &unit.skipped {
            println!("    skipped: {endpoint}");
        }
        println!(
            "    signing: {}, docs: {}",
            on_off(unit.signing),
            on_off(unit.docs)
        );
    }

    if summary.is_success() {
        println!("{} publication(s) OK", summary.units.len());
        return Ok(());
    }

    let failed = summary.failures.len();
    for (path, error) in summary.failures {
        eprintln!("{path}: {:?}", miette::Report::new(error));
    }
    Err(JarbirdError::Generic {
        message: format!("{failed} publication(s) failed validation"),
    }
    .into())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
