//! Handler for `jarbird tasks`.

use miette::Result;

use jarbird_ops::ops_tasks::{self, TasksOptions};

pub fn exec(json: bool) -> Result<()> {
    let cwd = super::current_dir()?;
    let out = ops_tasks::tasks(&cwd, &TasksOptions { json })?;
    print!("{out}");
    Ok(())
}
