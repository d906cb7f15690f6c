//! Handler for `jarbird pom`.

use miette::Result;

use jarbird_ops::ops_pom::{self, PomOptions};

pub fn exec(pub_name: Option<String>, variant: Option<String>, marker: bool) -> Result<()> {
    let cwd = super::current_dir()?;
    let opts = PomOptions {
        pub_name,
        variant,
        marker,
    };
    print!("{}", ops_pom::pom(&cwd, &opts)?);
    Ok(())
}
