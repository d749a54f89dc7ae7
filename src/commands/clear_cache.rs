use console::style;
use miette::Result;

use plugforge::template::{clear_cache, get_cache_dir};

pub fn run(version: Option<String>) -> Result<()> {
    let removed = clear_cache(&get_cache_dir()?, version.as_deref())?;

    let scope = match &version {
        Some(v) => format!(" for version {v}"),
        None => String::new(),
    };
    println!(
        "{} Removed {removed} cached template{}{scope}",
        style("\u{2713}").green().bold(),
        if removed == 1 { "" } else { "s" }
    );

    Ok(())
}
