use chrono::{DateTime, Utc};
use console::style;
use miette::Result;

use plugforge::template::{get_cache_dir, list_cached, CachedTemplate};

pub fn run() -> Result<()> {
    let entries = list_cached(&get_cache_dir()?)?;

    if entries.is_empty() {
        println!(
            "No cached templates. Use '{}' to download one.",
            style("plugforge new").cyan()
        );
        return Ok(());
    }

    println!(
        "{} ({} template{})\n",
        style("Cached templates").bold(),
        entries.len(),
        if entries.len() == 1 { "" } else { "s" }
    );

    for entry in &entries {
        print_entry(entry);
    }

    Ok(())
}

fn print_entry(entry: &CachedTemplate) {
    println!("  {} {}", style("version:").dim(), entry.metadata.version);
    println!("  {}  {}", style("source:").dim(), entry.metadata.source);
    println!(
        "  {}  {}",
        style("cached:").dim(),
        format_timestamp(entry.metadata.cached_at, Utc::now())
    );
    println!();
}

fn format_timestamp(cached_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(cached_at);

    let plural = |n: i64| if n == 1 { "" } else { "s" };
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        let mins = elapsed.num_minutes();
        format!("{mins} minute{} ago", plural(mins))
    } else if elapsed.num_days() < 1 {
        let hours = elapsed.num_hours();
        format!("{hours} hour{} ago", plural(hours))
    } else if elapsed.num_days() < 30 {
        let days = elapsed.num_days();
        format!("{days} day{} ago", plural(days))
    } else {
        cached_at.format("%Y-%m-%d").to_string()
    }
}
