use std::path::PathBuf;

use console::style;
use miette::Result;

use crate::cli::TemplateArgs;

pub async fn run(args: TemplateArgs, output: PathBuf, overwrite: bool, dry_run: bool) -> Result<()> {
    let (session, input) = super::prepare(&args)?;

    if dry_run {
        let plan = session.plan(&args.version, &input).await?;

        println!(
            "\n{} Dry run, files that would be written to {}.zip:",
            style("==>").cyan().bold(),
            style(&plan.root_name).cyan()
        );
        for entry in &plan.tree {
            println!("  {} {}/{}", style("create").green(), plan.root_name, entry.path);
        }
        println!("\nSummary: {} files", plan.tree.len());
        println!(
            "\n{} Dry run: no archive written.",
            style("\u{2139}").blue().bold()
        );
        return Ok(());
    }

    let artifact = session.generate(&args.version, &input).await?;
    let path = plugforge::save_artifact(&artifact, &output, overwrite).await?;

    println!(
        "\n{} Project archive written to {}",
        style("\u{2713}").green().bold(),
        style(path.display()).cyan()
    );
    println!("  {} bytes", artifact.bytes.len());

    Ok(())
}
