use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::TemplateArgs;

pub async fn run(args: TemplateArgs, json: bool) -> Result<()> {
    let (session, input) = super::prepare(&args)?;
    let tokens = session.tokens(&args.version, &input).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens).into_diagnostic()?);
        return Ok(());
    }

    let width = tokens.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in tokens.iter() {
        let mut lines = value.lines();
        let first = lines.next().unwrap_or("");
        println!("  {:width$}  {}", style(key).cyan(), first);
        for line in lines {
            println!("  {:width$}  {}", "", line);
        }
    }

    Ok(())
}
