pub mod clear_cache;
pub mod list;
pub mod new;
pub mod tokens;

use plugforge::config::UserInput;
use plugforge::error::{PlugforgeError, Result};
use plugforge::{Session, SessionOptions};

use crate::cli::TemplateArgs;

/// Open a session and gather user input for a template command.
pub fn prepare(args: &TemplateArgs) -> Result<(Session, UserInput)> {
    let session = Session::open(SessionOptions {
        source: args.source.clone(),
        settings: args.settings.clone(),
        no_cache: args.no_cache,
    })?;

    let mut input = match &args.values {
        Some(path) => UserInput::load_values_file(path)?,
        None => UserInput::new(),
    };
    input.merge(UserInput::from_pairs(&args.data)?);

    if !args.no_input && console::user_attended() {
        prompt_missing(&mut input)?;
    }

    Ok((session, input))
}

/// Ask for the plugin name and company when they were not supplied.
fn prompt_missing(input: &mut UserInput) -> Result<()> {
    let has_name = input.get("name").is_some_and(|n| !n.trim().is_empty());
    if !has_name {
        let name = inquire::Text::new("Plugin name:")
            .with_validator(|value: &str| {
                if value.trim().is_empty() {
                    Ok(inquire::validator::Validation::Invalid(
                        inquire::validator::ErrorMessage::Custom(
                            "The plugin name must not be empty".to_string(),
                        ),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()
            .map_err(|_| PlugforgeError::PromptCancelled)?;
        input.set("name", name.trim());
    }

    if !input.contains_key("company") {
        let company = inquire::Text::new("Company (optional):")
            .with_default("")
            .prompt()
            .map_err(|_| PlugforgeError::PromptCancelled)?;
        input.set("company", company.trim());
    }

    Ok(())
}
