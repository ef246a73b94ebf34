
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::Path;

use super::{
    Config, ConfigError, EmbeddingsConfig, GITHUB_TOKEN_VAR, GitHubConfig,
    OPENAI_API_KEY_VAR, SelectConfig,
};

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 Repo Router Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("GitHub").bold().yellow());
    configure_github(&mut config.github)?;

    eprintln!();
    eprintln!("{}", style("Embeddings provider").bold().yellow());
    configure_embeddings(&mut config.embeddings)?;

    eprintln!();
    eprintln!("{}", style("Repository picker").bold().yellow());
    configure_select(&mut config.select)?;

    eprintln!();
    print_credential_status();

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("GitHub Settings:").bold().yellow());
    eprintln!("  API URL: {}", style(&config.github.api_url).cyan());
    eprintln!(
        "  Org page size: {}",
        style(config.github.org_page_size).cyan()
    );
    eprintln!("  User agent: {}", style(&config.github.user_agent).cyan());
    eprintln!(
        "  Timeout: {}s",
        style(config.github.timeout_seconds).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Embeddings Settings:").bold().yellow());
    eprintln!("  API URL: {}", style(&config.embeddings.api_url).cyan());
    eprintln!("  Model: {}", style(&config.embeddings.model).cyan());
    eprintln!(
        "  Timeout: {}s",
        style(config.embeddings.timeout_seconds).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Picker Settings:").bold().yellow());
    eprintln!("  Debounce: {}ms", style(config.select.debounce_ms).cyan());
    match config.select.max_visible {
        Some(limit) => eprintln!("  Max visible: {}", style(limit).cyan()),
        None => eprintln!("  Max visible: {}", style("all matches").cyan()),
    }

    eprintln!();
    print_credential_status();

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn print_credential_status() {
    eprintln!("{}", style("Credentials (environment):").bold().yellow());
    for (name, present) in credential_status(|key| std::env::var(key).ok()) {
        if present {
            eprintln!("  {}: {}", name, style("set").green());
        } else {
            eprintln!("  {}: {}", name, style("missing").red());
        }
    }
}

/// Report which credentials are present without exposing their values
fn credential_status<F>(lookup: F) -> [(&'static str, bool); 2]
where
    F: Fn(&str) -> Option<String>,
{
    let present = |key: &str| lookup(key).is_some_and(|value| !value.trim().is_empty());
    [
        (GITHUB_TOKEN_VAR, present(GITHUB_TOKEN_VAR)),
        (OPENAI_API_KEY_VAR, present(OPENAI_API_KEY_VAR)),
    ]
}

fn load_existing_config(config_dir: &Path) -> Config {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No valid configuration found. Using defaults.").yellow()
            );
            Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            }
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_github(github: &mut GitHubConfig) -> Result<()> {
    let api_url: String = Input::new()
        .with_prompt("GitHub API URL")
        .default(github.api_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            GitHubConfig {
                api_url: input.clone(),
                ..GitHubConfig::default()
            }
            .validate()
        })
        .interact_text()?;

    let org_page_size: u32 = Input::new()
        .with_prompt("Repositories fetched per organization")
        .default(github.org_page_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Page size must be between 1 and 100")
            }
        })
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("GitHub request timeout (seconds)")
        .default(github.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if (1..=300).contains(input) {
                Ok(())
            } else {
                Err("Timeout must be between 1 and 300 seconds")
            }
        })
        .interact_text()?;

    github.set_api_url(api_url)?;
    github.set_org_page_size(org_page_size)?;
    github.set_timeout_seconds(timeout_seconds)?;

    Ok(())
}

fn configure_embeddings(embeddings: &mut EmbeddingsConfig) -> Result<()> {
    let api_url: String = Input::new()
        .with_prompt("Embeddings API URL")
        .default(embeddings.api_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            EmbeddingsConfig {
                api_url: input.clone(),
                ..EmbeddingsConfig::default()
            }
            .validate()
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embeddings.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("Request timeout (seconds)")
        .default(embeddings.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if (1..=300).contains(input) {
                Ok(())
            } else {
                Err("Timeout must be between 1 and 300 seconds")
            }
        })
        .interact_text()?;

    embeddings.set_api_url(api_url)?;
    embeddings.set_model(model)?;
    embeddings.set_timeout_seconds(timeout_seconds)?;

    Ok(())
}

fn configure_select(select: &mut SelectConfig) -> Result<()> {
    let debounce_ms: u64 = Input::new()
        .with_prompt("Debounce delay (ms)")
        .default(select.debounce_ms)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if (1..=10_000).contains(input) {
                Ok(())
            } else {
                Err("Debounce must be between 1 and 10000 ms")
            }
        })
        .interact_text()?;

    let max_visible: usize = Input::new()
        .with_prompt("Maximum visible options (0 = all matches)")
        .default(select.max_visible.unwrap_or(0))
        .interact_text()?;

    select.set_debounce_ms(debounce_ms)?;
    select.set_max_visible((max_visible > 0).then_some(max_visible))?;

    Ok(())
}
