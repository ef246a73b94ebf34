use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::config::Config;
use crate::router::Router;
use crate::select::{RepoSelect, SelectBinding};

/// Construct the router and index every visible repository
#[inline]
pub async fn build_router(config: &Config) -> Result<Router> {
    let mut router = Router::from_env(config).context("Failed to construct router")?;

    let progress = if std::io::stderr().is_terminal() {
        ProgressBar::new(0).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding {msg}")
                .context("Invalid progress template")?,
        )
    } else {
        ProgressBar::hidden()
    };

    let router = tokio::task::spawn_blocking(move || {
        router
            .initialize_with_progress(&progress)
            .map(|_| router)
    })
    .await
    .context("Router initialization task failed")?
    .context("Failed to index repositories")?;

    info!("Indexed {} repositories", router.len());
    Ok(router)
}

/// Print every indexed repository with its keywords
#[inline]
pub async fn list_repositories(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let router = build_router(&config).await?;

    if router.is_empty() {
        println!("No repositories are visible to this token.");
        return Ok(());
    }

    let mut records: Vec<_> = router.records().collect();
    records.sort_unstable_by_key(|(name, _)| *name);

    println!("Repositories ({} total):", records.len());
    println!();
    for (name, record) in records {
        println!("📦 {}", style(name).bold());
        if !record.description.is_empty() {
            println!("   {}", record.description);
        }
        println!("   Keywords: {}", style(record.keywords.join(", ")).dim());
    }

    Ok(())
}

/// Print repositories ranked against `description`
#[inline]
pub async fn rank_repositories(
    config_dir: &Path,
    description: String,
    limit: Option<usize>,
) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let router = Arc::new(build_router(&config).await?);

    let ranking = {
        let router = Arc::clone(&router);
        tokio::task::spawn_blocking(move || router.rank(&description))
            .await
            .context("Ranking task failed")?
            .context("Failed to rank repositories")?
    };

    let shown = limit.unwrap_or(ranking.len());
    for (position, found) in ranking.iter().take(shown).enumerate() {
        println!(
            "{:>3}. {:<50} {}",
            position + 1,
            found.name,
            style(format!("{:.4}", found.score)).cyan()
        );
    }

    if shown < ranking.len() {
        println!(
            "{}",
            style(format!("... {} more", ranking.len() - shown)).dim()
        );
    }

    Ok(())
}

/// Interactive picker: each stdin line replaces the description field
#[inline]
pub async fn pick_repository(config_dir: &Path, options_file: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let router = build_router(&config).await?;

    let values = match options_file {
        Some(path) => read_options(&path).await?,
        None => {
            let mut names: Vec<String> = router.records().map(|(name, _)| name.to_string()).collect();
            names.sort_unstable();
            names
        }
    };
    let select = Arc::new(Mutex::new(RepoSelect::new(values)));

    let binding = SelectBinding::new(Arc::new(router), Arc::clone(&select), &config.select);
    let mut applied = binding.subscribe();

    let printer = tokio::spawn({
        let select = Arc::clone(&select);
        async move {
            while applied.changed().await.is_ok() {
                let snapshot = select
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .clone();
                print_select(&snapshot);
            }
        }
    });

    eprintln!(
        "{}",
        style("Describe the issue; each line replaces the description. Ctrl-D to finish.").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        binding.on_input(line);
    }

    binding.close().await;
    if let Err(e) = printer.await {
        error!("Printer task failed: {}", e);
    }

    let snapshot = select
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone();
    match snapshot.selected() {
        Some(name) => println!("Selected: {}", style(name).green().bold()),
        None => println!("{}", style("No repository selected").yellow()),
    }

    Ok(())
}

fn print_select(select: &RepoSelect) {
    let selected = select.selected();
    let visible = select.visible();
    println!();
    println!("Matching repositories ({}):", visible.len());
    for name in visible {
        if Some(name) == selected {
            println!("  > {}", style(name).green().bold());
        } else {
            println!("    {}", name);
        }
    }
}

/// One option value per line; blank lines and `#` comments are skipped
async fn read_options(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;
    Ok(parse_options(&content))
}

fn parse_options(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
