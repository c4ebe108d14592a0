//! neovate-wrapped - year in review for Neovate session logs

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use neovate_wrapped::collector::data_root_exists;
use neovate_wrapped::config::Settings;
use neovate_wrapped::report;
use neovate_wrapped::theme::ThemeColors;
use neovate_wrapped::{generate, DisplayNames, ModelCatalog, OfflineNames};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "neovate-wrapped")]
#[command(about = "Your year with Neovate, summarized")]
#[command(version)]
struct Args {
    /// Calendar year to summarize (default: current year)
    #[arg(long)]
    year: Option<i32>,

    /// Session log root (default: $NEOVATE_DATA_DIR or ~/.neovate/projects)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip the models.dev name lookup
    #[arg(long)]
    offline: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::resolve(args.data_dir, args.year, args.offline, args.json);
    info!(
        "Summarizing {} from {}",
        settings.year,
        settings.data_root.display()
    );

    if !data_root_exists(&settings.data_root) {
        println!(
            "No Neovate data found at {}. Start a session first, then come back.",
            settings.data_root.display()
        );
        return Ok(());
    }

    let catalog;
    let names: &dyn DisplayNames = if settings.offline {
        &OfflineNames
    } else {
        catalog = ModelCatalog::load(&settings.cache_dir);
        &catalog
    };

    let summary = generate(&settings.data_root, settings.year, names)
        .with_context(|| format!("failed to summarize {}", settings.data_root.display()))?;

    if summary.is_empty() {
        println!("No activity found for {}", settings.year);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if settings.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        writeln!(out, "{}", json)?;
    } else {
        let styled = out.is_terminal();
        report::render(&mut out, &summary, &ThemeColors::DEFAULT, styled)
            .context("failed to write report")?;
    }
    Ok(())
}
