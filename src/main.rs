use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use image_search::cli::Cli;
use image_search::command::{Command, HELP};
use image_search::config::AppConfig;
use image_search::services::catalog::ImageCatalog;
use image_search::services::storage::StorageManager;
use image_search::state::ImageSearch;
use image_search::view::render;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let log_filter = cli.log_filter.as_deref().unwrap_or(config.log_filter());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let manager = StorageManager::new();
    manager
        .connect(config.storage.clone())
        .await
        .with_context(|| format!("Failed to connect to storage {}", config.storage.name))?;

    let search = ImageSearch::new(ImageCatalog::new(Arc::new(manager.clone())));
    search.load_projects().await;
    println!("{}", render(&*search.state().await));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        if let Err(e) = dispatch(&search, command.clone()).await {
            eprintln!("{}", e);
            continue;
        }
        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            _ => println!("{}", render(&*search.state().await)),
        }
    }

    manager.disconnect().await?;
    Ok(())
}

async fn dispatch(search: &ImageSearch<StorageManager>, command: Command) -> Result<()> {
    match command {
        Command::Projects => {
            search.load_projects().await;
        }
        Command::SelectProject(project) => {
            search.select_project(project).await;
        }
        Command::SelectCluster(cluster) => {
            search.select_cluster(cluster).await?;
        }
        Command::Page(page) => search.go_to_page(page).await?,
        Command::NextPage => search.next_page().await?,
        Command::PreviousPage => search.previous_page().await?,
        Command::Open(index) => {
            search.open_modal_at(index).await?;
        }
        Command::Close => search.close_modal().await,
        Command::Show | Command::Help | Command::Quit => {}
    }
    Ok(())
}
