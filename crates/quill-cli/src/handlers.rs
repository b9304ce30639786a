//! Command handlers for CLI operations

use std::io::{IsTerminal as _, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use quill_core::{ClientConfig, DraftField, Post, PostId};
use quill_providers::HttpPostCollection;
use quill_sync::PostListSynchronizer;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::cli::{Cli, Commands};
use crate::shell::run_shell;

/// Log filter used when `RUST_LOG` is not set. `quill` is the binary's target.
const DEFAULT_LOG_FILTER: &str = "quill=info,quill_sync=info,quill_providers=warn";

/// Install the stdout subscriber. Call once, before anything logs.
pub fn init_logging() {
    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(
            fmt::layer()
                .with_ansi(stdout().is_terminal())
                .with_target(false)
                .with_level(true),
        )
        .init();
}

/// Run the parsed command.
///
/// # Errors
/// Returns an error if configuration is invalid or the command's remote call fails
pub async fn run(cli: Cli) -> Result<()> {
    let (config, config_path) = load_config(&cli)?;

    match cli.command {
        Commands::Config => handle_config(&config, &config_path),
        Commands::List => {
            let sync = connect(&config)?;
            sync.initialize().await?;
            show_posts(&sync.posts());
            Ok(())
        }
        Commands::Add { title, content } => handle_add(&connect(&config)?, title, content).await,
        Commands::Delete { id } => handle_delete(&connect(&config)?, PostId::from(id)).await,
        Commands::Shell => run_shell(&connect(&config)?).await,
    }
}

/// Load or create the config file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<(ClientConfig, PathBuf)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => ClientConfig::config_path()?,
    };

    let mut config = ClientConfig::load_or_create(&path)?;
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(insert) = cli.insert {
        config.insert_policy = insert.into();
    }
    config.validate()?;

    Ok((config, path))
}

/// Build a synchronizer talking HTTP to the configured backend.
fn connect(config: &ClientConfig) -> Result<PostListSynchronizer> {
    let collection = HttpPostCollection::new(config)?;
    tracing::debug!("Using backend {}", collection.base_url());
    let sync = PostListSynchronizer::from_config(Arc::new(collection), config);
    tracing::debug!("Created posts are inserted with {:?}", sync.insert_policy());
    Ok(sync)
}

/// Fetch the list before a mutation. A failed list does not block the mutation.
async fn refresh_before_change(sync: &PostListSynchronizer) {
    if let Err(error) = sync.initialize().await {
        tracing::warn!("Continuing without the current list: {error}");
    }
}

fn handle_config(config: &ClientConfig, path: &Path) -> Result<()> {
    tracing::info!("Configuration file: {}", path.display());
    for line in toml::to_string_pretty(config)?.lines() {
        tracing::info!("  {line}");
    }
    Ok(())
}

async fn handle_add(sync: &PostListSynchronizer, title: String, content: String) -> Result<()> {
    refresh_before_change(sync).await;
    sync.update_draft_field(DraftField::Title, title);
    sync.update_draft_field(DraftField::Content, content);

    let post = sync.submit_draft().await?;
    tracing::info!("Added post {}", post.id);
    show_posts(&sync.posts());
    Ok(())
}

async fn handle_delete(sync: &PostListSynchronizer, id: PostId) -> Result<()> {
    refresh_before_change(sync).await;
    sync.delete_post(&id).await?;

    tracing::info!("Deleted post {id}");
    show_posts(&sync.posts());
    Ok(())
}

/// Print each post as an id/title header followed by its indented content.
pub fn show_posts(posts: &[Post]) {
    if posts.is_empty() {
        tracing::info!("No posts");
        return;
    }

    for post in posts {
        tracing::info!("[{}] {}", post.id, post.title);
        for line in post.content.lines() {
            tracing::info!("    {line}");
        }
    }
}
