//! Quill CLI - create, list and delete blog posts on a REST backend
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

use anyhow::Result;
use clap::Parser as _;
use cli::Cli;

mod cli;
mod handlers;
mod shell;

#[tokio::main]
async fn main() -> Result<()> {
    handlers::init_logging();
    let cli = Cli::parse();

    handlers::run(cli).await
}
