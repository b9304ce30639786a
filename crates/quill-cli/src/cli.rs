use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use quill_core::InsertPolicy;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Create, list and delete blog posts on a REST backend", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Configuration file [default: ~/.quill/config.toml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Backend base URL (overrides config)")]
    pub base_url: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Where newly created posts appear in the list (overrides config)"
    )]
    pub insert: Option<InsertArg>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Command-line spelling of [`InsertPolicy`].
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InsertArg {
    Append,
    Prepend,
}

impl From<InsertArg> for InsertPolicy {
    fn from(arg: InsertArg) -> Self {
        match arg {
            InsertArg::Append => Self::Append,
            InsertArg::Prepend => Self::Prepend,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List all posts")]
    List,

    #[command(about = "Create a post and show the updated list")]
    Add {
        #[arg(short, long, help = "Post title")]
        title: String,

        #[arg(short, long, help = "Post content")]
        content: String,
    },

    #[command(about = "Delete a post by id and show the updated list")]
    Delete {
        #[arg(help = "Id of the post to delete")]
        id: String,
    },

    #[command(about = "Show the effective configuration")]
    Config,

    #[command(about = "Start an interactive session reading commands from stdin")]
    Shell,
}
