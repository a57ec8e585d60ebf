use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "memoir", about = "Personal journal with synchronized attachments", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage journal entries
    #[command(subcommand)]
    Story(StoryCommands),

    /// Delete every story owned by the active identity
    Purge {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List queued blob operations
    Pending,

    /// Retry queued blob operations now
    Sync,
}

#[derive(Subcommand)]
pub enum StoryCommands {
    /// Add a new story
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// One of: neutral, happy, angry, sad
        #[arg(long, default_value = "neutral")]
        mood: String,

        /// Attach a local image file (repeatable)
        #[arg(long)]
        image: Vec<PathBuf>,
    },

    /// Show the grouped feed
    List {
        /// Restrict to one calendar day (YYYY-MM-DD)
        #[arg(long)]
        on: Option<String>,
    },

    /// Show one story
    Show { id: String },

    /// Edit a story's fields
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// One of: neutral, happy, angry, sad
        #[arg(long)]
        mood: Option<String>,
    },

    /// Delete a story and its attachments
    Delete { id: String },
}
