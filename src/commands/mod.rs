use crate::components::events::categories::CategoryStore;
use crate::components::events::EventStore;
use crate::components::storage::StorageActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use crate::startup;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::RwLock;

// Export submodules
pub mod categories;
pub mod events;
pub mod list;

/// Personal event reminders with countdowns and daily email dispatch
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new event
    Add {
        /// Event title (3-100 characters)
        title: String,
        /// Event date (YYYY-MM-DD)
        date: String,
        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Category id (see `categories`)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Update an existing event
    Update {
        /// Id of the event to update
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New category id; pass an empty string to clear it
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove an event by id
    Remove {
        /// Id of the event to remove
        id: String,
    },
    /// Show one event with its countdown
    Show {
        /// Id of the event to show
        id: String,
    },
    /// List all events grouped by status
    List,
    /// Manage event categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoryAction>,
    },
    /// Delete all stored data
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Run the reminder daemon
    Run,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// Add a category
    Add {
        /// Category name (1-40 characters)
        name: String,
        /// Display color as #rrggbb
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a category by id
    Remove {
        /// Id of the category to remove
        id: String,
    },
}

/// Shared context for one-shot commands
///
/// Opens the storage actor and loads both stores; `finish` stops the actor
/// once the command is done.
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub storage: StorageActorHandle,
    pub store: EventStore,
    pub categories: CategoryStore,
}

impl CommandContext {
    /// Open storage and load the event and category collections
    pub async fn open(config: Arc<RwLock<Config>>) -> AppResult<Self> {
        let storage = startup::open_storage(config.clone()).await;
        let store = EventStore::load(storage.clone()).await;
        let categories = CategoryStore::load(storage.clone()).await;
        Ok(Self {
            config,
            storage,
            store,
            categories,
        })
    }

    /// Stop the storage actor
    pub async fn finish(self) {
        let _ = self.storage.shutdown().await;
    }
}

/// Type alias for command result
pub type CommandResult = AppResult<()>;

/// Route a parsed command line to its handler
pub async fn dispatch(cli: Cli, config: Arc<RwLock<Config>>) -> miette::Result<()> {
    if let Command::Run = cli.command {
        return startup::start_app(config).await;
    }

    let mut context = CommandContext::open(config).await?;
    let result = match cli.command {
        Command::Add {
            title,
            date,
            description,
            category,
        } => events::add(&mut context, title, date, description, category).await,
        Command::Update {
            id,
            title,
            date,
            description,
            category,
        } => events::update(&mut context, &id, title, date, description, category).await,
        Command::Remove { id } => events::remove(&mut context, &id).await,
        Command::Show { id } => events::show(&context, &id).await,
        Command::List => list::list(&context).await,
        Command::Categories { action } => categories::run(&mut context, action).await,
        Command::Clear { yes } => list::clear(&context, yes).await,
        Command::Run => unreachable!("handled above"),
    };
    context.finish().await;
    result?;
    Ok(())
}
