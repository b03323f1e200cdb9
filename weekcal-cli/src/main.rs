mod client;
mod commands;
mod render;
mod session;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "weekcal")]
#[command(about = "Plan your week: add, view and delete tasks by day")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a Google ID token
    SignIn {
        /// Token from the Google sign-in flow (prompted if omitted)
        #[arg(long)]
        id_token: Option<String>,
    },
    SignOut,
    /// Show this week's tasks
    Week,
    /// Reload tasks from the remote store
    Refresh,
    /// Add a task to one day, or to several
    Add {
        title: Option<String>,

        /// Time of day, HH:MM
        #[arg(short, long)]
        time: Option<String>,

        /// Day of the week (e.g. "Lundi", "monday", "mon")
        #[arg(short, long, conflicts_with = "days")]
        day: Option<String>,

        /// Several days, comma separated, for a repeated task
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
    },
    /// Delete one task
    Delete { id: String },
    /// Delete several tasks in one go
    DeleteMany {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete all of your tasks
    Reset {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::SignIn { id_token } => commands::sign_in::run(id_token).await,
        Commands::SignOut => commands::sign_out::run().await,
        Commands::Week => commands::week::run().await,
        Commands::Refresh => commands::refresh::run().await,
        Commands::Add {
            title,
            time,
            day,
            days,
        } => commands::add::run(title, time, day, days).await,
        Commands::Delete { id } => commands::delete::run(&id).await,
        Commands::DeleteMany { ids } => commands::delete::run_many(&ids).await,
        Commands::Reset { yes } => commands::reset::run(yes).await,
    }
}
