mod commands;
mod prompt;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use deptcal_core::AttendanceStatus;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deptcal")]
#[command(about = "Save, fan out and delete calendar events across departments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save an event draft (JSON file) as one or more documents
    Save {
        /// Path to the draft JSON file
        draft: PathBuf,

        /// Number of occurrences to generate for a recurring draft
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Delete an event, optionally with its siblings or later occurrences
    Delete {
        id: String,

        /// Also delete every later occurrence of the series
        #[arg(long, conflicts_with = "only_this")]
        future: bool,

        /// Delete only this occurrence of the series
        #[arg(long)]
        only_this: bool,

        /// Delete every linked department copy
        #[arg(long, conflicts_with = "this_department")]
        linked: bool,

        /// Delete only this department's copy
        #[arg(long)]
        this_department: bool,
    },
    /// Set a participant's attendance on every occurrence of a series
    Attendance {
        recurrence_group_id: String,
        participant: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// List stored events
    List {
        /// Only show this department's documents
        #[arg(short, long)]
        department: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Joined,
    Declined,
}

impl From<StatusArg> for AttendanceStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => AttendanceStatus::Pending,
            StatusArg::Joined => AttendanceStatus::Joined,
            StatusArg::Declined => AttendanceStatus::Declined,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Save { draft, count } => commands::save::run(&draft, count).await,
        Commands::Delete {
            id,
            future,
            only_this,
            linked,
            this_department,
        } => {
            let answers = prompt::PresetAnswers::from_flags(future, only_this, linked, this_department);
            commands::delete::run(&id, answers).await
        }
        Commands::Attendance {
            recurrence_group_id,
            participant,
            status,
        } => commands::attendance::run(&recurrence_group_id, &participant, status.into()).await,
        Commands::List { department } => commands::list::run(department.as_deref()).await,
    }
}

/// Log to stderr, filtered by RUST_LOG (default: warnings only).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
