use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const LOG_ENV: &str = "HABITQUEST_LOG";

#[derive(Parser)]
#[command(name = "habitquest", version, about = "HabitQuest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus sessions
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Habit list and completion
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Task list and completion
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Subtask toggling
    Subtask {
        #[command(subcommand)]
        action: commands::subtask::SubtaskAction,
    },
    /// Show level and XP progress
    Dashboard(commands::dashboard::DashboardArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Access token management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Forget the token and every cached value
    Logout,
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Subtask { action } => commands::subtask::run(action),
        Commands::Dashboard(args) => commands::dashboard::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Logout => commands::auth::logout(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitquest", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
