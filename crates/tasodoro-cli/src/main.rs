use clap::{CommandFactory, Parser, Subcommand};
use tasodoro_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "tasodoro", version, about = "Tasodoro Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Work and break durations
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Application configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_env("TASODORO_LOG")
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "using default configuration");
    }

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tasodoro", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
