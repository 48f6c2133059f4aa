use anyhow::Result;
use clap::{Parser, Subcommand};
use modshape::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "modshape")]
#[command(
    author,
    version,
    about = "Layout fixing and load-state projection for non-Bethesda mod loaders"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Runtime mods directory override for this invocation
    #[arg(long)]
    mods_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported games
    Games,

    /// Record where a game is installed
    SetPath {
        /// Game ID (e.g., titanfall-2)
        game: String,
        /// Install directory containing the game binary
        game_dir: String,
        /// Profile directory for this game
        #[arg(long)]
        profile_dir: Option<String>,
    },

    /// Validate a staged mod directory without installing it
    Check {
        game: String,
        dir: String,
    },

    /// Install an archive or directory, fixing its layout
    Install {
        game: String,
        /// Archive (zip, 7z, rar) or directory
        source: String,
        /// Mod name, derived from the file name when omitted
        #[arg(long)]
        name: Option<String>,
    },

    /// List installed mods and their contents
    List {
        game: String,
    },

    /// Enable mods
    Enable {
        game: String,
        #[arg(required = true)]
        mods: Vec<String>,
    },

    /// Disable mods
    Disable {
        game: String,
        #[arg(required = true)]
        mods: Vec<String>,
    },

    /// Create data directories and seed a profile's files
    InitProfile {
        game: String,
        profile_dir: Option<String>,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "modshape=info",
        1 => "modshape=debug",
        2 => "modshape=trace",
        _ => "trace",
    };

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    let log_dir = modshape::config::log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("modshape.log"));

    match file {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(file));
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(stderr_layer)
                .init();
        }
        Err(e) => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            tracing::warn!("Logging to stderr only: {}", e);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // Load configuration
    let mut config = Config::load()?;
    if let Some(mods_dir) = cli.mods_dir.as_deref() {
        let trimmed = mods_dir.trim();
        if trimmed.is_empty() {
            anyhow::bail!("--mods-dir cannot be empty");
        }
        config.mods_dir_override = Some(trimmed.to_string());
    }

    let mut app = App::new(config);

    match cli.command {
        Commands::Games => app.cmd_games()?,
        Commands::SetPath {
            game,
            game_dir,
            profile_dir,
        } => app.cmd_set_path(&game, &game_dir, profile_dir.as_deref())?,
        Commands::Check { game, dir } => app.cmd_check(&game, &dir)?,
        Commands::Install { game, source, name } => {
            app.cmd_install(&game, &source, name.as_deref())?
        }
        Commands::List { game } => app.cmd_list(&game)?,
        Commands::Enable { game, mods } => app.cmd_toggle(&game, &mods, true)?,
        Commands::Disable { game, mods } => app.cmd_toggle(&game, &mods, false)?,
        Commands::InitProfile { game, profile_dir } => {
            app.cmd_init_profile(&game, profile_dir.as_deref())?
        }
    }

    Ok(())
}
