use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use genrelist::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth(AuthOptions),

    /// Show the authenticated Spotify user
    Whoami,

    /// Add tracks matching a genre and popularity range to a playlist
    #[clap(alias = "build")]
    Sync(SyncOptions),

    /// List suggested genre keywords
    Genres,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Ignore the cached token and authorize again in the browser
    #[clap(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SyncOptions {
    /// Playlist name; an existing playlist is matched ignoring case
    #[clap(long)]
    pub name: String,

    /// Genre or keyword to search for (see `genrelist genres`)
    #[clap(long)]
    pub genre: String,

    /// Lowest track popularity to accept (0-100)
    #[clap(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_popularity: u8,

    /// Highest track popularity to accept (0-100)
    #[clap(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub max_popularity: u8,

    /// Maximum number of tracks to collect
    #[clap(long, default_value_t = 25, value_parser = clap::value_parser!(u16).range(1..))]
    pub limit: u16,

    /// Create the playlist as private when it does not exist yet
    #[clap(long)]
    pub private: bool,

    /// Description for a newly created playlist
    #[clap(long)]
    pub description: Option<String>,

    /// Open the playlist in the browser when done
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    let settings = config::Settings::from_env();

    match cli.command {
        Command::Auth(opt) => cli::auth(settings, opt.force).await,
        Command::Whoami => cli::whoami(settings).await,
        Command::Sync(opt) => {
            cli::sync(
                settings,
                cli::SyncOptions {
                    name: opt.name,
                    genre: opt.genre,
                    min_popularity: opt.min_popularity,
                    max_popularity: opt.max_popularity,
                    limit: opt.limit as usize,
                    private: opt.private,
                    description: opt.description,
                    open: opt.open,
                },
            )
            .await
        }
        Command::Genres => cli::genres(),
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
