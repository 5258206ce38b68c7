use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sharelist::{api::AppState, cli, config, error, management::Provider};

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
    /// Run the HTTP server for OAuth callbacks and Slack events
    Serve,

    /// Authorize Spotify for a workspace, or install the Slack app
    Auth(AuthOptions),

    /// Add the tracks behind Spotify links to the shared playlists
    Share(ShareOptions),

    /// List tracks added for a workspace
    History(SpaceOptions),

    /// Store a Spotify refresh token for a workspace
    Import(ImportOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Workspace id; defaults to the workspace of the Slack bot token
    #[clap(long)]
    space: Option<String>,

    /// Install the Slack app instead of authorizing Spotify
    #[clap(long)]
    slack: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ShareOptions {
    /// Workspace id the links were shared in
    #[clap(long)]
    space: String,

    /// User recorded as having shared the links
    #[clap(long)]
    user: String,

    /// Links to share
    #[clap(required = true, num_args = 1..)]
    urls: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SpaceOptions {
    #[clap(long)]
    space: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    #[clap(long)]
    space: String,

    #[clap(long)]
    refresh_token: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    };
    let state = AppState::from_settings(&settings);

    match cli.command {
        Command::Serve => cli::serve(&settings, state).await,
        Command::Auth(opt) => {
            let provider = if opt.slack {
                Provider::Slack
            } else {
                Provider::Spotify
            };
            cli::auth(&settings, state, provider, opt.space).await
        }
        Command::Share(opt) => cli::share(&state, &opt.space, &opt.user, &opt.urls).await,
        Command::History(opt) => cli::history(&state, &opt.space).await,
        Command::Import(opt) => cli::import(&state, &opt.space, &opt.refresh_token).await,
        Command::Completions(_) => {}
    }
}
