//! # CLI Module
//!
//! User-facing commands of the `sharelist` binary. Each command takes the
//! wired [`crate::api::AppState`] and reports through the console macros;
//! fatal failures end the process through [`crate::error!`].
//!
//! ## Commands
//!
//! - [`serve`] - runs the HTTP server for the OAuth redirect and Slack events
//! - [`auth`] - authorizes Spotify for a workspace, or installs the Slack app
//!   with `--slack`, from the terminal
//! - [`share`] - runs the link pipeline for URLs given on the command line
//! - [`history`] - lists the tracks recorded for a workspace
//! - [`import`] - seeds a workspace credential from an existing refresh token
//!
//! ## Usage Patterns
//!
//! ```bash
//! sharelist serve                         # answer Slack and OAuth callbacks
//! sharelist auth                          # authorize the bot's workspace
//! sharelist auth --slack --space T024BE7LD # install the Slack app
//! sharelist share --space T024BE7LD --user U2147483697 \
//!     https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy
//! sharelist history --space T024BE7LD
//! ```

mod auth;
mod history;
mod import;
mod serve;
mod share;

pub use auth::auth;
pub use history::history;
pub use import::import;
pub use serve::serve;
pub use share::share;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
