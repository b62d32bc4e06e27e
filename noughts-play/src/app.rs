//! The three ways to start a game.

use tokio::io::BufReader;
use tracing::info;

use noughts_core::{GameSession, MoveChannel, NoughtsError, Rendezvous, Role};

use crate::autoplay::AutoPlayer;
use crate::config::PlayConfig;
use crate::console::ConsolePlayer;
use crate::launcher::SshLauncher;
use crate::player::{Player, drive};

/// Local side of the game.
fn local_player(config: &PlayConfig, autoplay: bool) -> Box<dyn Player> {
    if autoplay {
        Box::new(AutoPlayer::new(&config.autoplay))
    } else {
        Box::new(ConsolePlayer::new(BufReader::new(tokio::io::stdin())))
    }
}

/// Rendezvous with `host:port` and play.
pub async fn run_rendezvous(
    config: &PlayConfig,
    host: &str,
    port: u16,
    autoplay: bool,
) -> Result<(), NoughtsError> {
    let session = GameSession::connect(host, port, config.rendezvous.clone()).await?;
    let mut player = local_player(config, autoplay);
    drive(session, player.as_mut()).await
}

/// Start an autoplaying counterpart on `host` and play first against it.
///
/// `host` and `port` are checked the same way as for a rendezvous before
/// anything is spawned.
pub async fn run_launched(
    config: &PlayConfig,
    host: &str,
    port: u16,
    autoplay: bool,
) -> Result<(), NoughtsError> {
    Rendezvous::resolve(host, port, config.rendezvous.clone()).await?;
    let launcher = SshLauncher::new(config.launcher.clone());
    let session = GameSession::launch(&launcher, host).await?;
    let mut player = local_player(config, autoplay);
    drive(session, player.as_mut()).await
}

/// Play as the autoplaying second mover over this process's
/// stdin/stdout. Used on the far end of [`run_launched`].
pub async fn run_stdio(config: &PlayConfig) -> Result<(), NoughtsError> {
    let channel = MoveChannel::from_halves(tokio::io::stdin(), tokio::io::stdout());
    let session = GameSession::start(channel, Role::Host);
    let mut player = AutoPlayer::new(&config.autoplay);
    match drive(session, &mut player).await {
        // The launching side quitting closes our stdin.
        Err(NoughtsError::LinkClosed) => {
            info!("launcher closed the link");
            Ok(())
        }
        other => other,
    }
}
