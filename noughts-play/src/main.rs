//! noughts-play — entry point.
//!
//! ```text
//! noughts-play <ADDR> <PORT>          Rendezvous with ADDR:PORT and play
//! noughts-play <ADDR> <PORT> auto     Launch an autoplayer on ADDR over ssh
//! noughts-play --stdio                Autoplay as Host over stdin/stdout
//! noughts-play --autoplay ...         Let the local side play random moves
//! noughts-play --config <path>        Load a custom config TOML
//! noughts-play --gen-config           Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use noughts_core::MIN_PORT;
use noughts_play::app;
use noughts_play::config::PlayConfig;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "noughts-play", about = "Two-player tic-tac-toe over TCP")]
struct Cli {
    /// Counterpart's address (host name or IP).
    #[arg(required_unless_present_any = ["stdio", "gen_config"])]
    addr: Option<String>,

    /// Shared rendezvous port.
    #[arg(
        required_unless_present_any = ["stdio", "gen_config"],
        value_parser = clap::value_parser!(u16).range(i64::from(MIN_PORT)..)
    )]
    port: Option<u16>,

    /// `auto`: launch an autoplaying counterpart on ADDR over ssh.
    #[arg(value_enum)]
    mode: Option<Mode>,

    /// Play as the autoplaying Host over stdin/stdout.
    #[arg(long, conflicts_with_all = ["addr", "port", "mode"])]
    stdio: bool,

    /// Let the local side play random moves.
    #[arg(long, conflicts_with = "stdio")]
    autoplay: bool,

    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "noughts.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Auto,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&PlayConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config.
    let config = PlayConfig::load(&cli.config);

    // Init tracing. Stdout may be the move channel, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("noughts-play v{}", env!("CARGO_PKG_VERSION"));

    let result = if cli.stdio {
        app::run_stdio(&config).await
    } else if let (Some(addr), Some(port)) = (cli.addr, cli.port) {
        match cli.mode {
            Some(Mode::Auto) => app::run_launched(&config, &addr, port, cli.autoplay).await,
            None => app::run_rendezvous(&config, &addr, port, cli.autoplay).await,
        }
    } else {
        return Err("address and port are required".into());
    };

    if let Err(e) = result {
        error!(phase = %e.phase(), "{e}");
        std::process::exit(1);
    }

    Ok(())
}
