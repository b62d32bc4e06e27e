//! Player configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use noughts_core::RendezvousConfig;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Shared-port negotiation.
    pub rendezvous: RendezvousConfig,
    /// Automatic player.
    pub autoplay: AutoplayConfig,
    /// Remote counterpart launch for `auto` mode.
    pub launcher: LauncherConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Automatic player settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Pause before each automatic move, in milliseconds.
    pub move_delay_ms: u64,
    /// Start another game automatically when one ends.
    pub rematch: bool,
}

/// How the `auto` counterpart is started on the remote host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Secure-shell client to run.
    pub ssh_program: String,
    /// Extra arguments passed before the host name.
    pub ssh_args: Vec<String>,
    /// Remote login name. Empty uses the client's default.
    pub user: String,
    /// Command run on the remote host; must speak the move protocol on
    /// its stdin/stdout.
    pub remote_command: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            rendezvous: RendezvousConfig::default(),
            autoplay: AutoplayConfig::default(),
            launcher: LauncherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            move_delay_ms: 500,
            rematch: true,
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".into(),
            ssh_args: vec!["-T".into()],
            user: String::new(),
            remote_command: "noughts-play --stdio".into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl AutoplayConfig {
    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl PlayConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
