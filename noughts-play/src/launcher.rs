//! Launching the `auto` counterpart over `ssh`.
//!
//! The system secure-shell client is started with the counterpart's
//! command line; its stdin/stdout become the move channel. Credential
//! prompts are left to the client, which talks to the terminal directly.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use noughts_core::{MoveChannel, NoughtsError, RemoteLauncher};

use crate::config::LauncherConfig;

pub struct SshLauncher {
    config: LauncherConfig,
}

impl SshLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to the client for `host`.
    pub fn args(&self, host: &str) -> Vec<String> {
        let mut args = self.config.ssh_args.clone();
        if !self.config.user.is_empty() {
            args.push("-l".into());
            args.push(self.config.user.clone());
        }
        args.push(host.into());
        args.push(self.config.remote_command.clone());
        args
    }
}

#[async_trait]
impl RemoteLauncher for SshLauncher {
    async fn launch(&self, host: &str) -> Result<MoveChannel, NoughtsError> {
        let args = self.args(host);
        info!("launching: {} {}", self.config.ssh_program, args.join(" "));

        let mut child = Command::new(&self.config.ssh_program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NoughtsError::Launch(format!("{}: {e}", self.config.ssh_program)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| NoughtsError::Launch("child stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| NoughtsError::Launch("child stdout not captured".into()))?;

        // Reap the client; it exits once either side closes the link.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => info!("counterpart exited"),
                Ok(status) => warn!("counterpart exited with {status}"),
                Err(e) => warn!("waiting for counterpart failed: {e}"),
            }
        });

        Ok(MoveChannel::from_halves(stdout, stdin))
    }
}
