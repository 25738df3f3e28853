//! Delayed voice-channel release for sessions left with nothing to play.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use super::session::SessionCommand;

/// An armed auto-disconnect. Dropping it does not cancel; call `cancel`.
#[derive(Debug)]
pub struct DisconnectTimer {
    token: u64,
    task: JoinHandle<()>,
}

impl DisconnectTimer {
    /// After `delay`, sends a fire message carrying `token` to the session.
    pub(crate) fn arm(token: u64, delay: Duration, commands: UnboundedSender<SessionCommand>) -> Self {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if commands
                .send(SessionCommand::DisconnectTimerFired { token })
                .is_err()
            {
                debug!("Session closed before disconnect timer {} fired", token);
            }
        });

        Self { token, task }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// A fire message already in flight is not recalled; the session ignores
    /// it because the token no longer matches.
    pub fn cancel(self) {
        self.task.abort();
    }
}
