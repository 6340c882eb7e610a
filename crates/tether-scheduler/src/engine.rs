use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    error::{Result, SchedulerError},
    supervisor::Supervisor,
    types::Collaborators,
};

/// Drive `supervisor` every `interval` until `session` is cancelled.
///
/// A failed check is fatal: `connection` is cancelled, tearing down every
/// schedule of this connection, and the error is returned.
async fn run_check_loop(
    mut supervisor: Supervisor,
    interval: Duration,
    session: CancellationToken,
    connection: CancellationToken,
) -> Result<()> {
    info!(?interval, "check loop started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let outcome = loop {
        tokio::select! {
            biased;
            _ = session.cancelled() => break Ok(()),
            _ = ticker.tick() => {
                if let Err(e) = supervisor.check() {
                    error!(error = %e, "check cycle failed; stopping scheduler");
                    connection.cancel();
                    break Err(e);
                }
            }
        }
    };

    supervisor.reset();
    info!("check loop stopped");
    outcome
}

struct CheckLoop {
    session: CancellationToken,
    join: JoinHandle<Result<()>>,
}

/// Heartbeat / snapshot scheduling for one connection's lifetime.
///
/// Must be used from within a Tokio runtime. Dropping it cancels all of the
/// connection's background activity.
pub struct ConnectionScheduler {
    collab: Collaborators,
    session_name: Option<String>,
    connection: CancellationToken,
    check_loop: Option<CheckLoop>,
}

impl ConnectionScheduler {
    pub fn new(collab: Collaborators) -> Self {
        Self {
            collab,
            session_name: None,
            connection: CancellationToken::new(),
            check_loop: None,
        }
    }

    /// Name the server assigned to this client, once known.
    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    /// `true` while a check loop is alive.
    pub fn is_running(&self) -> bool {
        self.check_loop
            .as_ref()
            .is_some_and(|l| !l.session.is_cancelled() && !l.join.is_finished())
    }

    /// The server acknowledged the connection and named this client.
    ///
    /// The first name assigned on this connection is kept. Control mode is
    /// cleared, the previous check loop (if any) is stopped with all its
    /// schedules, and a fresh one is started. If the check interval cannot be
    /// read the whole connection is torn down and the error returned.
    pub fn on_connected(&mut self, assigned_name: &str) -> Result<()> {
        if self.connection.is_cancelled() {
            return Err(SchedulerError::ConnectionClosed);
        }

        if self.session_name.is_none() {
            self.session_name = Some(assigned_name.to_string());
            info!(
                session = %assigned_name,
                peer = %self.collab.peer,
                "session name assigned by server"
            );
            self.collab
                .notifier
                .notify(&format!("Session name assigned by server: {assigned_name}"));
        }

        // A re-identified session never inherits control.
        self.collab.control.set_controlled(false);
        self.reset();

        let interval = match self.collab.intervals.check_interval() {
            Ok(interval) => interval,
            Err(e) => {
                error!(
                    error = %e,
                    code = e.code(),
                    "check interval unreadable; closing scheduler"
                );
                self.connection.cancel();
                return Err(e.into());
            }
        };

        let session = self.connection.child_token();
        let supervisor = Supervisor::new(&self.collab, self.session_name(), session.clone());
        let join = tokio::spawn(run_check_loop(
            supervisor,
            interval,
            session.clone(),
            self.connection.clone(),
        ));
        self.check_loop = Some(CheckLoop { session, join });
        Ok(())
    }

    /// Stop the check loop and cancel every schedule of the current session.
    ///
    /// Schedules stop before their next firing; an in-flight firing may still
    /// complete. `on_connected` starts scheduling again.
    pub fn reset(&mut self) {
        if let Some(check_loop) = self.check_loop.take() {
            check_loop.session.cancel();
        }
    }

    /// Wait for the current check loop to end.
    ///
    /// Returns the fatal check error if that is why it ended; `Ok` after a
    /// reset, a shutdown, or when no loop is running.
    pub async fn wait(&mut self) -> Result<()> {
        match self.check_loop.take() {
            Some(check_loop) => check_loop.join.await?,
            None => Ok(()),
        }
    }

    /// The connection closed: cancel everything and wait for the loop to end.
    pub async fn shutdown(mut self) -> Result<()> {
        self.connection.cancel();
        let outcome = self.wait().await;
        info!(session = ?self.session_name, "connection scheduler shut down");
        outcome
    }
}

impl Drop for ConnectionScheduler {
    fn drop(&mut self) {
        self.connection.cancel();
    }
}
