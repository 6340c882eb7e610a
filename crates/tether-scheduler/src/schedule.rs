use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{task::PeriodicTask, types::TaskKind};

/// One outstanding repeating job.
///
/// Cancellation is cooperative: `cancel` asks the job to stop before its next
/// firing, a firing already in progress runs to completion. Dropping the
/// handle cancels the job.
#[derive(Debug)]
pub struct ScheduleHandle {
    kind: TaskKind,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Spawn `task` to fire immediately and then every `interval`.
    ///
    /// The job's token is a child of `parent`, so cancelling the session or
    /// the connection cancels the job too.
    pub fn spawn<T: PeriodicTask>(
        mut task: T,
        interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        let kind = task.kind();
        let token = parent.child_token();
        let stop = token.clone();

        let join = tokio::spawn(async move {
            // The first tick of a tokio interval completes immediately.
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => task.fire(),
                }
            }
            debug!(task = %kind, "schedule stopped");
        });

        debug!(task = %kind, ?interval, "schedule started");
        Self {
            kind,
            token,
            join,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// `true` once cancellation was requested, or if the job ended on its own
    /// (a panicking task body). Either way it will not fire again.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.join.is_finished()
    }

    /// Request the job to stop. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
