use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    capture::SnapshotSource,
    detector::ChangeDetector,
    error::Result,
    intervals::IntervalSource,
    registry::TaskRegistry,
    schedule::ScheduleHandle,
    task::{HeartbeatTask, SharedDetector, SnapshotTask, TaskContext},
    types::{Collaborators, ControlFlag, TaskKind},
};

/// Actions taken by one check cycle. Both `None` means the registry already
/// matched the control mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub cancelled: Option<TaskKind>,
    pub started: Option<TaskKind>,
}

impl CheckReport {
    pub fn is_noop(&self) -> bool {
        self.cancelled.is_none() && self.started.is_none()
    }
}

/// Keeps exactly one of heartbeat / snapshot scheduled for a session.
///
/// Owned by a single check loop; nothing else touches the registry.
/// Every snapshot schedule it starts shares one change-detection buffer,
/// which lives until the next [`reset`](Self::reset).
pub struct Supervisor {
    control: ControlFlag,
    intervals: Arc<dyn IntervalSource>,
    source: Arc<dyn SnapshotSource>,
    ctx: TaskContext,
    registry: TaskRegistry,
    detector: SharedDetector,
    session: CancellationToken,
}

impl Supervisor {
    /// Schedules started by this supervisor are children of `session`.
    pub fn new(
        collab: &Collaborators,
        session_name: Option<&str>,
        session: CancellationToken,
    ) -> Self {
        Self {
            control: collab.control.clone(),
            intervals: collab.intervals.clone(),
            source: collab.source.clone(),
            ctx: TaskContext::new(collab.connection.clone(), session_name, &collab.peer),
            registry: TaskRegistry::new(),
            detector: fresh_detector(),
            session,
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// One check cycle: cancel the task the current mode does not want, then
    /// start the one it wants unless it is already live.
    ///
    /// An interval read failure is returned as-is; the caller must treat it as
    /// fatal. The unwanted task is already cancelled by then.
    pub fn check(&mut self) -> Result<CheckReport> {
        let controlled = self.control.is_controlled();
        let wanted = TaskKind::for_mode(controlled);
        let unwanted = wanted.other();
        let mut report = CheckReport::default();

        if self.registry.cancel(unwanted) {
            report.cancelled = Some(unwanted);
        }

        if !self.registry.is_live(wanted) {
            let handle = self.start(wanted)?;
            self.registry.register(handle);
            report.started = Some(wanted);
        }

        if !report.is_noop() {
            info!(
                session = ?self.ctx.session(),
                controlled,
                cancelled = ?report.cancelled,
                started = ?report.started,
                "task mode reconciled"
            );
        }
        Ok(report)
    }

    /// Cancel every registered schedule regardless of the control mode.
    ///
    /// Returns how many schedules were live. The change-detection buffer is
    /// replaced, so the next snapshot schedule sends its first capture.
    pub fn reset(&mut self) -> usize {
        let cancelled = self.registry.cancel_all();
        // A cancelled firing still in flight keeps the old buffer to itself.
        self.detector = fresh_detector();
        if cancelled > 0 {
            info!(session = ?self.ctx.session(), cancelled, "task schedules reset");
        }
        cancelled
    }

    fn start(&self, kind: TaskKind) -> Result<ScheduleHandle> {
        // Intervals are re-read on every start so config changes apply here.
        let handle = match kind {
            TaskKind::Heartbeat => {
                let interval = self.intervals.heartbeat_interval()?;
                let task = HeartbeatTask::new(self.ctx.clone());
                ScheduleHandle::spawn(task, interval, &self.session)
            }
            TaskKind::Snapshot => {
                let interval = self.intervals.snapshot_interval()?;
                let task =
                    SnapshotTask::new(self.ctx.clone(), self.source.clone(), self.detector.clone());
                ScheduleHandle::spawn(task, interval, &self.session)
            }
        };
        Ok(handle)
    }
}

fn fresh_detector() -> SharedDetector {
    Arc::new(Mutex::new(ChangeDetector::new()))
}
