use std::sync::{Arc, Mutex, PoisonError};

use tether_protocol::Request;
use tracing::{debug, warn};

use crate::{
    capture::SnapshotSource, connection::Connection, detector::ChangeDetector,
    error::SchedulerError, types::TaskKind,
};

/// Body of one repeating schedule, fired once per interval.
///
/// `fire` must not block and must not fail: every fault is handled inside
/// the firing so that the next one still happens.
pub trait PeriodicTask: Send + 'static {
    fn kind(&self) -> TaskKind;

    fn fire(&mut self);
}

/// What a task body needs to emit a request on behalf of its session.
#[derive(Clone)]
pub struct TaskContext {
    connection: Arc<dyn Connection>,
    session: Option<Arc<str>>,
    peer: Arc<str>,
}

impl TaskContext {
    pub fn new(connection: Arc<dyn Connection>, session: Option<&str>, peer: &str) -> Self {
        Self {
            connection,
            session: session.map(Arc::from),
            peer: Arc::from(peer),
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Write `request` if the connection is open. A closed or refusing
    /// connection only costs this tick.
    fn emit(&self, request: Request) {
        let command = request.command;
        if !self.connection.is_open() {
            debug!(peer = %self.peer, %command, "connection closed; emission skipped");
            return;
        }
        match self.connection.send(request) {
            Ok(()) => {}
            Err(SchedulerError::ConnectionClosed) => {
                debug!(peer = %self.peer, %command, "connection closed during send");
            }
            Err(e) => {
                warn!(peer = %self.peer, %command, error = %e, "send failed; next firing retries");
            }
        }
    }
}

/// Tells the peer the session is alive while nobody is watching it.
pub struct HeartbeatTask {
    ctx: TaskContext,
}

impl HeartbeatTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

impl PeriodicTask for HeartbeatTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Heartbeat
    }

    fn fire(&mut self) {
        debug!(peer = %self.ctx.peer, session = ?self.ctx.session(), "sending heartbeat");
        self.ctx.emit(Request::heartbeat(self.ctx.session()));
    }
}

/// Change-detection buffer of one session, handed to each snapshot schedule
/// the session starts.
pub type SharedDetector = Arc<Mutex<ChangeDetector>>;

/// Streams the screen while the session is controlled, skipping frames that
/// did not change.
///
/// The detector outlives the task: stopping and restarting the snapshot
/// schedule within a session keeps the last sent frame as the baseline.
pub struct SnapshotTask {
    ctx: TaskContext,
    source: Arc<dyn SnapshotSource>,
    detector: SharedDetector,
}

impl SnapshotTask {
    pub fn new(
        ctx: TaskContext,
        source: Arc<dyn SnapshotSource>,
        detector: SharedDetector,
    ) -> Self {
        Self {
            ctx,
            source,
            detector,
        }
    }

    fn differs(&self, snapshot: &[u8]) -> bool {
        // A firing that panicked mid-compare leaves a usable buffer behind.
        self.detector
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .differs(Some(snapshot))
    }
}

impl PeriodicTask for SnapshotTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Snapshot
    }

    fn fire(&mut self) {
        let Some(snapshot) = self.source.capture() else {
            debug!(peer = %self.ctx.peer, "capture returned nothing; treated as unchanged");
            return;
        };
        if !self.differs(&snapshot) {
            return;
        }
        debug!(peer = %self.ctx.peer, bytes = snapshot.len(), "sending screen snapshot");
        self.ctx.emit(Request::screen(self.ctx.session(), snapshot));
    }
}
