use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{
    capture::SnapshotSource, connection::Connection, intervals::IntervalSource,
    notify::Notifier,
};

/// The two repeating jobs a session can run. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Heartbeat,
    Snapshot,
}

impl TaskKind {
    /// The task that must run for the given control mode.
    pub fn for_mode(controlled: bool) -> Self {
        if controlled {
            TaskKind::Snapshot
        } else {
            TaskKind::Heartbeat
        }
    }

    pub fn other(self) -> Self {
        match self {
            TaskKind::Heartbeat => TaskKind::Snapshot,
            TaskKind::Snapshot => TaskKind::Heartbeat,
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskKind::Heartbeat => "heartbeat",
            TaskKind::Snapshot => "snapshot",
        };
        write!(f, "{s}")
    }
}

/// "Is this session currently under control" — written by whoever handles
/// the peer's control commands, only read by the scheduler.
///
/// Clones share the same flag. Defaults to `false` (idle).
#[derive(Debug, Clone, Default)]
pub struct ControlFlag(Arc<AtomicBool>);

impl ControlFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_controlled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set_controlled(&self, controlled: bool) {
        self.0.store(controlled, Ordering::Release);
    }
}

/// Everything outside the scheduler that one connection's scheduling needs.
#[derive(Clone)]
pub struct Collaborators {
    pub connection: Arc<dyn Connection>,
    pub source: Arc<dyn SnapshotSource>,
    pub intervals: Arc<dyn IntervalSource>,
    pub control: ControlFlag,
    pub notifier: Arc<dyn Notifier>,
    /// `host:port` of the peer, for log context.
    pub peer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_flag_clones_share_state() {
        let flag = ControlFlag::new();
        let writer = flag.clone();
        assert!(!flag.is_controlled());
        writer.set_controlled(true);
        assert!(flag.is_controlled());
    }

    #[test]
    fn mode_selects_exactly_one_task() {
        assert_eq!(TaskKind::for_mode(false), TaskKind::Heartbeat);
        assert_eq!(TaskKind::for_mode(true), TaskKind::Snapshot);
        assert_eq!(TaskKind::for_mode(true).other(), TaskKind::Heartbeat);
    }
}
