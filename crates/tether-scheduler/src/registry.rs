use crate::{schedule::ScheduleHandle, types::TaskKind};

/// The schedules of one session: at most one heartbeat, at most one snapshot.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    heartbeat: Option<ScheduleHandle>,
    snapshot: Option<ScheduleHandle>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: TaskKind) -> &Option<ScheduleHandle> {
        match kind {
            TaskKind::Heartbeat => &self.heartbeat,
            TaskKind::Snapshot => &self.snapshot,
        }
    }

    fn slot_mut(&mut self, kind: TaskKind) -> &mut Option<ScheduleHandle> {
        match kind {
            TaskKind::Heartbeat => &mut self.heartbeat,
            TaskKind::Snapshot => &mut self.snapshot,
        }
    }

    pub fn get(&self, kind: TaskKind) -> Option<&ScheduleHandle> {
        self.slot(kind).as_ref()
    }

    /// Registered and not cancelled.
    pub fn is_live(&self, kind: TaskKind) -> bool {
        self.get(kind).is_some_and(|h| !h.is_cancelled())
    }

    /// Kinds that are currently live, heartbeat first.
    pub fn live(&self) -> Vec<TaskKind> {
        [TaskKind::Heartbeat, TaskKind::Snapshot]
            .into_iter()
            .filter(|k| self.is_live(*k))
            .collect()
    }

    /// Cancel `kind` if it is live. Returns whether anything was cancelled.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        match self.get(kind) {
            Some(handle) if !handle.is_cancelled() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Put `handle` in its slot, dropping (and so cancelling) whatever was there.
    pub fn register(&mut self, handle: ScheduleHandle) {
        let kind = handle.kind();
        *self.slot_mut(kind) = Some(handle);
    }

    /// Cancel and forget every registered schedule. Returns how many were live.
    pub fn cancel_all(&mut self) -> usize {
        let mut live = 0;
        for kind in [TaskKind::Heartbeat, TaskKind::Snapshot] {
            if let Some(handle) = self.slot_mut(kind).take() {
                if !handle.is_cancelled() {
                    live += 1;
                }
                handle.cancel();
            }
        }
        live
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::task::PeriodicTask;

    struct Ticking {
        kind: TaskKind,
        fired: Arc<AtomicUsize>,
    }

    impl PeriodicTask for Ticking {
        fn kind(&self) -> TaskKind {
            self.kind
        }

        fn fire(&mut self) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn spawn(kind: TaskKind, root: &CancellationToken) -> (ScheduleHandle, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let task = Ticking {
            kind,
            fired: fired.clone(),
        };
        (
            ScheduleHandle::spawn(task, Duration::from_millis(100), root),
            fired,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn register_fills_the_slot_of_the_handle_kind() {
        let root = CancellationToken::new();
        let mut registry = TaskRegistry::new();
        assert!(registry.live().is_empty());

        registry.register(spawn(TaskKind::Snapshot, &root).0);
        assert!(registry.get(TaskKind::Heartbeat).is_none());
        assert_eq!(registry.live(), vec![TaskKind::Snapshot]);

        registry.register(spawn(TaskKind::Heartbeat, &root).0);
        assert_eq!(registry.live(), vec![TaskKind::Heartbeat, TaskKind::Snapshot]);
    }

    #[tokio::test(start_paused = true)]
    async fn registering_over_a_live_handle_stops_the_old_one() {
        let root = CancellationToken::new();
        let mut registry = TaskRegistry::new();
        let (first, first_fired) = spawn(TaskKind::Heartbeat, &root);
        registry.register(first);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let (second, second_fired) = spawn(TaskKind::Heartbeat, &root);
        registry.register(second);
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(first_fired.load(Ordering::SeqCst), 1);
        assert!(second_fired.load(Ordering::SeqCst) > 1);
        assert_eq!(registry.live(), vec![TaskKind::Heartbeat]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_only_counts_live_handles() {
        let root = CancellationToken::new();
        let mut registry = TaskRegistry::new();
        registry.register(spawn(TaskKind::Heartbeat, &root).0);
        registry.register(spawn(TaskKind::Snapshot, &root).0);

        assert!(registry.cancel(TaskKind::Snapshot));
        assert!(!registry.cancel(TaskKind::Snapshot));
        assert!(registry.get(TaskKind::Snapshot).is_some());

        assert_eq!(registry.cancel_all(), 1);
        assert!(registry.get(TaskKind::Heartbeat).is_none());
        assert!(registry.get(TaskKind::Snapshot).is_none());
        assert_eq!(registry.cancel_all(), 0);
    }
}
